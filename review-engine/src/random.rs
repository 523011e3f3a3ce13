//! Injectable randomness for score jitter

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of bounded random values
pub trait RandomSource {
    /// Next value within `[low, high]`. Callers guarantee `low <= high`.
    fn next_bounded(&mut self, low: f64, high: f64) -> f64;
}

/// Process-wide generator (thread-local `rand` RNG). Production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_bounded(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        rand::thread_rng().gen_range(low..=high)
    }
}

/// Seeded generator for reproducible runs
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Create from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_bounded(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Always yields the same value, clamped to the requested bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedJitter(pub f64);

impl RandomSource for FixedJitter {
    fn next_bounded(&mut self, low: f64, high: f64) -> f64 {
        self.0.clamp(low, high)
    }
}

/// Replays a fixed sequence of values, cycling when exhausted
#[derive(Debug, Clone)]
pub struct JitterSequence {
    values: Vec<f64>,
    cursor: usize,
}

impl JitterSequence {
    /// Create from values. An empty sequence yields zero.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl RandomSource for JitterSequence {
    fn next_bounded(&mut self, low: f64, high: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0_f64.clamp(low, high);
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = (self.cursor + 1) % self.values.len();
        value.clamp(low, high)
    }
}
