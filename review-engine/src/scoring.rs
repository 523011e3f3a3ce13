//! Rule-based fraud scoring engine

use crate::config::{JitterBounds, ScoringConfig, Threshold};
use crate::random::RandomSource;
use crate::{Error, Probability, Result, RiskAssessment, RiskFactor, RuleSet, TransactionInput};
use serde::Serialize;
use tracing::debug;

/// Name of the factor reported when no rule contributes
pub const NORMAL_PATTERN_FACTOR: &str = "Normal Transaction Pattern";

/// Weight of the normal-pattern factor
pub const NORMAL_PATTERN_WEIGHT: f64 = -10.0;

/// Rationale of the normal-pattern factor
pub const NORMAL_PATTERN_RATIONALE: &str = "matches typical behavior";

/// Stateless scoring engine
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    jitter: JitterBounds,
}

impl ScoringEngine {
    /// Create engine with the given jitter bounds
    pub fn new(jitter: JitterBounds) -> Result<Self> {
        jitter.validate()?;
        Ok(Self { jitter })
    }

    /// Jitter bounds in use
    pub fn jitter(&self) -> JitterBounds {
        self.jitter
    }

    /// Score `input` against `rule_set`.
    ///
    /// Fails with a validation error before any rule runs if the input is out
    /// of range.
    pub fn evaluate<R>(
        &self,
        input: &TransactionInput,
        rule_set: &RuleSet,
        threshold: Threshold,
        rng: &mut R,
    ) -> Result<RiskAssessment>
    where
        R: RandomSource + ?Sized,
    {
        input.validate()?;

        let mut factors: Vec<RiskFactor> = rule_set
            .rules()
            .iter()
            .filter_map(|rule| rule.evaluate(input))
            .collect();

        let base: f64 = factors.iter().map(|f| f.weight).sum();
        let jitter = rng.next_bounded(self.jitter.min, self.jitter.max);
        let probability = Probability::from_raw(base + jitter);
        let is_flagged = f64::from(probability.value()) > threshold.value();

        if factors.is_empty() {
            factors.push(RiskFactor::new(
                NORMAL_PATTERN_FACTOR,
                NORMAL_PATTERN_WEIGHT,
                NORMAL_PATTERN_RATIONALE,
            ));
        }

        debug!(
            rules = rule_set.len(),
            fired = factors.len(),
            base,
            jitter,
            probability = probability.value(),
            is_flagged,
            "Transaction scored"
        );

        Ok(RiskAssessment::new(probability, is_flagged, factors))
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self {
            jitter: JitterBounds::default(),
        }
    }
}

/// Score a transaction with the settings' fraud threshold and jitter bounds
pub fn score_transaction<R>(
    input: &TransactionInput,
    rule_set: &RuleSet,
    config: &ScoringConfig,
    rng: &mut R,
) -> Result<RiskAssessment>
where
    R: RandomSource + ?Sized,
{
    config.validate()?;
    ScoringEngine::new(config.jitter)?.evaluate(input, rule_set, config.fraud_threshold, rng)
}

/// Outcome of scoring a batch of transactions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// One assessment per input, in input order
    pub assessments: Vec<RiskAssessment>,

    /// Number of flagged assessments
    pub flagged: usize,
}

impl BatchSummary {
    /// Total number of scored transactions
    pub fn total(&self) -> usize {
        self.assessments.len()
    }

    /// Share of flagged transactions (0.0 for an empty batch)
    pub fn flagged_ratio(&self) -> f64 {
        if self.assessments.is_empty() {
            0.0
        } else {
            self.flagged as f64 / self.assessments.len() as f64
        }
    }
}

/// Score every input; the first invalid input fails the whole batch
pub fn score_batch<R>(
    inputs: &[TransactionInput],
    rule_set: &RuleSet,
    config: &ScoringConfig,
    rng: &mut R,
) -> Result<BatchSummary>
where
    R: RandomSource + ?Sized,
{
    config.validate()?;

    if let Some((index, err)) = inputs
        .iter()
        .enumerate()
        .find_map(|(i, input)| input.validate().err().map(|e| (i, e)))
    {
        return Err(Error::Validation(format!("Row {}: {}", index, err)));
    }

    let engine = ScoringEngine::new(config.jitter)?;
    let assessments = inputs
        .iter()
        .map(|input| engine.evaluate(input, rule_set, config.fraud_threshold, &mut *rng))
        .collect::<Result<Vec<_>>>()?;
    let flagged = assessments.iter().filter(|a| a.is_flagged()).count();

    debug!(total = assessments.len(), flagged, "Batch scored");

    Ok(BatchSummary {
        assessments,
        flagged,
    })
}
