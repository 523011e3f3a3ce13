//! Ranking of risk factors for display

use crate::RiskFactor;

/// Number of factors the console shows by default
pub const DEFAULT_TOP_K: usize = 5;

/// Order factors by descending absolute weight.
///
/// Equal magnitudes keep their input (rule-set) order. The input is left
/// untouched and a new vector is returned.
pub fn rank(factors: &[RiskFactor]) -> Vec<RiskFactor> {
    let mut ranked = factors.to_vec();
    // sort_by is stable
    ranked.sort_by(|a, b| b.weight.abs().total_cmp(&a.weight.abs()));
    ranked
}

/// The `k` highest-impact factors
pub fn top(factors: &[RiskFactor], k: usize) -> Vec<RiskFactor> {
    let mut ranked = rank(factors);
    ranked.truncate(k);
    ranked
}
