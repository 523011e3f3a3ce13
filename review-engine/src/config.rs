//! Scoring settings
//!
//! Thresholds are held in an immutable [`ScoringConfig`] passed into every
//! scoring call. The engine never reads settings from ambient state.

use crate::{Error, Result, RiskAssessment, TransactionInput};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Amount above which a transaction always goes to an analyst
pub const DEFAULT_MAX_TRANSACTION_AMOUNT: i64 = 1_000_000;

/// Validated probability threshold in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    /// Create a threshold, rejecting NaN and values outside [0, 100]
    pub fn new(value: f64) -> Result<Self> {
        if !(0.0..=100.0).contains(&value) {
            return Err(Error::Configuration(format!(
                "Threshold must be within 0-100, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Threshold from an optional settings value
    pub fn required(value: Option<f64>) -> Result<Self> {
        value
            .ok_or_else(|| Error::Configuration("Missing threshold".to_string()))
            .and_then(Self::new)
    }

    /// Raw value
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Threshold {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

/// Bounds of the random jitter added to the rule score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterBounds {
    /// Lower bound (inclusive)
    pub min: f64,

    /// Upper bound (inclusive)
    pub max: f64,
}

impl JitterBounds {
    /// No jitter at all
    pub const NONE: JitterBounds = JitterBounds { min: 0.0, max: 0.0 };

    /// Create validated bounds
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check bounds are finite and ordered
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::Configuration(format!(
                "Jitter bounds must be finite, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(Error::Configuration(format!(
                "Jitter lower bound {} exceeds upper bound {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for JitterBounds {
    fn default() -> Self {
        Self {
            min: -10.0,
            max: 10.0,
        }
    }
}

/// Triage outcome for a scored transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Above the fraud threshold with auto-block enabled
    Block,
    /// Queued for an analyst
    Review,
    /// Nothing to do
    Clear,
}

/// Scoring settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScoringConfig")]
pub struct ScoringConfig {
    /// Probability above which a transaction is flagged as fraud
    pub fraud_threshold: Threshold,

    /// Probability above which a transaction raises a review alert
    pub alert_threshold: Threshold,

    /// Jitter bounds
    pub jitter: JitterBounds,

    /// Block transactions above the fraud threshold without review
    pub auto_block: bool,

    /// Amounts above this need additional scrutiny
    pub max_transaction_amount: Decimal,
}

impl ScoringConfig {
    /// Create validated settings
    pub fn new(
        fraud_threshold: Threshold,
        alert_threshold: Threshold,
        jitter: JitterBounds,
    ) -> Result<Self> {
        let config = Self {
            fraud_threshold,
            alert_threshold,
            jitter,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Settings with the given fraud threshold and default alert/jitter values.
    ///
    /// The alert threshold is lowered to the fraud threshold when needed.
    pub fn with_fraud_threshold(fraud_threshold: Threshold) -> Self {
        let defaults = Self::default();
        let alert_threshold = if defaults.alert_threshold > fraud_threshold {
            fraud_threshold
        } else {
            defaults.alert_threshold
        };
        Self {
            fraud_threshold,
            alert_threshold,
            ..defaults
        }
    }

    /// Replace the jitter bounds
    pub fn with_jitter(self, jitter: JitterBounds) -> Result<Self> {
        let config = Self { jitter, ..self };
        config.validate()?;
        Ok(config)
    }

    /// Enable or disable automatic blocking
    pub fn with_auto_block(self, auto_block: bool) -> Self {
        Self { auto_block, ..self }
    }

    /// Replace the scrutiny amount
    pub fn with_max_transaction_amount(self, max_transaction_amount: Decimal) -> Result<Self> {
        let config = Self {
            max_transaction_amount,
            ..self
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse settings from TOML. Omitted keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| Error::Configuration(format!("Invalid settings: {}", e)))
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        self.jitter.validate()?;
        if self.alert_threshold > self.fraud_threshold {
            return Err(Error::Configuration(format!(
                "Alert threshold {} exceeds fraud threshold {}",
                self.alert_threshold.value(),
                self.fraud_threshold.value()
            )));
        }
        if self.max_transaction_amount < Decimal::ZERO {
            return Err(Error::Configuration(format!(
                "Max transaction amount must not be negative, got {}",
                self.max_transaction_amount
            )));
        }
        Ok(())
    }

    /// Classify a scored transaction.
    ///
    /// Only auto-block turns a fraud-level score into [`Disposition::Block`];
    /// otherwise it goes to review, as do amounts above the scrutiny limit.
    pub fn triage(&self, input: &TransactionInput, assessment: &RiskAssessment) -> Disposition {
        let probability = f64::from(assessment.probability().value());
        if probability > self.fraud_threshold.value() {
            if self.auto_block {
                Disposition::Block
            } else {
                Disposition::Review
            }
        } else if probability > self.alert_threshold.value()
            || input.amount > self.max_transaction_amount
        {
            Disposition::Review
        } else {
            Disposition::Clear
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fraud_threshold: Threshold(70.0),
            alert_threshold: Threshold(50.0),
            jitter: JitterBounds::default(),
            auto_block: false,
            max_transaction_amount: Decimal::from(DEFAULT_MAX_TRANSACTION_AMOUNT),
        }
    }
}

/// Deserialization shape; validated into [`ScoringConfig`]
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScoringConfig {
    #[serde(default = "default_fraud_threshold")]
    fraud_threshold: f64,
    #[serde(default = "default_alert_threshold")]
    alert_threshold: f64,
    #[serde(default)]
    jitter: JitterBounds,
    #[serde(default)]
    auto_block: bool,
    #[serde(default = "default_max_transaction_amount")]
    max_transaction_amount: Decimal,
}

fn default_fraud_threshold() -> f64 {
    70.0
}

fn default_alert_threshold() -> f64 {
    50.0
}

fn default_max_transaction_amount() -> Decimal {
    Decimal::from(DEFAULT_MAX_TRANSACTION_AMOUNT)
}

impl TryFrom<RawScoringConfig> for ScoringConfig {
    type Error = Error;

    fn try_from(raw: RawScoringConfig) -> Result<Self> {
        Self::new(
            Threshold::new(raw.fraud_threshold)?,
            Threshold::new(raw.alert_threshold)?,
            raw.jitter,
        )?
        .with_auto_block(raw.auto_block)
        .with_max_transaction_amount(raw.max_transaction_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeviceType, MerchantCategory, Probability, RiskAssessment};

    fn at(p: u8) -> RiskAssessment {
        RiskAssessment::new(Probability::new(p), false, Vec::new())
    }

    fn spend(amount: i64) -> TransactionInput {
        TransactionInput::new(Decimal::from(amount), 12, MerchantCategory::Retail, DeviceType::Web)
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ScoringConfig::default();
        assert_eq!(config.fraud_threshold.value(), 70.0);
        assert_eq!(config.alert_threshold.value(), 50.0);
        assert_eq!(config.jitter, JitterBounds { min: -10.0, max: 10.0 });
        assert!(!config.auto_block);
        assert_eq!(config.max_transaction_amount, Decimal::from(1_000_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_range() {
        assert!(Threshold::new(0.0).is_ok());
        assert!(Threshold::new(100.0).is_ok());
        assert!(Threshold::new(-0.5).unwrap_err().is_configuration());
        assert!(Threshold::new(100.5).unwrap_err().is_configuration());
        assert!(Threshold::new(f64::NAN).unwrap_err().is_configuration());
        assert!(Threshold::required(None).unwrap_err().is_configuration());
    }

    #[test]
    fn test_jitter_bounds_validation() {
        assert!(JitterBounds::new(5.0, -5.0).unwrap_err().is_configuration());
        assert!(JitterBounds::new(f64::NEG_INFINITY, 0.0).is_err());
        assert!(JitterBounds::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_alert_threshold_cannot_exceed_fraud_threshold() {
        let result = ScoringConfig::new(
            Threshold::new(40.0).unwrap(),
            Threshold::new(60.0).unwrap(),
            JitterBounds::default(),
        );
        assert!(result.unwrap_err().is_configuration());

        let lowered = ScoringConfig::with_fraud_threshold(Threshold::new(30.0).unwrap());
        assert_eq!(lowered.alert_threshold.value(), 30.0);
    }

    #[test]
    fn test_from_toml() {
        let config = ScoringConfig::from_toml_str(
            r#"
            fraud_threshold = 80
            alert_threshold = 55.5
            auto_block = true
            max_transaction_amount = 250000

            [jitter]
            min = -5.0
            max = 5.0
            "#,
        )
        .unwrap();
        assert_eq!(config.fraud_threshold.value(), 80.0);
        assert_eq!(config.alert_threshold.value(), 55.5);
        assert_eq!(config.jitter, JitterBounds { min: -5.0, max: 5.0 });
        assert!(config.auto_block);
        assert_eq!(config.max_transaction_amount, Decimal::from(250_000));

        let defaults = ScoringConfig::from_toml_str("").unwrap();
        assert_eq!(defaults, ScoringConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_invalid_values() {
        assert!(ScoringConfig::from_toml_str("fraud_threshold = 150").is_err());
        assert!(ScoringConfig::from_toml_str("fraud_threshold = 20").is_err());
        assert!(ScoringConfig::from_toml_str("unknown = 1").is_err());
        assert!(ScoringConfig::from_toml_str("max_transaction_amount = -5").is_err());
    }

    #[test]
    fn test_triage_without_auto_block_never_blocks() {
        let config = ScoringConfig::default();
        let tx = spend(500);
        assert_eq!(config.triage(&tx, &at(95)), Disposition::Review);
        assert_eq!(config.triage(&tx, &at(71)), Disposition::Review);
        assert_eq!(config.triage(&tx, &at(70)), Disposition::Review);
        assert_eq!(config.triage(&tx, &at(51)), Disposition::Review);
        assert_eq!(config.triage(&tx, &at(50)), Disposition::Clear);
    }

    #[test]
    fn test_triage_with_auto_block() {
        let config = ScoringConfig::default().with_auto_block(true);
        let tx = spend(500);
        assert_eq!(config.triage(&tx, &at(71)), Disposition::Block);
        assert_eq!(config.triage(&tx, &at(70)), Disposition::Review);
        assert_eq!(config.triage(&tx, &at(50)), Disposition::Clear);
    }

    #[test]
    fn test_triage_reviews_amounts_above_limit() {
        let config = ScoringConfig::default();
        assert_eq!(config.triage(&spend(1_000_000), &at(10)), Disposition::Clear);
        assert_eq!(config.triage(&spend(1_000_001), &at(10)), Disposition::Review);

        let strict = config.with_max_transaction_amount(Decimal::from(1_000)).unwrap();
        assert_eq!(strict.triage(&spend(1_500), &at(10)), Disposition::Review);
        assert!(config
            .with_max_transaction_amount(Decimal::from(-1))
            .unwrap_err()
            .is_configuration());
    }
}
