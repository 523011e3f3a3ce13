//! Core types for the review engine

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fraud probability (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Probability(u8);

impl Probability {
    /// Create new probability, saturating at 100
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Clamp a raw score to [0, 100] and round half away from zero.
    ///
    /// NaN collapses to 0.
    pub fn from_raw(raw: f64) -> Self {
        if raw.is_nan() {
            return Self(0);
        }
        Self(raw.clamp(0.0, 100.0).round() as u8)
    }

    /// Get raw value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Display band of this probability
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.0)
    }
}

impl From<u8> for Probability {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Probability> for u8 {
    fn from(probability: Probability) -> Self {
        probability.0
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Colour band used by the review queue for a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    /// Score >= 70
    High,
    /// Score 40-69
    Elevated,
    /// Score < 40
    Low,
}

impl ScoreBand {
    /// Band a score
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 70 => ScoreBand::High,
            s if s >= 40 => ScoreBand::Elevated,
            _ => ScoreBand::Low,
        }
    }
}

/// Merchant category offered by the manual input form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantCategory {
    /// Retail/Fashion
    Retail,
    /// Food & Dining
    Food,
    /// Consumer electronics
    Electronics,
    /// Luxury goods
    Luxury,
    /// Grocery/Kirana
    Grocery,
    /// Travel/Transport
    Travel,
    /// Gold/Jewellery
    Gold,
    /// Petrol/Fuel
    Fuel,
}

impl MerchantCategory {
    /// All categories in form order
    pub const ALL: [MerchantCategory; 8] = [
        MerchantCategory::Retail,
        MerchantCategory::Food,
        MerchantCategory::Electronics,
        MerchantCategory::Luxury,
        MerchantCategory::Grocery,
        MerchantCategory::Travel,
        MerchantCategory::Gold,
        MerchantCategory::Fuel,
    ];

    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            MerchantCategory::Retail => "retail",
            MerchantCategory::Food => "food",
            MerchantCategory::Electronics => "electronics",
            MerchantCategory::Luxury => "luxury",
            MerchantCategory::Grocery => "grocery",
            MerchantCategory::Travel => "travel",
            MerchantCategory::Gold => "gold",
            MerchantCategory::Fuel => "fuel",
        }
    }
}

impl FromStr for MerchantCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::Validation(format!("Unknown merchant category: {:?}", s)))
    }
}

impl fmt::Display for MerchantCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device the transaction was submitted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// Mobile app
    Mobile,
    /// Web browser
    Web,
    /// Point of sale terminal
    Pos,
}

impl DeviceType {
    /// All device types in form order
    pub const ALL: [DeviceType; 3] = [DeviceType::Mobile, DeviceType::Web, DeviceType::Pos];

    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Web => "web",
            DeviceType::Pos => "pos",
        }
    }
}

impl FromStr for DeviceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::Validation(format!("Unknown device type: {:?}", s)))
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated transaction submitted for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Transaction amount (non-negative)
    pub amount: Decimal,

    /// Hour of day (0-23)
    pub hour_of_day: u8,

    /// Merchant category
    pub merchant_category: MerchantCategory,

    /// Device type
    pub device_type: DeviceType,
}

impl TransactionInput {
    /// Create a validated transaction input
    pub fn new(
        amount: Decimal,
        hour_of_day: u8,
        merchant_category: MerchantCategory,
        device_type: DeviceType,
    ) -> Result<Self> {
        let input = Self {
            amount,
            hour_of_day,
            merchant_category,
            device_type,
        };
        input.validate()?;
        Ok(input)
    }

    /// Check range constraints.
    ///
    /// Fields are public, so the scoring engine re-checks before every
    /// evaluation.
    pub fn validate(&self) -> Result<()> {
        if self.amount < Decimal::ZERO {
            return Err(Error::Validation(format!(
                "Amount must be non-negative, got {}",
                self.amount
            )));
        }
        if self.hour_of_day > 23 {
            return Err(Error::Validation(format!(
                "Hour of day must be within 0-23, got {}",
                self.hour_of_day
            )));
        }
        Ok(())
    }
}

/// Raw form payload, possibly incomplete
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    /// Amount as entered
    #[serde(default)]
    pub amount: Option<Decimal>,

    /// Hour as entered
    #[serde(default)]
    pub hour_of_day: Option<HourEntry>,

    /// Merchant category label
    #[serde(default)]
    pub merchant_category: Option<String>,

    /// Device type label
    #[serde(default)]
    pub device_type: Option<String>,
}

/// Hour field of a form: a number, or the text of a select option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HourEntry {
    /// Numeric hour
    Number(i64),
    /// Hour as text, e.g. `"14"`
    Text(String),
}

impl HourEntry {
    /// Hour within 0-23
    pub fn resolve(&self) -> Result<u8> {
        let hour = match self {
            HourEntry::Number(n) => *n,
            HourEntry::Text(text) => text.trim().parse::<i64>().map_err(|_| {
                Error::Validation(format!("Hour of day must be a number, got {:?}", text))
            })?,
        };
        u8::try_from(hour)
            .ok()
            .filter(|h| *h <= 23)
            .ok_or_else(|| {
                Error::Validation(format!("Hour of day must be within 0-23, got {}", hour))
            })
    }
}

impl From<i64> for HourEntry {
    fn from(hour: i64) -> Self {
        HourEntry::Number(hour)
    }
}

impl TryFrom<TransactionForm> for TransactionInput {
    type Error = Error;

    fn try_from(form: TransactionForm) -> Result<Self> {
        let amount = form
            .amount
            .ok_or_else(|| Error::Validation("Missing field: amount".to_string()))?;

        let hour_of_day = match &form.hour_of_day {
            Some(HourEntry::Text(text)) if text.trim().is_empty() => None,
            other => other.as_ref(),
        }
        .ok_or_else(|| Error::Validation("Missing field: hour_of_day".to_string()))?
        .resolve()?;

        let merchant_category = match form.merchant_category.as_deref() {
            Some(label) if !label.trim().is_empty() => label.parse()?,
            _ => return Err(Error::Validation("Missing field: merchant_category".to_string())),
        };

        let device_type = match form.device_type.as_deref() {
            Some(label) if !label.trim().is_empty() => label.parse()?,
            _ => return Err(Error::Validation("Missing field: device_type".to_string())),
        };

        TransactionInput::new(amount, hour_of_day, merchant_category, device_type)
    }
}

/// Signed contribution to a fraud probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Factor name
    pub name: String,

    /// Signed contribution in probability points
    pub weight: f64,

    /// Human-readable rationale
    pub rationale: String,
}

impl RiskFactor {
    /// Create new risk factor
    pub fn new(name: impl Into<String>, weight: f64, rationale: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight,
            rationale: rationale.into(),
        }
    }
}

/// Result of scoring one transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    probability: Probability,
    is_flagged: bool,
    factors: Vec<RiskFactor>,
}

impl RiskAssessment {
    pub(crate) fn new(probability: Probability, is_flagged: bool, factors: Vec<RiskFactor>) -> Self {
        Self {
            probability,
            is_flagged,
            factors,
        }
    }

    /// Fraud probability
    pub fn probability(&self) -> Probability {
        self.probability
    }

    /// Whether the probability exceeded the threshold
    pub fn is_flagged(&self) -> bool {
        self.is_flagged
    }

    /// Contributing factors, in rule-definition order
    pub fn factors(&self) -> &[RiskFactor] {
        &self.factors
    }
}
