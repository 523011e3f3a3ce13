//! Declarative risk rules
//!
//! A [`RuleSet`] is an ordered, immutable list of [`RuleDefinition`]s. The
//! scoring engine walks it front to back; adding a rule never touches engine
//! code.

use crate::{DeviceType, Error, MerchantCategory, Result, RiskFactor, TransactionInput};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Amount above which a transaction is considered high value
pub const HIGH_AMOUNT_THRESHOLD: i64 = 100_000;

/// First hour (inclusive) of normal business hours
pub const BUSINESS_HOURS_START: u8 = 6;

/// Last hour (inclusive) of normal business hours
pub const BUSINESS_HOURS_END: u8 = 22;

/// Shared rule predicate
pub type Predicate = Arc<dyn Fn(&TransactionInput) -> bool + Send + Sync>;

/// Shared weight function
pub type WeightFn = Arc<dyn Fn(&TransactionInput) -> f64 + Send + Sync>;

/// Weight a rule contributes when it fires
#[derive(Clone)]
pub enum RuleWeight {
    /// Constant contribution
    Fixed(f64),
    /// Contribution derived from the input
    Computed(WeightFn),
}

impl RuleWeight {
    fn resolve(&self, input: &TransactionInput) -> f64 {
        match self {
            RuleWeight::Fixed(w) => *w,
            RuleWeight::Computed(f) => f(input),
        }
    }
}

impl fmt::Debug for RuleWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleWeight::Fixed(w) => f.debug_tuple("Fixed").field(w).finish(),
            RuleWeight::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A named predicate with a weight and rationale
#[derive(Clone)]
pub struct RuleDefinition {
    id: String,
    name: String,
    rationale: String,
    weight: RuleWeight,
    predicate: Predicate,
}

impl RuleDefinition {
    /// Rule with a fixed weight
    pub fn new<P>(
        id: impl Into<String>,
        name: impl Into<String>,
        weight: f64,
        rationale: impl Into<String>,
        predicate: P,
    ) -> Self
    where
        P: Fn(&TransactionInput) -> bool + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            rationale: rationale.into(),
            weight: RuleWeight::Fixed(weight),
            predicate: Arc::new(predicate),
        }
    }

    /// Rule whose weight is computed from the input when it fires
    pub fn computed<P, W>(
        id: impl Into<String>,
        name: impl Into<String>,
        rationale: impl Into<String>,
        predicate: P,
        weight: W,
    ) -> Self
    where
        P: Fn(&TransactionInput) -> bool + Send + Sync + 'static,
        W: Fn(&TransactionInput) -> f64 + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            rationale: rationale.into(),
            weight: RuleWeight::Computed(Arc::new(weight)),
            predicate: Arc::new(predicate),
        }
    }

    /// Unique rule id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name of the factor this rule produces
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rationale shown to reviewers
    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    /// Weight definition
    pub fn weight(&self) -> &RuleWeight {
        &self.weight
    }

    /// Whether the predicate holds for `input`
    pub fn fires(&self, input: &TransactionInput) -> bool {
        (self.predicate)(input)
    }

    /// Factor produced for `input`, if the rule fires with a usable weight.
    ///
    /// Zero and non-finite weights produce nothing.
    pub fn evaluate(&self, input: &TransactionInput) -> Option<RiskFactor> {
        if !self.fires(input) {
            return None;
        }
        let weight = self.weight.resolve(input);
        if weight == 0.0 || !weight.is_finite() {
            return None;
        }
        Some(RiskFactor::new(self.name.clone(), weight, self.rationale.clone()))
    }
}

impl fmt::Debug for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("rationale", &self.rationale)
            .finish_non_exhaustive()
    }
}

/// Ordered rule collection with unique ids
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<RuleDefinition>,
}

impl RuleSet {
    /// Create a rule set, rejecting empty or duplicate ids
    pub fn new(rules: Vec<RuleDefinition>) -> Result<Self> {
        check_ids(&rules)?;
        Ok(Self { rules })
    }

    /// Start building a rule set
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    /// Rules used by the manual review console
    pub fn standard() -> Self {
        let high_amount = Decimal::from(HIGH_AMOUNT_THRESHOLD);
        Self {
            rules: vec![
                RuleDefinition::new(
                    "high_amount",
                    "High Transaction Amount",
                    30.0,
                    "Transaction amount exceeds typical spending pattern",
                    move |tx| tx.amount > high_amount,
                ),
                RuleDefinition::new(
                    "unusual_hour",
                    "Unusual Transaction Time",
                    20.0,
                    "Transaction occurred outside normal business hours",
                    |tx| tx.hour_of_day < BUSINESS_HOURS_START || tx.hour_of_day > BUSINESS_HOURS_END,
                ),
                RuleDefinition::new(
                    "luxury_merchant",
                    "High-Risk Merchant Category",
                    25.0,
                    "Luxury goods are commonly targeted by fraudsters",
                    |tx| tx.merchant_category == MerchantCategory::Luxury,
                ),
                RuleDefinition::new(
                    "mobile_device",
                    "Mobile Device Transaction",
                    15.0,
                    "Mobile transactions have higher fraud rates",
                    |tx| tx.device_type == DeviceType::Mobile,
                ),
            ],
        }
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[RuleDefinition] {
        &self.rules
    }

    /// Look up a rule by id
    pub fn get(&self, id: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set holds no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for [`RuleSet`]
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    rules: Vec<RuleDefinition>,
}

impl RuleSetBuilder {
    /// Seed the builder with the standard rules
    pub fn with_standard_rules(mut self) -> Self {
        self.rules.extend(RuleSet::standard().rules);
        self
    }

    /// Append a rule
    pub fn rule(mut self, rule: RuleDefinition) -> Self {
        self.rules.push(rule);
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<RuleSet> {
        RuleSet::new(self.rules)
    }
}

fn check_ids(rules: &[RuleDefinition]) -> Result<()> {
    let mut seen = HashSet::with_capacity(rules.len());
    for rule in rules {
        if rule.id.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "Rule {:?} has an empty id",
                rule.name
            )));
        }
        if !seen.insert(rule.id.as_str()) {
            return Err(Error::Configuration(format!(
                "Duplicate rule id: {}",
                rule.id
            )));
        }
    }
    Ok(())
}
