//! Review queue records

use crate::query::{FieldValue, Queryable};
use crate::{DeviceType, MerchantCategory, ScoreBand};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review status of an alert.
///
/// Lifecycle: `pending -> {approved, blocked, under_review}`,
/// `under_review -> {approved, blocked}`. Approved and blocked are terminal.
/// Transitions are driven by operators; queries never enforce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// Awaiting triage
    Pending,
    /// Assigned to an analyst
    UnderReview,
    /// Released
    Approved,
    /// Blocked as fraud
    Blocked,
}

impl AlertStatus {
    /// All statuses in lifecycle order
    pub const ALL: [AlertStatus; 4] = [
        AlertStatus::Pending,
        AlertStatus::UnderReview,
        AlertStatus::Approved,
        AlertStatus::Blocked,
    ];

    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "pending",
            AlertStatus::UnderReview => "under_review",
            AlertStatus::Approved => "approved",
            AlertStatus::Blocked => "blocked",
        }
    }

    /// Position in the lifecycle, used for sorting
    pub fn rank(&self) -> u8 {
        match self {
            AlertStatus::Pending => 0,
            AlertStatus::UnderReview => 1,
            AlertStatus::Approved => 2,
            AlertStatus::Blocked => 3,
        }
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertStatus::Approved | AlertStatus::Blocked)
    }

    /// Whether an operator may move an alert from `self` to `next`
    pub fn can_transition_to(&self, next: AlertStatus) -> bool {
        matches!(
            (self, next),
            (AlertStatus::Pending, AlertStatus::Approved)
                | (AlertStatus::Pending, AlertStatus::Blocked)
                | (AlertStatus::Pending, AlertStatus::UnderReview)
                | (AlertStatus::UnderReview, AlertStatus::Approved)
                | (AlertStatus::UnderReview, AlertStatus::Blocked)
        )
    }

    fn field_value(&self) -> FieldValue<'static> {
        FieldValue::Ordinal {
            rank: self.rank(),
            label: self.as_str(),
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    /// High
    High,
    /// Medium
    Medium,
    /// Low
    Low,
}

impl AlertPriority {
    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPriority::High => "high",
            AlertPriority::Medium => "medium",
            AlertPriority::Low => "low",
        }
    }

    /// Severity rank; higher is more urgent
    pub fn rank(&self) -> u8 {
        match self {
            AlertPriority::Low => 0,
            AlertPriority::Medium => 1,
            AlertPriority::High => 2,
        }
    }

    fn field_value(&self) -> FieldValue<'static> {
        FieldValue::Ordinal {
            rank: self.rank(),
            label: self.as_str(),
        }
    }
}

impl fmt::Display for AlertPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert in the review queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Alert id
    pub id: String,

    /// Flagged transaction id
    pub transaction_id: String,

    /// Raised at
    pub timestamp: NaiveDateTime,

    /// Transaction amount
    pub amount: Decimal,

    /// Merchant name
    pub merchant: String,

    /// Alert category (e.g. "Velocity Check")
    pub category: String,

    /// Fraud score (0-100)
    pub score: u8,

    /// Review status
    pub status: AlertStatus,

    /// Priority
    pub priority: AlertPriority,

    /// Assigned analyst
    #[serde(default)]
    pub assignee: Option<String>,
}

impl AlertRecord {
    /// Display band of the score
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }
}

impl Queryable for AlertRecord {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "transaction_id",
        "timestamp",
        "amount",
        "merchant",
        "category",
        "score",
        "status",
        "priority",
        "assignee",
    ];

    const SEARCH_FIELDS: &'static [&'static str] = &["id", "transaction_id", "merchant"];

    fn field(&self, field: &str) -> Option<FieldValue<'_>> {
        let value = match field {
            "id" => FieldValue::Text(&self.id),
            "transaction_id" => FieldValue::Text(&self.transaction_id),
            "timestamp" => FieldValue::Time(self.timestamp),
            "amount" => FieldValue::Number(self.amount),
            "merchant" => FieldValue::Text(&self.merchant),
            "category" => FieldValue::Text(&self.category),
            "score" => FieldValue::Number(Decimal::from(self.score)),
            "status" => self.status.field_value(),
            "priority" => self.priority.field_value(),
            "assignee" => FieldValue::Text(self.assignee.as_deref()?),
            _ => return None,
        };
        Some(value)
    }
}

/// Scored transaction shown in the dashboard table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction id
    pub id: String,

    /// Submitted at
    pub timestamp: NaiveDateTime,

    /// Amount
    pub amount: Decimal,

    /// Merchant name
    pub merchant: String,

    /// Merchant category
    pub merchant_category: MerchantCategory,

    /// Device type
    pub device_type: DeviceType,

    /// Fraud score (0-100)
    pub score: u8,

    /// Review status
    pub status: AlertStatus,

    /// Priority
    pub priority: AlertPriority,

    /// Assigned analyst
    #[serde(default)]
    pub assignee: Option<String>,

    /// Reasons shown next to the score
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl TransactionRecord {
    /// Display band of the score
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }
}

impl Queryable for TransactionRecord {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "timestamp",
        "amount",
        "merchant",
        "merchant_category",
        "device_type",
        "score",
        "status",
        "priority",
        "assignee",
    ];

    const SEARCH_FIELDS: &'static [&'static str] = &["id", "merchant"];

    fn field(&self, field: &str) -> Option<FieldValue<'_>> {
        let value = match field {
            "id" => FieldValue::Text(&self.id),
            "timestamp" => FieldValue::Time(self.timestamp),
            "amount" => FieldValue::Number(self.amount),
            "merchant" => FieldValue::Text(&self.merchant),
            "merchant_category" => FieldValue::Text(self.merchant_category.as_str()),
            "device_type" => FieldValue::Text(self.device_type.as_str()),
            "score" => FieldValue::Number(Decimal::from(self.score)),
            "status" => self.status.field_value(),
            "priority" => self.priority.field_value(),
            "assignee" => FieldValue::Text(self.assignee.as_deref()?),
            _ => return None,
        };
        Some(value)
    }
}

/// Summary counts for the alert queue header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStats {
    /// All alerts
    pub total: usize,
    /// Pending alerts
    pub pending: usize,
    /// Alerts under review
    pub under_review: usize,
    /// High-priority alerts
    pub high_priority: usize,
    /// Approved alerts
    pub approved: usize,
    /// Blocked alerts
    pub blocked: usize,
}

impl AlertStats {
    /// Count alerts by status and priority
    pub fn collect<'a, I>(alerts: I) -> Self
    where
        I: IntoIterator<Item = &'a AlertRecord>,
    {
        alerts.into_iter().fold(Self::default(), |mut stats, alert| {
            stats.total += 1;
            match alert.status {
                AlertStatus::Pending => stats.pending += 1,
                AlertStatus::UnderReview => stats.under_review += 1,
                AlertStatus::Approved => stats.approved += 1,
                AlertStatus::Blocked => stats.blocked += 1,
            }
            if alert.priority == AlertPriority::High {
                stats.high_priority += 1;
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{query_records, FieldFilter, QuerySpec, SortDirection};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 1)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .unwrap()
    }

    fn alert(id: &str, score: u8, status: AlertStatus, priority: AlertPriority) -> AlertRecord {
        AlertRecord {
            id: id.to_string(),
            transaction_id: format!("TXN-{}", id),
            timestamp: at(14, 0, 0),
            amount: Decimal::new(100_00, 2),
            merchant: "Test Merchant".to_string(),
            category: "High Amount".to_string(),
            score,
            status,
            priority,
            assignee: None,
        }
    }

    #[test]
    fn test_lifecycle() {
        use AlertStatus::*;
        assert!(Pending.can_transition_to(UnderReview));
        assert!(Pending.can_transition_to(Blocked));
        assert!(UnderReview.can_transition_to(Approved));
        assert!(!UnderReview.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Blocked));
        assert!(Approved.is_terminal() && Blocked.is_terminal());
        for status in AlertStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_filter_by_status_label() {
        let alerts = vec![
            alert("A", 85, AlertStatus::Pending, AlertPriority::High),
            alert("B", 92, AlertStatus::UnderReview, AlertPriority::High),
            alert("C", 55, AlertStatus::Pending, AlertPriority::Low),
        ];
        let spec = QuerySpec::default()
            .filter("status", FieldFilter::selection("pending"))
            .filter("priority", FieldFilter::selection("high"));
        let ids: Vec<String> = query_records(&alerts, &spec).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["A"]);

        let spec = QuerySpec::default().filter("status", FieldFilter::selection("under_review"));
        assert_eq!(query_records(&alerts, &spec)[0].id, "B");
    }

    #[test]
    fn test_priority_sorts_by_severity() {
        let alerts = vec![
            alert("low", 10, AlertStatus::Pending, AlertPriority::Low),
            alert("high", 10, AlertStatus::Pending, AlertPriority::High),
            alert("medium", 10, AlertStatus::Pending, AlertPriority::Medium),
        ];
        let spec = QuerySpec::default().sort_by("priority", SortDirection::Desc);
        let ids: Vec<String> = query_records(&alerts, &spec).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["high", "medium", "low"]);
    }

    #[test]
    fn test_timestamp_sorts_chronologically() {
        let mut early = alert("early", 10, AlertStatus::Pending, AlertPriority::Low);
        early.timestamp = at(9, 5, 0);
        let mut late = alert("late", 10, AlertStatus::Pending, AlertPriority::Low);
        late.timestamp = at(14, 23, 15);

        let spec = QuerySpec::default().sort_by("timestamp", SortDirection::Asc);
        let ids: Vec<String> = query_records(&[late, early], &spec).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn test_amount_filter_uses_normalized_text() {
        let alerts = vec![alert("A", 10, AlertStatus::Pending, AlertPriority::Low)];
        let spec = QuerySpec::default().filter("amount", FieldFilter::selection("100"));
        assert_eq!(query_records(&alerts, &spec).len(), 1);
    }

    #[test]
    fn test_transaction_record_fields() {
        let tx = TransactionRecord {
            id: "TXN-002".to_string(),
            timestamp: at(14, 18, 0),
            amount: Decimal::new(3450_00, 2),
            merchant: "Chai Point Indore".to_string(),
            merchant_category: MerchantCategory::Food,
            device_type: DeviceType::Pos,
            score: 15,
            status: AlertStatus::Approved,
            priority: AlertPriority::Low,
            assignee: None,
            reasons: vec!["Normal transaction pattern".to_string()],
        };
        assert_eq!(tx.field("device_type"), Some(FieldValue::Text("pos")));
        assert_eq!(tx.field("assignee"), None);
        assert_eq!(tx.field("reasons"), None);
        assert_eq!(tx.score_band(), ScoreBand::Low);

        let spec = QuerySpec::default().search("chai");
        assert_eq!(query_records(&[tx], &spec).len(), 1);
    }

    #[test]
    fn test_alert_stats() {
        let alerts = vec![
            alert("1", 85, AlertStatus::Pending, AlertPriority::High),
            alert("2", 92, AlertStatus::UnderReview, AlertPriority::High),
            alert("3", 78, AlertStatus::Approved, AlertPriority::Medium),
            alert("4", 67, AlertStatus::Blocked, AlertPriority::Medium),
            alert("5", 55, AlertStatus::Pending, AlertPriority::Low),
        ];
        let stats = AlertStats::collect(&alerts);
        assert_eq!(
            stats,
            AlertStats {
                total: 5,
                pending: 2,
                under_review: 1,
                high_priority: 2,
                approved: 1,
                blocked: 1,
            }
        );
        assert_eq!(AlertStats::collect(&[]), AlertStats::default());
    }
}
