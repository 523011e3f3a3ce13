//! Search, filter and sort over in-memory record collections
//!
//! The engine is generic over [`Queryable`] records. A [`QuerySpec`] is
//! applied in three steps: free-text search, exact-match filters (AND), then
//! a stable sort. Unknown field names are ignored and reported as
//! [`QuerySpecError`]s instead of failing the query.

use crate::QuerySpecError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Sentinel filter value meaning "no constraint"
pub const ALL: &str = "all";

/// Timestamp format used for filter keys
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Typed value of a record field.
///
/// Values of the same variant compare naturally: numbers numerically, text
/// lexicographically, timestamps chronologically and ordinals by rank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue<'a> {
    /// Numeric field
    Number(Decimal),
    /// Textual field
    Text(&'a str),
    /// Timestamp field
    Time(NaiveDateTime),
    /// Enumerated field with a severity rank
    Ordinal {
        /// Sort rank
        rank: u8,
        /// Canonical label used for filtering
        label: &'static str,
    },
}

impl<'a> FieldValue<'a> {
    /// Text used for search and exact-match filtering
    pub fn as_text(&self) -> Cow<'a, str> {
        match self {
            FieldValue::Number(n) => Cow::Owned(n.normalize().to_string()),
            FieldValue::Text(s) => Cow::Borrowed(*s),
            FieldValue::Time(t) => Cow::Owned(t.format(TIMESTAMP_FORMAT).to_string()),
            FieldValue::Ordinal { label, .. } => Cow::Borrowed(*label),
        }
    }
}

/// Record type the query engine can operate on
pub trait Queryable {
    /// Every field name the record exposes
    const FIELDS: &'static [&'static str];

    /// Fields matched by the free-text search
    const SEARCH_FIELDS: &'static [&'static str];

    /// Value of `field`; `None` when the field is unknown or has no value
    fn field(&self, field: &str) -> Option<FieldValue<'_>>;

    /// Whether `field` is one of [`Queryable::FIELDS`]
    fn has_field(field: &str) -> bool {
        Self::FIELDS.contains(&field)
    }
}

/// Exact-match constraint on one field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "FilterRepr")]
pub enum FieldFilter {
    /// No constraint
    #[default]
    All,
    /// Field text must equal one of the values
    AnyOf(BTreeSet<String>),
}

impl FieldFilter {
    /// Filter from a single UI selection; `"all"` disables the constraint
    pub fn selection(value: &str) -> Self {
        if value == ALL {
            FieldFilter::All
        } else {
            FieldFilter::AnyOf(BTreeSet::from([value.to_string()]))
        }
    }

    /// Filter accepting any of `values`; a set holding `"all"` disables the constraint
    pub fn any_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_set(values.into_iter().map(Into::into).collect())
    }

    fn from_set(values: BTreeSet<String>) -> Self {
        if values.contains(ALL) {
            FieldFilter::All
        } else {
            FieldFilter::AnyOf(values)
        }
    }

    /// Whether the filter constrains anything
    pub fn is_active(&self) -> bool {
        matches!(self, FieldFilter::AnyOf(_))
    }

    fn accepts(&self, value: Option<&FieldValue<'_>>) -> bool {
        match self {
            FieldFilter::All => true,
            FieldFilter::AnyOf(allowed) => {
                value.map_or(false, |v| allowed.contains(&*v.as_text()))
            }
        }
    }
}

/// Wire shape of [`FieldFilter`], normalized on deserialize
#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum FilterRepr {
    All,
    AnyOf(BTreeSet<String>),
}

impl From<FilterRepr> for FieldFilter {
    fn from(repr: FilterRepr) -> Self {
        match repr {
            FilterRepr::All => FieldFilter::All,
            FilterRepr::AnyOf(values) => FieldFilter::from_set(values),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    #[default]
    Desc,
}

/// Declarative query over a record collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    /// Case-insensitive substring; empty matches everything
    pub search_term: String,

    /// Field name to filter
    pub filters: BTreeMap<String, FieldFilter>,

    /// Field to sort by
    pub sort_field: Option<String>,

    /// Sort direction
    pub sort_direction: SortDirection,
}

impl QuerySpec {
    /// Set the search term
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Add or replace a field filter
    pub fn filter(mut self, field: impl Into<String>, filter: FieldFilter) -> Self {
        self.filters.insert(field.into(), filter);
        self
    }

    /// Sort by `field`
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_field = Some(field.into());
        self.sort_direction = direction;
        self
    }
}

/// Query result plus any ignored parts of the query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome<T> {
    /// Matching records in output order
    pub records: Vec<T>,

    /// Parts of the query that were ignored
    pub issues: Vec<QuerySpecError>,
}

impl<T> QueryOutcome<T> {
    /// Whether the whole query was applied
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Stateless query engine
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine;

impl QueryEngine {
    /// Create a query engine
    pub fn new() -> Self {
        Self
    }

    /// Apply `spec` to `records`. The input slice is not reordered.
    pub fn apply<T>(&self, records: &[T], spec: &QuerySpec) -> QueryOutcome<T>
    where
        T: Queryable + Clone,
    {
        let mut issues = Vec::new();

        let mut filters: Vec<(&str, &FieldFilter)> = Vec::new();
        for (field, filter) in &spec.filters {
            if !T::has_field(field) {
                issues.push(QuerySpecError::UnknownFilterField(field.clone()));
            } else if filter.is_active() {
                filters.push((field.as_str(), filter));
            }
        }

        let needle = spec.search_term.to_lowercase();

        let mut selected: Vec<&T> = records
            .iter()
            .filter(|record| matches_search(*record, &needle))
            .filter(|record| {
                filters
                    .iter()
                    .all(|(field, filter)| filter.accepts(record.field(field).as_ref()))
            })
            .collect();

        if let Some(field) = spec.sort_field.as_deref() {
            if T::has_field(field) {
                // stable in both directions
                selected.sort_by(|a, b| {
                    let ordering = compare_field(a.field(field), b.field(field));
                    match spec.sort_direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                });
            } else {
                issues.push(QuerySpecError::UnknownSortField(field.to_string()));
            }
        }

        QueryOutcome {
            records: selected.into_iter().cloned().collect(),
            issues,
        }
    }
}

/// Apply `spec` to `records`, logging any ignored part of the query
pub fn query_records<T>(records: &[T], spec: &QuerySpec) -> Vec<T>
where
    T: Queryable + Clone,
{
    let outcome = QueryEngine::new().apply(records, spec);
    for issue in &outcome.issues {
        warn!(%issue, "Query description partially ignored");
    }
    outcome.records
}

fn matches_search<T: Queryable>(record: &T, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    T::SEARCH_FIELDS.iter().any(|field| {
        record
            .field(field)
            .map_or(false, |v| v.as_text().to_lowercase().contains(needle))
    })
}

/// Missing values sort before present ones
fn compare_field(a: Option<FieldValue<'_>>, b: Option<FieldValue<'_>>) -> Ordering {
    a.cmp(&b)
}
