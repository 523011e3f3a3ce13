//! Review Engine for Fraud Sentinel
//!
//! Rule-based fraud scoring and review-queue querying for the review console.
//!
//! # Architecture
//!
//! - **Rules**: ordered, immutable predicate/weight/rationale definitions
//! - **Scoring**: sums fired weights, adds injected jitter, clamps to 0-100
//! - **Explanation**: ranks factors by impact for display
//! - **Query**: search, filter and stable sort over alert/transaction records
//!
//! Every operation is a synchronous pure function over its inputs. Engines
//! hold no state between calls and are safe to share across threads.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod explain;
pub mod query;
pub mod random;
pub mod records;
pub mod rules;
pub mod scoring;
pub mod types;

pub use config::{
    Disposition, JitterBounds, ScoringConfig, Threshold, DEFAULT_MAX_TRANSACTION_AMOUNT,
};
pub use error::{Error, QuerySpecError, Result};
pub use explain::{rank, top, DEFAULT_TOP_K};
pub use query::{
    query_records, FieldFilter, FieldValue, QueryEngine, QueryOutcome, QuerySpec, Queryable,
    SortDirection,
};
pub use random::{FixedJitter, JitterSequence, RandomSource, SeededRandom, ThreadRandom};
pub use records::{AlertPriority, AlertRecord, AlertStats, AlertStatus, TransactionRecord};
pub use rules::{RuleDefinition, RuleSet, RuleSetBuilder, RuleWeight};
pub use scoring::{score_batch, score_transaction, BatchSummary, ScoringEngine};
pub use types::*;
