//! Error types for the review engine

use thiserror::Error;

/// Review engine error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Transaction input is missing a field or holds an out-of-range value
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rule set or scoring settings are malformed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal problem with a query description.
///
/// The query engine ignores the offending part and reports it alongside the
/// results so the caller can surface it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuerySpecError {
    /// Sort field not present on the record type
    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    /// Filter field not present on the record type
    #[error("Unknown filter field: {0}")]
    UnknownFilterField(String),
}
