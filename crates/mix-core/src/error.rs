//! Unified error types for the scenario core.
//!
//! This module provides a common error type [`MixError`] that can represent
//! errors from any part of the system: schema checks against the item
//! registry, transaction-state violations, horizon-extension conflicts, and
//! unit handling. Domain-specific errors are converted to `MixError` for
//! uniform handling at API boundaries.

use thiserror::Error;

/// Unified error type for scenario-core operations.
///
/// Each variant corresponds to one entry of the error taxonomy: schema
/// violations are fatal and name the offending item, transaction and
/// solution-state violations are fatal, and horizon overlaps abort the
/// extension before any write happens.
#[derive(Error, Debug)]
pub enum MixError {
    /// Writing to an undeclared item, or to an item whose indexing sets do
    /// not match the registry.
    #[error("Schema violation: {0}")]
    Schema(String),

    /// Writing outside a check-out, or committing with no open check-out.
    #[error("Transaction violation: {0}")]
    Transaction(String),

    /// Mutating a scenario that still carries a solution.
    #[error("Solution state: {0}")]
    Solution(String),

    /// New periods overlap the existing horizon.
    #[error("Horizon overlap: {0}")]
    Overlap(String),

    /// Inconsistent units under one commodity.
    #[error("Unit error: {0}")]
    Unit(String),

    /// Scenario or item lookup failed.
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O errors from the persistence layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic errors (for wrapping external errors).
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using MixError.
pub type MixResult<T> = Result<T, MixError>;

impl From<anyhow::Error> for MixError {
    fn from(err: anyhow::Error) -> Self {
        MixError::Other(err.to_string())
    }
}

impl From<String> for MixError {
    fn from(s: String) -> Self {
        MixError::Other(s)
    }
}

impl From<&str> for MixError {
    fn from(s: &str) -> Self {
        MixError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MixError::Schema("output: dims differ".into());
        assert!(err.to_string().contains("Schema violation"));
        assert!(err.to_string().contains("output"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MixError = io_err.into();
        assert!(matches!(err, MixError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> MixResult<()> {
            Err(MixError::Transaction("not checked out".into()))
        }

        fn outer() -> MixResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
