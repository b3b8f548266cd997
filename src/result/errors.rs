//! Result error types
//!
//! Catalog and source errors pass through unchanged. This layer raises
//! `MalformedNesting` in strict mode only; lenient nested-set results
//! tolerate malformed intervals. `NestingTooDeep` is raised in both modes.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::source::SourceError;

/// Result type for fetch operations
pub type ResultResult<T> = Result<T, ResultError>;

/// Errors raised while fetching rows
#[derive(Debug, Error)]
pub enum ResultError {
    /// Catalog lookup or setup failure
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Failure of the underlying row source
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Strict nested-set validation failed
    #[error("Q_MALFORMED_NESTING: row {row}: {reason}")]
    MalformedNesting { row: usize, reason: String },

    /// A nested-set subtree goes deeper than the walk allows
    #[error("Q_NESTING_TOO_DEEP: row {row} is nested more than {limit} levels deep")]
    NestingTooDeep { row: usize, limit: usize },
}

impl ResultError {
    /// Create a malformed nesting error
    pub fn malformed_nesting(row: usize, reason: impl Into<String>) -> Self {
        ResultError::MalformedNesting {
            row,
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ResultError::Catalog(e) => e.code().code(),
            ResultError::Source(e) => e.code(),
            ResultError::MalformedNesting { .. } => "Q_MALFORMED_NESTING",
            ResultError::NestingTooDeep { .. } => "Q_NESTING_TOO_DEEP",
        }
    }

    /// True if this is a catalog lookup of an absent column or role
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResultError::Catalog(e) if e.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_errors_keep_their_code() {
        let err: ResultError = CatalogError::role_not_found("result:key").into();
        assert_eq!(err.code(), "Q_NOT_FOUND");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("result:key"));
    }

    #[test]
    fn test_source_errors_pass_through() {
        let err: ResultError = SourceError::driver("server has gone away").into();
        assert_eq!(err.code(), "Q_SOURCE_DRIVER");
        assert_eq!(err.to_string(), "Driver error: server has gone away");
    }

    #[test]
    fn test_malformed_nesting_display() {
        let err = ResultError::malformed_nesting(3, "interval overlaps row 1");
        assert_eq!(err.code(), "Q_MALFORMED_NESTING");
        assert!(err.to_string().contains("row 3"));
    }
}
