//! Markup error types
//!
//! Error codes:
//! - Q_UNSUPPORTED_VIEW: the `view` option names no known view
//! - Q_CONFIGURATION_ERROR: any other invalid option
//! - Q_MALFORMED_MARKUP: the reverse transform could not read its input
//!
//! Configuration errors are raised before anything is rendered.

use thiserror::Error;

use crate::result::ResultError;

/// Result type for markup operations
pub type MarkupResult<T> = Result<T, MarkupError>;

/// Errors raised while configuring, rendering or reading markup
#[derive(Debug, Error)]
pub enum MarkupError {
    /// Unknown `view` value
    #[error("Q_UNSUPPORTED_VIEW: unsupported view '{0}' (expected attributes, forest or standard)")]
    UnsupportedView(String),

    /// Unknown `names` value
    #[error("Q_CONFIGURATION_ERROR: unsupported names '{0}' (expected fieldnames or roles)")]
    UnsupportedNames(String),

    /// A tag option is not a valid XML name
    #[error("Q_CONFIGURATION_ERROR: invalid {option} tag '{tag}'")]
    InvalidTag { option: &'static str, tag: String },

    /// An option key nobody recognizes
    #[error("Q_CONFIGURATION_ERROR: unknown markup option '{0}'")]
    UnknownOption(String),

    /// Input to the reverse transform is not well-formed
    #[error("Q_MALFORMED_MARKUP: at byte {position}: {reason}")]
    Malformed { position: usize, reason: String },

    /// Failure while fetching the rows to render
    #[error(transparent)]
    Result(#[from] ResultError),
}

impl MarkupError {
    /// Create a malformed markup error
    pub fn malformed(position: usize, reason: impl Into<String>) -> Self {
        MarkupError::Malformed {
            position,
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            MarkupError::UnsupportedView(_) => "Q_UNSUPPORTED_VIEW",
            MarkupError::UnsupportedNames(_)
            | MarkupError::InvalidTag { .. }
            | MarkupError::UnknownOption(_) => "Q_CONFIGURATION_ERROR",
            MarkupError::Malformed { .. } => "Q_MALFORMED_MARKUP",
            MarkupError::Result(e) => e.code(),
        }
    }

    /// True for errors in the caller's configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MarkupError::UnsupportedView(_)
                | MarkupError::UnsupportedNames(_)
                | MarkupError::InvalidTag { .. }
                | MarkupError::UnknownOption(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_view_is_configuration() {
        let err = MarkupError::UnsupportedView("bogus".into());
        assert_eq!(err.code(), "Q_UNSUPPORTED_VIEW");
        assert!(err.is_configuration());
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_malformed_is_not_configuration() {
        let err = MarkupError::malformed(12, "unexpected end of input");
        assert!(!err.is_configuration());
        assert_eq!(err.code(), "Q_MALFORMED_MARKUP");
    }
}
