//! CLI-specific error types
//!
//! Errors from the library keep their own codes; only problems with the
//! command line's own inputs get `Q_CLI_*` codes.

use std::fmt;
use std::io;

use crate::fixture::FixtureError;
use crate::markup::MarkupError;
use crate::result::ResultError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or option error
    ConfigError,
    /// Fixture file error
    FixtureError,
    /// I/O error (stdout)
    IoError,
    /// Error raised by the result layer, with its own code
    Library(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "Q_CLI_CONFIG_ERROR",
            Self::FixtureError => "Q_CLI_FIXTURE_ERROR",
            Self::IoError => "Q_CLI_IO_ERROR",
            Self::Library(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// Fixture error
    pub fn fixture_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::FixtureError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<FixtureError> for CliError {
    fn from(e: FixtureError) -> Self {
        if e.is_document_error() {
            Self::fixture_error(e.to_string())
        } else {
            Self::new(CliErrorCode::Library(e.code()), e.to_string())
        }
    }
}

impl From<MarkupError> for CliError {
    fn from(e: MarkupError) -> Self {
        Self::new(CliErrorCode::Library(e.code()), e.to_string())
    }
}

impl From<ResultError> for CliError {
    fn from(e: ResultError) -> Self {
        Self::new(CliErrorCode::Library(e.code()), e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
