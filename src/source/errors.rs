//! Source error types
//!
//! Errors raised by a row source are passed through the result layer
//! unmodified. This layer adds no retry or recovery of its own.

use thiserror::Error;

/// Result type for row source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors raised by a flat row source
#[derive(Debug, Error)]
pub enum SourceError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON while reading rows
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A row does not match the width of the field metadata
    #[error("Row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A seek named a column the source does not have
    #[error("Join column {column} out of range ({width} columns)")]
    ColumnOutOfRange { column: usize, width: usize },

    /// Any other driver-reported failure
    #[error("Driver error: {0}")]
    Driver(String),
}

impl SourceError {
    /// Create a driver error
    pub fn driver(message: impl Into<String>) -> Self {
        SourceError::Driver(message.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SourceError::Io(_) => "Q_SOURCE_IO",
            SourceError::Json(_) => "Q_SOURCE_JSON",
            SourceError::RowWidth { .. } => "Q_SOURCE_ROW_WIDTH",
            SourceError::ColumnOutOfRange { .. } => "Q_SOURCE_COLUMN_OUT_OF_RANGE",
            SourceError::Driver(_) => "Q_SOURCE_DRIVER",
        }
    }
}
