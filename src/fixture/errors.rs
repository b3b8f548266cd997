//! Fixture error types
//!
//! Problems with the fixture document itself carry `Q_FIXTURE_*` codes.
//! Errors raised while building catalogs or results pass through with
//! their own codes.

use std::io;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::result::ResultError;
use crate::source::SourceError;

/// Result type for fixture loading
pub type FixtureResult<T> = Result<T, FixtureError>;

/// Errors raised while loading a fixture
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Q_FIXTURE_IO: {0}")]
    Io(#[from] io::Error),

    #[error("Q_FIXTURE_PARSE: {0}")]
    Parse(#[from] serde_json::Error),

    /// A query names a table the fixture does not define
    #[error("Q_FIXTURE_INVALID: unknown table '{0}'")]
    UnknownTable(String),

    /// Structurally valid JSON that cannot describe a query
    #[error("Q_FIXTURE_INVALID: {0}")]
    Invalid(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Result(#[from] ResultError),
}

impl FixtureError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FixtureError::Io(_) => "Q_FIXTURE_IO",
            FixtureError::Parse(_) => "Q_FIXTURE_PARSE",
            FixtureError::UnknownTable(_) | FixtureError::Invalid(_) => "Q_FIXTURE_INVALID",
            FixtureError::Source(e) => e.code(),
            FixtureError::Catalog(e) => e.code().code(),
            FixtureError::Result(e) => e.code(),
        }
    }

    /// True if the fixture document itself is at fault
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            FixtureError::Io(_)
                | FixtureError::Parse(_)
                | FixtureError::UnknownTable(_)
                | FixtureError::Invalid(_)
        )
    }
}
