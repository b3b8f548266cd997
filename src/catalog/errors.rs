//! Catalog error types
//!
//! Error codes:
//! - Q_CONFIGURATION_ERROR: invalid catalog setup, never retried
//! - Q_NOT_FOUND: lookup of a column, name or role that does not exist

use std::fmt;

/// Catalog error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorCode {
    /// Invalid catalog setup (duplicate binding, duplicate role, bad index)
    QConfigurationError,
    /// Lookup of a non-existent column or role
    QNotFound,
}

impl CatalogErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogErrorCode::QConfigurationError => "Q_CONFIGURATION_ERROR",
            CatalogErrorCode::QNotFound => "Q_NOT_FOUND",
        }
    }
}

impl fmt::Display for CatalogErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Catalog error with code and context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogError {
    code: CatalogErrorCode,
    message: String,
}

impl CatalogError {
    fn configuration(message: String) -> Self {
        Self {
            code: CatalogErrorCode::QConfigurationError,
            message,
        }
    }

    fn not_found(message: String) -> Self {
        Self {
            code: CatalogErrorCode::QNotFound,
            message,
        }
    }

    /// A column index was bound to a child result twice
    pub fn duplicate_binding(index: usize) -> Self {
        Self::configuration(format!("Column {} already has a child binding", index))
    }

    /// A binding index is neither an existing column nor the next free one
    pub fn binding_out_of_range(index: usize, len: usize) -> Self {
        Self::configuration(format!(
            "Cannot bind column {}: catalog has {} columns and indices must stay contiguous",
            index, len
        ))
    }

    /// A join column does not exist on one side of a binding
    pub fn invalid_join_column(side: &str, index: usize, width: usize) -> Self {
        Self::configuration(format!(
            "{} join column {} out of range ({} flat columns)",
            side, index, width
        ))
    }

    /// Two columns carry the same role
    pub fn duplicate_role(role: &str) -> Self {
        Self::configuration(format!("Role '{}' is assigned to more than one column", role))
    }

    /// No column at the index
    pub fn column_not_found(index: usize) -> Self {
        Self::not_found(format!("No column at index {}", index))
    }

    /// No column with the name
    pub fn name_not_found(name: &str) -> Self {
        Self::not_found(format!("No column named '{}'", name))
    }

    /// No column with the role
    pub fn role_not_found(role: &str) -> Self {
        Self::not_found(format!("No column with role '{}'", role))
    }

    /// Returns the error code
    pub fn code(&self) -> CatalogErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for lookups of absent columns; callers may treat these as optional
    pub fn is_not_found(&self) -> bool {
        self.code == CatalogErrorCode::QNotFound
    }

    /// True for setup errors
    pub fn is_configuration(&self) -> bool {
        self.code == CatalogErrorCode::QConfigurationError
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CatalogError {}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
