//! Field catalogs
//!
//! A catalog maps flat column positions to names, roles and source tables,
//! and marks the columns that are not literal cells but child results
//! resolved through a join key.
//!
//! # Invariants
//!
//! - Column indices are contiguous and stable for the catalog's lifetime
//! - Roles are unique within a catalog
//! - A column is bound to at most one child result

mod catalog;
mod column;
mod errors;

pub use catalog::{FieldCatalog, KEY_ROLE};
pub use column::{ChildBinding, Column, ColumnKind, ColumnRef, JoinMode};
pub use errors::{CatalogError, CatalogErrorCode, CatalogResult};
