//! Flat row sources
//!
//! The result layer never talks to a database directly. It consumes a
//! forward-only cursor over flat rows plus the driver's field metadata,
//! and opens filtered child cursors through `seek_to` when it resolves
//! a tree join.

mod errors;
mod field;
mod memory;

pub use errors::{SourceError, SourceResult};
pub use field::{FieldMeta, ROLE_MARKER};
pub use memory::{loosely_equal, MemoryRowSource};

use std::fmt;

use serde_json::Value;

/// A forward-only cursor over flat relational rows
pub trait FlatRowSource: fmt::Debug {
    /// Returns the next row, or `None` once the cursor is exhausted
    fn next_row(&mut self) -> SourceResult<Option<Vec<Value>>>;

    /// Moves the cursor back to the first row
    fn rewind(&mut self) -> SourceResult<()>;

    /// Field metadata, one entry per cell of every row
    fn field_metadata(&self) -> &[FieldMeta];

    /// Opens an independent cursor over the rows whose `column` equals `value`.
    ///
    /// Equivalent to re-executing the query with an extra filter. The
    /// returned cursor starts at its first row and does not share position
    /// with `self`.
    fn seek_to(&self, column: usize, value: &Value) -> SourceResult<Box<dyn FlatRowSource>>;
}
