//! Hierarchical results
//!
//! Flat rows come in; nested rows go out. Two result kinds share one fetch
//! contract ([`HierarchicalResult`]):
//!
//! - [`TreeResult`]: adjacency "tree joins", where child-bound columns are
//!   filled by querying a child source on a join key
//! - [`NestedSetResult`]: hierarchy from `(left, right)` interval
//!   containment
//!
//! # Invariants
//!
//! - Exhaustion is `Ok(None)`, never an error
//! - `get_column_values` and `fetch_all` leave the cursor where it was
//! - Record-list bindings with no matches yield `[]`; single-value
//!   bindings with no matches yield `null`
//! - Nested-set traversal restores the record pointer after every subtree

mod errors;
mod fetch;
mod nested_set;
mod projection;
mod row;
mod tree;

pub use errors::{ResultError, ResultResult};
pub use fetch::{HierarchicalResult, VALUE_PROJECTION};
pub use nested_set::{
    IntervalEntry, NestedSetColumns, NestedSetIndex, NestedSetResult, SkippedRow, LEFT_NAME,
    LEFT_ROLE, MAX_NESTING_DEPTH, RIGHT_NAME, RIGHT_ROLE,
};
pub use projection::{Projection, CHILDREN_KEY, UNKNOWN_TABLE};
pub use row::{Cell, Row};
pub use tree::TreeResult;
