//! JSON fixtures: in-memory tables plus a query over them
//!
//! Used by the command line and by tests to describe a result without a
//! database. A fixture opens to a [`QueryResult`], which is a tree result
//! unless the query declares `nested_set`.

mod errors;
mod loader;
mod model;
mod query;

pub use errors::{FixtureError, FixtureResult};
pub use model::{BindingSpec, ColumnSpec, FieldSpec, Fixture, NestedSetSpec, QuerySpec, TableSpec};
pub use query::QueryResult;
