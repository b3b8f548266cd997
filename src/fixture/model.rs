//! Fixture document model
//!
//! ```json
//! {
//!   "tables": {
//!     "customers": { "fields": ["id#role:result:key", "name"], "rows": [[1, "Ann"]] },
//!     "orders": { "fields": [{"name": "id"}, {"name": "customer_id"}], "rows": [[10, 1]] }
//!   },
//!   "query": {
//!     "table": "customers",
//!     "bindings": [{ "name": "orders", "parent_join": "id", "child_join": "customer_id",
//!                    "query": { "table": "orders" } }]
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{ColumnRef, JoinMode};
use crate::result::NestedSetColumns;
use crate::source::FieldMeta;

/// A set of in-memory tables plus the query to run over them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub tables: BTreeMap<String, TableSpec>,
    pub query: QuerySpec,
}

/// One table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

/// Field metadata, either as an object or as a `name#role:role` alias
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Alias(String),
    Meta(FieldMeta),
}

impl FieldSpec {
    pub fn to_meta(&self) -> FieldMeta {
        match self {
            FieldSpec::Alias(alias) => FieldMeta::from_alias(alias),
            FieldSpec::Meta(meta) => meta.clone(),
        }
    }
}

/// A column given by position or by reference string (`name`, `#3`, `@role`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    Index(usize),
    Reference(String),
}

impl ColumnSpec {
    pub fn to_ref(&self) -> ColumnRef {
        match self {
            ColumnSpec::Index(index) => ColumnRef::Index(*index),
            ColumnSpec::Reference(reference) => match reference.parse() {
                Ok(column) => column,
                Err(never) => match never {},
            },
        }
    }
}

/// A query over one table, with child bindings resolved per row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySpec {
    pub table: String,
    #[serde(default)]
    pub bindings: Vec<BindingSpec>,
    /// Present when rows form a nested set; only valid on the outermost query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_set: Option<NestedSetSpec>,
}

fn default_mode() -> JoinMode {
    JoinMode::RecordList
}

/// A child binding and the query feeding it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingSpec {
    /// Output column to bind; appended after the existing columns when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub name: String,
    #[serde(default = "default_mode")]
    pub mode: JoinMode,
    pub parent_join: ColumnSpec,
    pub child_join: ColumnSpec,
    /// Child column collected in single-value mode; the first column when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_column: Option<ColumnSpec>,
    pub query: QuerySpec,
}

/// Nested-set boundary columns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NestedSetSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<ColumnSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<ColumnSpec>,
    #[serde(default)]
    pub strict: bool,
}

impl NestedSetSpec {
    /// Boundary columns, with the defaults for any side left out
    pub fn columns(&self) -> NestedSetColumns {
        let defaults = NestedSetColumns::default();
        NestedSetColumns {
            left: self.left.as_ref().map_or(defaults.left, ColumnSpec::to_ref),
            right: self.right.as_ref().map_or(defaults.right, ColumnSpec::to_ref),
        }
    }
}
