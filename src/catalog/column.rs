//! Column descriptors and child-result bindings

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::source::{FlatRowSource, SourceResult};

use super::catalog::FieldCatalog;

/// How the rows of a child binding are folded into the parent cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinMode {
    /// The raw scalar values of one child column
    SingleValue,
    /// Whole child rows, resolved recursively through the child's catalog
    RecordList,
}

/// A column resolved by querying a child source on a join key
#[derive(Clone)]
pub struct ChildBinding {
    source: Arc<dyn FlatRowSource>,
    catalog: Arc<FieldCatalog>,
    parent_join: usize,
    child_join: usize,
    mode: JoinMode,
    value_column: usize,
}

impl ChildBinding {
    /// Creates a binding.
    ///
    /// `source` is never iterated itself; every parent row opens a fresh
    /// cursor through `seek_to(child_join, parent_value)`.
    pub fn new(
        source: Arc<dyn FlatRowSource>,
        catalog: Arc<FieldCatalog>,
        parent_join: usize,
        child_join: usize,
        mode: JoinMode,
    ) -> Self {
        Self {
            source,
            catalog,
            parent_join,
            child_join,
            mode,
            value_column: 0,
        }
    }

    /// Binding that yields whole child rows
    pub fn record_list(
        source: Arc<dyn FlatRowSource>,
        catalog: Arc<FieldCatalog>,
        parent_join: usize,
        child_join: usize,
    ) -> Self {
        Self::new(source, catalog, parent_join, child_join, JoinMode::RecordList)
    }

    /// Binding that yields the values of the child's first column
    pub fn single_value(
        source: Arc<dyn FlatRowSource>,
        catalog: Arc<FieldCatalog>,
        parent_join: usize,
        child_join: usize,
    ) -> Self {
        Self::new(source, catalog, parent_join, child_join, JoinMode::SingleValue)
    }

    /// Picks the child column collected in `SingleValue` mode
    pub fn with_value_column(mut self, column: usize) -> Self {
        self.value_column = column;
        self
    }

    /// Opens a child cursor for one parent join value.
    ///
    /// A null parent value matches nothing and the source is not queried.
    pub fn open(&self, parent_value: &Value) -> SourceResult<Option<Box<dyn FlatRowSource>>> {
        if parent_value.is_null() {
            return Ok(None);
        }
        self.source.seek_to(self.child_join, parent_value).map(Some)
    }

    /// The child's catalog
    pub fn catalog(&self) -> &Arc<FieldCatalog> {
        &self.catalog
    }

    /// Parent column holding the join value
    pub fn parent_join(&self) -> usize {
        self.parent_join
    }

    /// Child column matched against the join value
    pub fn child_join(&self) -> usize {
        self.child_join
    }

    /// Join mode
    pub fn mode(&self) -> JoinMode {
        self.mode
    }

    /// Child column collected in `SingleValue` mode
    pub fn value_column(&self) -> usize {
        self.value_column
    }
}

impl fmt::Debug for ChildBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildBinding")
            .field("parent_join", &self.parent_join)
            .field("child_join", &self.child_join)
            .field("mode", &self.mode)
            .field("value_column", &self.value_column)
            .field("columns", &self.catalog.len())
            .finish()
    }
}

/// What a column holds
#[derive(Debug, Clone)]
pub enum ColumnKind {
    /// A literal cell of the flat row
    Scalar,
    /// A nested child result
    Child(ChildBinding),
}

/// One output column
#[derive(Debug, Clone)]
pub struct Column {
    /// Position in the output row
    pub index: usize,
    /// Column name
    pub name: String,
    /// Semantic role
    pub role: Option<String>,
    /// Source table
    pub table: Option<String>,
    /// Scalar or child binding
    pub kind: ColumnKind,
}

impl Column {
    /// Returns the binding if this column is child-bound
    pub fn binding(&self) -> Option<&ChildBinding> {
        match &self.kind {
            ColumnKind::Child(binding) => Some(binding),
            ColumnKind::Scalar => None,
        }
    }

    /// True if this column is child-bound
    pub fn is_child(&self) -> bool {
        self.binding().is_some()
    }
}

/// Addresses a column by position, name or role
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
    Role(String),
}

impl ColumnRef {
    /// Reference by role
    pub fn role(role: impl Into<String>) -> Self {
        ColumnRef::Role(role.into())
    }

    /// Reference by name
    pub fn name(name: impl Into<String>) -> Self {
        ColumnRef::Name(name.into())
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

/// Same parsing as `FromStr`, so `"@role"` and `"#2"` never become names
impl From<&str> for ColumnRef {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(column) => column,
            Err(never) => match never {},
        }
    }
}

/// Parses `#3` as an index, `@role` as a role, anything else as a name
impl FromStr for ColumnRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix('#') {
            if let Ok(index) = rest.parse() {
                return Ok(ColumnRef::Index(index));
            }
        }
        if let Some(role) = s.strip_prefix('@') {
            return Ok(ColumnRef::Role(role.to_string()));
        }
        Ok(ColumnRef::Name(s.to_string()))
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(index) => write!(f, "#{}", index),
            ColumnRef::Name(name) => write!(f, "{}", name),
            ColumnRef::Role(role) => write!(f, "@{}", role),
        }
    }
}
