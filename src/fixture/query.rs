//! A result of either kind behind one type

use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{ColumnRef, FieldCatalog};
use crate::result::{HierarchicalResult, NestedSetResult, ResultResult, Row, TreeResult};

/// The result a fixture query opens to
#[derive(Debug)]
pub enum QueryResult {
    Tree(TreeResult),
    NestedSet(NestedSetResult),
}

impl QueryResult {
    fn inner(&self) -> &dyn HierarchicalResult {
        match self {
            QueryResult::Tree(r) => r,
            QueryResult::NestedSet(r) => r,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn HierarchicalResult {
        match self {
            QueryResult::Tree(r) => r,
            QueryResult::NestedSet(r) => r,
        }
    }
}

impl From<TreeResult> for QueryResult {
    fn from(result: TreeResult) -> Self {
        QueryResult::Tree(result)
    }
}

impl From<NestedSetResult> for QueryResult {
    fn from(result: NestedSetResult) -> Self {
        QueryResult::NestedSet(result)
    }
}

impl HierarchicalResult for QueryResult {
    fn catalog(&self) -> &Arc<FieldCatalog> {
        self.inner().catalog()
    }

    fn fetch_row(&mut self) -> ResultResult<Option<Row>> {
        self.inner_mut().fetch_row()
    }

    fn rewind(&mut self) -> ResultResult<()> {
        self.inner_mut().rewind()
    }

    fn position(&self) -> usize {
        self.inner().position()
    }

    fn seek(&mut self, position: usize) -> ResultResult<()> {
        self.inner_mut().seek(position)
    }

    fn fetch_value(&mut self, column: &ColumnRef) -> ResultResult<Option<Value>> {
        self.inner_mut().fetch_value(column)
    }
}
