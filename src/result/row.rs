//! Materialized rows
//!
//! A [`Row`] is an ordered list of typed cells. It keeps a handle to the
//! catalog that produced it, so any cell can be addressed by index, name
//! or role without the row carrying its own keys.

use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{CatalogError, CatalogResult, Column, ColumnRef, FieldCatalog};

/// One resolved cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A literal value from the flat row
    Scalar(Value),
    /// Values of a single-value binding; `None` when no child row matched
    Values(Option<Vec<Value>>),
    /// Rows of a record-list binding; empty when no child row matched
    Records(Vec<Row>),
}

impl Cell {
    /// Returns the scalar value, if this is a scalar cell
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Cell::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

/// A materialized row
#[derive(Debug, Clone)]
pub struct Row {
    catalog: Arc<FieldCatalog>,
    cells: Vec<Cell>,
    /// Nested-set descendants one level down
    children: Option<Vec<Row>>,
}

impl Row {
    pub(crate) fn new(catalog: Arc<FieldCatalog>, cells: Vec<Cell>) -> Self {
        Self {
            catalog,
            cells,
            children: None,
        }
    }

    pub(crate) fn set_children(&mut self, children: Vec<Row>) {
        self.children = Some(children);
    }

    /// The catalog this row was produced with
    pub fn catalog(&self) -> &Arc<FieldCatalog> {
        &self.catalog
    }

    /// Cells in column order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at a position
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Cell addressed by index, name or role
    pub fn get(&self, column: &ColumnRef) -> CatalogResult<&Cell> {
        let index = self.catalog.resolve(column)?;
        self.cells
            .get(index)
            .ok_or_else(|| CatalogError::column_not_found(index))
    }

    /// Columns paired with their cells
    pub fn iter(&self) -> impl Iterator<Item = (&Column, &Cell)> {
        self.catalog.columns().iter().zip(self.cells.iter())
    }

    /// Nested-set children, if the row has any
    pub fn children(&self) -> Option<&[Row]> {
        self.children.as_deref()
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Rows compare by content; the catalog handle is not part of equality.
impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells && self.children == other.children
    }
}
