//! Tree-join results
//!
//! One logical row per flat row. Every child-bound column is replaced by
//! data read from a fresh child cursor, filtered on the parent's join
//! value:
//!
//! 1. Read the next flat row
//! 2. Copy scalar cells
//! 3. For each binding, open `seek_to(child_join, row[parent_join])`
//! 4. Single-value: collect one column of every child row
//! 5. Record-list: materialize child rows through the child's catalog
//!
//! Child cursors are independent of the parent's cursor, so a child can be
//! drained while the parent row is still being built.

use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{ChildBinding, Column, ColumnKind, ColumnRef, FieldCatalog, JoinMode};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::source::FlatRowSource;

use super::errors::ResultResult;
use super::fetch::{HierarchicalResult, VALUE_PROJECTION};
use super::row::{Cell, Row};

/// Result over a flat source with child bindings resolved per row
#[derive(Debug)]
pub struct TreeResult {
    source: Box<dyn FlatRowSource>,
    catalog: Arc<FieldCatalog>,
    position: usize,
}

impl TreeResult {
    /// Opens a result over `source`, producing rows shaped by `catalog`
    pub fn new(source: Box<dyn FlatRowSource>, catalog: Arc<FieldCatalog>) -> Self {
        let columns = catalog.len().to_string();
        log_event_with_fields(
            Event::ResultOpened,
            &[("kind", "tree"), ("columns", columns.as_str())],
        );
        Self::nested(source, catalog)
    }

    /// Opens a result with a catalog built from the source's own metadata
    pub fn from_source(source: impl FlatRowSource + 'static) -> ResultResult<Self> {
        let catalog = FieldCatalog::for_source(&source)?;
        Ok(Self::new(Box::new(source), Arc::new(catalog)))
    }

    /// Child results are opened per parent row and are not logged
    fn nested(source: Box<dyn FlatRowSource>, catalog: Arc<FieldCatalog>) -> Self {
        Self {
            source,
            catalog,
            position: 0,
        }
    }

    fn next_raw(&mut self) -> ResultResult<Option<Vec<Value>>> {
        let raw = self.source.next_row()?;
        if raw.is_some() {
            self.position += 1;
        }
        Ok(raw)
    }
}

impl HierarchicalResult for TreeResult {
    fn catalog(&self) -> &Arc<FieldCatalog> {
        &self.catalog
    }

    fn fetch_row(&mut self) -> ResultResult<Option<Row>> {
        match self.next_raw()? {
            Some(raw) => resolve_row(&self.catalog, &raw).map(Some),
            None => Ok(None),
        }
    }

    fn rewind(&mut self) -> ResultResult<()> {
        self.source.rewind()?;
        self.position = 0;
        Ok(())
    }

    fn position(&self) -> usize {
        self.position
    }

    fn seek(&mut self, position: usize) -> ResultResult<()> {
        self.rewind()?;
        while self.position < position {
            if self.next_raw()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    fn fetch_value(&mut self, column: &ColumnRef) -> ResultResult<Option<Value>> {
        let index = self.catalog.resolve(column)?;
        let raw = match self.next_raw()? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let column = self.catalog.column_at(index)?;
        Ok(Some(resolve_cell(column, &raw)?.project(VALUE_PROJECTION)))
    }
}

/// Resolves every column of one flat row
pub(crate) fn resolve_row(catalog: &Arc<FieldCatalog>, raw: &[Value]) -> ResultResult<Row> {
    let cells = catalog
        .columns()
        .iter()
        .map(|column| resolve_cell(column, raw))
        .collect::<ResultResult<Vec<_>>>()?;
    Ok(Row::new(Arc::clone(catalog), cells))
}

/// Resolves one column of one flat row
pub(crate) fn resolve_cell(column: &Column, raw: &[Value]) -> ResultResult<Cell> {
    match &column.kind {
        // Appended columns have no flat cell.
        ColumnKind::Scalar => Ok(Cell::Scalar(
            raw.get(column.index).cloned().unwrap_or(Value::Null),
        )),
        ColumnKind::Child(binding) => resolve_binding(&column.name, binding, raw),
    }
}

fn resolve_binding(name: &str, binding: &ChildBinding, raw: &[Value]) -> ResultResult<Cell> {
    let parent_value = raw.get(binding.parent_join()).unwrap_or(&Value::Null);
    let cursor = binding.open(parent_value)?;

    let (cell, matched) = match binding.mode() {
        JoinMode::SingleValue => {
            let mut values = Vec::new();
            if let Some(mut cursor) = cursor {
                while let Some(child) = cursor.next_row()? {
                    values.push(
                        child
                            .get(binding.value_column())
                            .cloned()
                            .unwrap_or(Value::Null),
                    );
                }
            }
            let matched = values.len();
            let values = if values.is_empty() { None } else { Some(values) };
            (Cell::Values(values), matched)
        }
        JoinMode::RecordList => {
            let mut rows = Vec::new();
            if let Some(cursor) = cursor {
                let mut child = TreeResult::nested(cursor, Arc::clone(binding.catalog()));
                while let Some(row) = child.fetch_row()? {
                    rows.push(row);
                }
            }
            let matched = rows.len();
            (Cell::Records(rows), matched)
        }
    };

    if Logger::enabled(Severity::Trace) {
        let join_value = parent_value.to_string();
        let matched = matched.to_string();
        log_event_with_fields(
            Event::ChildResolved,
            &[
                ("column", name),
                ("join_value", join_value.as_str()),
                ("matched", matched.as_str()),
            ],
        );
    }

    Ok(cell)
}
