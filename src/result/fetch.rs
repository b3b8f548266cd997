//! The fetch contract shared by tree and nested-set results

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::catalog::{ColumnRef, FieldCatalog};
use crate::observability::ObservationScope;

use super::errors::ResultResult;
use super::projection::Projection;
use super::row::Row;

/// Shape used when a single column is fetched on its own.
///
/// Child rows inside the value are keyed by column name.
pub const VALUE_PROJECTION: Projection = Projection::Associative;

/// A pull-based cursor producing materialized rows.
///
/// Implementors supply row production and cursor positioning; every
/// projection is derived from those. Exhaustion is `Ok(None)`, never an
/// error.
pub trait HierarchicalResult {
    /// Catalog of the rows this result produces
    fn catalog(&self) -> &Arc<FieldCatalog>;

    /// Materializes the next row
    fn fetch_row(&mut self) -> ResultResult<Option<Row>>;

    /// Moves the cursor back before the first row
    fn rewind(&mut self) -> ResultResult<()>;

    /// Number of rows fetched since the last rewind
    fn position(&self) -> usize;

    /// Rewinds and skips `position` rows without materializing them
    fn seek(&mut self, position: usize) -> ResultResult<()>;

    /// Advances one row and resolves only `column`
    fn fetch_value(&mut self, column: &ColumnRef) -> ResultResult<Option<Value>> {
        let index = self.catalog().resolve(column)?;
        Ok(self.fetch_row()?.and_then(|row| {
            row.cell(index).map(|cell| cell.project(VALUE_PROJECTION))
        }))
    }

    /// Next row in the given shape
    fn fetch(&mut self, projection: Projection) -> ResultResult<Option<Value>> {
        Ok(self.fetch_row()?.map(|row| row.project(projection)))
    }

    /// Next row by column position
    fn fetch_ordered(&mut self) -> ResultResult<Option<Vec<Value>>> {
        Ok(self.fetch_row()?.map(|row| row.to_ordered()))
    }

    /// Next row by column name
    fn fetch_associative(&mut self) -> ResultResult<Option<Map<String, Value>>> {
        Ok(self.fetch_row()?.map(|row| row.to_associative()))
    }

    /// Next row by both position and name
    fn fetch_full_array(&mut self) -> ResultResult<Option<Map<String, Value>>> {
        Ok(self.fetch_row()?.map(|row| row.to_full()))
    }

    /// Next row grouped by source table
    fn fetch_per_table(&mut self) -> ResultResult<Option<Map<String, Value>>> {
        Ok(self.fetch_row()?.map(|row| row.to_per_table()))
    }

    /// Next row by role
    fn fetch_roles(&mut self) -> ResultResult<Option<Map<String, Value>>> {
        Ok(self.fetch_row()?.map(|row| row.to_roles()))
    }

    /// Runs `next` from the first row until exhaustion, then puts the
    /// cursor back where it was.
    ///
    /// A source error ends the drain and is returned after the cursor has
    /// been restored (if restoring is possible at all).
    fn drain_from_start<T, F>(&mut self, mut next: F) -> ResultResult<Vec<T>>
    where
        Self: Sized,
        F: FnMut(&mut Self) -> ResultResult<Option<T>>,
    {
        let saved = self.position();
        self.rewind()?;

        let mut items = Vec::new();
        let drained = loop {
            match next(self) {
                Ok(Some(item)) => items.push(item),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        let restored = self.seek(saved);
        drained?;
        restored?;
        Ok(items)
    }

    /// Resolved values of one column for every row; the cursor position is
    /// the same before and after the call.
    fn get_column_values(&mut self, column: &ColumnRef) -> ResultResult<Vec<Value>>
    where
        Self: Sized,
    {
        let index = ColumnRef::Index(self.catalog().resolve(column)?);
        self.drain_from_start(|result| result.fetch_value(&index))
    }

    /// Every row in the given shape; the cursor position is restored.
    ///
    /// When the catalog has a `result:key` column the rows are returned as
    /// an object keyed by that column's value. Duplicate keys overwrite.
    fn fetch_all(&mut self, projection: Projection) -> ResultResult<Value>
    where
        Self: Sized,
    {
        let scope = ObservationScope::new("FETCH_ALL");
        let key_column = self.catalog().key_column();
        let rows = match self.drain_from_start(|result| result.fetch_row()) {
            Ok(rows) => rows,
            Err(e) => {
                scope.fail(&e.to_string());
                return Err(e);
            }
        };
        let count = rows.len().to_string();

        let collected = match key_column {
            None => Value::Array(rows.iter().map(|row| row.project(projection)).collect()),
            Some(key_column) => {
                let mut keyed = Map::new();
                for row in &rows {
                    let key = row
                        .cell(key_column)
                        .map(|cell| key_string(&cell.project(VALUE_PROJECTION)))
                        .unwrap_or_default();
                    keyed.insert(key, row.project(projection));
                }
                Value::Object(keyed)
            }
        };

        scope.complete_with_fields(&[("rows", count.as_str()), ("projection", projection.as_str())]);
        Ok(collected)
    }
}

/// Object key for a `result:key` value
fn key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
