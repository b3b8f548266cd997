//! Building results from a fixture
//!
//! Catalogs are built bottom-up: every binding's child query is turned
//! into a source and catalog first, then attached to the parent catalog.
//! Join columns are resolved against the flat field list of their table,
//! so a binding that renames a column does not affect later joins.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::{ChildBinding, FieldCatalog};
use crate::observability::{log_event_with_fields, Event};
use crate::result::{NestedSetResult, TreeResult};
use crate::source::MemoryRowSource;

use super::errors::{FixtureError, FixtureResult};
use super::model::{Fixture, QuerySpec};
use super::query::QueryResult;

impl Fixture {
    /// Reads and parses a fixture file
    pub fn load(path: impl AsRef<Path>) -> FixtureResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let fixture = Self::from_json(&text)?;

        let tables = fixture.tables.len().to_string();
        let path_text = path.display().to_string();
        log_event_with_fields(
            Event::FixtureLoaded,
            &[("path", path_text.as_str()), ("tables", tables.as_str())],
        );
        Ok(fixture)
    }

    /// Parses a fixture document
    pub fn from_json(text: &str) -> FixtureResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// A fresh cursor over one table
    pub fn source(&self, table: &str) -> FixtureResult<MemoryRowSource> {
        let spec = self
            .tables
            .get(table)
            .ok_or_else(|| FixtureError::UnknownTable(table.to_string()))?;
        let fields = spec.fields.iter().map(|f| f.to_meta()).collect();
        Ok(MemoryRowSource::new(fields, spec.rows.clone())?)
    }

    /// Source and catalog for a query, with every binding attached
    pub fn build(&self, query: &QuerySpec) -> FixtureResult<(MemoryRowSource, FieldCatalog)> {
        let source = self.source(&query.table)?;
        let flat = FieldCatalog::for_source(&source)?;
        let mut catalog = flat.clone();

        for binding in &query.bindings {
            if binding.query.nested_set.is_some() {
                return Err(FixtureError::Invalid(format!(
                    "binding '{}': nested_set is only allowed on the outermost query",
                    binding.name
                )));
            }

            let (child_source, child_catalog) = self.build(&binding.query)?;
            let child_flat = FieldCatalog::for_source(&child_source)?;

            let parent_join = flat.resolve(&binding.parent_join.to_ref())?;
            let child_join = child_flat.resolve(&binding.child_join.to_ref())?;
            let value_column = match &binding.value_column {
                Some(column) => child_flat.resolve(&column.to_ref())?,
                None => 0,
            };

            let child = ChildBinding::new(
                Arc::new(child_source),
                Arc::new(child_catalog),
                parent_join,
                child_join,
                binding.mode,
            )
            .with_value_column(value_column);

            let column = binding.column.unwrap_or(catalog.len());
            catalog.add_child_binding(column, binding.name.clone(), child)?;
        }

        Ok((source, catalog))
    }

    /// Opens the fixture's query as a tree or nested-set result
    pub fn open(&self) -> FixtureResult<QueryResult> {
        let (source, catalog) = self.build(&self.query)?;
        let source = Box::new(source);
        let catalog = Arc::new(catalog);

        let result = match &self.query.nested_set {
            None => QueryResult::Tree(TreeResult::new(source, catalog)),
            Some(spec) if spec.strict => {
                QueryResult::NestedSet(NestedSetResult::strict(source, catalog, &spec.columns())?)
            }
            Some(spec) => {
                QueryResult::NestedSet(NestedSetResult::new(source, catalog, &spec.columns())?)
            }
        };
        Ok(result)
    }
}
