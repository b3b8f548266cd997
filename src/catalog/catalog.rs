//! Per-query field catalog
//!
//! Built once from driver metadata plus child bindings, then shared
//! immutably (behind `Arc`) by every row the query produces.

use std::collections::HashMap;

use crate::source::{FieldMeta, FlatRowSource};

use super::column::{ChildBinding, Column, ColumnKind, ColumnRef};
use super::errors::{CatalogError, CatalogResult};

/// Role whose value keys the collection returned by `fetch_all`
pub const KEY_ROLE: &str = "result:key";

/// Ordered output columns of one query
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    columns: Vec<Column>,
    /// Number of cells in each flat row
    flat_width: usize,
    names: HashMap<String, usize>,
    roles: HashMap<String, usize>,
}

impl FieldCatalog {
    /// Builds one scalar column per field.
    ///
    /// Fails with a configuration error if two fields share a role.
    pub fn from_metadata(fields: &[FieldMeta]) -> CatalogResult<Self> {
        let mut catalog = Self {
            flat_width: fields.len(),
            ..Self::default()
        };

        for (index, field) in fields.iter().enumerate() {
            if let Some(role) = &field.role {
                if catalog.roles.insert(role.clone(), index).is_some() {
                    return Err(CatalogError::duplicate_role(role));
                }
            }
            catalog.names.entry(field.name.clone()).or_insert(index);
            catalog.columns.push(Column {
                index,
                name: field.name.clone(),
                role: field.role.clone(),
                table: field.table.clone(),
                kind: ColumnKind::Scalar,
            });
        }

        Ok(catalog)
    }

    /// Builds a catalog from a source's own metadata
    pub fn for_source(source: &dyn FlatRowSource) -> CatalogResult<Self> {
        Self::from_metadata(source.field_metadata())
    }

    /// Registers that output column `column_index` is resolved through `binding`.
    ///
    /// `column_index` may name an existing scalar column, whose flat cell
    /// is then ignored, or be exactly `len()`, which appends a new column.
    /// Either way the column is named `name`.
    pub fn add_child_binding(
        &mut self,
        column_index: usize,
        name: impl Into<String>,
        binding: ChildBinding,
    ) -> CatalogResult<()> {
        let name = name.into();

        if column_index > self.columns.len() {
            return Err(CatalogError::binding_out_of_range(column_index, self.columns.len()));
        }
        if self
            .columns
            .get(column_index)
            .is_some_and(Column::is_child)
        {
            return Err(CatalogError::duplicate_binding(column_index));
        }
        if binding.parent_join() >= self.flat_width {
            return Err(CatalogError::invalid_join_column(
                "Parent",
                binding.parent_join(),
                self.flat_width,
            ));
        }
        let child_width = binding.catalog().flat_width();
        if binding.child_join() >= child_width {
            return Err(CatalogError::invalid_join_column(
                "Child",
                binding.child_join(),
                child_width,
            ));
        }

        if column_index == self.columns.len() {
            self.columns.push(Column {
                index: column_index,
                name: name.clone(),
                role: None,
                table: None,
                kind: ColumnKind::Child(binding),
            });
        } else {
            let column = &mut self.columns[column_index];
            if self.names.get(&column.name) == Some(&column_index) {
                self.names.remove(&column.name);
            }
            column.name = name.clone();
            column.kind = ColumnKind::Child(binding);
        }
        self.names.entry(name).or_insert(column_index);

        Ok(())
    }

    /// Builder form of [`add_child_binding`](Self::add_child_binding)
    pub fn with_child_binding(
        mut self,
        column_index: usize,
        name: impl Into<String>,
        binding: ChildBinding,
    ) -> CatalogResult<Self> {
        self.add_child_binding(column_index, name, binding)?;
        Ok(self)
    }

    /// Column at a position
    pub fn column_at(&self, index: usize) -> CatalogResult<&Column> {
        self.columns
            .get(index)
            .ok_or_else(|| CatalogError::column_not_found(index))
    }

    /// Position of the column carrying `role`
    pub fn index_of_role(&self, role: &str) -> CatalogResult<usize> {
        self.roles
            .get(role)
            .copied()
            .ok_or_else(|| CatalogError::role_not_found(role))
    }

    /// Position of the first column named `name`
    pub fn index_of_name(&self, name: &str) -> CatalogResult<usize> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| CatalogError::name_not_found(name))
    }

    /// Resolves any column reference to a position
    pub fn resolve(&self, column: &ColumnRef) -> CatalogResult<usize> {
        match column {
            ColumnRef::Index(index) => self.column_at(*index).map(|c| c.index),
            ColumnRef::Name(name) => self.index_of_name(name),
            ColumnRef::Role(role) => self.index_of_role(role),
        }
    }

    /// Position of the `result:key` column, if the query declares one
    pub fn key_column(&self) -> Option<usize> {
        self.roles.get(KEY_ROLE).copied()
    }

    /// All columns in output order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of output columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if there are no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of cells in each flat row of the underlying source
    pub fn flat_width(&self) -> usize {
        self.flat_width
    }

    /// True if any column is child-bound
    pub fn has_bindings(&self) -> bool {
        self.columns.iter().any(Column::is_child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::JoinMode;
    use crate::source::MemoryRowSource;
    use serde_json::json;
    use std::sync::Arc;

    fn customers_meta() -> Vec<FieldMeta> {
        vec![
            FieldMeta::new("id").with_role(KEY_ROLE).with_table("customers"),
            FieldMeta::new("name").with_table("customers"),
        ]
    }

    fn orders_binding() -> ChildBinding {
        let source = MemoryRowSource::new(
            vec![FieldMeta::new("id"), FieldMeta::new("customer_id")],
            vec![vec![json!(10), json!(1)]],
        )
        .unwrap();
        let catalog = FieldCatalog::for_source(&source).unwrap();
        ChildBinding::record_list(Arc::new(source), Arc::new(catalog), 0, 1)
    }

    #[test]
    fn test_from_metadata() {
        let catalog = FieldCatalog::from_metadata(&customers_meta()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.flat_width(), 2);
        assert_eq!(catalog.index_of_name("name").unwrap(), 1);
        assert_eq!(catalog.key_column(), Some(0));
        assert!(!catalog.has_bindings());
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let fields = vec![
            FieldMeta::new("a").with_role("x"),
            FieldMeta::new("b").with_role("x"),
        ];
        let err = FieldCatalog::from_metadata(&fields).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_append_child_binding() {
        let mut catalog = FieldCatalog::from_metadata(&customers_meta()).unwrap();
        catalog.add_child_binding(2, "orders", orders_binding()).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.flat_width(), 2);
        let column = catalog.column_at(2).unwrap();
        assert_eq!(column.name, "orders");
        assert_eq!(column.binding().unwrap().mode(), JoinMode::RecordList);
        assert_eq!(catalog.index_of_name("orders").unwrap(), 2);
    }

    #[test]
    fn test_rebind_existing_column() {
        let mut catalog = FieldCatalog::from_metadata(&customers_meta()).unwrap();
        catalog.add_child_binding(1, "orders", orders_binding()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.column_at(1).unwrap().is_child());
        assert!(catalog.index_of_name("name").unwrap_err().is_not_found());
    }

    #[test]
    fn test_duplicate_binding_rejected() {
        let mut catalog = FieldCatalog::from_metadata(&customers_meta()).unwrap();
        catalog.add_child_binding(2, "orders", orders_binding()).unwrap();
        let err = catalog
            .add_child_binding(2, "orders", orders_binding())
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.message().contains("already"));
    }

    #[test]
    fn test_gap_in_indices_rejected() {
        let mut catalog = FieldCatalog::from_metadata(&customers_meta()).unwrap();
        let err = catalog
            .add_child_binding(5, "orders", orders_binding())
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_join_columns_checked() {
        let source = MemoryRowSource::new(vec![FieldMeta::new("id")], vec![]).unwrap();
        let catalog = Arc::new(FieldCatalog::for_source(&source).unwrap());
        let binding = ChildBinding::record_list(Arc::new(source), catalog, 0, 3);

        let mut parent = FieldCatalog::from_metadata(&customers_meta()).unwrap();
        let err = parent.add_child_binding(2, "orders", binding).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_lookups_fail_with_not_found() {
        let catalog = FieldCatalog::from_metadata(&customers_meta()).unwrap();
        assert!(catalog.column_at(7).unwrap_err().is_not_found());
        assert!(catalog.index_of_role("tree:left").unwrap_err().is_not_found());
        assert!(catalog
            .resolve(&ColumnRef::name("email"))
            .unwrap_err()
            .is_not_found());
        assert_eq!(catalog.resolve(&ColumnRef::role(KEY_ROLE)).unwrap(), 0);
    }
}
