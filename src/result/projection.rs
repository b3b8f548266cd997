//! Row projections
//!
//! Turns a materialized [`Row`] into one of the fetch shapes. Child rows
//! are projected with the same shape, through their own catalog.
//!
//! Zero-match policy, identical in every shape: a record-list binding with
//! no matching child rows is an empty array, a single-value binding with
//! no matches is `null`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::row::{Cell, Row};

/// Reserved key under which nested-set children are emitted. A column of
/// the same name is shadowed in rows that have children.
pub const CHILDREN_KEY: &str = "children";

/// Table key for columns the driver reported no table for
pub const UNKNOWN_TABLE: &str = "";

/// Shape of a fetched row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Values by column position
    Ordered,
    /// Values by column name
    Associative,
    /// Values under both position and name
    Full,
    /// Values grouped by source table, then by name
    PerTable,
    /// Values by role, falling back to position
    Roles,
}

impl Projection {
    /// Returns the projection name
    pub fn as_str(&self) -> &'static str {
        match self {
            Projection::Ordered => "ordered",
            Projection::Associative => "associative",
            Projection::Full => "full",
            Projection::PerTable => "per_table",
            Projection::Roles => "roles",
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Projection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordered" => Ok(Projection::Ordered),
            "associative" => Ok(Projection::Associative),
            "full" => Ok(Projection::Full),
            "per_table" => Ok(Projection::PerTable),
            "roles" => Ok(Projection::Roles),
            other => Err(format!(
                "Unknown projection '{}'. Expected ordered, associative, full, per_table or roles.",
                other
            )),
        }
    }
}

impl Cell {
    /// Projects the cell; child rows take the same shape
    pub fn project(&self, projection: Projection) -> Value {
        match self {
            Cell::Scalar(value) => value.clone(),
            Cell::Values(None) => Value::Null,
            Cell::Values(Some(values)) => Value::Array(values.clone()),
            Cell::Records(rows) => {
                Value::Array(rows.iter().map(|row| row.project(projection)).collect())
            }
        }
    }
}

impl Row {
    /// Projects the row into the given shape
    pub fn project(&self, projection: Projection) -> Value {
        match projection {
            Projection::Ordered => Value::Array(self.to_ordered()),
            Projection::Associative => Value::Object(self.to_associative()),
            Projection::Full => Value::Object(self.to_full()),
            Projection::PerTable => Value::Object(self.to_per_table()),
            Projection::Roles => Value::Object(self.to_roles()),
        }
    }

    /// One value per column, by position.
    ///
    /// Nested-set children, if any, follow as one trailing array.
    pub fn to_ordered(&self) -> Vec<Value> {
        let mut values: Vec<Value> = self
            .cells()
            .iter()
            .map(|cell| cell.project(Projection::Ordered))
            .collect();
        if let Some(children) = self.projected_children(Projection::Ordered) {
            values.push(children);
        }
        values
    }

    /// One value per column name; a repeated name keeps the last value
    pub fn to_associative(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (column, cell) in self.iter() {
            map.insert(column.name.clone(), cell.project(Projection::Associative));
        }
        self.insert_children(&mut map, Projection::Associative);
        map
    }

    /// Every value twice: under its position and under its name.
    ///
    /// Position keys come first and are never overwritten, so a column
    /// named `"1"` is reachable only through its own position.
    pub fn to_full(&self) -> Map<String, Value> {
        let values: Vec<Value> = self
            .cells()
            .iter()
            .map(|cell| cell.project(Projection::Full))
            .collect();

        let mut map = Map::new();
        for (index, value) in values.iter().enumerate() {
            map.insert(index.to_string(), value.clone());
        }
        for ((column, _), value) in self.iter().zip(values) {
            map.entry(column.name.clone()).or_insert(value);
        }
        self.insert_children(&mut map, Projection::Full);
        map
    }

    /// Values grouped by source table
    pub fn to_per_table(&self) -> Map<String, Value> {
        let mut tables: Map<String, Value> = Map::new();
        for (column, cell) in self.iter() {
            let table = column.table.as_deref().unwrap_or(UNKNOWN_TABLE);
            let group = tables
                .entry(table.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(group) = group {
                group.insert(column.name.clone(), cell.project(Projection::PerTable));
            }
        }
        self.insert_children(&mut tables, Projection::PerTable);
        tables
    }

    /// Values by role; columns without a role are keyed by position
    pub fn to_roles(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (column, cell) in self.iter() {
            let key = match &column.role {
                Some(role) => role.clone(),
                None => column.index.to_string(),
            };
            map.insert(key, cell.project(Projection::Roles));
        }
        self.insert_children(&mut map, Projection::Roles);
        map
    }

    fn projected_children(&self, projection: Projection) -> Option<Value> {
        self.children().map(|children| {
            Value::Array(children.iter().map(|row| row.project(projection)).collect())
        })
    }

    fn insert_children(&self, map: &mut Map<String, Value>, projection: Projection) {
        if let Some(children) = self.projected_children(projection) {
            map.insert(CHILDREN_KEY.to_string(), children);
        }
    }
}
