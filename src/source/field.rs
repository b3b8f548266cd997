//! Driver-reported field metadata

use serde::{Deserialize, Serialize};

/// Separator between a column name and its role inside a column alias
pub const ROLE_MARKER: &str = "#role:";

/// Metadata for one flat column as reported by the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Column name (alias)
    pub name: String,
    /// Semantic role, independent of the physical name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Source table, if the driver knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl FieldMeta {
    /// Creates metadata with a name only
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
            table: None,
        }
    }

    /// Splits an alias of the form `name#role:role_name`.
    ///
    /// An alias without the marker, or with an empty role, yields no role.
    pub fn from_alias(alias: &str) -> Self {
        match alias.split_once(ROLE_MARKER) {
            Some((name, role)) if !role.is_empty() => Self {
                name: name.to_string(),
                role: Some(role.to_string()),
                table: None,
            },
            Some((name, _)) => Self::new(name),
            None => Self::new(alias),
        }
    }

    /// Sets the role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Sets the table
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_alias_with_role() {
        let meta = FieldMeta::from_alias("customer_id#role:parent");
        assert_eq!(meta.name, "customer_id");
        assert_eq!(meta.role.as_deref(), Some("parent"));
    }

    #[test]
    fn test_from_alias_plain() {
        let meta = FieldMeta::from_alias("title");
        assert_eq!(meta.name, "title");
        assert!(meta.role.is_none());
    }

    #[test]
    fn test_from_alias_empty_role() {
        let meta = FieldMeta::from_alias("title#role:");
        assert_eq!(meta.name, "title");
        assert!(meta.role.is_none());
    }

    #[test]
    fn test_deserialize_defaults() {
        let meta: FieldMeta = serde_json::from_str(r#"{"name":"id"}"#).unwrap();
        assert_eq!(meta, FieldMeta::new("id"));
    }
}
