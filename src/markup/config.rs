//! Markup configuration
//!
//! [`MarkupOptions`] is the raw, serde-loadable option set. It becomes a
//! [`MarkupConfig`] only through [`MarkupOptions::validate`], so rendering
//! never starts with an unsupported view.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::{MarkupError, MarkupResult};
use super::writer::is_valid_name;

/// Layout of rows and columns in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Scalars are attributes of the row element
    Attributes,
    /// Every column is an element named after the column
    Forest,
    /// Every column is a `column` element with a `name` attribute
    Standard,
}

impl View {
    /// Returns the option value naming this view
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Attributes => "attributes",
            View::Forest => "forest",
            View::Standard => "standard",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for View {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attributes" => Ok(View::Attributes),
            "forest" => Ok(View::Forest),
            "standard" => Ok(View::Standard),
            other => Err(MarkupError::UnsupportedView(other.to_string())),
        }
    }
}

/// Where column labels come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// Column names
    FieldNames,
    /// Column roles; columns without a role are left out
    Roles,
}

impl FromStr for NameSource {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fieldnames" => Ok(NameSource::FieldNames),
            "roles" => Ok(NameSource::Roles),
            other => Err(MarkupError::UnsupportedNames(other.to_string())),
        }
    }
}

/// Raw markup options, as read from a config file or command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupOptions {
    pub view: String,
    pub root: String,
    pub row: String,
    pub column: String,
    pub value: String,
    pub names: String,
    pub declaration: bool,
    pub indent: bool,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self {
            view: "standard".to_string(),
            root: "resultset".to_string(),
            row: "row".to_string(),
            column: "column".to_string(),
            value: "value".to_string(),
            names: "fieldnames".to_string(),
            declaration: true,
            indent: false,
        }
    }
}

impl MarkupOptions {
    /// Options for a view, with default tags
    pub fn with_view(view: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            ..Self::default()
        }
    }

    /// Sets one option by key. Unknown keys are a configuration error.
    pub fn set(&mut self, key: &str, value: &str) -> MarkupResult<()> {
        match key {
            "view" => self.view = value.to_string(),
            "root" => self.root = value.to_string(),
            "row" => self.row = value.to_string(),
            "column" => self.column = value.to_string(),
            "value" => self.value = value.to_string(),
            "names" => self.names = value.to_string(),
            "declaration" => self.declaration = parse_flag(key, value)?,
            "indent" => self.indent = parse_flag(key, value)?,
            other => return Err(MarkupError::UnknownOption(other.to_string())),
        }
        Ok(())
    }

    /// Builds options from key/value pairs over the defaults
    pub fn from_pairs(pairs: &[(&str, &str)]) -> MarkupResult<Self> {
        let mut options = Self::default();
        for (key, value) in pairs {
            options.set(key, value)?;
        }
        Ok(options)
    }

    /// Checks every option and produces a render-ready config
    pub fn validate(&self) -> MarkupResult<MarkupConfig> {
        let view = self.view.parse()?;
        let names = self.names.parse()?;

        for (option, tag) in [
            ("root", &self.root),
            ("row", &self.row),
            ("column", &self.column),
            ("value", &self.value),
        ] {
            if !is_valid_name(tag) {
                return Err(MarkupError::InvalidTag {
                    option,
                    tag: tag.clone(),
                });
            }
        }

        Ok(MarkupConfig {
            view,
            names,
            root: self.root.clone(),
            row: self.row.clone(),
            column: self.column.clone(),
            value: self.value.clone(),
            declaration: self.declaration,
            indent: self.indent,
        })
    }
}

fn parse_flag(key: &str, value: &str) -> MarkupResult<bool> {
    match value {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(MarkupError::UnknownOption(format!("{}={}", key, value))),
    }
}

/// Validated markup configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupConfig {
    pub view: View,
    pub names: NameSource,
    pub root: String,
    pub row: String,
    pub column: String,
    pub value: String,
    pub declaration: bool,
    pub indent: bool,
}

impl MarkupConfig {
    /// Default tags for a view
    pub fn for_view(view: View) -> Self {
        let defaults = MarkupOptions::default();
        Self {
            view,
            names: NameSource::FieldNames,
            root: defaults.root,
            row: defaults.row,
            column: defaults.column,
            value: defaults.value,
            declaration: defaults.declaration,
            indent: defaults.indent,
        }
    }
}
