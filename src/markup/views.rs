//! Rendering rows as markup
//!
//! Three layouts share one walk over the row tree:
//!
//! ```text
//! attributes  <row id="1" name="Ann"><orders><row .../></orders></row>
//! forest      <row><id>1</id><name>Ann</name><orders><row>..</row></orders></row>
//! standard    <row><column name="id">1</column>...</row>
//! ```
//!
//! Record-list cells recurse into child rows, single-value cells become
//! `value` elements and nested-set descendants go inside a `children`
//! element. An empty list is written self-closing with `count="0"`, which
//! keeps it apart from null (`<tag/>`) and from the empty string
//! (`<tag></tag>`).

use std::collections::HashSet;

use serde_json::Value;

use crate::catalog::Column;
use crate::observability::{log_event_with_fields, Event};
use crate::result::{Cell, HierarchicalResult, Row, CHILDREN_KEY};

use super::config::{MarkupConfig, MarkupOptions, NameSource, View};
use super::errors::MarkupResult;
use super::writer::{sanitize_name, XmlWriter};

/// Attribute marking an empty list element
pub(crate) const COUNT_ATTR: &str = "count";

/// Validates `options`, then renders every row of `result`.
///
/// Nothing is rendered if the options are invalid.
pub fn to_markup<R: HierarchicalResult>(
    result: &mut R,
    options: &MarkupOptions,
) -> MarkupResult<String> {
    let config = options.validate()?;
    render_result(result, &config)
}

/// Renders every row of `result` from the first one. The cursor position
/// is restored afterwards.
pub fn render_result<R: HierarchicalResult>(
    result: &mut R,
    config: &MarkupConfig,
) -> MarkupResult<String> {
    let rows = result.drain_from_start(|r| r.fetch_row())?;

    let mut writer = XmlWriter::new(config.indent);
    if config.declaration {
        writer.declaration();
    }
    if rows.is_empty() {
        writer.empty(&config.root, &[]);
    } else {
        writer.open(&config.root, &[]);
        for row in &rows {
            write_row(&mut writer, row, config);
        }
        writer.close(&config.root);
    }

    let count = rows.len().to_string();
    log_event_with_fields(
        Event::MarkupRendered,
        &[("view", config.view.as_str()), ("rows", count.as_str())],
    );
    Ok(writer.finish())
}

/// Renders one row element, without declaration or root
pub fn row_to_markup(row: &Row, config: &MarkupConfig) -> String {
    let mut writer = XmlWriter::new(config.indent);
    write_row(&mut writer, row, config);
    writer.finish()
}

fn label<'a>(column: &'a Column, names: NameSource) -> Option<&'a str> {
    match names {
        NameSource::FieldNames => Some(column.name.as_str()),
        NameSource::Roles => column.role.as_deref(),
    }
}

/// Text of a scalar; `None` for null
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        // Structured scalars are kept as JSON text.
        other => Some(other.to_string()),
    }
}

fn write_row(writer: &mut XmlWriter, row: &Row, config: &MarkupConfig) {
    let labelled: Vec<(&str, &Cell)> = row
        .iter()
        .filter_map(|(column, cell)| label(column, config.names).map(|l| (l, cell)))
        .collect();

    match config.view {
        View::Attributes => write_attributes_row(writer, row, &labelled, config),
        View::Forest | View::Standard => {
            if labelled.is_empty() && row.children().is_none() {
                writer.empty(&config.row, &[]);
                return;
            }
            writer.open(&config.row, &[]);
            for (label, cell) in &labelled {
                write_cell(writer, label, cell, config);
            }
            write_children(writer, row, config);
            writer.close(&config.row);
        }
    }
}

fn write_attributes_row(
    writer: &mut XmlWriter,
    row: &Row,
    labelled: &[(&str, &Cell)],
    config: &MarkupConfig,
) {
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut nested: Vec<(&str, &Cell)> = Vec::new();

    // An attribute name may appear once per element; later scalars with the
    // same name are written as child elements instead.
    for (label, cell) in labelled {
        match cell {
            Cell::Scalar(value) => {
                let Some(text) = scalar_text(value) else {
                    continue;
                };
                let name = sanitize_name(label);
                if taken.insert(name.clone()) {
                    attrs.push((name, text));
                } else {
                    nested.push((label, cell));
                }
            }
            _ => nested.push((label, cell)),
        }
    }

    let attrs: Vec<(&str, String)> = attrs
        .iter()
        .map(|(name, text)| (name.as_str(), text.clone()))
        .collect();

    if nested.is_empty() && row.children().is_none() {
        writer.empty(&config.row, &attrs);
        return;
    }

    writer.open(&config.row, &attrs);
    for (label, cell) in nested {
        write_cell(writer, label, cell, config);
    }
    write_children(writer, row, config);
    writer.close(&config.row);
}

/// Opens the element holding one column's content, per view
fn cell_tag(label: &str, config: &MarkupConfig) -> (String, Vec<(&'static str, String)>) {
    match config.view {
        View::Standard => (config.column.clone(), vec![("name", label.to_string())]),
        View::Forest | View::Attributes => (sanitize_name(label), Vec::new()),
    }
}

fn write_cell(writer: &mut XmlWriter, label: &str, cell: &Cell, config: &MarkupConfig) {
    let (tag, attrs) = cell_tag(label, config);
    match cell {
        Cell::Scalar(value) => match scalar_text(value) {
            Some(text) => writer.text_element(&tag, &attrs, &text),
            None => writer.empty(&tag, &attrs),
        },
        Cell::Values(None) => writer.empty(&tag, &attrs),
        Cell::Values(Some(values)) if values.is_empty() => write_empty_list(writer, &tag, attrs),
        Cell::Values(Some(values)) => {
            writer.open(&tag, &attrs);
            for value in values {
                match scalar_text(value) {
                    Some(text) => writer.text_element(&config.value, &[], &text),
                    None => writer.empty(&config.value, &[]),
                }
            }
            writer.close(&tag);
        }
        Cell::Records(rows) if rows.is_empty() => write_empty_list(writer, &tag, attrs),
        Cell::Records(rows) => {
            writer.open(&tag, &attrs);
            for child in rows {
                write_row(writer, child, config);
            }
            writer.close(&tag);
        }
    }
}

fn write_empty_list(writer: &mut XmlWriter, tag: &str, mut attrs: Vec<(&'static str, String)>) {
    attrs.push((COUNT_ATTR, "0".to_string()));
    writer.empty(tag, &attrs);
}

fn write_children(writer: &mut XmlWriter, row: &Row, config: &MarkupConfig) {
    if let Some(children) = row.children() {
        if children.is_empty() {
            return;
        }
        writer.open(CHILDREN_KEY, &[]);
        for child in children {
            write_row(writer, child, config);
        }
        writer.close(CHILDREN_KEY);
    }
}
