//! In-memory row source
//!
//! Holds a table of rows behind `Arc`, so `seek_to` can hand out
//! independent filtered cursors without copying the rows.

use std::sync::Arc;

use serde_json::Value;

use super::errors::{SourceError, SourceResult};
use super::field::FieldMeta;
use super::FlatRowSource;

/// A forward-only cursor over an in-memory table
#[derive(Debug, Clone)]
pub struct MemoryRowSource {
    fields: Arc<[FieldMeta]>,
    rows: Arc<[Vec<Value>]>,
    /// Visible row indices; `None` means every row
    selection: Option<Arc<[usize]>>,
    cursor: usize,
}

impl MemoryRowSource {
    /// Creates a source, checking that every row matches the field count
    pub fn new(fields: Vec<FieldMeta>, rows: Vec<Vec<Value>>) -> SourceResult<Self> {
        let expected = fields.len();
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(SourceError::RowWidth {
                row,
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            fields: fields.into(),
            rows: rows.into(),
            selection: None,
            cursor: 0,
        })
    }

    /// Number of rows visible through this cursor
    pub fn len(&self) -> usize {
        match &self.selection {
            Some(selection) => selection.len(),
            None => self.rows.len(),
        }
    }

    /// Returns true if no rows are visible
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn visible(&self) -> Vec<usize> {
        match &self.selection {
            Some(selection) => selection.to_vec(),
            None => (0..self.rows.len()).collect(),
        }
    }
}

impl FlatRowSource for MemoryRowSource {
    fn next_row(&mut self) -> SourceResult<Option<Vec<Value>>> {
        if self.cursor >= self.len() {
            return Ok(None);
        }
        let index = match &self.selection {
            Some(selection) => selection[self.cursor],
            None => self.cursor,
        };
        self.cursor += 1;
        Ok(Some(self.rows[index].clone()))
    }

    fn rewind(&mut self) -> SourceResult<()> {
        self.cursor = 0;
        Ok(())
    }

    fn field_metadata(&self) -> &[FieldMeta] {
        &self.fields
    }

    fn seek_to(&self, column: usize, value: &Value) -> SourceResult<Box<dyn FlatRowSource>> {
        if column >= self.fields.len() {
            return Err(SourceError::ColumnOutOfRange {
                column,
                width: self.fields.len(),
            });
        }

        let matching: Vec<usize> = self
            .visible()
            .into_iter()
            .filter(|&i| loosely_equal(&self.rows[i][column], value))
            .collect();

        Ok(Box::new(MemoryRowSource {
            fields: Arc::clone(&self.fields),
            rows: Arc::clone(&self.rows),
            selection: Some(matching.into()),
            cursor: 0,
        }))
    }
}

/// Join-key comparison the way SQL drivers hand values back.
///
/// Null matches nothing. Numbers compare by numeric value, and a numeric
/// string matches the number it spells (`"1"` matches `1`).
pub fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match (s.trim().parse::<f64>(), n.as_f64()) {
                (Ok(parsed), Some(number)) => parsed == number,
                _ => false,
            }
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn orders() -> MemoryRowSource {
        MemoryRowSource::new(
            vec![
                FieldMeta::new("id"),
                FieldMeta::new("customer_id"),
                FieldMeta::new("item"),
            ],
            vec![
                vec![json!(10), json!(1), json!("pen")],
                vec![json!(11), json!(1), json!("ink")],
                vec![json!(12), json!(2), json!("cup")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_drain_and_rewind() {
        let mut source = orders();
        let mut count = 0;
        while source.next_row().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
        assert!(source.next_row().unwrap().is_none());

        source.rewind().unwrap();
        assert_eq!(source.next_row().unwrap().unwrap()[2], json!("pen"));
    }

    #[test]
    fn test_seek_to_filters_rows() {
        let source = orders();
        let mut matching = source.seek_to(1, &json!(1)).unwrap();
        assert_eq!(matching.next_row().unwrap().unwrap()[0], json!(10));
        assert_eq!(matching.next_row().unwrap().unwrap()[0], json!(11));
        assert!(matching.next_row().unwrap().is_none());
    }

    #[test]
    fn test_seek_to_matches_numeric_strings() {
        let source = orders();
        let mut matching = source.seek_to(1, &json!("2")).unwrap();
        assert_eq!(matching.next_row().unwrap().unwrap()[2], json!("cup"));
    }

    #[test]
    fn test_seek_to_null_matches_nothing() {
        let source = orders();
        let mut matching = source.seek_to(1, &Value::Null).unwrap();
        assert!(matching.next_row().unwrap().is_none());
    }

    #[test]
    fn test_seek_is_independent_of_parent_cursor() {
        let mut source = orders();
        source.next_row().unwrap();
        let mut matching = source.seek_to(1, &json!(1)).unwrap();
        assert_eq!(matching.next_row().unwrap().unwrap()[0], json!(10));
        assert_eq!(source.next_row().unwrap().unwrap()[0], json!(11));
    }

    #[test]
    fn test_seek_out_of_range() {
        let source = orders();
        let err = source.seek_to(9, &json!(1)).unwrap_err();
        assert!(matches!(err, SourceError::ColumnOutOfRange { column: 9, width: 3 }));
    }

    #[test]
    fn test_row_width_checked() {
        let err = MemoryRowSource::new(vec![FieldMeta::new("id")], vec![vec![json!(1), json!(2)]])
            .unwrap_err();
        assert!(matches!(err, SourceError::RowWidth { row: 0, expected: 1, actual: 2 }));
    }

    #[test]
    fn test_loosely_equal() {
        assert!(loosely_equal(&json!(1), &json!(1.0)));
        assert!(loosely_equal(&json!("7"), &json!(7)));
        assert!(!loosely_equal(&json!("x"), &json!(7)));
        assert!(!loosely_equal(&Value::Null, &Value::Null));
        assert!(loosely_equal(&json!("a"), &json!("a")));
    }
}
