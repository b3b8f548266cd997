//! Nested-set results
//!
//! Hierarchy comes from `(left, right)` interval containment, not from a
//! join. The source is drained once at construction into a
//! [`NestedSetIndex`]; traversal then moves a record pointer over that
//! index:
//!
//! - child: smallest left boundary strictly inside the current interval
//! - sibling: smallest left boundary after the current right boundary,
//!   bounded by the enclosing parent while walking its children
//!
//! Top-level fetches enumerate the roots. Each root carries its subtree
//! under the reserved `children` key. The pointer is saved on an explicit
//! stack before descending and restored after.
//!
//! Malformed input is tolerated by default: unreadable or inverted
//! intervals are left out of the index, and overlapping intervals are
//! adopted by whichever scan reaches them first. [`NestedSetResult::strict`]
//! rejects such input instead.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{CatalogResult, ColumnRef, FieldCatalog};
use crate::observability::{log_event_with_fields, Event};
use crate::source::FlatRowSource;

use super::errors::{ResultError, ResultResult};
use super::fetch::{HierarchicalResult, VALUE_PROJECTION};
use super::row::Row;
use super::tree::{resolve_cell, resolve_row};

/// Default role of the left-boundary column
pub const LEFT_ROLE: &str = "tree:left";
/// Default role of the right-boundary column
pub const RIGHT_ROLE: &str = "tree:right";
/// Column name used when no column carries [`LEFT_ROLE`]
pub const LEFT_NAME: &str = "lft";
/// Column name used when no column carries [`RIGHT_ROLE`]
pub const RIGHT_NAME: &str = "rgt";
/// Deepest subtree a fetch will materialize, counting the root as level 0
pub const MAX_NESTING_DEPTH: usize = 256;

/// Which columns hold the interval boundaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedSetColumns {
    pub left: ColumnRef,
    pub right: ColumnRef,
}

impl Default for NestedSetColumns {
    fn default() -> Self {
        Self {
            left: ColumnRef::role(LEFT_ROLE),
            right: ColumnRef::role(RIGHT_ROLE),
        }
    }
}

impl NestedSetColumns {
    /// Boundary columns addressed by reference
    pub fn new(left: impl Into<ColumnRef>, right: impl Into<ColumnRef>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Resolves both columns; the default roles fall back to `lft`/`rgt`
    pub fn resolve(&self, catalog: &FieldCatalog) -> CatalogResult<(usize, usize)> {
        let left = Self::locate(catalog, &self.left, LEFT_ROLE, LEFT_NAME)?;
        let right = Self::locate(catalog, &self.right, RIGHT_ROLE, RIGHT_NAME)?;
        Ok((left, right))
    }

    fn locate(
        catalog: &FieldCatalog,
        column: &ColumnRef,
        default_role: &str,
        fallback_name: &str,
    ) -> CatalogResult<usize> {
        match catalog.resolve(column) {
            Err(e) if e.is_not_found() && *column == ColumnRef::role(default_role) => {
                catalog.index_of_name(fallback_name)
            }
            other => other,
        }
    }
}

/// One indexed row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalEntry {
    /// Position of the row in the drained source
    pub row: usize,
    pub left: i64,
    pub right: i64,
}

/// Rows keyed by left and by right boundary, each in ascending order
#[derive(Debug, Clone, Default)]
pub struct NestedSetIndex {
    by_left: BTreeMap<i64, IntervalEntry>,
    by_right: BTreeMap<i64, IntervalEntry>,
}

impl NestedSetIndex {
    /// Indexes an interval. Returns false, leaving the index unchanged, if
    /// either boundary is already taken.
    pub fn insert(&mut self, entry: IntervalEntry) -> bool {
        if self.by_left.contains_key(&entry.left) || self.by_right.contains_key(&entry.right) {
            return false;
        }
        self.by_left.insert(entry.left, entry);
        self.by_right.insert(entry.right, entry);
        true
    }

    /// Interval with the smallest left boundary
    pub fn first(&self) -> Option<IntervalEntry> {
        self.by_left.values().next().copied()
    }

    /// Interval with the smallest left boundary in `(after, before)`.
    ///
    /// `before = None` leaves the range open above.
    pub fn first_left_between(&self, after: i64, before: Option<i64>) -> Option<IntervalEntry> {
        let upper = match before {
            Some(before) if before <= after => return None,
            Some(before) => Bound::Excluded(before),
            None => Bound::Unbounded,
        };
        self.by_left
            .range((Bound::Excluded(after), upper))
            .next()
            .map(|(_, entry)| *entry)
    }

    /// Interval closing at `right`
    pub fn closing_at(&self, right: i64) -> Option<&IntervalEntry> {
        self.by_right.get(&right)
    }

    /// Intervals in ascending left order
    pub fn iter(&self) -> impl Iterator<Item = &IntervalEntry> {
        self.by_left.values()
    }

    /// Number of indexed intervals
    pub fn len(&self) -> usize {
        self.by_left.len()
    }

    /// True if nothing was indexed
    pub fn is_empty(&self) -> bool {
        self.by_left.is_empty()
    }
}

/// A row that was left out of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

/// Result over a nested-set encoded table
#[derive(Debug)]
pub struct NestedSetResult {
    catalog: Arc<FieldCatalog>,
    rows: Vec<Vec<Value>>,
    /// Index entry per drained row; `None` for skipped rows
    entries: Vec<Option<IntervalEntry>>,
    index: NestedSetIndex,
    skipped: Vec<SkippedRow>,
    pointer: Option<usize>,
    /// Rows whose children are being walked, innermost last
    saved: Vec<usize>,
    position: usize,
}

impl NestedSetResult {
    /// Drains `source` and indexes it, tolerating malformed intervals
    pub fn new(
        mut source: Box<dyn FlatRowSource>,
        catalog: Arc<FieldCatalog>,
        columns: &NestedSetColumns,
    ) -> ResultResult<Self> {
        let (left_column, right_column) = columns.resolve(&catalog)?;

        source.rewind()?;
        let mut rows = Vec::new();
        while let Some(row) = source.next_row()? {
            rows.push(row);
        }

        let mut index = NestedSetIndex::default();
        let mut entries = Vec::with_capacity(rows.len());
        let mut skipped = Vec::new();

        for (row, cells) in rows.iter().enumerate() {
            let left = cells.get(left_column).and_then(boundary);
            let right = cells.get(right_column).and_then(boundary);

            let outcome = match (left, right) {
                (Some(left), Some(right)) if left < right => {
                    let entry = IntervalEntry { row, left, right };
                    if index.insert(entry) {
                        Ok(entry)
                    } else {
                        Err("duplicate boundary")
                    }
                }
                (Some(_), Some(_)) => Err("left boundary not below right boundary"),
                _ => Err("boundary is not an integer"),
            };

            match outcome {
                Ok(entry) => entries.push(Some(entry)),
                Err(reason) => {
                    let row_text = row.to_string();
                    log_event_with_fields(
                        Event::IntervalSkipped,
                        &[("reason", reason), ("row", row_text.as_str())],
                    );
                    skipped.push(SkippedRow {
                        row,
                        reason: reason.to_string(),
                    });
                    entries.push(None);
                }
            }
        }

        let row_count = rows.len().to_string();
        let indexed = index.len().to_string();
        log_event_with_fields(
            Event::NestedSetIndexed,
            &[("indexed", indexed.as_str()), ("rows", row_count.as_str())],
        );

        Ok(Self {
            catalog,
            rows,
            entries,
            index,
            skipped,
            pointer: None,
            saved: Vec::new(),
            position: 0,
        })
    }

    /// Like [`new`](Self::new), but fails on any malformed interval:
    /// unreadable or inverted boundaries, duplicate boundaries, or partial
    /// overlap between two intervals.
    pub fn strict(
        source: Box<dyn FlatRowSource>,
        catalog: Arc<FieldCatalog>,
        columns: &NestedSetColumns,
    ) -> ResultResult<Self> {
        let result = Self::new(source, catalog, columns)?;
        result.validate()?;
        Ok(result)
    }

    /// Opens a lenient result with a catalog built from the source's metadata
    pub fn from_source(
        source: impl FlatRowSource + 'static,
        columns: &NestedSetColumns,
    ) -> ResultResult<Self> {
        let catalog = FieldCatalog::for_source(&source)?;
        Self::new(Box::new(source), Arc::new(catalog), columns)
    }

    /// Checks that the indexed intervals form a proper forest
    pub fn validate(&self) -> ResultResult<()> {
        if let Some(skipped) = self.skipped.first() {
            return Err(ResultError::malformed_nesting(
                skipped.row,
                skipped.reason.clone(),
            ));
        }

        let mut open: Vec<IntervalEntry> = Vec::new();
        for entry in self.index.iter() {
            while open.last().is_some_and(|parent| parent.right < entry.left) {
                open.pop();
            }
            if let Some(parent) = open.last() {
                if entry.right >= parent.right {
                    return Err(ResultError::malformed_nesting(
                        entry.row,
                        format!("interval overlaps row {}", parent.row),
                    ));
                }
            }
            open.push(*entry);
        }
        Ok(())
    }

    /// Rows left out of the index
    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }

    /// The interval index
    pub fn index(&self) -> &NestedSetIndex {
        &self.index
    }

    /// Row the record pointer is on
    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    /// Number of ancestors whose children are being walked
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Number of drained rows, indexed or not
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn entry(&self, row: usize) -> Option<IntervalEntry> {
        self.entries.get(row).copied().flatten()
    }

    fn current(&self) -> Option<IntervalEntry> {
        self.pointer.and_then(|row| self.entry(row))
    }

    /// Moves the pointer to the first root and forgets saved positions.
    ///
    /// Returns false if nothing was indexed.
    pub fn prepare_fetch_first(&mut self) -> bool {
        self.saved.clear();
        self.pointer = self.index.first().map(|entry| entry.row);
        self.pointer.is_some()
    }

    /// Moves the pointer to the next interval starting after the current
    /// one ends. Inside a child walk the search stops at the parent's right
    /// boundary. Returns false, leaving the pointer in place, if there is
    /// no such interval.
    pub fn prepare_fetch_sibling(&mut self) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        let bound = self
            .saved
            .last()
            .and_then(|&parent| self.entry(parent))
            .map(|parent| parent.right);

        match self.index.first_left_between(current.right, bound) {
            Some(next) => {
                self.pointer = Some(next.row);
                true
            }
            None => false,
        }
    }

    /// Moves the pointer to the first interval nested inside the current
    /// one. Returns false, leaving the pointer in place, if there is none.
    pub fn prepare_fetch_child(&mut self) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        match self.index.first_left_between(current.left, Some(current.right)) {
            Some(child) => {
                self.pointer = Some(child.row);
                true
            }
            None => false,
        }
    }

    /// Advances to the next root: the first root on the first call, the
    /// next sibling afterwards.
    fn advance(&mut self) -> bool {
        if self.position == 0 {
            self.prepare_fetch_first()
        } else {
            self.prepare_fetch_sibling()
        }
    }

    /// Resolves `row` and its whole subtree; the pointer ends where it
    /// started.
    fn materialize(&mut self, row: usize) -> ResultResult<Row> {
        let base = self.saved.len();
        let outcome = self.walk_subtree(row);
        self.saved.truncate(base);
        self.pointer = Some(row);
        outcome
    }

    /// Depth-first walk without recursion. `open` holds the partially built
    /// ancestors of `current`, parallel to the row positions on `saved`.
    fn walk_subtree(&mut self, root: usize) -> ResultResult<Row> {
        let base = self.saved.len();
        let mut open: Vec<(Row, Vec<Row>)> = Vec::new();
        let mut current = self.enter(root)?;
        let mut descend = true;

        loop {
            if descend && self.prepare_fetch_child() {
                if let Some(child) = self.pointer {
                    if self.saved.len() - base > MAX_NESTING_DEPTH {
                        return Err(ResultError::NestingTooDeep {
                            row: child,
                            limit: MAX_NESTING_DEPTH,
                        });
                    }
                    open.push(current);
                    current = self.enter(child)?;
                    continue;
                }
            }

            // Close `current`; the pointer goes back onto its row.
            self.pointer = self.saved.pop();
            let (mut row, children) = current;
            if !children.is_empty() {
                row.set_children(children);
            }

            let Some(mut parent) = open.pop() else {
                return Ok(row);
            };
            parent.1.push(row);

            descend = self.prepare_fetch_sibling();
            current = match (descend, self.pointer) {
                (true, Some(sibling)) => {
                    open.push(parent);
                    self.enter(sibling)?
                }
                _ => {
                    descend = false;
                    parent
                }
            };
        }
    }

    /// Resolves `row`, puts the pointer on it and saves its position
    fn enter(&mut self, row: usize) -> ResultResult<(Row, Vec<Row>)> {
        let resolved = resolve_row(&self.catalog, &self.rows[row])?;
        self.pointer = Some(row);
        self.saved.push(row);
        Ok((resolved, Vec::new()))
    }
}

impl HierarchicalResult for NestedSetResult {
    fn catalog(&self) -> &Arc<FieldCatalog> {
        &self.catalog
    }

    fn fetch_row(&mut self) -> ResultResult<Option<Row>> {
        if !self.advance() {
            return Ok(None);
        }
        let Some(root) = self.pointer else {
            return Ok(None);
        };
        let row = self.materialize(root)?;
        self.position += 1;
        Ok(Some(row))
    }

    fn rewind(&mut self) -> ResultResult<()> {
        self.pointer = None;
        self.saved.clear();
        self.position = 0;
        Ok(())
    }

    fn position(&self) -> usize {
        self.position
    }

    fn seek(&mut self, position: usize) -> ResultResult<()> {
        self.rewind()?;
        while self.position < position && self.advance() {
            self.position += 1;
        }
        Ok(())
    }

    fn fetch_value(&mut self, column: &ColumnRef) -> ResultResult<Option<Value>> {
        let index = self.catalog.resolve(column)?;
        if !self.advance() {
            return Ok(None);
        }
        let Some(root) = self.pointer else {
            return Ok(None);
        };
        self.position += 1;
        let column = self.catalog.column_at(index)?;
        Ok(Some(
            resolve_cell(column, &self.rows[root])?.project(VALUE_PROJECTION),
        ))
    }
}

/// Reads an interval boundary: integers, integral floats, numeric strings
fn boundary(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FieldMeta, MemoryRowSource};
    use serde_json::json;

    fn intervals(bounds: &[(Value, Value)]) -> NestedSetResult {
        let rows = bounds
            .iter()
            .enumerate()
            .map(|(i, (l, r))| vec![json!(format!("n{}", i)), l.clone(), r.clone()])
            .collect();
        let source = MemoryRowSource::new(
            vec![
                FieldMeta::new("title"),
                FieldMeta::new("lft"),
                FieldMeta::new("rgt"),
            ],
            rows,
        )
        .unwrap();
        NestedSetResult::from_source(source, &NestedSetColumns::default()).unwrap()
    }

    fn sample() -> NestedSetResult {
        intervals(&[
            (json!(0), json!(7)),
            (json!(1), json!(2)),
            (json!(3), json!(6)),
            (json!(4), json!(5)),
        ])
    }

    #[test]
    fn test_child_and_sibling_navigation() {
        let mut result = sample();
        assert!(result.prepare_fetch_first());
        assert_eq!(result.pointer(), Some(0));

        assert!(result.prepare_fetch_child());
        assert_eq!(result.pointer(), Some(1));

        assert!(result.prepare_fetch_sibling());
        assert_eq!(result.pointer(), Some(2));

        assert!(result.prepare_fetch_child());
        assert_eq!(result.pointer(), Some(3));

        assert!(!result.prepare_fetch_child());
        assert!(!result.prepare_fetch_sibling());
        assert_eq!(result.pointer(), Some(3));
    }

    #[test]
    fn test_fetch_builds_subtree() {
        let mut result = sample();
        let root = result.fetch_associative().unwrap().unwrap();
        assert_eq!(root["title"], json!("n0"));
        assert_eq!(root["children"][0]["title"], json!("n1"));
        assert_eq!(root["children"][1]["title"], json!("n2"));
        assert_eq!(root["children"][1]["children"][0]["title"], json!("n3"));
        assert!(root["children"][0].get("children").is_none());

        assert!(result.fetch_row().unwrap().is_none());
        assert_eq!(result.depth(), 0);
    }

    #[test]
    fn test_multiple_roots() {
        let mut result = intervals(&[
            (json!(1), json!(4)),
            (json!(2), json!(3)),
            (json!(5), json!(6)),
        ]);
        let first = result.fetch_ordered().unwrap().unwrap();
        assert_eq!(first[0], json!("n0"));
        let second = result.fetch_ordered().unwrap().unwrap();
        assert_eq!(second[0], json!("n2"));
        assert!(result.fetch_ordered().unwrap().is_none());
    }

    #[test]
    fn test_pointer_restored_after_subtree() {
        let mut result = sample();
        result.fetch_row().unwrap();
        assert_eq!(result.pointer(), Some(0));
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let result = intervals(&[
            (json!(1), json!(10)),
            (json!("x"), json!(3)),
            (json!(6), json!(4)),
            (json!(1), json!(12)),
            (json!("2"), json!("5")),
        ]);
        assert_eq!(result.index().len(), 2);
        let reasons: Vec<usize> = result.skipped().iter().map(|s| s.row).collect();
        assert_eq!(reasons, vec![1, 2, 3]);
        assert_eq!(result.index().closing_at(5).map(|e| e.row), Some(4));
    }

    #[test]
    fn test_overlapping_intervals_are_adopted() {
        let mut result = intervals(&[(json!(1), json!(5)), (json!(3), json!(8))]);
        let root = result.fetch_associative().unwrap().unwrap();
        assert_eq!(root["children"][0]["title"], json!("n1"));
        assert!(result.validate().is_err());
    }

    #[test]
    fn test_strict_mode_rejects_overlap() {
        let source = MemoryRowSource::new(
            vec![FieldMeta::new("lft"), FieldMeta::new("rgt")],
            vec![vec![json!(1), json!(3)], vec![json!(3), json!(5)]],
        )
        .unwrap();
        let catalog = Arc::new(FieldCatalog::for_source(&source).unwrap());
        let err = NestedSetResult::strict(Box::new(source), catalog, &NestedSetColumns::default())
            .unwrap_err();
        assert!(matches!(err, ResultError::MalformedNesting { row: 1, .. }));
    }

    #[test]
    fn test_strict_mode_accepts_forest() {
        let source = MemoryRowSource::new(
            vec![FieldMeta::new("lft"), FieldMeta::new("rgt")],
            vec![
                vec![json!(0), json!(7)],
                vec![json!(1), json!(2)],
                vec![json!(3), json!(6)],
                vec![json!(4), json!(5)],
                vec![json!(8), json!(9)],
            ],
        )
        .unwrap();
        let catalog = Arc::new(FieldCatalog::for_source(&source).unwrap());
        assert!(
            NestedSetResult::strict(Box::new(source), catalog, &NestedSetColumns::default())
                .is_ok()
        );
    }

    #[test]
    fn test_boundary_columns_by_role() {
        let source = MemoryRowSource::new(
            vec![
                FieldMeta::new("a").with_role(LEFT_ROLE),
                FieldMeta::new("b").with_role(RIGHT_ROLE),
            ],
            vec![vec![json!(1), json!(2)]],
        )
        .unwrap();
        let result = NestedSetResult::from_source(source, &NestedSetColumns::default()).unwrap();
        assert_eq!(result.index().len(), 1);
    }

    #[test]
    fn test_missing_boundary_columns() {
        let source = MemoryRowSource::new(vec![FieldMeta::new("title")], vec![]).unwrap();
        let err = NestedSetResult::from_source(source, &NestedSetColumns::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_seek_and_column_values() {
        let mut result = intervals(&[
            (json!(1), json!(4)),
            (json!(2), json!(3)),
            (json!(5), json!(6)),
        ]);
        result.fetch_row().unwrap();
        let titles = result.get_column_values(&ColumnRef::name("title")).unwrap();
        assert_eq!(titles, vec![json!("n0"), json!("n2")]);
        assert_eq!(result.position(), 1);
        assert_eq!(result.pointer(), Some(0));
    }

    #[test]
    fn test_boundary_parsing() {
        assert_eq!(boundary(&json!(4)), Some(4));
        assert_eq!(boundary(&json!(4.0)), Some(4));
        assert_eq!(boundary(&json!(4.5)), None);
        assert_eq!(boundary(&json!(" 12 ")), Some(12));
        assert_eq!(boundary(&Value::Null), None);
    }
}
