//! ObservationScope for begin/complete logging around whole-set operations
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` on `complete_with_fields()`
//! - Logs `{name}_FAILED` on `fail()`
//! - Logs `{name}_INCOMPLETE` if dropped without either

use std::time::Instant;

use super::logger::Logger;

/// A scope that logs begin and complete events
///
/// ```ignore
/// let scope = ObservationScope::new("FETCH_ALL");
/// // ... drain the result ...
/// scope.complete_with_fields(&[("rows", "12")]);
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    completed: bool,
    started: Instant,
}

impl<'a> ObservationScope<'a> {
    /// Create a new observation scope and log `{name}_BEGIN`
    pub fn new(name: &'a str) -> Self {
        Logger::trace(&format!("{}_BEGIN", name), &[]);
        Self {
            name,
            completed: false,
            started: Instant::now(),
        }
    }

    /// Mark the scope as completed, attaching fields and the elapsed time
    pub fn complete_with_fields(mut self, fields: &[(&str, &str)]) {
        self.completed = true;
        let elapsed = self.started.elapsed().as_micros().to_string();
        let mut all_fields: Vec<(&str, &str)> = fields.to_vec();
        all_fields.push(("elapsed_us", elapsed.as_str()));
        Logger::info(&format!("{}_COMPLETE", self.name), &all_fields);
    }

    /// Mark the scope as failed
    pub fn fail(mut self, reason: &str) {
        self.completed = true;
        Logger::error(&format!("{}_FAILED", self.name), &[("reason", reason)]);
    }

    /// Check if the scope has been completed
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}
