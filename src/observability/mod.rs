//! Observability for the result layer
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Begin/complete scopes around whole-set operations
//!
//! Observability is read-only: nothing here changes what a fetch returns.
//!
//! ```ignore
//! use qresult::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::NestedSetIndexed, &[("rows", "42")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity, LOG_ENV_VAR};
pub use scope::ObservationScope;

/// Log a lifecycle event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::IntervalSkipped, &[("row", "3"), ("reason", "left >= right")]);
    }
}
