//! Observable events of the result layer
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A tree result was opened over a source
    ResultOpened,
    /// A nested-set index was built
    NestedSetIndexed,
    /// A nested-set row was left out of the index
    IntervalSkipped,
    /// A child binding was resolved for one parent row
    ChildResolved,
    /// A result set or row was rendered to markup
    MarkupRendered,
    /// A fixture file was loaded
    FixtureLoaded,
    /// A config file was loaded
    ConfigLoaded,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ResultOpened => "RESULT_OPENED",
            Event::NestedSetIndexed => "NESTED_SET_INDEXED",
            Event::IntervalSkipped => "INTERVAL_SKIPPED",
            Event::ChildResolved => "CHILD_RESOLVED",
            Event::MarkupRendered => "MARKUP_RENDERED",
            Event::FixtureLoaded => "FIXTURE_LOADED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Returns the severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::IntervalSkipped => Severity::Warn,
            Event::ChildResolved => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake_case() {
        let events = [
            Event::ResultOpened,
            Event::NestedSetIndexed,
            Event::IntervalSkipped,
            Event::ChildResolved,
            Event::MarkupRendered,
            Event::FixtureLoaded,
            Event::ConfigLoaded,
        ];
        for event in events {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_skipped_interval_is_a_warning() {
        assert_eq!(Event::IntervalSkipped.severity(), Severity::Warn);
        assert_eq!(Event::ChildResolved.severity(), Severity::Trace);
    }
}
