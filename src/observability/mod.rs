//! Observability subsystem for flatdb
//!
//! Structured JSON logging of engine events. Logging is read-only and never
//! changes the outcome of an operation.
//!
//! ```ignore
//! use flatdb::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::TableCreated, &[("table", "users")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

use crate::errors::DbError;

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_rejection() {
        Severity::Warn
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

/// Log a rejected operation together with its error code and column
pub fn log_rejection(event: Event, operation: &str, target: &str, err: &DbError) {
    let column = err.column().unwrap_or("");
    log_event_with_fields(
        event,
        &[
            ("code", err.code().code()),
            ("column", column),
            ("message", err.message()),
            ("operation", operation),
            ("target", target),
        ],
    );
}
