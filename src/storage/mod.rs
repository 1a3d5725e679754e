//! Record storage subsystem for flatdb
//!
//! Each table is a pair of line-oriented text artifacts in its database
//! directory: the data artifact (header + one line per row) and the hidden
//! metadata artifact written by the schema subsystem.
//!
//! # Design Principles
//!
//! - Whole-artifact rewrites go through temp file + rename
//! - Appends write exactly one newline-terminated line
//! - Linear scans only; no index structures
//! - One advisory lock per table serializes writers

mod atomic;
mod layout;
mod lock;
mod record;
mod store;

pub use atomic::{atomic_create, atomic_write};
pub use layout::{is_hidden, TablePaths, HIDDEN_MARKER};
pub use lock::TableLock;
pub use record::{Row, TableData, DELIMITER};
pub use store::RecordStore;
