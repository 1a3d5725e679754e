//! Table subsystem for flatdb
//!
//! Operations: create, insert (single or batch), select, update-cell,
//! delete-row, drop, list. All of them take an explicit [`Session`]
//! naming the database to work in.
//!
//! [`Session`]: crate::database::Session

mod manager;
mod types;

pub use manager::TableManager;
pub use types::{RowOutcome, SelectMode, SelectResult, SelectedRow, TableInfo};
