//! Schema subsystem for flatdb
//!
//! A table's column set is fixed at creation and stored in a hidden
//! metadata artifact next to its data. There is no ALTER.
//!
//! # Design Principles
//!
//! - Column set validated in full before anything is written
//! - Metadata published atomically (temp file + rename)
//! - Column order in metadata matches the data header

mod metadata;
mod store;
mod types;

pub use crate::validation::ColumnType;
pub use metadata::METADATA_HEADER;
pub use store::SchemaStore;
pub use types::{validate_columns, Column, TableSchema};
