//! flatdb - A strict flat-file table storage engine
//!
//! Databases are directories; tables are `|`-delimited text files with a
//! hidden metadata companion describing typed, constrained columns.

pub mod cli;
pub mod config;
pub mod database;
pub mod errors;
pub mod observability;
pub mod schema;
pub mod storage;
pub mod table;
pub mod validation;

pub use config::Config;
pub use database::{DatabaseManager, Session};
pub use errors::{DbError, DbErrorCode, DbResult, Violation};
pub use schema::{Column, ColumnType, TableSchema};
pub use table::{SelectMode, SelectResult, TableManager};
