//! CLI module for flatdb
//!
//! A thin, non-interactive caller of the engine: it tokenizes arguments,
//! runs one database or table operation and prints one JSON response.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{parse_column_spec, split_row, Cli, Command, DbAction, TableAction};
pub use commands::{run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
