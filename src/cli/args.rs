//! CLI argument definitions using clap
//!
//! Commands:
//! - flatdb db create|drop <name> / db list
//! - flatdb table --db <db> create <name> --column id:int:pk ...
//! - flatdb table --db <db> drop|describe <name> / table --db <db> list
//! - flatdb insert --db <db> <table> --row "1|alice|true" ...
//! - flatdb select --db <db> <table> [--column N | --where col=value]
//! - flatdb update --db <db> <table> --row N --column N --value V
//! - flatdb delete --db <db> <table> --row N

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::schema::{Column, ColumnType};
use crate::storage::DELIMITER;

/// flatdb - flat-file databases with typed, constrained tables
#[derive(Parser, Debug)]
#[command(name = "flatdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults apply if it does not exist)
    #[arg(long, global = true, default_value = "./flatdb.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create, drop or list databases
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Create, drop, list or describe tables
    Table {
        /// Database to work in
        #[arg(long)]
        db: String,

        #[command(subcommand)]
        action: TableAction,
    },

    /// Insert one or more rows; each row is checked and committed on its own
    Insert {
        #[arg(long)]
        db: String,

        table: String,

        /// Row values separated by '|'; an empty value stores null
        #[arg(long = "row", required = true, allow_hyphen_values = true)]
        rows: Vec<String>,
    },

    /// Read rows
    Select {
        #[arg(long)]
        db: String,

        table: String,

        /// Return a single column by 1-based index
        #[arg(long, conflicts_with = "filter")]
        column: Option<usize>,

        /// Return rows where COLUMN equals VALUE exactly
        #[arg(long = "where", value_name = "COLUMN=VALUE", value_parser = parse_filter)]
        filter: Option<(String, String)>,
    },

    /// Replace one cell
    Update {
        #[arg(long)]
        db: String,

        table: String,

        /// 1-based row index
        #[arg(long)]
        row: usize,

        /// 1-based column index
        #[arg(long)]
        column: usize,

        /// New value; empty stores null
        #[arg(long, allow_hyphen_values = true)]
        value: String,
    },

    /// Delete one row; later rows shift up
    Delete {
        #[arg(long)]
        db: String,

        table: String,

        /// 1-based row index
        #[arg(long)]
        row: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum DbAction {
    Create { name: String },
    Drop { name: String },
    List,
}

#[derive(Subcommand, Debug)]
pub enum TableAction {
    Create {
        name: String,

        /// Column as name:type[:pk][:notnull][:unique]
        #[arg(long = "column", required = true, value_parser = parse_column_spec)]
        columns: Vec<Column>,
    },
    Drop {
        name: String,
    },
    Describe {
        name: String,
    },
    List,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Parses `name:type[:pk][:notnull][:unique]`.
pub fn parse_column_spec(spec: &str) -> Result<Column, String> {
    let mut parts = spec.split(':');
    let name = parts.next().unwrap_or_default();
    let column_type: ColumnType = parts
        .next()
        .ok_or_else(|| format!("column '{}' needs a type (name:type)", spec))?
        .parse()?;

    let mut column = Column::new(name, column_type);
    for flag in parts {
        column = match flag.to_ascii_lowercase().as_str() {
            "pk" | "primary" => column.primary_key(),
            "notnull" | "not_null" => column.not_null(),
            "unique" => column.unique(),
            other => return Err(format!("unknown column flag '{}'", other)),
        };
    }
    Ok(column)
}

/// Splits a `|`-delimited row argument into values.
pub fn split_row(row: &str) -> Vec<String> {
    row.split(DELIMITER).map(str::to_string).collect()
}

fn parse_filter(filter: &str) -> Result<(String, String), String> {
    filter
        .split_once('=')
        .map(|(c, v)| (c.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", filter))
}
