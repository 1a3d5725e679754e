//! CLI command implementations
//!
//! Each command loads the configuration, performs exactly one engine call
//! and renders its result as JSON. No prompting, no retries.

use serde_json::{json, Value};

use crate::config::Config;
use crate::database::{DatabaseManager, Session};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::table::{SelectMode, TableManager};

use super::args::{split_row, Cli, Command, DbAction, TableAction};
use super::errors::{CliError, CliResult};
use super::io::{error_value, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = Config::load_or_default(&cli.config)?;
    Logger::set_min_severity(config.severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("databases_root", &config.databases_root.display().to_string())],
    );

    match run_command(&config, cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(&e)?;
            Err(e)
        }
    }
}

/// Run one command against the configured databases root
pub fn run_command(config: &Config, cmd: Command) -> CliResult<Value> {
    let databases = DatabaseManager::from_config(config);
    let tables = TableManager::from_config(config);

    match cmd {
        Command::Db { action } => database_command(&databases, action),
        Command::Table { db, action } => {
            let session = databases.select(&db)?;
            table_command(&tables, &session, action)
        }
        Command::Insert { db, table, rows } => {
            let session = databases.select(&db)?;
            insert(&tables, &session, &table, rows)
        }
        Command::Select {
            db,
            table,
            column,
            filter,
        } => {
            let session = databases.select(&db)?;
            let mode = match (column, filter) {
                (Some(index), _) => SelectMode::Column(index),
                (None, Some((column, value))) => SelectMode::Where { column, value },
                (None, None) => SelectMode::All,
            };
            let result = tables.select(&session, &table, mode)?;
            Ok(serde_json::to_value(result)?)
        }
        Command::Update {
            db,
            table,
            row,
            column,
            value,
        } => {
            let session = databases.select(&db)?;
            tables.update_cell(&session, &table, row, column, &value)?;
            Ok(json!({"updated": {"row": row, "column": column}}))
        }
        Command::Delete { db, table, row } => {
            let session = databases.select(&db)?;
            tables.delete_row(&session, &table, row)?;
            let remaining = tables.row_count(&session, &table)?;
            Ok(json!({"deleted": row, "row_count": remaining}))
        }
    }
}

fn database_command(databases: &DatabaseManager, action: DbAction) -> CliResult<Value> {
    match action {
        DbAction::Create { name } => {
            databases.create(&name)?;
            Ok(json!({"created": name}))
        }
        DbAction::Drop { name } => {
            databases.drop(&name)?;
            Ok(json!({"dropped": name}))
        }
        DbAction::List => Ok(json!({"databases": databases.list()?})),
    }
}

fn table_command(tables: &TableManager, session: &Session, action: TableAction) -> CliResult<Value> {
    match action {
        TableAction::Create { name, columns } => {
            let schema = tables.create_table(session, &name, columns)?;
            Ok(serde_json::to_value(schema)?)
        }
        TableAction::Drop { name } => {
            tables.drop_table(session, &name)?;
            Ok(json!({"dropped": name}))
        }
        TableAction::Describe { name } => {
            let schema = tables.describe(session, &name)?;
            Ok(serde_json::to_value(schema)?)
        }
        TableAction::List => Ok(json!({"tables": tables.list_tables(session)?})),
    }
}

fn insert(
    tables: &TableManager,
    session: &Session,
    table: &str,
    rows: Vec<String>,
) -> CliResult<Value> {
    let rows = rows.iter().map(|r| split_row(r)).collect();
    let outcomes = tables.insert_rows(session, table, rows)?;

    let mut inserted = 0usize;
    let results: Vec<Value> = outcomes
        .into_iter()
        .map(|outcome| match outcome.result {
            Ok(index) => {
                inserted += 1;
                json!({"position": outcome.position, "status": "ok", "row": index})
            }
            Err(e) => {
                let mut value = error_value(&CliError::from(e));
                value["position"] = json!(outcome.position);
                value
            }
        })
        .collect();

    Ok(json!({
        "inserted": inserted,
        "rejected": results.len() - inserted,
        "results": results,
    }))
}
