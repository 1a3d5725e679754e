//! End-to-End Tests
//!
//! Drives a full users-table session twice: once through the engine API and
//! once through the CLI command layer, checking the on-disk artifacts after
//! every step.

use std::fs;

use clap::Parser;
use flatdb::cli::{run_command, Cli};
use flatdb::table::SelectMode;
use flatdb::{Column, ColumnType, Config, DatabaseManager, TableManager, Violation};
use serde_json::Value;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn values(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn test_config(tmp: &TempDir) -> Config {
    Config {
        fsync: false,
        ..Config::with_root(tmp.path().join("databases"))
    }
}

fn cli(config: &Config, args: &[&str]) -> Result<Value, flatdb::cli::CliError> {
    let mut argv = vec!["flatdb"];
    argv.extend_from_slice(args);
    let parsed = Cli::try_parse_from(argv).unwrap();
    run_command(config, parsed.command)
}

// =============================================================================
// Engine API
// =============================================================================

/// Create, insert, reject duplicate, delete, reject bad boolean.
#[test]
fn test_users_session() {
    let tmp = TempDir::new().unwrap();
    let dbs = DatabaseManager::new(tmp.path().join("databases"));
    let tables = TableManager::new(false);

    dbs.create("app").unwrap();
    let session = dbs.select("app").unwrap();

    tables
        .create_table(
            &session,
            "users",
            vec![
                Column::new("id", ColumnType::Int).primary_key(),
                Column::new("name", ColumnType::String).not_null(),
                Column::new("active", ColumnType::Boolean),
            ],
        )
        .unwrap();

    let data = session.path().join("users");
    let metadata = session.path().join(".users");
    assert_eq!(fs::read_to_string(&data).unwrap(), "id|name|active\n");
    assert_eq!(
        fs::read_to_string(&metadata).unwrap(),
        "Column_Name|Column_Type|Primary_Key|Not_Null|Unique\n\
         id|int|yes|yes|yes\n\
         name|string|no|yes|no\n\
         active|boolean|no|no|no\n"
    );

    assert_eq!(
        tables
            .insert_row(&session, "users", values(&["1", "alice", "true"]))
            .unwrap(),
        1
    );

    let err = tables
        .insert_row(&session, "users", values(&["1", "bob", "false"]))
        .unwrap_err();
    assert_eq!(err.violation(), Some(&Violation::PrimaryKey("1".into())));

    assert_eq!(
        tables
            .insert_row(&session, "users", values(&["2", "bob", "false"]))
            .unwrap(),
        2
    );
    assert_eq!(
        fs::read_to_string(&data).unwrap(),
        "id|name|active\n1|alice|true\n2|bob|false\n"
    );

    tables.delete_row(&session, "users", 1).unwrap();
    let rows = tables.select(&session, "users", SelectMode::All).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.rows[0].cells, values(&["2", "bob", "false"]));

    let before = fs::read(&data).unwrap();
    let err = tables
        .update_cell(&session, "users", 1, 3, "maybe")
        .unwrap_err();
    assert!(matches!(
        err.violation(),
        Some(Violation::TypeMismatch { .. })
    ));
    assert_eq!(err.column(), Some("active"));
    assert_eq!(fs::read(&data).unwrap(), before);

    tables.update_cell(&session, "users", 1, 3, "1").unwrap();
    assert_eq!(
        fs::read_to_string(&data).unwrap(),
        "id|name|active\n2|bob|1\n"
    );

    let listed = tables.list_tables(&session).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "users");
    assert_eq!(listed[0].row_count, 1);

    tables.drop_table(&session, "users").unwrap();
    assert!(!data.exists());
    assert!(!metadata.exists());
    assert!(tables.list_tables(&session).unwrap().is_empty());
}

// =============================================================================
// CLI Command Layer
// =============================================================================

#[test]
fn test_cli_users_session() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);

    cli(&config, &["db", "create", "app"]).unwrap();
    let out = cli(&config, &["db", "list"]).unwrap();
    assert_eq!(out["databases"][0], "app");

    let schema = cli(
        &config,
        &[
            "table", "--db", "app", "create", "users",
            "--column", "id:int:pk",
            "--column", "name:string:notnull",
            "--column", "active:bool",
        ],
    )
    .unwrap();
    assert_eq!(schema["columns"][0]["is_primary_key"], true);
    assert_eq!(schema["columns"][2]["type"], "boolean");

    let out = cli(
        &config,
        &[
            "insert", "--db", "app", "users",
            "--row", "1|alice|true",
            "--row", "1|bob|false",
            "--row", "2|bob|false",
        ],
    )
    .unwrap();
    assert_eq!(out["inserted"], 2);
    assert_eq!(out["rejected"], 1);
    assert_eq!(out["results"][1]["code"], "FLAT_VALIDATION_FAILED");
    assert_eq!(out["results"][1]["position"], 2);

    let out = cli(
        &config,
        &["select", "--db", "app", "users", "--where", "name=bob"],
    )
    .unwrap();
    assert_eq!(out["rows"][0]["index"], 2);

    cli(&config, &["delete", "--db", "app", "users", "--row", "1"]).unwrap();

    let err = cli(
        &config,
        &[
            "update", "--db", "app", "users",
            "--row", "1", "--column", "3", "--value", "maybe",
        ],
    )
    .unwrap_err();
    assert_eq!(err.column(), Some("active"));

    let out = cli(&config, &["select", "--db", "app", "users", "--column", "2"]).unwrap();
    assert_eq!(out["header"][0], "name");
    assert_eq!(out["rows"][0]["cells"][0], "bob");
}

#[test]
fn test_cli_missing_database() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);

    let err = cli(&config, &["table", "--db", "ghost", "list"]).unwrap_err();
    assert_eq!(err.code_str(), "FLAT_NOT_FOUND");
}
