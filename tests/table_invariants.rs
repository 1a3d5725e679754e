//! Table Invariant Tests
//!
//! - Rejected insert/update/delete leaves the table byte-identical
//! - At most one primary key; boolean primary keys are refused
//! - PK/UNIQUE values are distinct across rows (null exempt)
//! - Updating a key checks every row except the one being updated
//! - Deleting a row shifts later rows up by one
//! - Schema round-trips through the metadata artifact

use std::fs;
use std::path::PathBuf;

use flatdb::table::{SelectMode, TableManager};
use flatdb::{Column, ColumnType, DatabaseManager, DbErrorCode, Session, Violation};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (TempDir, Session, TableManager) {
    let tmp = TempDir::new().unwrap();
    let dbs = DatabaseManager::new(tmp.path().join("databases"));
    dbs.create("shop").unwrap();
    let session = dbs.select("shop").unwrap();
    (tmp, session, TableManager::new(false))
}

fn customers(tables: &TableManager, session: &Session) {
    tables
        .create_table(
            session,
            "customers",
            vec![
                Column::new("id", ColumnType::Int).primary_key(),
                Column::new("email", ColumnType::Varchar).unique(),
                Column::new("name", ColumnType::String).not_null(),
                Column::new("age", ColumnType::Int),
            ],
        )
        .unwrap();
}

fn values(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn data_path(session: &Session, table: &str) -> PathBuf {
    session.path().join(table)
}

fn snapshot(session: &Session, table: &str) -> Vec<u8> {
    fs::read(data_path(session, table)).unwrap()
}

fn seeded() -> (TempDir, Session, TableManager) {
    let (tmp, session, tables) = setup();
    customers(&tables, &session);
    for row in [
        ["1", "a@x.io", "Ann", "30"],
        ["2", "b@x.io", "Ben", ""],
        ["3", "", "Cat", "41"],
    ] {
        tables.insert_row(&session, "customers", values(&row)).unwrap();
    }
    (tmp, session, tables)
}

// =============================================================================
// Rejected Mutations Leave Tables Unchanged
// =============================================================================

/// Every kind of rejected insert leaves the data artifact byte-identical.
#[test]
fn test_rejected_inserts_are_byte_identical() {
    let (_tmp, session, tables) = seeded();
    let before = snapshot(&session, "customers");

    let rejected = [
        values(&["4", "d@x.io", "Dan"]),               // column count
        values(&["x", "d@x.io", "Dan", "1"]),          // int type
        values(&["", "d@x.io", "Dan", "1"]),           // empty pk
        values(&["1", "d@x.io", "Dan", "1"]),          // pk conflict
        values(&["4", "a@x.io", "Dan", "1"]),          // unique conflict
        values(&["4", "d@x.io", "", "1"]),             // not null
        values(&["4", "d@x.io", "null", "1"]),         // not null sentinel
        values(&["4", "d@x.io", "D|an", "1"]),         // delimiter
    ];
    for row in rejected {
        let err = tables.insert_row(&session, "customers", row).unwrap_err();
        assert_eq!(err.code(), DbErrorCode::Validation, "{err}");
    }

    assert_eq!(snapshot(&session, "customers"), before);
    assert_eq!(tables.row_count(&session, "customers").unwrap(), 3);
}

#[test]
fn test_rejected_update_and_delete_are_byte_identical() {
    let (_tmp, session, tables) = seeded();
    let before = snapshot(&session, "customers");

    assert!(tables.update_cell(&session, "customers", 1, 1, "2").is_err());
    assert!(tables.update_cell(&session, "customers", 1, 2, "b@x.io").is_err());
    assert!(tables.update_cell(&session, "customers", 1, 4, "old").is_err());
    assert!(tables.update_cell(&session, "customers", 9, 1, "9").is_err());
    assert!(tables.update_cell(&session, "customers", 1, 9, "9").is_err());
    assert!(tables.update_cell(&session, "customers", 1, 3, "").is_err());
    assert!(tables.delete_row(&session, "customers", 0).is_err());
    assert!(tables.delete_row(&session, "customers", 4).is_err());

    assert_eq!(snapshot(&session, "customers"), before);
}

// =============================================================================
// Primary Key Rules
// =============================================================================

#[test]
fn test_second_primary_key_rejected() {
    let (_tmp, session, tables) = setup();
    let err = tables
        .create_table(
            &session,
            "t",
            vec![
                Column::new("a", ColumnType::Int).primary_key(),
                Column::new("b", ColumnType::String).primary_key(),
            ],
        )
        .unwrap_err();
    assert_eq!(err.violation(), Some(&Violation::MultiplePrimaryKeys));
    assert!(!data_path(&session, "t").exists());
    assert!(!session.path().join(".t").exists());
}

#[test]
fn test_boolean_primary_key_rejected() {
    let (_tmp, session, tables) = setup();
    let err = tables
        .create_table(
            &session,
            "flags",
            vec![Column::new("on", ColumnType::Boolean).primary_key()],
        )
        .unwrap_err();
    assert_eq!(err.violation(), Some(&Violation::BooleanPrimaryKey));
}

#[test]
fn test_duplicate_column_rejected_case_insensitive() {
    let (_tmp, session, tables) = setup();
    let err = tables
        .create_table(
            &session,
            "t",
            vec![
                Column::new("Name", ColumnType::String),
                Column::new("name", ColumnType::String),
            ],
        )
        .unwrap_err();
    assert!(matches!(err.violation(), Some(Violation::DuplicateColumn(_))));
}

// =============================================================================
// Uniqueness
// =============================================================================

/// Null values never collide in UNIQUE columns.
#[test]
fn test_unique_ignores_null() {
    let (_tmp, session, tables) = seeded();
    tables
        .insert_row(&session, "customers", values(&["4", "", "Dee", ""]))
        .unwrap();

    let result = tables
        .select(
            &session,
            "customers",
            SelectMode::Where {
                column: "email".into(),
                value: "null".into(),
            },
        )
        .unwrap();
    assert_eq!(result.len(), 2);
}

/// Uniqueness is a case-sensitive exact match.
#[test]
fn test_unique_is_case_sensitive() {
    let (_tmp, session, tables) = seeded();
    tables
        .insert_row(&session, "customers", values(&["4", "A@x.io", "Dee", ""]))
        .unwrap();
}

#[test]
fn test_update_pk_to_own_value_succeeds() {
    let (_tmp, session, tables) = seeded();
    tables.update_cell(&session, "customers", 2, 1, "2").unwrap();
    tables.update_cell(&session, "customers", 2, 2, "b@x.io").unwrap();
}

#[test]
fn test_update_pk_to_other_rows_value_fails() {
    let (_tmp, session, tables) = seeded();
    let err = tables.update_cell(&session, "customers", 2, 1, "3").unwrap_err();
    assert_eq!(err.violation(), Some(&Violation::PrimaryKey("3".into())));
    assert_eq!(err.column(), Some("id"));
}

#[test]
fn test_update_pk_empty_rejected_optional_empty_is_null() {
    let (_tmp, session, tables) = seeded();

    let err = tables.update_cell(&session, "customers", 1, 1, "").unwrap_err();
    assert_eq!(err.violation(), Some(&Violation::NotNull));

    tables.update_cell(&session, "customers", 1, 4, "").unwrap();
    let age = tables
        .select(&session, "customers", SelectMode::Column(4))
        .unwrap();
    assert_eq!(age.rows[0].cells, vec!["null"]);
}

// =============================================================================
// Delete Shifting
// =============================================================================

#[test]
fn test_delete_shifts_rows_up() {
    let (_tmp, session, tables) = seeded();
    let before = tables
        .select(&session, "customers", SelectMode::All)
        .unwrap();

    tables.delete_row(&session, "customers", 2).unwrap();

    let after = tables
        .select(&session, "customers", SelectMode::All)
        .unwrap();
    assert_eq!(after.len(), before.len() - 1);
    assert_eq!(after.rows[0].cells, before.rows[0].cells);
    assert_eq!(after.rows[1].cells, before.rows[2].cells);
    assert_eq!(after.rows[1].index, 2);
}

#[test]
fn test_delete_from_empty_table() {
    let (_tmp, session, tables) = setup();
    customers(&tables, &session);
    let err = tables.delete_row(&session, "customers", 1).unwrap_err();
    assert_eq!(err.violation(), Some(&Violation::EmptyTable));
    let err = tables.update_cell(&session, "customers", 1, 1, "1").unwrap_err();
    assert_eq!(err.violation(), Some(&Violation::EmptyTable));
}

// =============================================================================
// Schema Round Trip
// =============================================================================

#[test]
fn test_schema_round_trip() {
    let (_tmp, session, tables) = setup();
    let columns = vec![
        Column::new("id", ColumnType::Int).primary_key(),
        Column::new("title", ColumnType::Varchar).not_null(),
        Column::new("price", ColumnType::Float),
        Column::new("published", ColumnType::Date),
        Column::new("in_stock", ColumnType::Boolean),
        Column::new("sku", ColumnType::String).unique(),
    ];
    tables
        .create_table(&session, "books", columns.clone())
        .unwrap();

    let schema = tables.describe(&session, "books").unwrap();
    assert_eq!(schema.columns, columns);

    let header = fs::read_to_string(data_path(&session, "books")).unwrap();
    assert_eq!(header, "id|title|price|published|in_stock|sku\n");
}

#[test]
fn test_create_existing_table_conflicts() {
    let (_tmp, session, tables) = seeded();
    let before = snapshot(&session, "customers");
    let err = tables
        .create_table(
            &session,
            "customers",
            vec![Column::new("x", ColumnType::Int)],
        )
        .unwrap_err();
    assert_eq!(err.code(), DbErrorCode::Conflict);
    assert_eq!(snapshot(&session, "customers"), before);
}

// =============================================================================
// Select Modes
// =============================================================================

#[test]
fn test_select_modes() {
    let (_tmp, session, tables) = seeded();

    let names = tables
        .select(&session, "customers", SelectMode::Column(3))
        .unwrap();
    assert_eq!(names.header, vec!["name"]);
    assert_eq!(names.len(), 3);

    let cat = tables
        .select(
            &session,
            "customers",
            SelectMode::Where {
                column: "NAME".into(),
                value: "Cat".into(),
            },
        )
        .unwrap();
    assert_eq!(cat.len(), 1);
    assert_eq!(cat.rows[0].index, 3);

    let err = tables
        .select(&session, "customers", SelectMode::Column(5))
        .unwrap_err();
    assert!(matches!(
        err.violation(),
        Some(Violation::ColumnOutOfRange { .. })
    ));

    let err = tables
        .select(
            &session,
            "customers",
            SelectMode::Where {
                column: "phone".into(),
                value: "1".into(),
            },
        )
        .unwrap_err();
    assert!(matches!(err.violation(), Some(Violation::UnknownColumn(_))));
}

// =============================================================================
// Batch Insert
// =============================================================================

#[test]
fn test_batch_rows_are_independent() {
    let (_tmp, session, tables) = seeded();
    let outcomes = tables
        .insert_rows(
            &session,
            "customers",
            vec![
                values(&["4", "d@x.io", "Dee", "20"]),
                values(&["4", "e@x.io", "Eve", "21"]),
                values(&["5", "e@x.io", "Eve", "21"]),
            ],
        )
        .unwrap();

    assert!(outcomes[0].is_ok());
    assert!(!outcomes[1].is_ok());
    assert_eq!(outcomes[1].position, 2);
    assert_eq!(outcomes[2].result.as_ref().unwrap(), &5);
    assert_eq!(tables.row_count(&session, "customers").unwrap(), 5);
}

#[test]
fn test_validate_row_has_no_side_effects() {
    let (_tmp, session, tables) = seeded();
    let before = snapshot(&session, "customers");

    let row = tables
        .validate_row(&session, "customers", values(&["9", "", "Zed", ""]))
        .unwrap();
    assert_eq!(row.cells(), &["9", "null", "Zed", "null"]);
    assert!(tables
        .validate_row(&session, "customers", values(&["1", "", "Zed", ""]))
        .is_err());

    assert_eq!(snapshot(&session, "customers"), before);
}
