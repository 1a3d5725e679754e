//! Schema store: per-table column metadata

use std::fs;
use std::io;
use std::path::PathBuf;

use super::metadata;
use super::types::{validate_columns, Column, TableSchema};
use crate::errors::{DbError, DbErrorCode, DbResult};
use crate::storage::{atomic_create, TablePaths};

/// Reads and writes metadata artifacts under one database directory.
#[derive(Debug, Clone)]
pub struct SchemaStore {
    db_dir: PathBuf,
    fsync: bool,
}

impl SchemaStore {
    pub fn new(db_dir: impl Into<PathBuf>, fsync: bool) -> Self {
        Self {
            db_dir: db_dir.into(),
            fsync,
        }
    }

    fn metadata_path(&self, table: &str) -> PathBuf {
        TablePaths::new(&self.db_dir, table).metadata
    }

    /// Returns true if the table's metadata artifact exists.
    pub fn exists(&self, table: &str) -> bool {
        self.metadata_path(table).exists()
    }

    /// Validates `columns` and publishes them as a new metadata artifact.
    ///
    /// # Errors
    ///
    /// - Validation if the column set breaks a schema invariant
    /// - Conflict if the table already has metadata
    /// - Io if the temp write or rename fails (temp file is removed)
    pub fn create(&self, table: &str, columns: Vec<Column>) -> DbResult<TableSchema> {
        validate_columns(&columns)?;
        let schema = TableSchema::new(table, columns);

        atomic_create(
            &self.metadata_path(table),
            metadata::encode(&schema).as_bytes(),
            self.fsync,
        )
        .map_err(|e| match e.code() {
            DbErrorCode::Conflict => DbError::conflict("table", table),
            _ => e,
        })?;

        Ok(schema)
    }

    /// Reads the columns of `table` in declaration order.
    pub fn read(&self, table: &str) -> DbResult<TableSchema> {
        let path = self.metadata_path(table);
        let text = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                DbError::not_found("table", table)
            } else {
                DbError::io("read", &path, e)
            }
        })?;
        metadata::decode(&path, table, &text)
    }

    /// Case-insensitive column membership test.
    pub fn column_exists(&self, table: &str, column: &str) -> DbResult<bool> {
        Ok(self.read(table)?.position_of(column).is_some())
    }

    /// Removes the metadata artifact; used to undo a half-finished create.
    pub fn remove(&self, table: &str) -> DbResult<()> {
        let path = self.metadata_path(table);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DbError::io("remove", &path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Violation;
    use crate::validation::ColumnType;
    use tempfile::TempDir;

    fn users() -> Vec<Column> {
        vec![
            Column::new("id", ColumnType::Int).primary_key(),
            Column::new("name", ColumnType::String),
            Column::new("email", ColumnType::Varchar).unique(),
            Column::new("active", ColumnType::Boolean).not_null(),
        ]
    }

    #[test]
    fn test_create_and_read_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = SchemaStore::new(tmp.path(), true);

        let created = store.create("users", users()).unwrap();
        let read = store.read("users").unwrap();

        assert_eq!(created, read);
        assert_eq!(read.columns, users());
        assert!(tmp.path().join(".users").exists());
    }

    #[test]
    fn test_create_conflict() {
        let tmp = TempDir::new().unwrap();
        let store = SchemaStore::new(tmp.path(), false);
        store.create("users", users()).unwrap();

        let err = store.create("users", users()).unwrap_err();
        assert_eq!(err.code(), DbErrorCode::Conflict);
    }

    #[test]
    fn test_invalid_columns_write_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = SchemaStore::new(tmp.path(), false);

        let cols = vec![
            Column::new("a", ColumnType::Int).primary_key(),
            Column::new("b", ColumnType::Int).primary_key(),
        ];
        let err = store.create("t", cols).unwrap_err();
        assert_eq!(err.violation(), Some(&Violation::MultiplePrimaryKeys));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_read_missing() {
        let tmp = TempDir::new().unwrap();
        let store = SchemaStore::new(tmp.path(), false);
        assert_eq!(store.read("ghost").unwrap_err().code(), DbErrorCode::NotFound);
    }

    #[test]
    fn test_column_exists() {
        let tmp = TempDir::new().unwrap();
        let store = SchemaStore::new(tmp.path(), false);
        store.create("users", users()).unwrap();

        assert!(store.column_exists("users", "EMAIL").unwrap());
        assert!(!store.column_exists("users", "phone").unwrap());
    }

    #[test]
    fn test_remove() {
        let tmp = TempDir::new().unwrap();
        let store = SchemaStore::new(tmp.path(), false);
        store.create("users", users()).unwrap();
        store.remove("users").unwrap();
        assert!(!store.exists("users"));
        store.remove("users").unwrap();
    }
}
