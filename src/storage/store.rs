//! Record store: row data of every table in one database directory
//!
//! All lookups are linear scans over the data artifact. Uniqueness checks
//! therefore cost O(rows) per insert or update; there is no index.
//!
//! Row indices are 1-based and positional: row 1 is the first line after
//! the header, and deleting a row shifts every later row up by one.
//!
//! Locking is the caller's job; see [`super::TableLock`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::atomic::{atomic_create, atomic_write};
use super::layout::TablePaths;
use super::record::{Row, TableData};
use crate::errors::{DbError, DbErrorCode, DbResult, Violation};

/// Reads and writes data artifacts under one database directory.
#[derive(Debug, Clone)]
pub struct RecordStore {
    db_dir: PathBuf,
    fsync: bool,
}

impl RecordStore {
    pub fn new(db_dir: impl Into<PathBuf>, fsync: bool) -> Self {
        Self {
            db_dir: db_dir.into(),
            fsync,
        }
    }

    pub fn paths(&self, table: &str) -> TablePaths {
        TablePaths::new(&self.db_dir, table)
    }

    /// Returns true if the table's data artifact exists.
    pub fn exists(&self, table: &str) -> bool {
        self.paths(table).data.exists()
    }

    /// Publishes a header-only data artifact.
    pub fn create_empty(&self, table: &str, column_names: &[String]) -> DbResult<()> {
        let path = self.paths(table).data;
        let data = TableData::empty(column_names.to_vec());
        atomic_create(&path, data.encode().as_bytes(), self.fsync)
            .map_err(|e| match e.code() {
                DbErrorCode::Conflict => DbError::conflict("table", table),
                _ => e,
            })
    }

    /// Appends one row. The caller has checked the row width.
    pub fn append_row(&self, table: &str, row: &Row) -> DbResult<()> {
        let path = self.paths(table).data;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| not_found_or_io(e, table, "open", &path))?;

        let mut line = row.encode();
        line.push('\n');
        file.write_all(line.as_bytes())
            .map_err(|e| DbError::io("append to", &path, e))?;

        if self.fsync {
            file.sync_all().map_err(|e| DbError::io("fsync", &path, e))?;
        }
        Ok(())
    }

    /// Reads the header and every row.
    pub fn read_all(&self, table: &str) -> DbResult<TableData> {
        let path = self.paths(table).data;
        let text =
            fs::read_to_string(&path).map_err(|e| not_found_or_io(e, table, "read", &path))?;
        TableData::parse(&path, &text)
    }

    /// Number of data lines, excluding the header.
    pub fn row_count(&self, table: &str) -> DbResult<usize> {
        let path = self.paths(table).data;
        let file = File::open(&path).map_err(|e| not_found_or_io(e, table, "open", &path))?;

        let mut lines = 0usize;
        for line in BufReader::new(file).lines() {
            line.map_err(|e| DbError::io("read", &path, e))?;
            lines += 1;
        }
        Ok(lines.saturating_sub(1))
    }

    /// Replaces row `row_index` (1-based) with `new_row`.
    pub fn replace_row(&self, table: &str, row_index: usize, new_row: Row) -> DbResult<()> {
        let mut data = self.read_all(table)?;
        let slot = checked_slot(&data, row_index)?;
        data.rows[slot] = new_row;
        self.publish(table, &data)
    }

    /// Removes row `row_index` (1-based); later rows shift up by one.
    pub fn delete_row(&self, table: &str, row_index: usize) -> DbResult<()> {
        let mut data = self.read_all(table)?;
        let slot = checked_slot(&data, row_index)?;
        data.rows.remove(slot);
        self.publish(table, &data)
    }

    /// Values of the column at `position` (0-based) across all rows,
    /// optionally skipping row `exclude_row_index` (1-based).
    pub fn column_values(
        &self,
        table: &str,
        position: usize,
        exclude_row_index: Option<usize>,
    ) -> DbResult<Vec<String>> {
        let data = self.read_all(table)?;
        Ok(data
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| exclude_row_index != Some(i + 1))
            .filter_map(|(_, row)| row.get(position).map(str::to_string))
            .collect())
    }

    /// Removes the data and metadata artifacts together.
    ///
    /// A table with only one of the two artifacts left is cleaned up without
    /// error; a table with neither is reported missing.
    pub fn drop(&self, table: &str) -> DbResult<()> {
        let paths = self.paths(table);
        let removed_data = remove_if_present(&paths.data)?;
        let removed_meta = remove_if_present(&paths.metadata)?;
        if !removed_data && !removed_meta {
            return Err(DbError::not_found("table", table));
        }
        // The lock file is kept; see `TableLock`.
        Ok(())
    }

    fn publish(&self, table: &str, data: &TableData) -> DbResult<()> {
        atomic_write(&self.paths(table).data, data.encode().as_bytes(), self.fsync)
    }
}

fn checked_slot(data: &TableData, row_index: usize) -> DbResult<usize> {
    let count = data.rows.len();
    if count == 0 {
        return Err(DbError::validation(Violation::EmptyTable));
    }
    if row_index == 0 || row_index > count {
        return Err(DbError::validation(Violation::RowOutOfRange {
            index: row_index,
            count,
        }));
    }
    Ok(row_index - 1)
}

fn remove_if_present(path: &Path) -> DbResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(DbError::io("remove", path, e)),
    }
}

fn not_found_or_io(e: io::Error, table: &str, action: &str, path: &Path) -> DbError {
    if e.kind() == io::ErrorKind::NotFound {
        DbError::not_found("table", table)
    } else {
        DbError::io(action, path, e)
    }
}
