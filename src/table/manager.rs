//! Table manager: the six table operations over the schema and record stores
//!
//! Every mutation is two-phase:
//! 1. validate all input against the schema and current rows, no side effects
//! 2. only if every check passed, perform exactly one filesystem mutation
//!
//! A rejected operation therefore leaves the table byte-for-byte unchanged.
//! Each mutation holds the table's exclusive lock across both phases; reads
//! hold it shared.
//!
//! PK/UNIQUE checks are O(rows) linear scans over the data artifact.

use std::fs;
use std::io;

use super::types::{RowOutcome, SelectMode, SelectResult, SelectedRow, TableInfo};
use crate::config::Config;
use crate::database::Session;
use crate::errors::{DbError, DbErrorCode, DbResult, Violation};
use crate::observability::{log_event_with_fields, log_rejection, Event};
use crate::schema::{validate_columns, Column, SchemaStore, TableSchema};
use crate::storage::{is_hidden, RecordStore, Row, TableData, TableLock, TablePaths};
use crate::validation::{
    is_null, normalize_input, validate_cell_text, validate_identifier, validate_not_null,
    validate_safe_name, validate_type, IdentifierKind,
};

/// Orchestrates table operations for a [`Session`].
#[derive(Debug, Clone)]
pub struct TableManager {
    fsync: bool,
}

impl Default for TableManager {
    fn default() -> Self {
        Self { fsync: true }
    }
}

impl TableManager {
    pub fn new(fsync: bool) -> Self {
        Self { fsync }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.fsync)
    }

    fn schemas(&self, session: &Session) -> SchemaStore {
        SchemaStore::new(session.path(), self.fsync)
    }

    fn records(&self, session: &Session) -> RecordStore {
        RecordStore::new(session.path(), self.fsync)
    }

    /// Creates a table with a fixed column set and no rows.
    pub fn create_table(
        &self,
        session: &Session,
        table: &str,
        columns: Vec<Column>,
    ) -> DbResult<TableSchema> {
        let result = self.create_table_inner(session, table, columns);
        match &result {
            Ok(schema) => log_event_with_fields(
                Event::TableCreated,
                &[
                    ("columns", &schema.len().to_string()),
                    ("database", session.database()),
                    ("table", table),
                ],
            ),
            Err(e) => log_rejection(Event::OperationRejected, "create_table", table, e),
        }
        result
    }

    fn create_table_inner(
        &self,
        session: &Session,
        table: &str,
        columns: Vec<Column>,
    ) -> DbResult<TableSchema> {
        check_table_name(table)?;
        validate_columns(&columns)?;

        let schemas = self.schemas(session);
        let records = self.records(session);
        let paths = TablePaths::new(session.path(), table);

        let _lock = TableLock::exclusive(&paths.lock)?;
        if schemas.exists(table) || records.exists(table) {
            return Err(DbError::conflict("table", table));
        }

        publish_table(&schemas, &records, table, columns)
    }

    /// Inserts one row. Returns the new row's 1-based index.
    pub fn insert_row(&self, session: &Session, table: &str, values: Vec<String>) -> DbResult<usize> {
        let result = self.lock_existing(session, table, true).and_then(|_lock| {
            let schema = self.schemas(session).read(table)?;
            self.commit_insert(session, table, &schema, values)
        });
        log_insert(session, table, &result);
        result
    }

    /// Inserts rows one at a time. A rejected row does not affect rows
    /// committed before it nor stop the rows after it.
    ///
    /// Fails as a whole only when the table itself cannot be used.
    pub fn insert_rows(
        &self,
        session: &Session,
        table: &str,
        rows: Vec<Vec<String>>,
    ) -> DbResult<Vec<RowOutcome>> {
        let _lock = self.lock_existing(session, table, true)?;
        let schema = self.schemas(session).read(table)?;

        let outcomes = rows
            .into_iter()
            .enumerate()
            .map(|(i, values)| {
                let result = self.commit_insert(session, table, &schema, values);
                log_insert(session, table, &result);
                RowOutcome {
                    position: i + 1,
                    result,
                }
            })
            .collect();
        Ok(outcomes)
    }

    /// Runs every insert check without writing anything.
    pub fn validate_row(
        &self,
        session: &Session,
        table: &str,
        values: Vec<String>,
    ) -> DbResult<Row> {
        let _lock = self.lock_existing(session, table, false)?;
        let schema = self.schemas(session).read(table)?;
        self.check_row(session, table, &schema, values)
    }

    fn commit_insert(
        &self,
        session: &Session,
        table: &str,
        schema: &TableSchema,
        values: Vec<String>,
    ) -> DbResult<usize> {
        let row = self.check_row(session, table, schema, values)?;
        let records = self.records(session);
        let index = records.row_count(table)? + 1;
        records.append_row(table, &row)?;
        Ok(index)
    }

    fn check_row(
        &self,
        session: &Session,
        table: &str,
        schema: &TableSchema,
        values: Vec<String>,
    ) -> DbResult<Row> {
        if values.len() != schema.len() {
            return Err(DbError::validation(Violation::ColumnCount {
                expected: schema.len(),
                actual: values.len(),
            }));
        }

        let records = self.records(session);
        let mut cells = Vec::with_capacity(values.len());

        for (position, (column, raw)) in schema.columns.iter().zip(values).enumerate() {
            let value = check_value(column, &raw)?;

            if column.requires_unique() && !is_null(&value) {
                let existing = records.column_values(table, position, None)?;
                check_unique(column, &value, &existing)?;
            }
            cells.push(value);
        }

        Ok(Row::new(cells))
    }

    /// Reads rows. Read-only; checks only table existence and index bounds.
    pub fn select(&self, session: &Session, table: &str, mode: SelectMode) -> DbResult<SelectResult> {
        let _lock = self.lock_existing(session, table, false)?;
        let (schema, data) = self.load(session, table)?;

        let indexed = data.rows.into_iter().enumerate().map(|(i, row)| (i + 1, row));

        match mode {
            SelectMode::All => Ok(SelectResult {
                header: data.header,
                rows: indexed
                    .map(|(index, row)| SelectedRow {
                        index,
                        cells: row.into_cells(),
                    })
                    .collect(),
            }),
            SelectMode::Column(column_index) => {
                let position = column_position(&schema, column_index)?;
                Ok(SelectResult {
                    header: vec![schema.columns[position].name.clone()],
                    rows: indexed
                        .map(|(index, row)| SelectedRow {
                            index,
                            cells: vec![row.get(position).unwrap_or_default().to_string()],
                        })
                        .collect(),
                })
            }
            SelectMode::Where { column, value } => {
                let position = schema.position_of(&column).ok_or_else(|| {
                    DbError::column_violation(&column, Violation::UnknownColumn(column.clone()))
                })?;
                Ok(SelectResult {
                    header: data.header,
                    rows: indexed
                        .filter(|(_, row)| row.get(position) == Some(value.as_str()))
                        .map(|(index, row)| SelectedRow {
                            index,
                            cells: row.into_cells(),
                        })
                        .collect(),
                })
            }
        }
    }

    /// Replaces one cell. Indices are 1-based.
    pub fn update_cell(
        &self,
        session: &Session,
        table: &str,
        row_index: usize,
        column_index: usize,
        new_value: &str,
    ) -> DbResult<()> {
        let result = self
            .lock_existing(session, table, true)
            .and_then(|_lock| self.update_inner(session, table, row_index, column_index, new_value));

        let row = row_index.to_string();
        let column = column_index.to_string();
        match &result {
            Ok(()) => log_event_with_fields(
                Event::CellUpdated,
                &[("column", &column), ("row", &row), ("table", table)],
            ),
            Err(e) => log_rejection(Event::OperationRejected, "update_cell", table, e),
        }
        result
    }

    fn update_inner(
        &self,
        session: &Session,
        table: &str,
        row_index: usize,
        column_index: usize,
        new_value: &str,
    ) -> DbResult<()> {
        let (schema, data) = self.load(session, table)?;
        let slot = row_slot(&data, row_index)?;
        let position = column_position(&schema, column_index)?;
        let column = &schema.columns[position];

        if new_value.is_empty() && column.is_primary_key {
            return Err(DbError::column_violation(&column.name, Violation::NotNull));
        }
        let value = check_value(column, new_value)?;

        let mut row = data.rows[slot].clone();
        let changed = row.get(position) != Some(value.as_str());

        if column.requires_unique() && changed && !is_null(&value) {
            let records = self.records(session);
            let others = records.column_values(table, position, Some(row_index))?;
            check_unique(column, &value, &others)?;
        }

        row.set(position, value);
        self.records(session).replace_row(table, row_index, row)
    }

    /// Removes one row (1-based); later rows shift up.
    pub fn delete_row(&self, session: &Session, table: &str, row_index: usize) -> DbResult<()> {
        let result = self.lock_existing(session, table, true).and_then(|_lock| {
            let (_, data) = self.load(session, table)?;
            row_slot(&data, row_index)?;
            self.records(session).delete_row(table, row_index)
        });

        match &result {
            Ok(()) => log_event_with_fields(
                Event::RowDeleted,
                &[("row", &row_index.to_string()), ("table", table)],
            ),
            Err(e) => log_rejection(Event::OperationRejected, "delete_row", table, e),
        }
        result
    }

    /// Removes the table's data and metadata. Confirmation is the caller's job.
    pub fn drop_table(&self, session: &Session, table: &str) -> DbResult<()> {
        let result = self.drop_inner(session, table);
        match &result {
            Ok(()) => log_event_with_fields(
                Event::TableDropped,
                &[("database", session.database()), ("table", table)],
            ),
            Err(e) => log_rejection(Event::OperationRejected, "drop_table", table, e),
        }
        result
    }

    fn drop_inner(&self, session: &Session, table: &str) -> DbResult<()> {
        check_table_name(table)?;
        let records = self.records(session);
        if !records.exists(table) && !self.schemas(session).exists(table) {
            return Err(DbError::not_found("table", table));
        }
        let _lock = TableLock::exclusive(&records.paths(table).lock)?;
        records.drop(table)
    }

    /// Every table in the session's database with its row count, sorted by name.
    pub fn list_tables(&self, session: &Session) -> DbResult<Vec<TableInfo>> {
        let dir = session.path();
        let entries = fs::read_dir(dir).map_err(|e| DbError::io("read", dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DbError::io("read", dir, e))?;
            let is_file = entry
                .file_type()
                .map_err(|e| DbError::io("stat", &entry.path(), e))?
                .is_file();
            match entry.file_name().to_str() {
                Some(name) if is_file && !is_hidden(name) => names.push(name.to_string()),
                _ => {}
            }
        }
        names.sort();

        let records = self.records(session);
        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let _lock = TableLock::shared(&records.paths(&name).lock)?;
            let row_count = records.row_count(&name)?;
            tables.push(TableInfo { name, row_count });
        }
        Ok(tables)
    }

    /// Column definitions of a table.
    pub fn describe(&self, session: &Session, table: &str) -> DbResult<TableSchema> {
        let _lock = self.lock_existing(session, table, false)?;
        self.schemas(session).read(table)
    }

    pub fn row_count(&self, session: &Session, table: &str) -> DbResult<usize> {
        let _lock = self.lock_existing(session, table, false)?;
        self.records(session).row_count(table)
    }

    /// Validates the name, checks the table exists, then takes its lock.
    fn lock_existing(&self, session: &Session, table: &str, exclusive: bool) -> DbResult<TableLock> {
        check_table_name(table)?;
        if !self.schemas(session).exists(table) {
            return Err(DbError::not_found("table", table));
        }
        let lock_path = TablePaths::new(session.path(), table).lock;
        if exclusive {
            TableLock::exclusive(&lock_path)
        } else {
            TableLock::shared(&lock_path)
        }
    }

    fn load(&self, session: &Session, table: &str) -> DbResult<(TableSchema, TableData)> {
        let schema = self.schemas(session).read(table)?;
        let records = self.records(session);
        let data = records.read_all(table)?;
        if data.header != schema.column_names() {
            return Err(DbError::corruption(
                &records.paths(table).data,
                "data header does not match metadata",
            ));
        }
        Ok((schema, data))
    }
}

/// Publishes metadata then data. If the data artifact cannot be created the
/// metadata is removed again and the failure is reported as an IO error.
fn publish_table(
    schemas: &SchemaStore,
    records: &RecordStore,
    table: &str,
    columns: Vec<Column>,
) -> DbResult<TableSchema> {
    let schema = schemas.create(table, columns)?;
    if let Err(e) = records.create_empty(table, &schema.column_names()) {
        let _ = schemas.remove(table);
        let err = match e.code() {
            DbErrorCode::Io => e,
            _ => DbError::io(
                "create",
                &records.paths(table).data,
                io::Error::new(io::ErrorKind::Other, e.message().to_string()),
            ),
        };
        log_rejection(Event::CreateRolledBack, "create_table", table, &err);
        return Err(err);
    }
    Ok(schema)
}

fn check_table_name(table: &str) -> DbResult<()> {
    validate_safe_name(table)?;
    validate_identifier(table, IdentifierKind::Table)
}

/// Per-column checks shared by insert and update. Returns the stored value.
fn check_value(column: &Column, raw: &str) -> DbResult<String> {
    let attach = |e: DbError| e.with_column(&column.name);

    validate_cell_text(raw).map_err(attach)?;
    let value = normalize_input(raw);
    if column.requires_value() {
        validate_not_null(&value).map_err(attach)?;
    }
    validate_type(&value, column.column_type).map_err(attach)?;
    Ok(value)
}

fn check_unique(column: &Column, value: &str, existing: &[String]) -> DbResult<()> {
    if existing.iter().any(|v| v == value) {
        let violation = if column.is_primary_key {
            Violation::PrimaryKey(value.to_string())
        } else {
            Violation::Unique(value.to_string())
        };
        return Err(DbError::column_violation(&column.name, violation));
    }
    Ok(())
}

fn row_slot(data: &TableData, row_index: usize) -> DbResult<usize> {
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

fn column_position(schema: &TableSchema, column_index: usize) -> DbResult<usize> {
    let count = schema.len();
    if column_index == 0 || column_index > count {
        return Err(DbError::validation(Violation::ColumnOutOfRange {
            index: column_index,
            count,
        }));
    }
    Ok(column_index - 1)
}

fn log_insert(session: &Session, table: &str, result: &DbResult<usize>) {
    match result {
        Ok(index) => log_event_with_fields(
            Event::RowInserted,
            &[
                ("database", session.database()),
                ("row", &index.to_string()),
                ("table", table),
            ],
        ),
        Err(e) => log_rejection(Event::RowRejected, "insert_row", table, e),
    }
}
