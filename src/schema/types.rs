//! Column and table schema definitions
//!
//! Invariants enforced at creation:
//! - at least one column
//! - column names are identifiers, unique within the table ignoring case
//! - at most one primary key, never of type boolean
//! - a primary key is always NOT NULL and UNIQUE

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{DbError, DbResult, Violation};
use crate::validation::{validate_identifier, ColumnType, IdentifierKind};

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub is_primary_key: bool,
    pub is_not_null: bool,
    pub is_unique: bool,
}

impl Column {
    /// Create an unconstrained column
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            is_primary_key: false,
            is_not_null: false,
            is_unique: false,
        }
    }

    /// Mark as primary key (implies NOT NULL and UNIQUE)
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_not_null = true;
        self.is_unique = true;
        self
    }

    /// Mark as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.is_not_null = true;
        self
    }

    /// Mark as UNIQUE
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Whether values must be distinct across rows
    pub fn requires_unique(&self) -> bool {
        self.is_primary_key || self.is_unique
    }

    /// Whether the `null` sentinel is forbidden
    pub fn requires_value(&self) -> bool {
        self.is_primary_key || self.is_not_null
    }

    fn normalized(mut self) -> Self {
        if self.is_primary_key {
            self.is_not_null = true;
            self.is_unique = true;
        }
        self
    }
}

/// Ordered column set of one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    /// Builds a schema, forcing the primary key's implied flags.
    pub fn new(table: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            table: table.into(),
            columns: columns.into_iter().map(Column::normalized).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Case-insensitive lookup of a column's 0-based position
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    pub fn primary_key(&self) -> Option<(usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.is_primary_key)
    }
}

/// Validates a column set for table creation. No side effects.
pub fn validate_columns(columns: &[Column]) -> DbResult<()> {
    if columns.is_empty() {
        return Err(DbError::validation(Violation::NoColumns));
    }

    let mut seen = HashSet::new();
    let mut primary_key: Option<&Column> = None;

    for column in columns {
        validate_identifier(&column.name, IdentifierKind::Column)?;

        if !seen.insert(column.name.to_ascii_lowercase()) {
            return Err(DbError::column_violation(
                &column.name,
                Violation::DuplicateColumn(column.name.clone()),
            ));
        }

        if column.is_primary_key {
            if primary_key.is_some() {
                return Err(DbError::column_violation(
                    &column.name,
                    Violation::MultiplePrimaryKeys,
                ));
            }
            if column.column_type == ColumnType::Boolean {
                return Err(DbError::column_violation(
                    &column.name,
                    Violation::BooleanPrimaryKey,
                ));
            }
            primary_key = Some(column);
        }
    }

    Ok(())
}
