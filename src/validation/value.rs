//! Cell value validation
//!
//! Supported column types:
//! - int: optional leading `-` followed by digits
//! - boolean (alias bool): `true`, `false`, `0` or `1`
//! - string, varchar, float, date: any text

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{DbError, DbResult, Violation};

/// Literal stored in a cell that has no value.
pub const NULL_SENTINEL: &str = "null";

fn int_pattern() -> &'static Regex {
    static INT: OnceLock<Regex> = OnceLock::new();
    INT.get_or_init(|| Regex::new(r"^-?[0-9]+$").expect("static pattern"))
}

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    String,
    Boolean,
    Varchar,
    Float,
    Date,
}

impl ColumnType {
    /// Returns the name written to the metadata artifact
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::String => "string",
            ColumnType::Boolean => "boolean",
            ColumnType::Varchar => "varchar",
            ColumnType::Float => "float",
            ColumnType::Date => "date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "int" => Ok(ColumnType::Int),
            "string" => Ok(ColumnType::String),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            "varchar" => Ok(ColumnType::Varchar),
            "float" => Ok(ColumnType::Float),
            "date" => Ok(ColumnType::Date),
            other => Err(format!("unknown column type '{}'", other)),
        }
    }
}

/// Returns true for the absent-value sentinel.
pub fn is_null(value: &str) -> bool {
    value == NULL_SENTINEL
}

/// Maps empty user input to the `null` sentinel.
///
/// A genuine empty string cannot be stored.
pub fn normalize_input(value: &str) -> String {
    if value.is_empty() {
        NULL_SENTINEL.to_string()
    } else {
        value.to_string()
    }
}

/// Checks that `value` is acceptable for `column_type`. `null` always is.
pub fn validate_type(value: &str, column_type: ColumnType) -> DbResult<()> {
    if is_null(value) {
        return Ok(());
    }
    let ok = match column_type {
        ColumnType::Int => int_pattern().is_match(value),
        ColumnType::Boolean => matches!(value, "true" | "false" | "0" | "1"),
        ColumnType::String | ColumnType::Varchar | ColumnType::Float | ColumnType::Date => true,
    };
    if ok {
        Ok(())
    } else {
        Err(DbError::validation(Violation::TypeMismatch {
            expected: column_type.to_string(),
            value: value.to_string(),
        }))
    }
}

/// Fails for empty input or the `null` sentinel; call for required columns only.
pub fn validate_not_null(value: &str) -> DbResult<()> {
    if value.is_empty() || is_null(value) {
        return Err(DbError::validation(Violation::NotNull));
    }
    Ok(())
}

/// Rejects text that would break the line format.
pub fn validate_cell_text(value: &str) -> DbResult<()> {
    if value.contains(['|', '\n', '\r']) {
        return Err(DbError::validation(Violation::ForbiddenCharacter));
    }
    Ok(())
}
