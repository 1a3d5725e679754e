//! Error types shared by every flatdb subsystem
//!
//! Error codes:
//! - FLAT_VALIDATION_FAILED (bad identifier, type, constraint, index)
//! - FLAT_NOT_FOUND (table or database missing)
//! - FLAT_CONFLICT (table or database already exists)
//! - FLAT_IO_ERROR (filesystem failure during write/rename/delete)
//! - FLAT_DATA_CORRUPTION (artifact exists but does not parse)
//!
//! Validation errors are always raised before any mutation, so an operation
//! failing with one leaves the table untouched.

use std::fmt;
use std::io;
use std::path::Path;

use thiserror::Error;

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorCode {
    /// Input rejected before any mutation
    Validation,
    /// Table or database missing
    NotFound,
    /// Table or database already exists
    Conflict,
    /// Filesystem failure
    Io,
    /// On-disk artifact is malformed
    Corruption,
}

impl DbErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            DbErrorCode::Validation => "FLAT_VALIDATION_FAILED",
            DbErrorCode::NotFound => "FLAT_NOT_FOUND",
            DbErrorCode::Conflict => "FLAT_CONFLICT",
            DbErrorCode::Io => "FLAT_IO_ERROR",
            DbErrorCode::Corruption => "FLAT_DATA_CORRUPTION",
        }
    }
}

impl fmt::Display for DbErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The rule a rejected input broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("name is empty")]
    Empty,

    #[error("name is longer than {max} characters")]
    TooLong { max: usize },

    #[error("name must start with an ASCII letter")]
    BadStart,

    #[error("name may only contain letters, digits and underscores")]
    BadCharacter,

    #[error("'{0}' is a reserved word")]
    ReservedWord(String),

    #[error("name must not contain '..', '/' or '\\'")]
    PathTraversal,

    #[error("expected {expected} values, got {actual}")]
    ColumnCount { expected: usize, actual: usize },

    #[error("value '{value}' is not a valid {expected}")]
    TypeMismatch { expected: String, value: String },

    #[error("value is required")]
    NotNull,

    #[error("primary key value '{0}' already exists")]
    PrimaryKey(String),

    #[error("unique value '{0}' already exists")]
    Unique(String),

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("a table may have at most one primary key")]
    MultiplePrimaryKeys,

    #[error("a boolean column cannot be the primary key")]
    BooleanPrimaryKey,

    #[error("a table needs at least one column")]
    NoColumns,

    #[error("table has no rows")]
    EmptyTable,

    #[error("row {index} is out of range (1..={count})")]
    RowOutOfRange { index: usize, count: usize },

    #[error("column {index} is out of range (1..={count})")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("value contains '|' or a line break")]
    ForbiddenCharacter,
}

/// flatdb error with full context
#[derive(Debug)]
pub struct DbError {
    code: DbErrorCode,
    message: String,
    /// Column or field the error refers to
    column: Option<String>,
    violation: Option<Violation>,
    source: Option<io::Error>,
}

impl DbError {
    fn new(code: DbErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            column: None,
            violation: None,
            source: None,
        }
    }

    /// Create a validation error for a broken rule
    pub fn validation(violation: Violation) -> Self {
        let mut err = Self::new(DbErrorCode::Validation, violation.to_string());
        err.violation = Some(violation);
        err
    }

    /// Create a validation error attributed to a column
    pub fn column_violation(column: impl Into<String>, violation: Violation) -> Self {
        Self::validation(violation).with_column(column)
    }

    /// Create a not found error
    pub fn not_found(kind: &str, name: impl AsRef<str>) -> Self {
        Self::new(
            DbErrorCode::NotFound,
            format!("{} '{}' does not exist", kind, name.as_ref()),
        )
    }

    /// Create a conflict error
    pub fn conflict(kind: &str, name: impl AsRef<str>) -> Self {
        Self::new(
            DbErrorCode::Conflict,
            format!("{} '{}' already exists", kind, name.as_ref()),
        )
    }

    /// Create a conflict error for a table held by another lock owner
    pub fn locked(name: impl AsRef<str>) -> Self {
        Self::new(
            DbErrorCode::Conflict,
            format!("table '{}' is locked by another writer", name.as_ref()),
        )
    }

    /// Create an IO error with the path that failed
    pub fn io(action: &str, path: &Path, source: io::Error) -> Self {
        let mut err = Self::new(
            DbErrorCode::Io,
            format!("failed to {} {}: {}", action, path.display(), source),
        );
        err.source = Some(source);
        err
    }

    /// Create a corruption error for a malformed artifact
    pub fn corruption(path: &Path, reason: impl Into<String>) -> Self {
        Self::new(
            DbErrorCode::Corruption,
            format!("malformed artifact {}: {}", path.display(), reason.into()),
        )
    }

    /// Attach a column reference
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> DbErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the column reference if applicable
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Returns the broken rule for validation errors
    pub fn violation(&self) -> Option<&Violation> {
        self.violation.as_ref()
    }

    pub fn is_validation(&self) -> bool {
        self.code == DbErrorCode::Validation
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        if let Some(ref column) = self.column {
            write!(f, " (column '{}')", column)?;
        }
        Ok(())
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for flatdb operations
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DbErrorCode::Validation.code(), "FLAT_VALIDATION_FAILED");
        assert_eq!(DbErrorCode::NotFound.code(), "FLAT_NOT_FOUND");
        assert_eq!(DbErrorCode::Conflict.code(), "FLAT_CONFLICT");
        assert_eq!(DbErrorCode::Io.code(), "FLAT_IO_ERROR");
        assert_eq!(DbErrorCode::Corruption.code(), "FLAT_DATA_CORRUPTION");
    }

    #[test]
    fn test_column_violation_display() {
        let err = DbError::column_violation(
            "active",
            Violation::TypeMismatch {
                expected: "boolean".into(),
                value: "maybe".into(),
            },
        );
        let display = err.to_string();
        assert!(display.contains("FLAT_VALIDATION_FAILED"));
        assert!(display.contains("maybe"));
        assert!(display.contains("column 'active'"));
        assert!(err.is_validation());
        assert_eq!(err.column(), Some("active"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error;

        let err = DbError::io(
            "write",
            Path::new("/tmp/x"),
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        assert_eq!(err.code(), DbErrorCode::Io);
        assert!(err.source().is_some());
        assert!(err.message().contains("/tmp/x"));
    }
}
