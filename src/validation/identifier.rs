//! Identifier validation for database, table and column names

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{DbError, DbResult, Violation};

/// Maximum identifier length in characters
pub const MAX_IDENTIFIER_LEN: usize = 64;

const RESERVED_WORDS: &[&str] = &[
    "select", "from", "where", "insert", "update", "delete", "drop", "create", "table",
    "database", "index", "view", "trigger", "procedure", "function", "alter", "add", "column",
    "constraint", "primary", "foreign", "key", "null", "not", "unique", "default", "check",
    "references", "cascade", "int", "integer", "varchar", "char", "text", "date", "time",
    "timestamp", "boolean", "bool", "float", "double", "decimal", "numeric",
];

fn reserved_words() -> &'static HashSet<&'static str> {
    static WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| RESERVED_WORDS.iter().copied().collect())
}

fn identifier_body() -> &'static Regex {
    static BODY: OnceLock<Regex> = OnceLock::new();
    BODY.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]*$").expect("static pattern"))
}

/// What an identifier names. Column errors carry the offending name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Database,
    Table,
    Column,
}

/// Returns true if `word` is a reserved keyword, ignoring case.
pub fn is_reserved_word(word: &str) -> bool {
    reserved_words().contains(word.to_ascii_lowercase().as_str())
}

/// Validates a database, table or column name.
///
/// Column names carry their name as the error's column reference.
pub fn validate_identifier(name: &str, kind: IdentifierKind) -> DbResult<()> {
    let reject = |violation: Violation| {
        let err = DbError::validation(violation);
        match kind {
            IdentifierKind::Column => err.with_column(name),
            _ => err,
        }
    };

    let first = match name.chars().next() {
        Some(c) => c,
        None => return Err(reject(Violation::Empty)),
    };
    if name.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(reject(Violation::TooLong {
            max: MAX_IDENTIFIER_LEN,
        }));
    }
    if !first.is_ascii_alphabetic() {
        return Err(reject(Violation::BadStart));
    }
    if !identifier_body().is_match(name) {
        return Err(reject(Violation::BadCharacter));
    }
    if is_reserved_word(name) {
        return Err(reject(Violation::ReservedWord(name.to_string())));
    }
    Ok(())
}

/// Rejects names that could escape their parent directory.
pub fn validate_safe_name(name: &str) -> DbResult<()> {
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(DbError::validation(Violation::PathTraversal));
    }
    Ok(())
}
