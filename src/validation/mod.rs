//! Validator subsystem for flatdb
//!
//! Pure functions that decide whether a name or a cell value may enter a
//! table. Nothing here touches the filesystem; every check runs before a
//! mutation is attempted.
//!
//! # Rules
//!
//! - Identifiers: 1-64 chars, ASCII letter first, `[A-Za-z0-9_]` only,
//!   not a reserved word (case-insensitive)
//! - Safe names: no `..`, `/` or `\`
//! - Values: `null` is the absent-value sentinel; `int` and `boolean` are
//!   checked, other types accept any text
//! - Cells never contain the `|` delimiter or line breaks

mod identifier;
mod value;

pub use identifier::{
    is_reserved_word, validate_identifier, validate_safe_name, IdentifierKind,
    MAX_IDENTIFIER_LEN,
};
pub use value::{
    is_null, normalize_input, validate_cell_text, validate_not_null, validate_type, ColumnType,
    NULL_SENTINEL,
};
