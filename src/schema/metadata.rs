//! Metadata artifact format
//!
//! ```text
//! Column_Name|Column_Type|Primary_Key|Not_Null|Unique
//! id|int|yes|yes|yes
//! name|string|no|no|no
//! ```
//!
//! One line per column, in data-header order.

use std::path::Path;

use super::types::{Column, TableSchema};
use crate::errors::{DbError, DbResult};
use crate::storage::DELIMITER;
use crate::validation::ColumnType;

/// First line of every metadata artifact
pub const METADATA_HEADER: &str = "Column_Name|Column_Type|Primary_Key|Not_Null|Unique";

const FIELD_COUNT: usize = 5;

pub fn encode(schema: &TableSchema) -> String {
    let sep = DELIMITER.to_string();
    let mut out = String::from(METADATA_HEADER);
    out.push('\n');
    for c in &schema.columns {
        let fields = [
            c.name.as_str(),
            c.column_type.as_str(),
            flag(c.is_primary_key),
            flag(c.is_not_null),
            flag(c.is_unique),
        ];
        out.push_str(&fields.join(sep.as_str()));
        out.push('\n');
    }
    out
}

pub fn decode(path: &Path, table: &str, text: &str) -> DbResult<TableSchema> {
    let mut lines = text.lines();
    if lines.next() != Some(METADATA_HEADER) {
        return Err(DbError::corruption(path, "missing metadata header"));
    }

    let mut columns = Vec::new();
    for (i, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            return Err(DbError::corruption(
                path,
                format!("column line {} has {} fields", i + 1, fields.len()),
            ));
        }

        let column_type: ColumnType = fields[1]
            .parse()
            .map_err(|e: String| DbError::corruption(path, e))?;

        columns.push(Column {
            name: fields[0].to_string(),
            column_type,
            is_primary_key: parse_flag(path, fields[2])?,
            is_not_null: parse_flag(path, fields[3])?,
            is_unique: parse_flag(path, fields[4])?,
        });
    }

    if columns.is_empty() {
        return Err(DbError::corruption(path, "no columns"));
    }

    Ok(TableSchema::new(table, columns))
}

fn flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn parse_flag(path: &Path, field: &str) -> DbResult<bool> {
    match field {
        "yes" => Ok(true),
        "no" => Ok(false),
        other => Err(DbError::corruption(
            path,
            format!("expected yes/no, got '{}'", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DbErrorCode;

    #[test]
    fn test_encode_format() {
        let schema = TableSchema::new(
            "users",
            vec![
                Column::new("id", ColumnType::Int).primary_key(),
                Column::new("email", ColumnType::Varchar).unique(),
            ],
        );
        assert_eq!(
            encode(&schema),
            "Column_Name|Column_Type|Primary_Key|Not_Null|Unique\n\
             id|int|yes|yes|yes\n\
             email|varchar|no|no|yes\n"
        );
    }

    #[test]
    fn test_decode_bool_alias() {
        let text = format!("{}\nflag|bool|no|yes|no\n", METADATA_HEADER);
        let schema = decode(Path::new(".t"), "t", &text).unwrap();
        assert_eq!(schema.columns[0].column_type, ColumnType::Boolean);
        assert!(schema.columns[0].is_not_null);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let p = Path::new(".t");
        let bad = [
            "not a header\n".to_string(),
            format!("{}\n", METADATA_HEADER),
            format!("{}\nid|int|yes\n", METADATA_HEADER),
            format!("{}\nid|blob|no|no|no\n", METADATA_HEADER),
            format!("{}\nid|int|maybe|no|no\n", METADATA_HEADER),
        ];
        for text in bad {
            let err = decode(p, "t", &text).unwrap_err();
            assert_eq!(err.code(), DbErrorCode::Corruption, "{text}");
        }
    }
}
