//! Request and result types for table operations

use serde::Serialize;

use crate::errors::DbResult;

/// What a select returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectMode {
    /// Every column of every row
    All,
    /// One column, by 1-based index
    Column(usize),
    /// Rows whose cell in `column` (matched by name, ignoring case) equals `value` exactly
    Where { column: String, value: String },
}

/// One returned row with its current 1-based position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedRow {
    pub index: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectResult {
    pub header: Vec<String>,
    pub rows: Vec<SelectedRow>,
}

impl SelectResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Table name with its current row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub row_count: usize,
}

/// Outcome of one row in a batch insert.
///
/// `position` is the row's 1-based place in the batch; on success the result
/// holds the row's index in the table.
#[derive(Debug)]
pub struct RowOutcome {
    pub position: usize,
    pub result: DbResult<usize>,
}

impl RowOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}
