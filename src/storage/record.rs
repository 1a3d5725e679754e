//! Row encoding for the data artifact
//!
//! ```text
//! id|name|active        <- header: column names
//! 1|alice|true          <- one line per row
//! 2|bob|null
//! ```
//!
//! Cells are joined with `|` and never escaped; the validator rejects cell
//! text containing the delimiter or line breaks before it reaches this layer.

use std::path::Path;

use serde::Serialize;

use crate::errors::{DbError, DbResult};

/// Cell delimiter
pub const DELIMITER: char = '|';

/// One table row: a cell per column, in header order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.cells.get(position).map(String::as_str)
    }

    pub fn set(&mut self, position: usize, value: String) {
        if let Some(cell) = self.cells.get_mut(position) {
            *cell = value;
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn into_cells(self) -> Vec<String> {
        self.cells
    }

    /// Encodes the row as one line without the trailing newline.
    pub fn encode(&self) -> String {
        join_line(&self.cells)
    }

    /// Decodes one data line.
    pub fn decode(line: &str) -> Self {
        Self {
            cells: split_line(line),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Full contents of a data artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableData {
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

impl TableData {
    /// Data artifact with a header and no rows.
    pub fn empty(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Parses a data artifact, checking every row against the header width.
    pub fn parse(path: &Path, text: &str) -> DbResult<Self> {
        let mut lines = text.lines();
        let header = match lines.next() {
            Some(line) if !line.is_empty() => split_line(line),
            _ => return Err(DbError::corruption(path, "missing header line")),
        };

        let mut rows = Vec::new();
        for (i, line) in lines.enumerate() {
            let row = Row::decode(line);
            if row.len() != header.len() {
                return Err(DbError::corruption(
                    path,
                    format!(
                        "row {} has {} cells, header has {}",
                        i + 1,
                        row.len(),
                        header.len()
                    ),
                ));
            }
            rows.push(row);
        }

        Ok(Self { header, rows })
    }

    /// Serializes header and rows, one line each, newline-terminated.
    pub fn encode(&self) -> String {
        let mut out = join_line(&self.header);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.encode());
            out.push('\n');
        }
        out
    }
}

fn join_line(cells: &[String]) -> String {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        line.push_str(cell);
    }
    line
}

fn split_line(line: &str) -> Vec<String> {
    line.split(DELIMITER).map(str::to_string).collect()
}
