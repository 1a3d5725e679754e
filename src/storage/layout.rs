//! On-disk layout of a database directory
//!
//! ```text
//! <databases-root>/<db>/<table>          data artifact
//! <databases-root>/<db>/.<table>         metadata artifact
//! <databases-root>/<db>/.<table>.lock    advisory lock file
//! <databases-root>/<db>/.<file>.<id>.tmp atomic-publish temporary
//! ```
//!
//! Every artifact other than table data starts with the hidden marker.

use std::path::{Path, PathBuf};

/// Prefix that hides metadata, lock and temporary files
pub const HIDDEN_MARKER: char = '.';

const LOCK_SUFFIX: &str = ".lock";

/// Paths of the artifacts belonging to one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    pub data: PathBuf,
    pub metadata: PathBuf,
    pub lock: PathBuf,
}

impl TablePaths {
    pub fn new(db_dir: &Path, table: &str) -> Self {
        Self {
            data: db_dir.join(table),
            metadata: db_dir.join(format!("{}{}", HIDDEN_MARKER, table)),
            lock: db_dir.join(format!("{}{}{}", HIDDEN_MARKER, table, LOCK_SUFFIX)),
        }
    }
}

/// Returns true for directory entries that are not table data.
pub fn is_hidden(file_name: &str) -> bool {
    file_name.starts_with(HIDDEN_MARKER)
}
