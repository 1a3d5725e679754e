//! Session: the explicit "current database" handed to table operations

use std::path::{Path, PathBuf};

use serde::Serialize;

/// The database a caller is working in.
///
/// Obtained from [`super::DatabaseManager::select`] and passed explicitly to
/// every table operation; the engine keeps no "current database" of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    database: String,
    path: PathBuf,
}

impl Session {
    pub(crate) fn new(database: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            path: path.into(),
        }
    }

    /// Name of the selected database
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Directory backing the selected database
    pub fn path(&self) -> &Path {
        &self.path
    }
}
