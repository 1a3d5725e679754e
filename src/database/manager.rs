//! Database manager: databases are directories under the databases root

use std::fs::{self, DirBuilder};
use std::io;
use std::path::{Path, PathBuf};

use super::session::Session;
use crate::config::Config;
use crate::errors::{DbError, DbResult};
use crate::observability::{log_event_with_fields, log_rejection, Event};
use crate::validation::{validate_identifier, validate_safe_name, IdentifierKind};

/// Permission bits for the root and database directories (rwxr-xr-x)
pub const DIR_MODE: u32 = 0o755;

/// Creates, drops, lists and selects databases.
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    root: PathBuf,
}

impl DatabaseManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.databases_root.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the databases root if it is missing.
    pub fn ensure_root(&self) -> DbResult<()> {
        if self.root.is_dir() {
            return Ok(());
        }
        make_dir(&self.root, true).map_err(|e| DbError::io("create directory", &self.root, e))
    }

    pub fn exists(&self, name: &str) -> bool {
        check_name(name).is_ok() && self.root.join(name).is_dir()
    }

    /// Creates an empty database.
    pub fn create(&self, name: &str) -> DbResult<()> {
        let result = self.create_inner(name);
        match &result {
            Ok(()) => log_event_with_fields(Event::DatabaseCreated, &[("database", name)]),
            Err(e) => log_rejection(Event::OperationRejected, "create_database", name, e),
        }
        result
    }

    fn create_inner(&self, name: &str) -> DbResult<()> {
        check_name(name)?;
        self.ensure_root()?;

        let path = self.root.join(name);
        make_dir(&path, false).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => DbError::conflict("database", name),
            _ => DbError::io("create directory", &path, e),
        })
    }

    /// Deletes a database together with all of its tables.
    pub fn drop(&self, name: &str) -> DbResult<()> {
        let result = self.drop_inner(name);
        match &result {
            Ok(()) => log_event_with_fields(Event::DatabaseDropped, &[("database", name)]),
            Err(e) => log_rejection(Event::OperationRejected, "drop_database", name, e),
        }
        result
    }

    fn drop_inner(&self, name: &str) -> DbResult<()> {
        check_name(name)?;
        let path = self.root.join(name);
        if !path.is_dir() {
            return Err(DbError::not_found("database", name));
        }
        fs::remove_dir_all(&path).map_err(|e| DbError::io("remove", &path, e))
    }

    /// Opens a session on an existing database.
    pub fn select(&self, name: &str) -> DbResult<Session> {
        check_name(name)?;
        let path = self.root.join(name);
        if !path.is_dir() {
            return Err(DbError::not_found("database", name));
        }
        log_event_with_fields(Event::DatabaseSelected, &[("database", name)]);
        Ok(Session::new(name, path))
    }

    /// Names of all databases, sorted.
    pub fn list(&self) -> DbResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DbError::io("read", &self.root, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DbError::io("read", &self.root, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| DbError::io("stat", &entry.path(), e))?
                .is_dir();
            if let (true, Some(name)) = (is_dir, entry.file_name().to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn check_name(name: &str) -> DbResult<()> {
    validate_safe_name(name)?;
    validate_identifier(name, IdentifierKind::Database)
}

fn make_dir(path: &Path, recursive: bool) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(recursive);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path)
}
