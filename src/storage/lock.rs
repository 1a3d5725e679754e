//! Per-table advisory locks
//!
//! The lock file `.<table>.lock` is created by the first writer and never
//! removed, so every writer of a table locks the same inode.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use fs2::FileExt;

use crate::errors::{DbError, DbResult};

/// An advisory lock scoped to one table (`flock(2)` on Unix).
///
/// Writers take it exclusively for the whole validate/commit sequence;
/// readers take it shared. The lock is released when the guard is dropped.
#[derive(Debug)]
pub struct TableLock {
    /// `None` for a shared lock on a table no writer has touched yet
    _file: Option<File>,
}

impl TableLock {
    /// Acquire an exclusive (write) lock. Blocks until the lock is acquired.
    ///
    /// Creates the lock file if it does not exist.
    pub fn exclusive(path: &Path) -> DbResult<Self> {
        let file = open_or_create(path)?;
        file.lock_exclusive()
            .map_err(|e| DbError::io("lock", path, e))?;
        Ok(Self { _file: Some(file) })
    }

    /// Acquire a shared (read) lock. Blocks while a writer holds the table.
    ///
    /// Never creates the lock file: a missing one means no writer exists.
    pub fn shared(path: &Path) -> DbResult<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self { _file: None }),
            Err(e) => return Err(DbError::io("open lock file", path, e)),
        };
        file.lock_shared().map_err(|e| DbError::io("lock", path, e))?;
        Ok(Self { _file: Some(file) })
    }

    /// Try to acquire an exclusive lock without blocking.
    pub fn try_exclusive(path: &Path) -> DbResult<Self> {
        let file = open_or_create(path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { _file: Some(file) }),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Err(DbError::locked(name))
            }
            Err(e) => Err(DbError::io("lock", path, e)),
        }
    }
}

fn open_or_create(path: &Path) -> DbResult<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| DbError::io("open lock file", path, e))
}
