//! Atomic publish of whole artifacts
//!
//! Contents are written to a uniquely named hidden temporary file in the
//! destination directory and renamed into place. Rename is the only visible
//! state transition, so a reader sees either the old artifact or the new one.
//! On any failure the temporary file is removed.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::layout::HIDDEN_MARKER;
use crate::errors::{DbError, DbResult};

/// Writes `contents` to `path` via temp file + rename, replacing any existing file.
pub fn atomic_write(path: &Path, contents: &[u8], fsync: bool) -> DbResult<()> {
    let tmp = temp_path(path);

    let result = write_temp(&tmp, contents, fsync)
        .and_then(|_| fs::rename(&tmp, path).map_err(|e| DbError::io("rename", &tmp, e)));

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
        return result;
    }

    if fsync {
        sync_parent(path)?;
    }
    Ok(())
}

/// Like [`atomic_write`] but fails with a conflict if `path` already exists.
///
/// Callers hold the table's exclusive lock, which makes the existence check
/// and the rename a single step for cooperating writers.
pub fn atomic_create(path: &Path, contents: &[u8], fsync: bool) -> DbResult<()> {
    if path.exists() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Err(DbError::conflict("artifact", name));
    }
    atomic_write(path, contents, fsync)
}

fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_name = format!(
        "{}{}.{}.tmp",
        HIDDEN_MARKER,
        file_name.trim_start_matches(HIDDEN_MARKER),
        Uuid::new_v4().simple()
    );
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}

fn write_temp(tmp: &Path, contents: &[u8], fsync: bool) -> DbResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp)
        .map_err(|e| DbError::io("create", tmp, e))?;

    file.write_all(contents)
        .map_err(|e| DbError::io("write", tmp, e))?;

    if fsync {
        file.sync_all().map_err(|e| DbError::io("fsync", tmp, e))?;
    }
    Ok(())
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> DbResult<()> {
    if let Some(parent) = path.parent() {
        let dir = File::open(parent).map_err(|e| DbError::io("open", parent, e))?;
        dir.sync_all().map_err(|e| DbError::io("fsync", parent, e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> DbResult<()> {
    Ok(())
}
