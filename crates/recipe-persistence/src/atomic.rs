//! Atomic file operations for crash-safe persistence.
//!
//! A write happens in two steps. [`StagedWrite::stage`] writes the full
//! payload to a temporary file next to the target and syncs it, then
//! [`StagedWrite::commit`] renames it over the target. Until the rename the
//! target still holds its previous contents, so a crash at any point leaves
//! either the old file or the new one, never a truncated mix.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{PersistenceError, Result};

/// A fully written temp file waiting to be renamed over its target.
///
/// Dropping a staged write without committing removes the temp file and
/// leaves the target untouched.
#[derive(Debug)]
pub struct StagedWrite {
    target: PathBuf,
    temp: NamedTempFile,
}

impl StagedWrite {
    /// Writes `data` to a temp file in the target's directory.
    ///
    /// Creates the parent directory if needed.
    pub fn stage(path: &Path, data: &[u8]) -> Result<Self> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| PersistenceError::DirectoryError {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        // Same directory as the target so the rename stays on one filesystem
        let mut temp = NamedTempFile::new_in(dir).map_err(|source| PersistenceError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;

        let write_err = |source| PersistenceError::WriteError {
            path: path.to_path_buf(),
            source,
        };
        temp.write_all(data).map_err(write_err)?;
        temp.flush().map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;

        Ok(Self {
            target: path.to_path_buf(),
            temp,
        })
    }

    /// Path of the temp file holding the staged data.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Path the data will land at on commit.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically replaces the target with the staged data.
    pub fn commit(self) -> Result<()> {
        let target = self.target;
        self.temp
            .persist(&target)
            .map_err(|e| PersistenceError::WriteError {
                path: target.clone(),
                source: e.error,
            })?;
        Ok(())
    }
}

/// Writes data to a file atomically.
///
/// # Errors
/// Returns an error if the directory, the temp file or the rename fails.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    StagedWrite::stage(path, data)?.commit()
}

/// Writes JSON data to a file atomically.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())
}

/// Reads and deserializes JSON from a file.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|source| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|e| {
        PersistenceError::InvalidData(format!("{} is not valid JSON: {}", path.display(), e))
    })
}

/// Reads JSON from a file, returning None if the file doesn't exist.
pub fn read_json_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}
