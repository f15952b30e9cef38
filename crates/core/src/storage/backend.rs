use std::path::{Path, PathBuf};

use crate::errors::CacheError;
use super::format;
use super::table::CacheTable;

/// Durable home of a [`CacheTable`].
///
/// `persist` is called with the complete staged table; the store only
/// publishes that table to readers once `persist` has returned `Ok`.
pub trait TableBackend: Send + Sync {
    /// Human-readable name (for logs).
    fn name(&self) -> &str;

    /// Load the last persisted table, or an empty one if nothing was saved yet.
    fn load(&self) -> Result<CacheTable, CacheError>;

    /// Durably replace the stored table.
    fn persist(&self, table: &CacheTable) -> Result<(), CacheError>;
}

/// Keeps nothing on disk; the store's in-memory copy is the only copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryBackend;

impl TableBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<CacheTable, CacheError> {
        Ok(CacheTable::new())
    }

    fn persist(&self, _table: &CacheTable) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Stores the table in a single framed file (see [`format`]).
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so a crash mid-write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TableBackend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    fn load(&self) -> Result<CacheTable, CacheError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => format::decode_table(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CacheTable::new()),
            Err(e) => Err(CacheError::Read(format!(
                "Failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn persist(&self, table: &CacheTable) -> Result<(), CacheError> {
        let bytes = format::encode_table(table)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CacheError::Write(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let tmp = self.temp_path();
        std::fs::write(&tmp, &bytes).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            CacheError::Write(format!("Failed to write {}: {e}", tmp.display()))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            CacheError::Write(format!("Failed to replace {}: {e}", self.path.display()))
        })
    }
}
