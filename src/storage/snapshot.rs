//! Snapshot file
//!
//! Reads and writes the JSON snapshot of a [`TableSet`].

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::PersistStrategy;
use crate::error::Result;
use crate::table::TableSet;

/// The engine's backing file
///
/// Holds no handle between writes; each `write` opens, writes and closes.
/// Callers serialize access (the engine writes only under its write lock).
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
    strategy: PersistStrategy,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>, strategy: PersistStrategy) -> Self {
        Self {
            path: path.into(),
            strategy,
        }
    }

    /// Load the snapshot, treating a missing file as "no state yet"
    pub fn load(&self) -> Result<Option<TableSet>> {
        match read_snapshot(&self.path) {
            Ok(tables) => Ok(Some(tables)),
            Err(crate::GemError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replace the file contents with `tables`
    pub fn write(&self, tables: &TableSet) -> Result<()> {
        write_snapshot(&self.path, tables, self.strategy)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Decode a snapshot file
///
/// A missing file is an `Io` error with kind `NotFound`.
pub fn read_snapshot(path: &Path) -> Result<TableSet> {
    let bytes = fs::read(path)?;
    let tables = serde_json::from_slice(&bytes)?;
    Ok(tables)
}

/// Encode `tables` and write them to `path` in full
pub fn write_snapshot(path: &Path, tables: &TableSet, strategy: PersistStrategy) -> Result<()> {
    let bytes = serde_json::to_vec(tables)?;

    match strategy {
        PersistStrategy::Overwrite => fs::write(path, &bytes)?,
        PersistStrategy::AtomicRename => replace_atomically(path, &bytes)?,
    }

    tracing::trace!(
        "Wrote snapshot to {} ({} bytes, {} tables)",
        path.display(),
        bytes.len(),
        tables.len()
    );
    Ok(())
}

/// unique temp file → fsync → rename over the target
///
/// Each call gets its own temp file in the target's directory, so concurrent
/// writers to one path never share a half-written file.
fn replace_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    // Dropped (and removed) on any error before `persist`
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    // Make the rename itself durable. Not every platform can open a directory.
    match File::open(dir) {
        Ok(handle) => {
            if let Err(e) = handle.sync_all() {
                tracing::warn!(
                    "Directory sync of {} failed, rename of {} may not be durable: {}",
                    dir.display(),
                    path.display(),
                    e
                );
            }
        }
        Err(e) => tracing::trace!("Cannot open {} for sync: {}", dir.display(), e),
    }

    Ok(())
}
