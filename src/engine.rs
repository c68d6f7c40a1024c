//! Engine Module
//!
//! The table storage engine.
//!
//! ## Responsibilities
//! - Own every table and record
//! - Serialize concurrent access through one RwLock
//! - Rewrite the snapshot file after every mutation
//! - Load the snapshot file on startup

use std::path::Path;

use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::error::Result;
use crate::storage::{read_snapshot, write_snapshot, SnapshotFile};
use crate::table::TableSet;

/// The table storage engine
///
/// ## Concurrency Model: one RwLock over the whole engine
///
/// - **Writes** (create/delete table, set, delete, import): take the write
///   lock, apply the change, persist, then release. Persistence therefore
///   happens in lock order and the file never sees interleaved writes.
/// - **Reads** (get, list, export): take the read lock and run concurrently
///   with each other. Exports additionally queue on a dedicated mutex so two
///   exports never write the same target at once.
///
/// There is no per-table lock. Two writers to different tables still
/// serialize.
///
/// ## Persistence failures
/// If the in-memory change applied but the snapshot write failed, the error
/// is returned and the change is NOT rolled back. Memory is then ahead of
/// disk until the next successful write.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Backing snapshot file
    snapshot: SnapshotFile,

    /// All tables
    tables: RwLock<TableSet>,

    /// Serializes `export_to_file` calls
    export_lock: Mutex<()>,
}

impl Engine {
    /// Open an engine backed by `config.data_file`
    ///
    /// A missing file starts an empty engine. An unreadable or malformed
    /// file is an error.
    pub fn open(config: Config) -> Result<Self> {
        let snapshot = SnapshotFile::new(&config.data_file, config.persist_strategy);

        let tables = match snapshot.load()? {
            Some(tables) => {
                tracing::info!(
                    "Loaded {} tables ({} records) from {}",
                    tables.len(),
                    tables.record_count(),
                    snapshot.path().display()
                );
                tables
            }
            None => {
                tracing::info!(
                    "No snapshot at {}, starting empty",
                    snapshot.path().display()
                );
                TableSet::new()
            }
        };

        Ok(Self {
            config,
            snapshot,
            tables: RwLock::new(tables),
            export_lock: Mutex::new(()),
        })
    }

    /// Open with a data file path (convenience method)
    ///
    /// Uses default config with the specified data file
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_file(path).build();
        Self::open(config)
    }

    // =========================================================================
    // Table Operations
    // =========================================================================

    /// Create an empty table
    pub fn create_table(&self, name: &str) -> Result<()> {
        let mut tables = self.tables.write();
        tables.create(name)?;
        tracing::debug!("Created table {}", name);
        self.persist(&tables)
    }

    /// Delete a table and every record in it
    pub fn delete_table(&self, name: &str) -> Result<()> {
        let mut tables = self.tables.write();
        let dropped = tables.drop_table(name)?;
        tracing::debug!("Deleted table {} ({} records)", name, dropped.len());
        self.persist(&tables)
    }

    /// Table names, sorted
    pub fn list_tables(&self) -> Vec<String> {
        self.tables.read().names()
    }

    /// Keys of one table, sorted
    pub fn list_keys(&self, table: &str) -> Result<Vec<String>> {
        Ok(self.tables.read().table(table)?.keys())
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Get a value
    pub fn get(&self, table: &str, key: &str) -> Result<String> {
        self.tables.read().get(table, key).map(str::to_string)
    }

    /// Insert or overwrite a value
    pub fn set(&self, table: &str, key: &str, value: &str) -> Result<()> {
        let mut tables = self.tables.write();
        tables.set(table, key.to_string(), value.to_string())?;
        tracing::debug!("Set {}/{} ({} bytes)", table, key, value.len());
        self.persist(&tables)
    }

    /// Remove a value
    pub fn delete(&self, table: &str, key: &str) -> Result<()> {
        let mut tables = self.tables.write();
        tables.remove(table, key)?;
        tracing::debug!("Deleted {}/{}", table, key);
        self.persist(&tables)
    }

    // =========================================================================
    // Import / Export
    // =========================================================================

    /// Write the current state to an arbitrary file
    ///
    /// Holds the read lock for the duration of the write, so the exported
    /// state is a consistent cut. Concurrent exports run one at a time.
    pub fn export_to_file(&self, path: &Path) -> Result<()> {
        let tables = self.tables.read();
        let _export = self.export_lock.lock();
        write_snapshot(path, &tables, self.config.persist_strategy)?;
        tracing::info!("Exported {} tables to {}", tables.len(), path.display());
        Ok(())
    }

    /// Replace the whole state with the contents of `path`
    ///
    /// The file is decoded before the lock is taken; a read or decode failure
    /// leaves the engine untouched. Unlike startup, a missing file is an
    /// error here. On success the new state is persisted to the backing file.
    pub fn import_from_file(&self, path: &Path) -> Result<()> {
        let imported = read_snapshot(path)?;

        let mut tables = self.tables.write();
        *tables = imported;
        tracing::info!("Imported {} tables from {}", tables.len(), path.display());
        self.persist(&tables)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the backing file path
    pub fn data_file(&self) -> &Path {
        self.snapshot.path()
    }

    /// Number of tables
    pub fn table_count(&self) -> usize {
        self.tables.read().len()
    }

    /// Number of records across all tables
    pub fn record_count(&self) -> usize {
        self.tables.read().record_count()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Rewrite the backing file (called with write lock held)
    fn persist(&self, tables: &TableSet) -> Result<()> {
        self.snapshot.write(tables).map_err(|e| {
            tracing::error!(
                "Snapshot write to {} failed, memory is ahead of disk: {}",
                self.snapshot.path().display(),
                e
            );
            e
        })
    }
}
