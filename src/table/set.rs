//! Table set implementation
//!
//! The complete storage engine state: every table by name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GemError, Result};
use super::RecordTable;

/// All tables of one engine
///
/// Serializes as `{ "<table>": { "<key>": "<value>" } }`, which is exactly
/// the snapshot file layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSet {
    tables: BTreeMap<String, RecordTable>,
}

impl TableSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table
    ///
    /// Fails with `TableExists` if the name is taken.
    pub fn create(&mut self, name: &str) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(GemError::TableExists(name.to_string()));
        }
        self.tables.insert(name.to_string(), RecordTable::new());
        Ok(())
    }

    /// Remove a table together with all of its records
    pub fn drop_table(&mut self, name: &str) -> Result<RecordTable> {
        self.tables
            .remove(name)
            .ok_or_else(|| GemError::TableNotFound(name.to_string()))
    }

    pub fn table(&self, name: &str) -> Result<&RecordTable> {
        self.tables
            .get(name)
            .ok_or_else(|| GemError::TableNotFound(name.to_string()))
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut RecordTable> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| GemError::TableNotFound(name.to_string()))
    }

    /// Read one record
    pub fn get(&self, table: &str, key: &str) -> Result<&str> {
        self.table(table)?
            .get(key)
            .ok_or_else(|| GemError::KeyNotFound {
                table: table.to_string(),
                key: key.to_string(),
            })
    }

    /// Insert or overwrite one record
    pub fn set(&mut self, table: &str, key: String, value: String) -> Result<()> {
        self.table_mut(table)?.set(key, value);
        Ok(())
    }

    /// Remove one record
    pub fn remove(&mut self, table: &str, key: &str) -> Result<String> {
        self.table_mut(table)?
            .remove(key)
            .ok_or_else(|| GemError::KeyNotFound {
                table: table.to_string(),
                key: key.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of records across all tables
    pub fn record_count(&self) -> usize {
        self.tables.values().map(RecordTable::len).sum()
    }
}
