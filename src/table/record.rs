//! Record table implementation
//!
//! One named table: a map from key to value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single table of string records
///
/// Serializes as a flat JSON object `{ "<key>": "<value>" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordTable {
    records: BTreeMap<String, String>,
}

impl RecordTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(String::as_str)
    }

    /// Insert or overwrite a record, returning the previous value
    pub fn set(&mut self, key: String, value: String) -> Option<String> {
        self.records.insert(key, value)
    }

    /// Remove a record, returning its value if it existed
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.records.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    /// Iterate records in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(String, String)> for RecordTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
