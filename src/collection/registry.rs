//! Collection registry
//!
//! Named collections, created and dropped explicitly.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::error::{GemError, Result};
use super::Collection;

/// Every document collection of one database
///
/// Handles are `Arc`s: a dropped collection stops its worker threads once the
/// last in-flight caller releases its handle.
pub struct Collections {
    /// Retention window for documents in new collections
    ttl: Duration,

    collections: RwLock<BTreeMap<String, Arc<Collection>>>,
}

impl Collections {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            collections: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create an empty collection
    pub fn create_collection(&self, name: &str) -> Result<Arc<Collection>> {
        let mut collections = self.collections.write();
        if collections.contains_key(name) {
            return Err(GemError::CollectionExists(name.to_string()));
        }

        let collection = Arc::new(Collection::new(name, self.ttl)?);
        collections.insert(name.to_string(), Arc::clone(&collection));
        tracing::debug!("Created collection {}", name);
        Ok(collection)
    }

    pub fn get_collection(&self, name: &str) -> Result<Arc<Collection>> {
        self.collections
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| GemError::CollectionNotFound(name.to_string()))
    }

    /// Remove a collection and all of its documents
    pub fn drop_collection(&self, name: &str) -> Result<()> {
        let removed = self
            .collections
            .write()
            .remove(name)
            .ok_or_else(|| GemError::CollectionNotFound(name.to_string()))?;
        tracing::debug!("Dropped collection {} ({} documents)", name, removed.len());
        // `removed` is dropped here, outside the registry lock, so joining
        // its threads never blocks other registry callers.
        Ok(())
    }

    /// Collection names, sorted
    pub fn list_collections(&self) -> Vec<String> {
        self.collections.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.collections.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.read().is_empty()
    }

    /// Retention window given to new collections
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
