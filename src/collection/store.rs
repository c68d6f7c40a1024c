//! Collection implementation
//!
//! HashMap-based document store with a writer thread for inserts.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::RwLock;

use crate::error::{GemError, Result};
use super::{Document, ExpiryHandle, ExpiryScheduler};

/// A stored document and the generation it was inserted under
struct StoredDocument {
    document: Document,
    generation: u64,
}

/// Lock-protected collection state
#[derive(Default)]
struct DocumentMap {
    documents: HashMap<String, StoredDocument>,

    /// Bumped on every insert; never reused
    next_generation: u64,
}

impl DocumentMap {
    fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// Store a new document, returning its generation
    fn insert(&mut self, document: Document) -> Result<u64> {
        if self.documents.contains_key(&document.id) {
            return Err(GemError::DocumentExists(document.id));
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        self.documents.insert(
            document.id.clone(),
            StoredDocument {
                document,
                generation,
            },
        );
        Ok(generation)
    }

    fn remove(&mut self, id: &str) -> Option<StoredDocument> {
        self.documents.remove(id)
    }

    /// Remove `id` only if it is still the document stored at `generation`
    fn remove_generation(&mut self, id: &str, generation: u64) -> bool {
        match self.documents.get(id) {
            Some(stored) if stored.generation == generation => {
                self.documents.remove(id);
                true
            }
            _ => false,
        }
    }
}

/// One queued insert and where to send its outcome
struct InsertJob {
    document: Document,
    reply: Sender<Result<()>>,
}

/// A named collection of documents with automatic expiry
///
/// ## Insert protocol
/// 1. Optimistic duplicate check under the read lock (cheap rejection)
/// 2. Job handed to the writer thread
/// 3. Writer re-checks under the write lock, stores, schedules expiry
/// 4. Caller blocks on a one-shot channel for the outcome
///
/// Step 3 is authoritative: of two concurrent inserts with the same ID,
/// exactly one succeeds.
pub struct Collection {
    /// Collection name (used for thread names and logging)
    name: String,

    /// Retention window applied to every insert
    ttl: Duration,

    /// Shared with the writer and expiry threads
    documents: Arc<RwLock<DocumentMap>>,

    /// Insert queue; `None` once shutdown has begun
    inserts: Option<Sender<InsertJob>>,

    /// Writer thread
    writer: Option<JoinHandle<()>>,

    /// Cancels pending expiry on explicit delete
    expiry: ExpiryScheduler,
}

impl Collection {
    /// Create an empty collection and start its worker threads
    pub fn new(name: impl Into<String>, ttl: Duration) -> Result<Self> {
        let name = name.into();
        let documents = Arc::new(RwLock::new(DocumentMap::default()));

        let expired_from = Arc::clone(&documents);
        let collection_name = name.clone();
        let expiry = ExpiryScheduler::start(&name, move |id, generation| {
            if expired_from.write().remove_generation(id, generation) {
                tracing::debug!("Document {}/{} expired", collection_name, id);
            }
        })?;

        let (insert_tx, insert_rx) = channel::unbounded();
        let writer_documents = Arc::clone(&documents);
        let writer_expiry = expiry.handle();
        let writer = thread::Builder::new()
            .name(format!("gemdb-writer-{}", name))
            .spawn(move || run_writer(insert_rx, writer_documents, writer_expiry, ttl))?;

        Ok(Self {
            name,
            ttl,
            documents,
            inserts: Some(insert_tx),
            writer: Some(writer),
            expiry,
        })
    }

    /// Insert a document, blocking until the writer thread has applied it
    ///
    /// Fails with `DocumentExists` if a live document already has this ID.
    pub fn insert_document(&self, document: Document) -> Result<()> {
        if self.documents.read().contains(&document.id) {
            return Err(GemError::DocumentExists(document.id));
        }

        let inserts = self
            .inserts
            .as_ref()
            .ok_or_else(|| GemError::WorkerStopped(format!("collection {} is closing", self.name)))?;

        let (reply_tx, reply_rx) = channel::bounded(1);
        inserts
            .send(InsertJob {
                document,
                reply: reply_tx,
            })
            .map_err(|_| GemError::WorkerStopped(format!("writer for {} is gone", self.name)))?;

        reply_rx
            .recv()
            .map_err(|_| GemError::WorkerStopped(format!("writer for {} dropped the insert", self.name)))?
    }

    /// Get a document by ID
    pub fn get_document(&self, id: &str) -> Result<Document> {
        self.documents
            .read()
            .documents
            .get(id)
            .map(|stored| stored.document.clone())
            .ok_or_else(|| GemError::DocumentNotFound(id.to_string()))
    }

    /// Remove a document before its retention window ends
    ///
    /// Its pending expiry is cancelled.
    pub fn delete_document(&self, id: &str) -> Result<()> {
        let mut documents = self.documents.write();
        let stored = documents
            .remove(id)
            .ok_or_else(|| GemError::DocumentNotFound(id.to_string()))?;
        self.expiry.cancel(stored.document.id, stored.generation);
        tracing::debug!("Deleted document {}/{}", self.name, id);
        Ok(())
    }

    /// IDs of every document whose data equals `value`, sorted
    pub fn search_by_value(&self, value: &str) -> Vec<String> {
        let documents = self.documents.read();
        let mut ids: Vec<String> = documents
            .documents
            .values()
            .filter(|stored| stored.document.data == value)
            .map(|stored| stored.document.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Number of live documents
    pub fn len(&self) -> usize {
        self.documents.read().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Retention window applied to inserts
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Drop for Collection {
    fn drop(&mut self) {
        // Closing the queue ends the writer loop; the expiry scheduler is
        // stopped afterwards by its own Drop.
        self.inserts.take();
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                tracing::error!("Writer thread for collection {} panicked", self.name);
            }
        }
    }
}

/// Writer loop: apply inserts one at a time and report each outcome
fn run_writer(
    jobs: Receiver<InsertJob>,
    documents: Arc<RwLock<DocumentMap>>,
    expiry: ExpiryHandle,
    ttl: Duration,
) {
    for InsertJob { document, reply } in jobs.iter() {
        let id = document.id.clone();
        let outcome = {
            let mut documents = documents.write();
            documents.insert(document).map(|generation| {
                // Scheduled under the lock so a racing delete's cancel is
                // always queued after this entry.
                expiry.schedule(id.clone(), generation, ttl);
                generation
            })
        };

        match &outcome {
            Ok(generation) => tracing::debug!("Inserted document {} (generation {})", id, generation),
            Err(e) => tracing::debug!("Rejected insert of {}: {}", id, e),
        }

        // The caller may have given up waiting; nothing else to do then.
        let _ = reply.send(outcome.map(|_| ()));
    }
}
