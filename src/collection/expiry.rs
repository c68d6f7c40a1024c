//! Expiry scheduler
//!
//! One background thread per collection that removes documents when their
//! retention window ends.
//!
//! Every scheduled entry is keyed by document ID and the generation the
//! document was stored under. An entry only fires if it is still the pending
//! entry for that ID, and the removal callback is expected to re-check the
//! generation under its own lock. A timer left over from a deleted document
//! can therefore never remove a later document that reuses the ID.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use crate::error::Result;

/// Messages accepted by the scheduler thread
enum ExpiryMessage {
    Schedule {
        id: String,
        generation: u64,
        deadline: Instant,
    },
    Cancel {
        id: String,
        generation: u64,
    },
    Shutdown,
}

/// A queued deadline; ordered by time first
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Deadline {
    at: Instant,
    generation: u64,
    id: String,
}

/// Cloneable sender side of an [`ExpiryScheduler`]
#[derive(Clone)]
pub struct ExpiryHandle {
    sender: Sender<ExpiryMessage>,
}

impl ExpiryHandle {
    /// Expire `id` at `generation` once `ttl` has elapsed
    pub fn schedule(&self, id: String, generation: u64, ttl: Duration) {
        let message = ExpiryMessage::Schedule {
            id,
            generation,
            deadline: Instant::now() + ttl,
        };
        if self.sender.send(message).is_err() {
            tracing::warn!("Expiry scheduler stopped, document will not expire");
        }
    }

    /// Drop the pending expiry of `id` at `generation`, if any
    pub fn cancel(&self, id: String, generation: u64) {
        let _ = self.sender.send(ExpiryMessage::Cancel { id, generation });
    }
}

/// Owns the scheduler thread; stops and joins it on drop
pub struct ExpiryScheduler {
    handle: ExpiryHandle,
    thread: Option<JoinHandle<()>>,
}

impl ExpiryScheduler {
    /// Start the scheduler thread
    ///
    /// `on_expire(id, generation)` runs on the scheduler thread each time an
    /// entry comes due.
    pub fn start<F>(name: &str, on_expire: F) -> Result<Self>
    where
        F: Fn(&str, u64) + Send + 'static,
    {
        let (sender, receiver) = channel::unbounded();

        let thread = thread::Builder::new()
            .name(format!("gemdb-expiry-{}", name))
            .spawn(move || run_scheduler(receiver, on_expire))?;

        Ok(Self {
            handle: ExpiryHandle { sender },
            thread: Some(thread),
        })
    }

    /// A sender that other threads can use to schedule and cancel
    pub fn handle(&self) -> ExpiryHandle {
        self.handle.clone()
    }

    pub fn cancel(&self, id: String, generation: u64) {
        self.handle.cancel(id, generation);
    }
}

impl Drop for ExpiryScheduler {
    fn drop(&mut self) {
        let _ = self.handle.sender.send(ExpiryMessage::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Expiry scheduler thread panicked");
            }
        }
    }
}

/// Scheduler loop: fire due entries, then wait for the next message or the
/// next deadline, whichever comes first.
fn run_scheduler<F>(receiver: Receiver<ExpiryMessage>, on_expire: F)
where
    F: Fn(&str, u64),
{
    let mut queue: BinaryHeap<Reverse<Deadline>> = BinaryHeap::new();
    // id → generation of its live entry; cancelled heap entries stay queued
    // and are skipped when they come due
    let mut pending: HashMap<String, u64> = HashMap::new();

    loop {
        let now = Instant::now();
        while queue.peek().map_or(false, |Reverse(next)| next.at <= now) {
            if let Some(Reverse(due)) = queue.pop() {
                if pending.get(&due.id) == Some(&due.generation) {
                    pending.remove(&due.id);
                    on_expire(&due.id, due.generation);
                }
            }
        }

        let message = match queue.peek() {
            Some(Reverse(next)) => {
                let wait = next.at.saturating_duration_since(Instant::now());
                match receiver.recv_timeout(wait) {
                    Ok(message) => message,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match receiver.recv() {
                Ok(message) => message,
                Err(_) => break,
            },
        };

        match message {
            ExpiryMessage::Schedule {
                id,
                generation,
                deadline,
            } => {
                pending.insert(id.clone(), generation);
                queue.push(Reverse(Deadline {
                    at: deadline,
                    generation,
                    id,
                }));
            }
            ExpiryMessage::Cancel { id, generation } => {
                if pending.get(&id) == Some(&generation) {
                    pending.remove(&id);
                }
            }
            ExpiryMessage::Shutdown => break,
        }
    }

    tracing::trace!("Expiry scheduler exiting with {} pending entries", pending.len());
}
