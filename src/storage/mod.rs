//! Storage Module
//!
//! Whole-state snapshot persistence.
//!
//! ## Responsibilities
//! - Encode the complete table set as one JSON document
//! - Replace the backing file in full on every write
//! - Load the backing file on startup and on explicit import
//!
//! ## File Format
//! ```text
//! {
//!   "<table>": { "<key>": "<value>", ... },
//!   ...
//! }
//! ```
//!
//! There is no log and no incremental update. Every persisted write costs one
//! full serialization of the state.

mod snapshot;

pub use snapshot::{read_snapshot, write_snapshot, SnapshotFile};
