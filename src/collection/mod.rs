//! Collection Module
//!
//! In-memory document collections with time-bounded retention.
//!
//! ## Responsibilities
//! - Store documents by ID, rejecting duplicate IDs
//! - Route inserts through a dedicated writer thread
//! - Expire documents after the retention window
//! - Search documents by exact data match
//!
//! ## Threads per collection
//! ```text
//!   caller ──InsertJob──▶ writer thread ──Schedule──▶ expiry thread
//!     ▲                        │                           │
//!     └──── one-shot reply ────┘                           │
//!                                                          ▼
//!              RwLock<DocumentMap>  ◀──── remove if same generation
//! ```
//!
//! Nothing here is persisted. A restart loses every collection.

mod document;
mod expiry;
mod registry;
mod store;

pub use document::Document;
pub use expiry::{ExpiryHandle, ExpiryScheduler};
pub use registry::Collections;
pub use store::Collection;
