//! # GemDB
//!
//! A table-namespaced key-value store with:
//! - Whole-state JSON snapshot persistence after every mutation
//! - One reader/writer lock per engine (coarse, predictable contention)
//! - In-memory document collections with TTL expiry
//! - API-key gated TCP protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Access Gate                               │
//! │                  (API key check)                             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Database                                 │
//! │                 (Command Router)                             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Engine    │          │ Collections │
//!   │  (RwLock)   │          │  (RwLock)   │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          ▼                        ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Snapshot   │          │ Writer +    │
//!   │ (JSON file) │          │ Expiry      │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod table;
pub mod storage;
pub mod engine;
pub mod collection;
pub mod database;
pub mod auth;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, GemError, Result};
pub use config::{Config, PersistStrategy};
pub use engine::Engine;
pub use collection::{Collection, Collections, Document};
pub use database::Database;
pub use auth::AccessGate;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of GemDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
