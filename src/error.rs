//! Error types for GemDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using GemError
pub type Result<T> = std::result::Result<T, GemError>;

/// Unified error type for GemDB operations
#[derive(Debug, Error)]
pub enum GemError {
    // -------------------------------------------------------------------------
    // I/O and Decoding Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Table Errors
    // -------------------------------------------------------------------------
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    TableExists(String),

    #[error("key not found: {table}/{key}")]
    KeyNotFound { table: String, key: String },

    // -------------------------------------------------------------------------
    // Collection Errors
    // -------------------------------------------------------------------------
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("collection already exists: {0}")]
    CollectionExists(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("document already exists: {0}")]
    DocumentExists(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// Failure reported by the server, as seen by a client
    #[error("{message}")]
    Remote { kind: ErrorKind, message: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Background worker stopped: {0}")]
    WorkerStopped(String),
}

/// Coarse classification of a [`GemError`]
///
/// The transport layer maps each kind onto a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Io,
    Decode,
    Unauthorized,
    BadRequest,
    Internal,
}

impl GemError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GemError::TableNotFound(_)
            | GemError::KeyNotFound { .. }
            | GemError::CollectionNotFound(_)
            | GemError::DocumentNotFound(_) => ErrorKind::NotFound,
            GemError::TableExists(_)
            | GemError::CollectionExists(_)
            | GemError::DocumentExists(_) => ErrorKind::AlreadyExists,
            GemError::Io(_) => ErrorKind::Io,
            GemError::Decode(_) => ErrorKind::Decode,
            GemError::Unauthorized => ErrorKind::Unauthorized,
            GemError::Protocol(_) => ErrorKind::BadRequest,
            GemError::Remote { kind, .. } => *kind,
            GemError::Config(_) | GemError::WorkerStopped(_) => ErrorKind::Internal,
        }
    }

    /// True for any "missing table / key / collection / document" error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// True for any "name or id already taken" error
    pub fn is_already_exists(&self) -> bool {
        self.kind() == ErrorKind::AlreadyExists
    }
}
