//! Access Gate
//!
//! Shared-secret check applied to every request before it reaches the core.
//!
//! ## Key resolution (first match wins)
//! 1. `API_KEY` environment variable
//! 2. `{"api_key": "..."}` in the configured key file
//! 3. A fresh random 32-byte key, hex encoded and written to the key file

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::error::{GemError, Result};

/// Environment variable consulted first for the API key
pub const API_KEY_ENV: &str = "API_KEY";

/// Field name inside the key file
const API_KEY_FIELD: &str = "api_key";

/// Random bytes in a generated key
const GENERATED_KEY_BYTES: usize = 32;

/// Validates the API key carried by each request
#[derive(Clone)]
pub struct AccessGate {
    api_key: String,
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate").finish_non_exhaustive()
    }
}

impl AccessGate {
    /// Gate accepting exactly `api_key`
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Resolve the key from the environment or `key_file`
    pub fn load(key_file: &Path) -> Result<Self> {
        let from_env = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        Self::resolve(from_env, key_file)
    }

    /// Key resolution with the environment value passed in
    fn resolve(from_env: Option<String>, key_file: &Path) -> Result<Self> {
        if let Some(key) = from_env {
            tracing::info!("Using API key from {}", API_KEY_ENV);
            return Ok(Self::new(key));
        }

        match fs::read(key_file) {
            Ok(bytes) => {
                let fields: HashMap<String, String> = serde_json::from_slice(&bytes)
                    .map_err(|e| {
                        GemError::Config(format!("failed to parse {}: {}", key_file.display(), e))
                    })?;
                let key = fields.get(API_KEY_FIELD).cloned().ok_or_else(|| {
                    GemError::Config(format!(
                        "{} has no \"{}\" field",
                        key_file.display(),
                        API_KEY_FIELD
                    ))
                })?;
                tracing::info!("Using API key from {}", key_file.display());
                Ok(Self::new(key))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let key = generate_key();
                let body = serde_json::json!({ API_KEY_FIELD: key });
                fs::write(key_file, serde_json::to_vec(&body)?).map_err(|e| {
                    GemError::Config(format!("failed to write {}: {}", key_file.display(), e))
                })?;
                tracing::info!("Generated new API key in {}", key_file.display());
                Ok(Self::new(key))
            }
            Err(e) => Err(GemError::Config(format!(
                "failed to read {}: {}",
                key_file.display(),
                e
            ))),
        }
    }

    /// Accept or reject a presented key
    pub fn check(&self, presented: &str) -> Result<()> {
        if constant_time_compare(presented, &self.api_key) {
            Ok(())
        } else {
            Err(GemError::Unauthorized)
        }
    }

    /// The expected key (for printing at startup or handing to a local client)
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Constant-time string comparison
///
/// The length check leaks only the key length.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    if a_bytes.len() != b_bytes.len() {
        return false;
    }

    a_bytes.ct_eq(b_bytes).into()
}

/// Random key, lowercase hex
fn generate_key() -> String {
    let mut bytes = [0u8; GENERATED_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
