//! Document type

use serde::{Deserialize, Serialize};

/// An identified blob of opaque string data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique within its collection
    pub id: String,

    pub data: String,
}

impl Document {
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }
}
