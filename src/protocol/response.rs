//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};

use crate::collection::Document;
use crate::error::{ErrorKind, GemError, Result};
use super::codec::checked_payload_len;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
    AlreadyExists = 0x03,
    Unauthorized = 0x04,
    BadRequest = 0x05,
}

impl Status {
    /// Parse a status byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        let status = match byte {
            0x00 => Status::Ok,
            0x01 => Status::NotFound,
            0x02 => Status::Error,
            0x03 => Status::AlreadyExists,
            0x04 => Status::Unauthorized,
            0x05 => Status::BadRequest,
            _ => return None,
        };
        Some(status)
    }
}

impl From<ErrorKind> for Status {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => Status::NotFound,
            ErrorKind::AlreadyExists => Status::AlreadyExists,
            ErrorKind::Unauthorized => Status::Unauthorized,
            ErrorKind::BadRequest => Status::BadRequest,
            ErrorKind::Io | ErrorKind::Decode | ErrorKind::Internal => Status::Error,
        }
    }
}

impl From<Status> for ErrorKind {
    fn from(status: Status) -> Self {
        match status {
            Status::NotFound => ErrorKind::NotFound,
            Status::AlreadyExists => ErrorKind::AlreadyExists,
            Status::Unauthorized => ErrorKind::Unauthorized,
            Status::BadRequest => ErrorKind::BadRequest,
            Status::Ok | Status::Error => ErrorKind::Internal,
        }
    }
}

/// Result of a successfully executed command
///
/// Sent as the JSON payload of an OK response, e.g. `{"value":"..."}`,
/// `{"tables":["a","b"]}` or `"done"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reply {
    /// Mutation applied, nothing to return
    Done,
    Value(String),
    Tables(Vec<String>),
    Keys(Vec<String>),
    Collections(Vec<String>),
    Document(Document),
    Ids(Vec<String>),
    Pong,
}

/// A response to send to client
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (JSON reply for OK, error message otherwise)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response carrying an encoded reply
    ///
    /// Fails with `Protocol` if the encoded reply does not fit in one frame.
    pub fn ok(reply: &Reply) -> Result<Self> {
        let payload = serde_json::to_vec(reply)?;
        checked_payload_len(payload.len(), "reply")?;
        Ok(Self {
            status: Status::Ok,
            payload: Some(payload),
        })
    }

    /// Create a response for a failed command
    pub fn from_error(error: &GemError) -> Self {
        Self {
            status: error.kind().into(),
            payload: Some(error.to_string().into_bytes()),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an UNAUTHORIZED response
    pub fn unauthorized() -> Self {
        Self::from_error(&GemError::Unauthorized)
    }

    /// Payload as text (error messages)
    pub fn message(&self) -> String {
        self.payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default()
    }

    /// Decode the reply of an OK response
    pub fn into_reply(self) -> Result<Reply> {
        match self.status {
            Status::Ok => {
                let payload = self.payload.unwrap_or_default();
                Ok(serde_json::from_slice(&payload)?)
            }
            status => Err(GemError::Remote {
                kind: status.into(),
                message: self.message(),
            }),
        }
    }
}
