//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Request Payload
//! A sequence of length-prefixed UTF-8 fields:
//! ```text
//! ┌──────────┬─────────┬──────────┬─────────┬─────
//! │ Len (4)  │ API key │ Len (4)  │ Arg 1   │ ...
//! └──────────┴─────────┴──────────┴─────────┴─────
//! ```
//! The API key is always present (possibly empty). The number of arguments
//! is fixed per command type.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{GemError, Result};
use super::{Command, CommandType, Request, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
///
/// Fails with `Protocol` if the payload would exceed `MAX_PAYLOAD_SIZE`, so
/// nothing is written that the peer would refuse to decode.
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    let fields = request.command.fields();

    let payload_len: usize = 4 + request.api_key.len()
        + fields.iter().map(|f| 4 + f.len()).sum::<usize>();
    let len_prefix = checked_payload_len(payload_len, "request")?;

    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload_len);
    message.put_u8(request.command.command_type() as u8);
    message.put_u32(len_prefix);

    put_field(&mut message, &request.api_key);
    for field in fields {
        put_field(&mut message, field);
    }

    Ok(message.to_vec())
}

/// Decode a request from bytes
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let (cmd_byte, mut payload) = split_frame(bytes, "request")?;

    let command_type = CommandType::from_byte(cmd_byte).ok_or_else(|| {
        GemError::Protocol(format!("Unknown command type: 0x{:02x}", cmd_byte))
    })?;

    let api_key = take_field(&mut payload, "API key")?;

    let mut fields = Vec::with_capacity(command_type.field_count());
    for index in 0..command_type.field_count() {
        fields.push(take_field(&mut payload, &format!("{:?} argument {}", command_type, index + 1))?);
    }

    if payload.has_remaining() {
        return Err(GemError::Protocol(format!(
            "{:?} command: {} unexpected trailing bytes",
            command_type,
            payload.remaining()
        )));
    }

    let command = Command::from_fields(command_type, fields).ok_or_else(|| {
        GemError::Protocol(format!("{:?} command: wrong argument count", command_type))
    })?;

    Ok(Request { api_key, command })
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
///
/// Fails with `Protocol` if the payload exceeds `MAX_PAYLOAD_SIZE`.
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    let len_prefix = checked_payload_len(payload.len(), "response")?;

    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(response.status as u8);
    message.put_u32(len_prefix);
    message.put_slice(payload);

    Ok(message.to_vec())
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = Status::from_byte(status_byte).ok_or_else(|| {
        GemError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete request from a stream
///
/// Blocks until a complete request is received or an error occurs
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    let frame = read_frame(reader)?;
    decode_request(&frame)
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let frame = read_frame(reader)?;
    decode_response(&frame)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Payload length as the header's u32, or `Protocol` if over the limit
pub(crate) fn checked_payload_len(len: usize, what: &str) -> Result<u32> {
    if len > MAX_PAYLOAD_SIZE as usize {
        return Err(GemError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(len as u32)
}

/// Append one length-prefixed field
fn put_field(buf: &mut BytesMut, field: &str) {
    buf.put_u32(field.len() as u32);
    buf.put_slice(field.as_bytes());
}

/// Consume one length-prefixed UTF-8 field
fn take_field(payload: &mut &[u8], what: &str) -> Result<String> {
    if payload.remaining() < 4 {
        return Err(GemError::Protocol(format!("{}: missing field length", what)));
    }
    let len = payload.get_u32() as usize;

    if payload.remaining() < len {
        return Err(GemError::Protocol(format!(
            "{}: incomplete field (expected {}, got {})",
            what,
            len,
            payload.remaining()
        )));
    }

    let data: &[u8] = *payload;
    let (field, rest) = data.split_at(len);
    *payload = rest;

    String::from_utf8(field.to_vec())
        .map_err(|_| GemError::Protocol(format!("{}: field is not valid UTF-8", what)))
}

/// Validate a header and return (type/status byte, payload)
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(GemError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let kind = header.get_u8();
    let payload_len = header.get_u32() as usize;

    // Validate payload length
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(GemError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(GemError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((kind, &bytes[HEADER_SIZE..total_len]))
}

/// Read header + payload off a stream without interpreting them
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    // Read header first
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    // Parse payload length
    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;

    // Validate payload length
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(GemError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut frame = vec![0u8; HEADER_SIZE + payload_len];
    frame[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut frame[HEADER_SIZE..])?;
    }

    Ok(frame)
}
