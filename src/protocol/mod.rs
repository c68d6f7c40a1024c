//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │  API key + argument fields  │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: CREATE_TABLE      - name
//! - 0x02: DELETE_TABLE      - name
//! - 0x03: SET               - table, key, value
//! - 0x04: GET               - table, key
//! - 0x05: DELETE            - table, key
//! - 0x06: LIST_TABLES       - (none)
//! - 0x07: LIST_KEYS         - table
//! - 0x08: EXPORT            - path
//! - 0x10: CREATE_COLLECTION - name
//! - 0x11: DROP_COLLECTION   - name
//! - 0x12: LIST_COLLECTIONS  - (none)
//! - 0x13: INSERT_DOCUMENT   - collection, id, data
//! - 0x14: GET_DOCUMENT      - collection, id
//! - 0x15: DELETE_DOCUMENT   - collection, id
//! - 0x16: SEARCH_DOCUMENTS  - collection, value
//! - 0x20: PING              - (none)
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK             (payload: JSON [`Reply`])
//! - 0x01: NOT_FOUND
//! - 0x02: ERROR
//! - 0x03: ALREADY_EXISTS
//! - 0x04: UNAUTHORIZED
//! - 0x05: BAD_REQUEST

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType, Request};
pub use response::{Reply, Response, Status};
pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_request,
    read_response, write_request, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
