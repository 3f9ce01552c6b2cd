//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Frame Format
//! ```text
//! ┌──────────────────┬─────────────────────────────┐
//! │ Len (4, i32, BE) │      Payload (JSON)         │
//! └──────────────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - `SET` - fields: `key`, `value`
//! - `GET` - fields: `key`
//! - `DEL` - fields: `key`
//! - `RST` - no fields
//!
//! ### Status Codes
//! - 200: OK
//! - 400-499: client error (404: key not found)
//! - 500-599: server error

mod codec;
mod command;
mod key;
mod response;

pub use codec::{
    decode_length, decode_payload, encode_frame, read_frame, read_frame_bytes, write_all,
    write_frame, LENGTH_SIZE, MAX_PAYLOAD_SIZE, MAX_READ_CHUNK,
};
pub use command::{Command, Request, FIELD_COMMAND, FIELD_KEY, FIELD_VALUE};
pub use key::{Key, KeyInput};
pub use response::{
    Lookup, Reply, Status, CLIENT_ERROR_CODES, CODE_NOT_FOUND, CODE_OK, FIELD_STATUS_CODE,
    SERVER_ERROR_CODES,
};
