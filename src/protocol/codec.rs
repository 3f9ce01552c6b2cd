//! Protocol codec
//!
//! Encoding and decoding of frames.
//!
//! ## Wire Format
//! ```text
//! ┌──────────────────┬─────────────────────────────┐
//! │ Len (4, i32, BE) │      Payload (JSON)         │
//! └──────────────────┴─────────────────────────────┘
//! ```
//!
//! The length is signed and must be strictly positive. Exactly one frame is
//! written per send and read per receive.

use std::io::{ErrorKind, Read, Write};

use bytes::{BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SpeicherError};

/// Size of the length prefix
pub const LENGTH_SIZE: usize = 4;

/// Largest single read issued while collecting a payload
pub const MAX_READ_CHUNK: usize = 1_000_000;

/// Largest payload a signed 32-bit length can describe
pub const MAX_PAYLOAD_SIZE: usize = i32::MAX as usize;

// =============================================================================
// Encoding
// =============================================================================

/// Serialize `value` and prepend its length.
pub fn encode_frame<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(value)?;
    let length = i32::try_from(payload.len())
        .map_err(|_| SpeicherError::FrameTooLarge(payload.len()))?;

    let mut frame = Vec::with_capacity(LENGTH_SIZE + payload.len());
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode a frame payload (without the length prefix).
pub fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(payload)?)
}

/// Validate a length prefix.
pub fn decode_length(header: [u8; LENGTH_SIZE]) -> Result<usize> {
    let length = i32::from_be_bytes(header);
    if length <= 0 {
        return Err(SpeicherError::connection(format!(
            "Packet length should be positive integer, got {length}"
        )));
    }
    Ok(length as usize)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a complete frame to a stream
pub fn write_frame<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<()> {
    let frame = encode_frame(value)?;
    write_all(writer, &frame)
}

/// Write already encoded bytes, mapping I/O failures to connection errors.
pub fn write_all<W: Write>(writer: &mut W, frame: &[u8]) -> Result<()> {
    writer
        .write_all(frame)
        .and_then(|_| writer.flush())
        .map_err(|e| SpeicherError::connection_io(format!("Error while writing to socket: {e}"), e))
}

/// Read a complete frame from a stream
///
/// Blocks until the frame is received, the stream ends, or an error occurs.
pub fn read_frame<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<T> {
    let payload = read_frame_bytes(reader)?;
    decode_payload(&payload)
}

/// Read one frame and return its raw payload.
pub fn read_frame_bytes<R: Read>(reader: &mut R) -> Result<BytesMut> {
    let mut header = [0u8; LENGTH_SIZE];
    let mut filled = 0;
    while filled < LENGTH_SIZE {
        filled += recv(reader, &mut header[filled..])?;
    }
    let length = decode_length(header)?;

    let mut payload = BytesMut::with_capacity(length.min(MAX_READ_CHUNK));
    let mut chunk = vec![0u8; length.min(MAX_READ_CHUNK)];
    let mut left = length;
    while left > 0 {
        let want = left.min(MAX_READ_CHUNK);
        let n = recv(reader, &mut chunk[..want])?;
        payload.put_slice(&chunk[..n]);
        left -= n;
    }

    Ok(payload)
}

/// One read; a zero-byte read means the peer went away.
fn recv<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(0) => {
                return Err(SpeicherError::connection(
                    "Error reading from socket: end-of-file",
                ))
            }
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(SpeicherError::connection_io(
                    format!("Error while reading from socket: {e}"),
                    e,
                ))
            }
        }
    }
}
