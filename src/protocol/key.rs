//! Key normalization
//!
//! Keys are non-empty byte sequences. Callers hand in either text or bytes
//! through [`KeyInput`]; [`Key::prepare`] is the single place both are
//! validated. Keys travel as JSON strings, so bytes must be valid UTF-8.

use std::fmt;

use serde_json::Value;

use crate::error::{Result, SpeicherError};

/// Raw key as supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for KeyInput<'a> {
    fn from(text: &'a str) -> Self {
        KeyInput::Text(text)
    }
}

impl<'a> From<&'a String> for KeyInput<'a> {
    fn from(text: &'a String) -> Self {
        KeyInput::Text(text.as_str())
    }
}

impl<'a> From<&'a [u8]> for KeyInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        KeyInput::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for KeyInput<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        KeyInput::Bytes(bytes.as_slice())
    }
}

impl<'a> From<&'a Vec<u8>> for KeyInput<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        KeyInput::Bytes(bytes.as_slice())
    }
}

impl<'a> From<&'a Key> for KeyInput<'a> {
    fn from(key: &'a Key) -> Self {
        KeyInput::Bytes(key.as_bytes())
    }
}

/// A validated key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(Vec<u8>);

impl Key {
    /// Normalize text to UTF-8 bytes and reject empty keys.
    pub fn prepare(input: KeyInput<'_>) -> Result<Self> {
        let bytes = match input {
            KeyInput::Text(text) => text.as_bytes(),
            KeyInput::Bytes(bytes) => bytes,
        };

        if bytes.is_empty() {
            return Err(SpeicherError::InvalidArgument(
                "Key should not be empty".to_string(),
            ));
        }
        if std::str::from_utf8(bytes).is_err() {
            return Err(SpeicherError::InvalidArgument(format!(
                "Key {} is not valid UTF-8",
                String::from_utf8_lossy(bytes)
            )));
        }

        Ok(Key(bytes.to_vec()))
    }

    /// Keys coming from dynamically typed data: only JSON strings qualify.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Key::prepare(KeyInput::Text(text)),
            other => Err(SpeicherError::TypeMismatch(format!(
                "Key {other} is not string"
            ))),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Checked in `prepare`.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl<'a> TryFrom<KeyInput<'a>> for Key {
    type Error = SpeicherError;

    fn try_from(input: KeyInput<'a>) -> Result<Self> {
        Key::prepare(input)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
