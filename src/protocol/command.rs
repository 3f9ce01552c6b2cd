//! Command definitions
//!
//! Requests sent to the server are JSON objects carrying a `command` field
//! plus command-specific fields.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use super::Key;

/// Field names used on the wire
pub const FIELD_COMMAND: &str = "command";
pub const FIELD_KEY: &str = "key";
pub const FIELD_VALUE: &str = "value";

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Set,
    Get,
    Delete,
    Reset,
}

impl Command {
    /// Name of the command on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Set => "SET",
            Command::Get => "GET",
            Command::Delete => "DEL",
            Command::Reset => "RST",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request ready to be framed
///
/// Serializes as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Request {
    fields: Map<String, Value>,
}

impl Request {
    /// Request with an arbitrary command name and no other fields.
    pub fn new(command: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(FIELD_COMMAND.to_string(), Value::String(command.into()));
        Self { fields }
    }

    pub fn get(key: &Key) -> Self {
        Request::from(Command::Get).with_key(key)
    }

    pub fn set(key: &Key, value: Value) -> Self {
        Request::from(Command::Set).with_key(key).with_value(value)
    }

    pub fn delete(key: &Key) -> Self {
        Request::from(Command::Delete).with_key(key)
    }

    pub fn reset() -> Self {
        Request::from(Command::Reset)
    }

    pub fn with_key(self, key: &Key) -> Self {
        self.with_field(FIELD_KEY, Value::String(key.as_str().to_string()))
    }

    pub fn with_value(self, value: Value) -> Self {
        self.with_field(FIELD_VALUE, value)
    }

    /// Add or replace any field.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// The `command` field
    pub fn command(&self) -> &str {
        self.fields
            .get(FIELD_COMMAND)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Command> for Request {
    fn from(command: Command) -> Self {
        Request::new(command.as_str())
    }
}
