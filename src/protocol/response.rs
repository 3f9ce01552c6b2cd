//! Response definitions
//!
//! Replies are JSON objects carrying a numeric `status_code`.

use std::ops::RangeInclusive;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Result, SpeicherError};

use super::command::FIELD_VALUE;

/// Field name of the status code in every reply
pub const FIELD_STATUS_CODE: &str = "status_code";

/// No errors happened.
pub const CODE_OK: u16 = 200;

/// Key not found.
pub const CODE_NOT_FOUND: u16 = 404;

/// Caller-correctable failures
pub const CLIENT_ERROR_CODES: RangeInclusive<u16> = 400..=499;

/// Server-side faults
pub const SERVER_ERROR_CODES: RangeInclusive<u16> = 500..=599;

/// Classified status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Exactly 200
    Ok,
    /// 400..=499
    ClientError(u16),
    /// 500..=599
    ServerError(u16),
    /// Anything else the server should never send
    Unsupported(i64),
}

impl Status {
    pub fn classify(code: i64) -> Self {
        match u16::try_from(code) {
            Ok(CODE_OK) => Status::Ok,
            Ok(code) if CLIENT_ERROR_CODES.contains(&code) => Status::ClientError(code),
            Ok(code) if SERVER_ERROR_CODES.contains(&code) => Status::ServerError(code),
            _ => Status::Unsupported(code),
        }
    }

    /// Map error statuses to the matching error.
    pub fn into_result(self) -> Result<()> {
        match self {
            Status::Ok => Ok(()),
            Status::ClientError(code) => Err(SpeicherError::Client(code)),
            Status::ServerError(code) => Err(SpeicherError::Server(code)),
            Status::Unsupported(code) => Err(SpeicherError::MalformedReply(format!(
                "Unsupported status code {code}"
            ))),
        }
    }
}

/// A reply whose shape has been checked
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: Status,
    fields: Map<String, Value>,
}

impl Reply {
    /// Check that the decoded payload is an object with an integer
    /// `status_code`.
    pub fn from_value(value: Value) -> Result<Self> {
        let fields = match value {
            Value::Object(fields) => fields,
            _ => {
                return Err(SpeicherError::MalformedReply(
                    "Reply is not an object".to_string(),
                ))
            }
        };

        let code = match fields.get(FIELD_STATUS_CODE) {
            None => {
                return Err(SpeicherError::MalformedReply(format!(
                    "Key \"{FIELD_STATUS_CODE}\" not exists in reply"
                )))
            }
            Some(code) => status_code_of(code).ok_or_else(|| {
                SpeicherError::MalformedReply(format!("Unsupported status code {code}"))
            })?,
        };

        Ok(Self {
            status: Status::classify(code),
            fields,
        })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Take the `value` field, failing if the server left it out.
    pub fn into_value(mut self) -> Result<Value> {
        self.fields.remove(FIELD_VALUE).ok_or_else(|| {
            SpeicherError::MalformedReply(format!("Key \"{FIELD_VALUE}\" not exists in reply"))
        })
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

/// Integers, and floats with no fractional part (`404.0`), are status codes.
fn status_code_of(code: &Value) -> Option<i64> {
    if let Some(code) = code.as_i64() {
        return Some(code);
    }
    let code = code.as_f64()?;
    if code.fract() == 0.0 && code >= i64::MIN as f64 && code <= i64::MAX as f64 {
        Some(code as i64)
    } else {
        None
    }
}

/// Outcome of a lookup: "not found" is a normal branch, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Value),
    Absent,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    pub fn into_option(self) -> Option<Value> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Absent => None,
        }
    }

    /// Decode a found value into a concrete type.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<Option<T>> {
        match self {
            Lookup::Found(value) => Ok(Some(serde_json::from_value(value)?)),
            Lookup::Absent => Ok(None),
        }
    }
}
