//! Error types for Speicher
//!
//! Provides a unified error type for all client operations.

use thiserror::Error;

/// Result type alias using SpeicherError
pub type Result<T> = std::result::Result<T, SpeicherError>;

/// Unified error type for Speicher operations
#[derive(Debug, Error)]
pub enum SpeicherError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    /// Socket could not be established, or an I/O error, timeout or
    /// unexpected end-of-stream happened while reading or writing.
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Frame too large: {0} bytes does not fit a signed 32-bit length")]
    FrameTooLarge(usize),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    /// Status code in `400..=499`.
    #[error("Client error {0}")]
    Client(u16),

    /// Status code in `500..=599`.
    #[error("Server error {0}")]
    Server(u16),

    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SpeicherError {
    pub(crate) fn connection(message: impl Into<String>) -> Self {
        SpeicherError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn connection_io(message: impl Into<String>, source: std::io::Error) -> Self {
        SpeicherError::Connection {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Status code carried by a client or server failure.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SpeicherError::Client(code) | SpeicherError::Server(code) => Some(*code),
            _ => None,
        }
    }

    /// True for `Client(404)`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SpeicherError::Client(crate::protocol::CODE_NOT_FOUND))
    }

    /// True for transport failures, which always leave the connection closed.
    pub fn is_connection(&self) -> bool {
        matches!(self, SpeicherError::Connection { .. })
    }
}
