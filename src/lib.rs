//! # Speicher
//!
//! A synchronous client for a key-value storage service with:
//! - Length-prefixed JSON frames over plain TCP
//! - Lazy connect on first request, automatic teardown on I/O errors
//! - Typed outcomes for the `status_code` of every reply
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Client                             │
//! │        get / set / delete / reset, status classification    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Request / Reply
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Connection                           │
//! │           one frame per send, one frame per read            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  [len: i32 BE][JSON]
//!                       ▼
//!                  TCP socket
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SpeicherError, Result};
pub use config::Config;
pub use client::Client;
pub use network::Connection;
pub use protocol::{Key, KeyInput, Lookup};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Speicher
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
