//! Network Module
//!
//! TCP transport for the client side, plus a loopback relay.
//!
//! ## Architecture
//! - `Connection` owns one socket, one frame per send/read
//! - `Relay` echoes or transforms frames for tests and debugging

mod connection;
mod relay;

pub use connection::Connection;
pub use relay::{FrameHandler, Relay};
