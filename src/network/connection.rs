//! Connection
//!
//! Owns a single TCP socket to the storage server and moves one frame at a
//! time across it.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{Result, SpeicherError};
use crate::protocol::{decode_payload, encode_frame, read_frame_bytes, write_all};

/// Plain TCP connection to the storage server
///
/// Either disconnected (`stream` is `None`) or connected. Any I/O failure
/// drops back to disconnected; the next [`send`](Connection::send)
/// reconnects. The socket is closed on drop.
pub struct Connection {
    host: String,
    port: u16,
    timeout: Duration,
    stream: Option<TcpStream>,
}

impl Connection {
    /// Create a disconnected connection
    pub fn new(config: &Config) -> Self {
        let config = config.clone().with_defaults();
        Self {
            host: config.host,
            port: config.port,
            timeout: config.timeout,
            stream: None,
        }
    }

    /// Connects to the server if not already connected.
    pub fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = self.create_connection().map_err(|e| {
            tracing::debug!("Connecting to {} failed: {}", self.addr(), e);
            SpeicherError::connection_io(
                format!("Error connecting to {}. {}.", self.addr(), e),
                e,
            )
        })?;

        tracing::debug!("Connected to {}", self.addr());
        self.stream = Some(stream);
        Ok(())
    }

    fn create_connection(&self) -> std::io::Result<TcpStream> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port).to_socket_addrs()?.collect();

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeout))?;
                    stream.set_write_timeout(Some(self.timeout))?;
                    // Disable Nagle's algorithm for low latency
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "host resolved to no addresses",
            )
        }))
    }

    /// Disconnects from the server and closes the socket.
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            // Close-time errors leave nothing to recover.
            let _ = stream.shutdown(std::net::Shutdown::Both);
            tracing::debug!("Disconnected from {}", self.addr());
        }
    }

    /// Send one value as a frame, connecting first if needed.
    pub fn send<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        // Either connected-and-sent or failed and disconnected.
        let frame = match encode_frame(value) {
            Ok(frame) => frame,
            Err(e) => {
                self.disconnect();
                return Err(e);
            }
        };

        if self.stream.is_none() {
            self.connect()?;
        }
        tracing::trace!("Sending {} byte frame to {}", frame.len(), self.addr());

        let Some(stream) = self.stream.as_mut() else {
            return Err(SpeicherError::connection("Not connected"));
        };
        if let Err(e) = write_all(stream, &frame) {
            tracing::warn!("Write to {} failed: {}", self.addr(), e);
            self.disconnect();
            return Err(e);
        }
        Ok(())
    }

    /// Read the reply to a previously sent value.
    pub fn read<T: DeserializeOwned>(&mut self) -> Result<T> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(SpeicherError::connection(
                "Not connected: read called before send",
            ));
        };

        let result = read_frame_bytes(stream).and_then(|payload| {
            tracing::trace!("Received {} byte frame from {}", payload.len(), self.addr());
            decode_payload(&payload)
        });

        if let Err(e) = &result {
            tracing::warn!("Read from {} failed: {}", self.addr(), e);
            self.disconnect();
        }
        result
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// `host:port` of the server
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}
