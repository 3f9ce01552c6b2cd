//! Loopback Relay
//!
//! A small TCP endpoint that stands in for the storage server. It either
//! echoes bytes back unchanged or decodes each frame, hands it to a callback
//! and frames the callback's answer.
//!
//! ## Threads
//! - One acceptor thread (non-blocking accept, polls the shutdown flag)
//! - One thread per accepted connection
//!
//! `stop()` (or drop) sets the flag, shuts down every accepted socket and
//! joins all threads.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use crate::config::Config;
use crate::error::{Result, SpeicherError};
use crate::protocol::{decode_payload, read_frame_bytes, write_frame};

/// Callback for framed relays. Returning `None` closes the connection
/// without replying.
pub type FrameHandler = dyn Fn(Value) -> Option<Value> + Send + Sync;

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone)]
enum Mode {
    Echo,
    Framed(Arc<FrameHandler>),
}

/// Accepted sockets paired with the thread serving them
type Peers = Vec<(TcpStream, JoinHandle<()>)>;

/// Loopback relay for exercising connections without a real server
pub struct Relay {
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    peers: Arc<Mutex<Peers>>,
    acceptor: Option<JoinHandle<()>>,
}

impl Relay {
    /// Echo relay on an ephemeral loopback port
    pub fn echo() -> Result<Self> {
        Self::bind("127.0.0.1:0", Mode::Echo)
    }

    /// Echo relay on a chosen address
    pub fn echo_on(addr: impl ToSocketAddrs) -> Result<Self> {
        Self::bind(addr, Mode::Echo)
    }

    /// Framed relay on an ephemeral loopback port
    pub fn framed<F>(handler: F) -> Result<Self>
    where
        F: Fn(Value) -> Option<Value> + Send + Sync + 'static,
    {
        Self::bind("127.0.0.1:0", Mode::Framed(Arc::new(handler)))
    }

    fn bind(addr: impl ToSocketAddrs, mode: Mode) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .map_err(|e| SpeicherError::connection_io(format!("Relay bind failed: {e}"), e))?;
        let addr = listener
            .local_addr()
            .and_then(|addr| listener.set_nonblocking(true).map(|_| addr))
            .map_err(|e| SpeicherError::connection_io(format!("Relay setup failed: {e}"), e))?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let peers = Arc::new(Mutex::new(Peers::new()));

        let acceptor = {
            let shutdown = Arc::clone(&shutdown);
            let peers = Arc::clone(&peers);
            thread::spawn(move || accept_loop(listener, mode, shutdown, peers))
        };

        tracing::debug!("Relay listening on {}", addr);

        Ok(Self {
            addr,
            shutdown,
            peers,
            acceptor: Some(acceptor),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Client configuration pointing at this relay
    pub fn config(&self) -> Config {
        Config::builder()
            .host(self.addr.ip().to_string())
            .port(self.addr.port())
            .build()
    }

    /// Block until the acceptor exits
    pub fn wait(mut self) {
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
    }

    /// Stop accepting, close every accepted socket and join all threads.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }

        let peers = std::mem::take(&mut *self.peers.lock());
        for (stream, worker) in peers {
            let _ = stream.shutdown(std::net::Shutdown::Both);
            let _ = worker.join();
        }
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.stop();
    }
}

fn accept_loop(
    listener: TcpListener,
    mode: Mode,
    shutdown: Arc<AtomicBool>,
    peers: Arc<Mutex<Peers>>,
) {
    while !shutdown.load(Ordering::SeqCst) {
        let (stream, peer) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
                continue;
            }
            Err(e) => {
                tracing::warn!("Relay accept failed: {}", e);
                continue;
            }
        };

        let tracked = match stream.set_nonblocking(false).and_then(|_| stream.try_clone()) {
            Ok(tracked) => tracked,
            Err(e) => {
                tracing::warn!("Relay could not set up {}: {}", peer, e);
                continue;
            }
        };

        tracing::debug!("Relay accepted {}", peer);
        let mode = mode.clone();
        let worker = thread::spawn(move || {
            let result = match mode {
                Mode::Echo => echo(stream),
                Mode::Framed(handler) => serve_frames(stream, &*handler),
            };
            if let Err(e) = result {
                tracing::debug!("Relay connection {} ended: {}", peer, e);
            }
        });

        let mut peers = peers.lock();
        peers.retain(|(_, worker)| !worker.is_finished());
        peers.push((tracked, worker));
    }
}

fn echo(mut stream: TcpStream) -> Result<()> {
    let mut buf = [0u8; 8192];
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(SpeicherError::connection_io(
                    format!("Relay read failed: {e}"),
                    e,
                ))
            }
        };
        stream
            .write_all(&buf[..n])
            .map_err(|e| SpeicherError::connection_io(format!("Relay write failed: {e}"), e))?;
    }
}

fn serve_frames(mut stream: TcpStream, handler: &FrameHandler) -> Result<()> {
    loop {
        let payload = read_frame_bytes(&mut stream)?;
        let request: Value = decode_payload(&payload)?;
        match handler(request) {
            Some(reply) => write_frame(&mut stream, &reply)?,
            None => {
                let _ = stream.shutdown(std::net::Shutdown::Both);
                return Ok(());
            }
        }
    }
}
