//! Client Module
//!
//! Blocking client for the storage service.
//!
//! ## Responsibilities
//! - Validate and normalize keys before any network activity
//! - Build `SET`/`GET`/`DEL`/`RST` requests
//! - Classify the `status_code` of every reply
//! - Turn 404 into a normal "absent" result for `get` and `delete`

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::network::Connection;
use crate::protocol::{Key, KeyInput, Lookup, Reply, Request, Status, CODE_NOT_FOUND};

/// Client to the storage service
///
/// One client drives one connection and has at most one request in flight.
///
/// ```no_run
/// use speicher::{Client, Config, Lookup};
/// use serde_json::json;
///
/// let mut client = Client::new(Config::default());
/// client.set("foo", "bar")?;
/// assert_eq!(client.get("foo")?, Lookup::Found(json!("bar")));
/// assert!(client.delete("foo")?);
/// client.reset()?;
/// assert!(!client.delete("foo")?);
/// assert_eq!(client.get("foo")?, Lookup::Absent);
/// client.close();
/// # Ok::<(), speicher::SpeicherError>(())
/// ```
pub struct Client {
    config: Config,
    conn: Connection,
}

impl Client {
    /// Create a client. No connection is made until the first request.
    pub fn new(config: Config) -> Self {
        let conn = Connection::new(&config);
        Self { config, conn }
    }

    /// Client for `host:port` with the default timeout
    pub fn connect_to(host: impl Into<String>, port: u16) -> Self {
        Self::new(Config::builder().host(host).port(port).build())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    /// Send a request and return the reply if its status is 200.
    ///
    /// Any 4xx status becomes [`crate::SpeicherError::Client`], any 5xx
    /// [`crate::SpeicherError::Server`], anything else [`crate::SpeicherError::MalformedReply`].
    pub fn execute(&mut self, request: &Request) -> Result<Reply> {
        let reply = self.exchange(request)?;
        reply.status().into_result()?;
        Ok(reply)
    }

    /// One round trip with shape checks but no status interpretation.
    fn exchange(&mut self, request: &Request) -> Result<Reply> {
        tracing::trace!("Executing {} on {}", request.command(), self.config.addr());
        self.conn.send(request)?;
        let reply: Value = self.conn.read()?;
        Reply::from_value(reply)
    }

    /// Get a value, or `Lookup::Absent` if the key does not exist.
    pub fn get<'k>(&mut self, key: impl Into<KeyInput<'k>>) -> Result<Lookup> {
        let key = Key::prepare(key.into())?;
        let reply = self.exchange(&Request::get(&key))?;
        match reply.status() {
            Status::ClientError(CODE_NOT_FOUND) => Ok(Lookup::Absent),
            status => {
                status.into_result()?;
                Ok(Lookup::Found(reply.into_value()?))
            }
        }
    }

    /// Store a value under `key`.
    ///
    /// A value that serializes to `null` deletes the key instead; whether a
    /// value existed is not reported.
    pub fn set<'k, V: Serialize + ?Sized>(
        &mut self,
        key: impl Into<KeyInput<'k>>,
        value: &V,
    ) -> Result<()> {
        let key = Key::prepare(key.into())?;
        let value = serde_json::to_value(value)?;
        if value.is_null() {
            self.delete(&key)?;
            return Ok(());
        }
        self.execute(&Request::set(&key, value))?;
        Ok(())
    }

    /// Delete a key. Returns `false` if it did not exist.
    pub fn delete<'k>(&mut self, key: impl Into<KeyInput<'k>>) -> Result<bool> {
        let key = Key::prepare(key.into())?;
        let reply = self.exchange(&Request::delete(&key))?;
        match reply.status() {
            Status::ClientError(CODE_NOT_FOUND) => Ok(false),
            status => status.into_result().map(|_| true),
        }
    }

    /// Delete every value on the server.
    pub fn reset(&mut self) -> Result<()> {
        self.execute(&Request::reset())?;
        Ok(())
    }

    /// Close the connection if it is open.
    pub fn close(&mut self) {
        self.conn.disconnect();
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("addr", &self.config.addr())
            .field("connected", &self.conn.is_connected())
            .finish()
    }
}
