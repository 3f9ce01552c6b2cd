//! Configuration for Speicher
//!
//! Connection settings with the defaults the storage service expects.

use std::env;
use std::time::Duration;

use crate::error::{Result, SpeicherError};

/// Default server host
pub const DEFAULT_HOST: &str = "localhost";

/// Default server port
pub const DEFAULT_PORT: u16 = 14567;

/// Default socket timeout (connect, read and write)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variables read by [`Config::from_env`]
pub const ENV_HOST: &str = "SERVER_HOST";
pub const ENV_PORT: &str = "SERVER_PORT";
pub const ENV_TIMEOUT: &str = "SERVER_TIMEOUT";

/// Client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Server host name or IP address
    pub host: String,

    /// Server TCP port
    pub port: u16,

    /// Applied to connect and to every read/write on the socket
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Defaults overridden by `SERVER_HOST`, `SERVER_PORT` and
    /// `SERVER_TIMEOUT` (seconds, fractional allowed).
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(host) = env::var(ENV_HOST) {
            if !host.is_empty() {
                config.host = host;
            }
        }

        if let Ok(port) = env::var(ENV_PORT) {
            config.port = port
                .parse()
                .map_err(|_| SpeicherError::Config(format!("{ENV_PORT}={port:?} is not a port")))?;
        }

        if let Ok(timeout) = env::var(ENV_TIMEOUT) {
            config.timeout = parse_timeout_secs(&timeout)?;
        }

        Ok(config)
    }

    /// Replace unusable values (empty host, port 0, zero timeout) with the
    /// defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.host.is_empty() {
            self.host = DEFAULT_HOST.to_string();
        }
        if self.port == 0 {
            self.port = DEFAULT_PORT;
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        self
    }

    /// `host:port` as used in log lines and error messages
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a positive number of seconds into a timeout.
pub fn parse_timeout_secs(raw: &str) -> Result<Duration> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| SpeicherError::Config(format!("timeout {raw:?} is not a number")))?;

    match Duration::try_from_secs_f64(secs) {
        Ok(timeout) if !timeout.is_zero() => Ok(timeout),
        _ => Err(SpeicherError::Config(format!(
            "timeout should be a positive number of seconds, got {raw:?}"
        ))),
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the socket timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Empty host, port 0 and a zero timeout fall back to the defaults.
    pub fn build(self) -> Config {
        self.config.with_defaults()
    }
}
