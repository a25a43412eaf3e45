//! Configuration for cnclink
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

/// Default controller port for the Ethernet protocol
pub const DEFAULT_PORT: u16 = 8193;

/// Main configuration for a controller session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Controller host name or IP address
    pub host: String,

    /// Controller TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Timeout Configuration (milliseconds, 0 disables)
    // -------------------------------------------------------------------------
    /// TCP connect timeout
    pub connect_timeout_ms: u64,

    /// Socket read timeout
    pub read_timeout_ms: u64,

    /// Socket write timeout
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Reject responses whose request id differs from the request's
    pub strict_request_id: bool,

    /// Payload sent with the session-open request.
    ///
    /// The layout (remote host, port, timeout) is device specific and not
    /// documented; the default is the zero-filled block seen in captures.
    pub handshake_payload: Vec<u8>,

    /// Largest `total_length` accepted from the controller (in bytes)
    pub max_response_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: 5000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            strict_request_id: true,
            handshake_payload: vec![0u8; 16],
            max_response_size: 16 * 1024 * 1024, // 16 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` string for address resolution
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    pub(crate) fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub(crate) fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the controller host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the controller port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set connect, read and write timeouts at once (in milliseconds)
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self.config.read_timeout_ms = ms;
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable request id echo checking
    pub fn strict_request_id(mut self, strict: bool) -> Self {
        self.config.strict_request_id = strict;
        self
    }

    /// Set the opaque session-open payload
    pub fn handshake_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.config.handshake_payload = payload.into();
        self
    }

    /// Set the maximum accepted response size (in bytes)
    pub fn max_response_size(mut self, size: usize) -> Self {
        self.config.max_response_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
