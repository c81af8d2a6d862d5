//! Configuration for the GPS feed relay
//!
//! Loads configuration from a TOML file. Every section has defaults that
//! match the bench setup (115200 baud receiver, subscribers on port 8089),
//! so a file only needs to list what differs.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub relay: RelayConfig,
    pub logging: LoggingConfig,
}

/// Serial source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path of the positioning receiver (e.g. "/dev/ttyUSB0", "COM3")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    ///
    /// A read that times out counts as "source idle", which is when a
    /// pending partial line may be flushed (see [`RelayConfig::flush_partial_lines`]).
    pub read_timeout_ms: u64,
}

/// Broadcast relay configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// TCP bind address for WebSocket subscribers
    ///
    /// Examples:
    /// - `0.0.0.0:8089` - Bind to all interfaces on port 8089
    /// - `127.0.0.1:8089` - Localhost only
    pub bind_address: String,
    /// Per-subscriber outbox capacity in lines
    ///
    /// When a subscriber falls this far behind, new lines are dropped for
    /// that subscriber only.
    pub subscriber_queue: usize,
    /// Longest accepted line in bytes; longer input is discarded up to the
    /// next line terminator.
    pub max_line_length: usize,
    /// Forward an unterminated partial line once the source goes idle
    pub flush_partial_lines: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error); `RUST_LOG` wins
    pub level: String,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            read_timeout_ms: 100,
        }
    }
}

impl SerialConfig {
    /// Read timeout as a [`Duration`]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8089".to_string(),
            subscriber_queue: 256,
            max_line_length: 1024,
            flush_partial_lines: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use gps_feed::config::Config;
    ///
    /// let config = Config::load("gpsfeed.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
