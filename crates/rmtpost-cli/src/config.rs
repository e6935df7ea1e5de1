//! Configuration file.
//!
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0:80"
//! max_request_size = 16384
//! read_timeout_ms = 5000
//!
//! [channel]
//! channel = 0
//! clock_divisor = 80
//! carrier_freq_hz = 40000
//! carrier_duty_percent = 50
//! carrier_enabled = true
//! idle_level = "low"
//!
//! [simulation]
//! event_log_capacity = 1024
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every table and key is optional.

use anyhow::{Context, Result, anyhow};
use rmtpost_hardware::{ChannelConfig, mock::DEFAULT_EVENT_CAPACITY};
use rmtpost_network::{DEFAULT_MAX_REQUEST_SIZE, DEFAULT_READ_TIMEOUT, HttpServerConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub channel: ChannelConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub max_request_size: usize,
    pub read_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let defaults = HttpServerConfig::default();
        Self {
            bind_addr: defaults.bind_addr,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
        }
    }
}

impl ServerConfig {
    pub fn to_http_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            bind_addr: self.bind_addr,
            max_request_size: self.max_request_size,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

/// Settings for the simulated channel used when no driver is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Peripheral operations kept in memory; older ones are dropped.
    pub event_log_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            event_log_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file. A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.channel.validate()?;
        if self.server.max_request_size == 0 {
            return Err(anyhow!("server.max_request_size must be non-zero"));
        }
        Ok(())
    }

    /// Write a default configuration file.
    pub async fn create_default(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())
            .context("Failed to serialize default config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }
}
