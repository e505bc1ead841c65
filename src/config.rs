//! Configuration loading and defaults.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use thiserror::Error;

/// Default port, shared by the server and the bundled client.
pub const DEFAULT_PORT: u16 = 7667;

/// Default listen address.
pub const DEFAULT_ADDRESS: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT);

/// Default room capacity.
pub const DEFAULT_CAPACITY: usize = 3;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network listen configuration.
    pub listen: ListenConfig,
    /// Chat room limits.
    pub room: RoomConfig,
}

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "127.0.0.1:7667").
    pub address: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
        }
    }
}

/// Chat room configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Maximum number of peers admitted at once.
    pub capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
