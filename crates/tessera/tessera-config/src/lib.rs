use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings shared by the terminal and monitor binaries.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TesseraConfig {
    #[serde(default = "defaults::region_name")]
    pub region_name: String,
    /// Directory holding the region file. Unset means the platform shm dir.
    #[serde(default)]
    pub shm_dir: Option<PathBuf>,
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    #[serde(default)]
    pub capacities: CapacityConfig,
    #[serde(default = "defaults::heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    #[serde(default = "defaults::heartbeat_timeout_ms")]
    pub heartbeat_timeout_ms: u64,
    #[serde(default = "defaults::poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Slots per channel. Both sides of a region must agree on these.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CapacityConfig {
    #[serde(default = "defaults::tick")]
    pub tick: u32,
    #[serde(default = "defaults::position")]
    pub position: u32,
    #[serde(default = "defaults::command")]
    pub command: u32,
    #[serde(default = "defaults::account")]
    pub account: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

mod defaults {
    pub fn region_name() -> String {
        "TESSERA_SHM".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }

    pub fn heartbeat_interval_ms() -> u64 {
        1_000
    }

    pub fn heartbeat_timeout_ms() -> u64 {
        5_000
    }

    pub fn poll_interval_ms() -> u64 {
        100
    }

    pub fn tick() -> u32 {
        4096
    }

    pub fn position() -> u32 {
        1024
    }

    pub fn command() -> u32 {
        512
    }

    pub fn account() -> u32 {
        64
    }
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            tick: defaults::tick(),
            position: defaults::position(),
            command: defaults::command(),
            account: defaults::account(),
        }
    }
}

impl Default for TesseraConfig {
    fn default() -> Self {
        Self {
            region_name: defaults::region_name(),
            shm_dir: None,
            log_level: defaults::log_level(),
            capacities: CapacityConfig::default(),
            heartbeat_interval_ms: defaults::heartbeat_interval_ms(),
            heartbeat_timeout_ms: defaults::heartbeat_timeout_ms(),
            poll_interval_ms: defaults::poll_interval_ms(),
        }
    }
}

impl TesseraConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let toml_to_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&toml_to_str)
    }

    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
