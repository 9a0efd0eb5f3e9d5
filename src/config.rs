//! Configuration
//!
//! Read from a TOML file (`spirit-trade.toml` by default). Every field is
//! optional; missing values fall back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;
use crate::resource::ResourceLocation;

pub const DEFAULT_CONFIG_FILE: &str = "spirit-trade.toml";

/// Raw config as written in TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub data_dir: Option<PathBuf>,
    pub namespace: Option<String>,
    pub log_filter: Option<String>,
    pub watch_poll_secs: Option<u64>,
}

/// Resolved config with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Namespace for recipe ids and the spirit trade type name
    pub namespace: String,
    /// `tracing` filter directive
    pub log_filter: String,
    pub watch_poll_interval: Duration,
}

impl Config {
    pub fn from_raw(raw: RawConfig) -> Result<Self> {
        let namespace = raw.namespace.unwrap_or_else(|| "occultism".to_string());
        // Same rules as any id namespace
        ResourceLocation::new(&namespace, "spirit_trade")?;

        Ok(Self {
            data_dir: raw.data_dir.unwrap_or_else(|| PathBuf::from("data")),
            namespace,
            log_filter: raw
                .log_filter
                .unwrap_or_else(|| "spirit_trade=info".to_string()),
            watch_poll_interval: Duration::from_secs(raw.watch_poll_secs.unwrap_or(1).max(1)),
        })
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Self::from_raw(toml::from_str(content)?)
    }

    /// Load from `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Self::from_raw(RawConfig::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            namespace: "occultism".to_string(),
            log_filter: "spirit_trade=info".to_string(),
            watch_poll_interval: Duration::from_secs(1),
        }
    }
}
