//! Configuration loading

use anyhow::Result;
use iolink_core::{MasterConfig, RequestMode, TemperatureDecoder, DEFAULT_ADDRESS};
use iolink_discovery::ScannerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// IP address of the IO-Link Master
    #[serde(default = "default_address")]
    pub address: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// "get" or "post"
    #[serde(default)]
    pub mode: RequestMode,
    /// Command id for POST requests
    #[serde(default = "default_cid")]
    pub cid: i64,
    /// "scaled" or "tv7105"
    #[serde(default)]
    pub decoder: TemperatureDecoder,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            timeout_secs: default_timeout(),
            mode: RequestMode::default(),
            cid: default_cid(),
            decoder: TemperatureDecoder::default(),
        }
    }
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_timeout() -> u64 {
    5
}

fn default_cid() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Port to monitor
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds between readings
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Stop after this many seconds (runs until Ctrl-C when unset)
    #[serde(default)]
    pub duration_secs: Option<u64>,
    /// Warn above this temperature
    #[serde(default = "default_high_alert")]
    pub high_alert: Option<f64>,
    /// Warn below this temperature
    #[serde(default = "default_low_alert")]
    pub low_alert: Option<f64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            interval_secs: default_interval(),
            duration_secs: None,
            high_alert: default_high_alert(),
            low_alert: default_low_alert(),
        }
    }
}

fn default_port() -> u16 {
    1
}

fn default_interval() -> u64 {
    5
}

fn default_high_alert() -> Option<f64> {
    Some(30.0)
}

fn default_low_alert() -> Option<f64> {
    Some(10.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Landing page probe timeout in milliseconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
    /// Probe link-local hosts when no ifm MAC address is found
    #[serde(default = "default_true")]
    pub link_local_fallback: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: default_probe_timeout(),
            link_local_fallback: true,
        }
    }
}

fn default_probe_timeout() -> u64 {
    3000
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Convert to MasterConfig
    pub fn to_master_config(&self) -> MasterConfig {
        MasterConfig {
            address: self.device.address.clone(),
            timeout: Duration::from_secs(self.device.timeout_secs),
            mode: self.device.mode,
            cid: self.device.cid,
            decoder: self.device.decoder,
        }
    }

    /// Convert to ScannerConfig
    pub fn to_scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            probe_timeout_ms: self.discovery.probe_timeout_ms,
            link_local_fallback: self.discovery.link_local_fallback,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}
