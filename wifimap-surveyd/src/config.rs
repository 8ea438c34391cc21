use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use wifimap_common::MetricConfig;
use wifimap_core::heatfield::DEFAULT_GRID_STEP;
use wifimap_core::intensity::{CONTRAST_HIGH, CONTRAST_STANDARD};
use wifimap_core::interpolate::{DEFAULT_CUTOFF_RADIUS, DEFAULT_IDW_POWER, DEFAULT_MIN_DISTANCE};
use wifimap_core::{default_catalog, IdwParams};
use wifimap_scan::{ScanConfig, DEFAULT_COMMAND_TIMEOUT, DEFAULT_INTERFACE};

pub const DEFAULT_CONFIG_PATH: &str = "wifimap.toml";
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8787";
pub const DEFAULT_MODE: &str = "heatmap";
pub const DEFAULT_CACHE_TTL_MS: u64 = 45_000;
pub const DEFAULT_PING_COUNT: u32 = 8;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub scan: ScanSection,
    pub measure: MeasureConfig,
    pub storage: StorageConfig,
    pub heatmap: HeatmapConfig,
    pub metrics: Vec<MetricConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            scan: ScanSection::default(),
            measure: MeasureConfig::default(),
            storage: StorageConfig::default(),
            heatmap: HeatmapConfig::default(),
            metrics: default_catalog(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    /// Reported to clients through GetMeta
    pub mode: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            mode: DEFAULT_MODE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    pub interface: String,
    pub cache_ttl_ms: u64,
    pub command_timeout_ms: u64,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            interface: DEFAULT_INTERFACE.to_string(),
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT.as_millis() as u64,
        }
    }
}

impl ScanSection {
    pub fn provider_config(&self) -> ScanConfig {
        ScanConfig {
            interface: self.interface.clone(),
            command_timeout: Duration::from_millis(self.command_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Ping the default gateway while taking a sample
    pub ping: bool,
    pub ping_count: u32,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            ping: true,
            ping_count: DEFAULT_PING_COUNT,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON snapshot of all projects. Without it samples live in memory only.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    pub grid_step: f64,
    pub cutoff_radius: f64,
    pub idw_power: f64,
    pub contrast: f64,
    pub high_contrast: f64,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            grid_step: DEFAULT_GRID_STEP,
            cutoff_radius: DEFAULT_CUTOFF_RADIUS,
            idw_power: DEFAULT_IDW_POWER,
            contrast: CONTRAST_STANDARD,
            high_contrast: CONTRAST_HIGH,
        }
    }
}

impl HeatmapConfig {
    pub fn idw(&self) -> IdwParams {
        IdwParams {
            power: self.idw_power,
            cutoff_radius: self.cutoff_radius,
            min_distance: DEFAULT_MIN_DISTANCE,
        }
    }
}

pub fn parse_config(text: &str) -> Result<Config, Box<dyn Error>> {
    let mut config: Config = toml::from_str(text)?;

    if config.metrics.is_empty() {
        config.metrics = default_catalog();
    }
    if let Some(metric) = config.metrics.iter().find(|m| m.good == m.bad) {
        return Err(format!("metric '{}' has equal good and bad thresholds", metric.key).into());
    }
    if !(config.heatmap.grid_step > 0.0) {
        return Err("heatmap.grid_step must be positive".into());
    }

    Ok(config)
}

/// Loads the config file, falling back to defaults when it doesn't exist
pub fn load_config(path: &Path) -> Result<Config, Box<dyn Error>> {
    if !path.exists() {
        log::warn!("Config file {} not found, using defaults", path.display());
        return Ok(Config::default());
    }

    let text = fs::read_to_string(path)?;
    parse_config(&text)
}
