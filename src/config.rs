//! Configuration system using Figment.
//!
//! This module provides strongly-typed configuration loading for the
//! collector. Configuration is loaded from:
//! 1. aerovant.toml file (base configuration)
//! 2. Environment variables (prefixed with AEROVANT_)
//!
//! All fields carry defaults matching the original calibration rig (five MQ
//! sensors on MCP3008 inputs 0-4, 10 second sampling), so a missing
//! configuration file yields a runnable setup.
//!
//! # Example
//! ```no_run
//! use aerovant::config::CollectorConfig;
//!
//! # fn main() -> Result<(), aerovant::error::CollectorError> {
//! let config = CollectorConfig::load_from("config/aerovant.toml")?;
//! println!("Logging to {}", config.acquisition.output.display());
//! # Ok(())
//! # }
//! ```

use crate::error::AppResult;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level collector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Acquisition cycle settings
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    /// Hardware wiring settings
    #[serde(default)]
    pub hardware: HardwareConfig,
    /// Gas-sensor channel definitions, in column order
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelConfig>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            application: ApplicationConfig::default(),
            acquisition: AcquisitionConfig::default(),
            hardware: HardwareConfig::default(),
            channels: default_channels(),
        }
    }
}

/// Application-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

/// Acquisition cycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Output file for the acquisition log
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Time between samples (e.g. "10s")
    #[serde(with = "humantime_serde", default = "default_interval")]
    pub sample_interval: Duration,
    /// Known gas concentration for the experiment, in ppm
    #[serde(default = "default_true_ppm")]
    pub true_ppm: u32,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            sample_interval: default_interval(),
            true_ppm: default_true_ppm(),
        }
    }
}

/// Hardware wiring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareConfig {
    /// BCM GPIO pin carrying the DHT11 data line
    #[serde(default = "default_dht_gpio")]
    pub dht_gpio: u8,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            dht_gpio: default_dht_gpio(),
        }
    }
}

/// One gas-sensor channel definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Column name in the output log (e.g. "MQ135_adc")
    pub id: String,
    /// MCP3008 input line (0-7)
    pub adc_input: u8,
}

// Default value functions
fn default_app_name() -> String {
    "AEROVANT".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("custom_sensor_data.csv")
}

fn default_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_true_ppm() -> u32 {
    100
}

fn default_dht_gpio() -> u8 {
    4
}

fn default_channels() -> Vec<ChannelConfig> {
    [
        ("MQ2_adc", 0),
        ("MQ4_adc", 1),
        ("MQ5_adc", 2),
        ("MQ9_adc", 3),
        ("MQ135_adc", 4),
    ]
    .into_iter()
    .map(|(id, adc_input)| ChannelConfig {
        id: id.to_string(),
        adc_input,
    })
    .collect()
}

impl CollectorConfig {
    /// Load configuration from a TOML file and environment variables.
    ///
    /// Environment variables can override configuration with prefix AEROVANT_,
    /// using `__` as the section separator.
    /// Example: AEROVANT_ACQUISITION__TRUE_PPM=250
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("AEROVANT_").split("__"))
            .extract()?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<(), String> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.acquisition.sample_interval.is_zero() {
            return Err("sample_interval must be greater than zero".to_string());
        }

        if self.channels.is_empty() {
            return Err("At least one channel must be configured".to_string());
        }

        // Channel ids double as column names, so both ids and ADC inputs
        // must be unique.
        let mut ids = std::collections::HashSet::new();
        let mut inputs = std::collections::HashSet::new();
        for channel in &self.channels {
            if !ids.insert(&channel.id) {
                return Err(format!("Duplicate channel id: {}", channel.id));
            }
            if !inputs.insert(channel.adc_input) {
                return Err(format!(
                    "Duplicate ADC input {} (channel {})",
                    channel.adc_input, channel.id
                ));
            }
            if channel.adc_input > 7 {
                return Err(format!(
                    "ADC input {} out of range for channel {} (MCP3008 has inputs 0-7)",
                    channel.adc_input, channel.id
                ));
            }
        }

        Ok(())
    }

    /// Channel column names in configured (and therefore header) order.
    pub fn channel_ids(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.id.clone()).collect()
    }
}
