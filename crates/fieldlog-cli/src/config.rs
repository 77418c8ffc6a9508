//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fieldlog_core::{GpsProvider, ManualGps, NoGps, SessionConfig};
use fieldlog_types::GeoFix;

/// Configuration file structure.
///
/// Every field has a build-time default matching the sensor firmware, so an
/// absent or empty file works out of the box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Advertised name of the target peripheral.
    #[serde(default = "default_device_name")]
    pub device_name: String,

    /// Service the sensor characteristics live under.
    #[serde(default)]
    pub service_uuid: Option<Uuid>,

    /// Temperature characteristic.
    #[serde(default)]
    pub temperature_uuid: Option<Uuid>,

    /// Humidity characteristic.
    #[serde(default)]
    pub humidity_uuid: Option<Uuid>,

    /// Data log location; defaults to the platform data directory.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Per-phase BLE timeouts.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Fixed position of the logging host.
    #[serde(default)]
    pub gps: GpsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            service_uuid: None,
            temperature_uuid: None,
            humidity_uuid: None,
            log_path: None,
            timeouts: TimeoutConfig::default(),
            gps: GpsConfig::default(),
        }
    }
}

/// Per-phase BLE timeouts in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_scan_secs")]
    pub scan_secs: u64,
    #[serde(default = "default_connect_secs")]
    pub connect_secs: u64,
    #[serde(default = "default_discovery_secs")]
    pub discovery_secs: u64,
    #[serde(default = "default_read_secs")]
    pub read_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            scan_secs: default_scan_secs(),
            connect_secs: default_connect_secs(),
            discovery_secs: default_discovery_secs(),
            read_secs: default_read_secs(),
        }
    }
}

/// Fixed position configuration.
///
/// Both coordinates must be set for readings to be taken; with neither set,
/// `take-reading` fails with a location error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GpsConfig {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

fn default_device_name() -> String {
    fieldlog_types::uuids::DEFAULT_DEVICE_NAME.to_string()
}

fn default_scan_secs() -> u64 {
    30
}

fn default_connect_secs() -> u64 {
    15
}

fn default_discovery_secs() -> u64 {
    10
}

fn default_read_secs() -> u64 {
    10
}

impl Config {
    /// Default config file path.
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fieldlog")
            .join("config.toml")
    }

    /// Load config from the given path (or the default location), falling
    /// back to defaults with a warning on any failure.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::path);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Build the session configuration, applying UUID and timeout overrides.
    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::default()
            .device_name(self.device_name.clone())
            .scan_timeout(Duration::from_secs(self.timeouts.scan_secs))
            .connect_timeout(Duration::from_secs(self.timeouts.connect_secs))
            .discovery_timeout(Duration::from_secs(self.timeouts.discovery_secs))
            .read_timeout(Duration::from_secs(self.timeouts.read_secs));
        if let Some(service) = self.service_uuid {
            config.service = service;
        }
        if let Some(temperature) = self.temperature_uuid {
            config.temperature = temperature;
        }
        if let Some(humidity) = self.humidity_uuid {
            config.humidity = humidity;
        }
        config
    }

    /// Resolve the data log path.
    pub fn log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(fieldlog_store::default_log_path)
    }

    /// Build the position provider from the configured coordinates.
    pub fn gps_provider(&self) -> Arc<dyn GpsProvider> {
        match (self.gps.latitude, self.gps.longitude) {
            (Some(latitude), Some(longitude)) => {
                Arc::new(ManualGps::new(GeoFix::new(latitude, longitude)))
            }
            _ => Arc::new(NoGps),
        }
    }
}
