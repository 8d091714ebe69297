// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Configuration module

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::platform::PositionOptions;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level
    pub log_level: String,

    /// Simulated audio, vibration, position and battery
    pub demo_mode: bool,

    /// Where status links point
    pub app: AppConfig,

    /// Siren tone
    pub siren: SirenConfig,

    /// Location tracking
    pub location: LocationConfig,

    /// Battery listener
    pub battery: BatteryConfig,

    /// Settings storage
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            demo_mode: false,
            app: AppConfig::default(),
            siren: SirenConfig::default(),
            location: LocationConfig::default(),
            battery: BatteryConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Reject values the coordinators cannot run with
    pub fn validate(&self) -> Result<()> {
        self.app.base_url()?;
        if self.siren.cadence_ms == 0 {
            return Err(anyhow!("siren.cadence_ms must be positive"));
        }
        if !(0.0..=1.0).contains(&self.siren.gain) {
            return Err(anyhow!("siren.gain must be within [0, 1]"));
        }
        if self.location.timeout_ms == 0 {
            return Err(anyhow!("location.timeout_ms must be positive"));
        }
        if self.battery.poll_interval_ms == 0 {
            return Err(anyhow!("battery.poll_interval_ms must be positive"));
        }
        Ok(())
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("distress"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Status viewer address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base address status links are built against
    pub base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://distress-signal.app/".to_string(),
        }
    }
}

impl AppConfig {
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| anyhow!("invalid app.base_url {:?}: {}", self.base_url, e))
    }
}

/// Siren tone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SirenConfig {
    pub high_hz: f32,
    pub low_hz: f32,
    /// Time between frequency switches
    pub cadence_ms: u64,
    /// Glide between frequencies
    pub ramp_ms: u64,
    pub gain: f32,
}

impl Default for SirenConfig {
    fn default() -> Self {
        Self {
            high_hz: 800.0,
            low_hz: 600.0,
            cadence_ms: 400,
            ramp_ms: 100,
            gain: 0.5,
        }
    }
}

/// Location tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
    /// Pause between fix attempts
    pub fix_interval_ms: u64,
    /// Report this position when the host has no geolocation of its own
    pub fixed_position: Option<(f64, f64)>,
    /// Center of the simulated position in demo mode
    pub demo_origin: (f64, f64),
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 20_000,
            maximum_age_ms: 0,
            fix_interval_ms: 5_000,
            fixed_position: None,
            demo_origin: (37.7749, -122.4194),
        }
    }
}

impl LocationConfig {
    pub fn options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.high_accuracy,
            maximum_age: Duration::from_millis(self.maximum_age_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn fix_interval(&self) -> Duration {
        Duration::from_millis(self.fix_interval_ms)
    }
}

/// Battery listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub poll_interval_ms: u64,
    /// Root of the Linux power supply class
    pub sysfs_root: PathBuf,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
            sysfs_root: PathBuf::from("/sys/class/power_supply"),
        }
    }
}

impl BatteryConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Persist settings; when off they live in memory only
    pub enabled: bool,

    /// Database path
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: Config::config_dir().join("settings.db"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_signal_timings() {
        let config = Config::default();
        assert_eq!(config.siren.high_hz, 800.0);
        assert_eq!(config.siren.low_hz, 600.0);
        assert_eq!(config.siren.cadence_ms, 400);
        assert_eq!(config.siren.ramp_ms, 100);

        let options = config.location.options();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(20));
        assert_eq!(options.maximum_age, Duration::ZERO);
        config.validate().unwrap();
    }

    #[test]
    fn test_load_or_create_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_or_create(&path).unwrap();
        assert!(path.exists());

        let loaded = Config::load_or_create(&path).unwrap();
        assert_eq!(loaded.app.base_url, created.app.base_url);
        assert_eq!(loaded.location.timeout_ms, 20_000);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "demo_mode = true\n[app]\nbase_url = \"https://example.org/sos\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.demo_mode);
        assert_eq!(config.app.base_url, "https://example.org/sos");
        assert_eq!(config.siren.cadence_ms, 400);
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = Config::default();
        config.app.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
