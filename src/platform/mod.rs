// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Host capabilities - audio, vibration, geolocation, battery, share
//!
//! Every feature the host may or may not provide is reached through a trait object.
//! [`Capabilities::probe`] runs once at startup and hands back an optional handle per
//! feature; a `None` means the channel is unsupported and its coordinator degrades
//! silently.

mod simulator;
mod sysfs;
#[cfg(feature = "audio")]
mod audio;

pub use simulator::{
    SimulatedAudio, SimulatedBattery, SimulatedClipboard, SimulatedPosition, SimulatedVibrator,
};
pub use sysfs::SysfsBattery;
#[cfg(feature = "audio")]
pub use audio::CpalAudio;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::core::{BatterySample, LocationSample};

/// Failure of a host device or missing feature
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("{0} is not supported on this host")]
    Unsupported(&'static str),

    #[error("device error: {0}")]
    Device(String),
}

/// Failure of a single position fix
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("User denied Geolocation")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    Unavailable(String),

    #[error("Timeout expired")]
    Timeout,
}

/// Options passed to every fix attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// Oldest cached fix accepted; zero forces a fresh fix
    pub maximum_age: Duration,
    /// Upper bound for one attempt
    pub timeout: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age: Duration::ZERO,
            timeout: Duration::from_secs(20),
        }
    }
}

/// An open oscillator. Dropping without `close` must also silence it.
pub trait Tone: Send {
    fn set_gain(&mut self, gain: f32);

    /// Jump to a frequency immediately
    fn set_frequency(&mut self, hz: f32);

    /// Glide linearly to `hz` over `over`
    fn ramp_frequency(&mut self, hz: f32, over: Duration);

    /// Stop output and release the device; returns once silent
    fn close(&mut self) -> Result<(), PlatformError>;
}

/// Audio output device
pub trait AudioOutput: Send + Sync {
    fn open(&self) -> Result<Box<dyn Tone>, PlatformError>;
}

/// Vibration motor. A zero-length pattern entry cancels any vibration in flight.
pub trait Vibrator: Send + Sync {
    fn vibrate(&self, pattern: &[u64]) -> Result<(), PlatformError>;

    fn cancel(&self) -> Result<(), PlatformError> {
        self.vibrate(&[0])
    }
}

/// Geolocation provider
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn fix(&self, options: &PositionOptions) -> Result<LocationSample, LocationError>;
}

/// Battery status provider
#[async_trait]
pub trait BatterySource: Send + Sync {
    async fn read(&self) -> Result<BatterySample, PlatformError>;
}

/// Payload handed to a native share sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Native share sheet
#[async_trait]
pub trait ShareTarget: Send + Sync {
    async fn share(&self, data: &ShareData) -> Result<(), PlatformError>;
}

/// System clipboard
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), PlatformError>;
}

/// Optional handle per host feature
#[derive(Clone, Default)]
pub struct Capabilities {
    pub audio: Option<Arc<dyn AudioOutput>>,
    pub vibration: Option<Arc<dyn Vibrator>>,
    pub geolocation: Option<Arc<dyn PositionSource>>,
    pub battery: Option<Arc<dyn BatterySource>>,
    pub share: Option<Arc<dyn ShareTarget>>,
    pub clipboard: Option<Arc<dyn Clipboard>>,
}

impl Capabilities {
    /// Nothing supported
    pub fn none() -> Self {
        Self::default()
    }

    /// Detect what this host offers
    pub fn probe(config: &Config) -> Self {
        let caps = if config.demo_mode {
            Self::simulated(config)
        } else {
            Self::native(config)
        };

        for (name, present) in caps.summary() {
            if present {
                info!("Capability available: {}", name);
            } else {
                debug!("Capability unavailable: {}", name);
            }
        }

        caps
    }

    fn simulated(config: &Config) -> Self {
        let (lat, lon) = config.location.demo_origin;
        Self {
            audio: Some(Arc::new(SimulatedAudio::new())),
            vibration: Some(Arc::new(SimulatedVibrator::new())),
            geolocation: Some(Arc::new(SimulatedPosition::jitter(
                LocationSample::new(lat, lon),
                0.0002,
                0.05,
            ))),
            battery: Some(Arc::new(SimulatedBattery::draining(0.87, 0.001))),
            share: None,
            clipboard: Some(Arc::new(SimulatedClipboard::new())),
        }
    }

    fn native(config: &Config) -> Self {
        #[cfg(feature = "audio")]
        let audio: Option<Arc<dyn AudioOutput>> =
            CpalAudio::probe().map(|a| Arc::new(a) as Arc<dyn AudioOutput>);
        #[cfg(not(feature = "audio"))]
        let audio: Option<Arc<dyn AudioOutput>> = None;

        let geolocation = config.location.fixed_position.map(|(lat, lon)| {
            Arc::new(SimulatedPosition::fixed(LocationSample::new(lat, lon)))
                as Arc<dyn PositionSource>
        });

        let battery = SysfsBattery::probe(&config.battery.sysfs_root)
            .map(|b| Arc::new(b) as Arc<dyn BatterySource>);

        Self {
            audio,
            vibration: None,
            geolocation,
            battery,
            share: None,
            clipboard: None,
        }
    }

    /// Feature name and whether it is present
    pub fn summary(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("audio", self.audio.is_some()),
            ("vibration", self.vibration.is_some()),
            ("geolocation", self.geolocation.is_some()),
            ("battery", self.battery.is_some()),
            ("share", self.share.is_some()),
            ("clipboard", self.clipboard.is_some()),
        ]
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Capabilities");
        for (name, present) in self.summary() {
            s.field(name, &present);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_mode_probes_everything_but_share() {
        let mut config = Config::default();
        config.demo_mode = true;

        let caps = Capabilities::probe(&config);
        assert!(caps.audio.is_some());
        assert!(caps.vibration.is_some());
        assert!(caps.geolocation.is_some());
        assert!(caps.battery.is_some());
        assert!(caps.share.is_none());
    }

    #[test]
    fn test_native_has_no_vibration() {
        let mut config = Config::default();
        config.demo_mode = false;
        config.location.fixed_position = Some((48.85, 2.35));

        let caps = Capabilities::probe(&config);
        assert!(caps.vibration.is_none());
        assert!(caps.geolocation.is_some());
    }

    #[test]
    fn test_location_error_messages() {
        assert_eq!(LocationError::Timeout.to_string(), "Timeout expired");
        assert_eq!(
            LocationError::Unavailable("no satellites".into()).to_string(),
            "Position unavailable: no satellites"
        );
    }
}
