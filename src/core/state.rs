// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Process-wide observable state
//!
//! Each value has a single writer (the coordinator or listener that owns it) and any
//! number of readers. Values are published whole through `watch` channels, so a reader
//! never observes a half-written sample.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// A position fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationSample {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both coordinates finite and within WGS84 bounds
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Host battery reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatterySample {
    /// Charge fraction in [0, 1]
    pub level: f64,
    pub charging: bool,
}

impl BatterySample {
    pub fn new(level: f64, charging: bool) -> Self {
        Self {
            level: level.clamp(0.0, 1.0),
            charging,
        }
    }

    /// Level as a rounded percentage
    pub fn percent(&self) -> u8 {
        (self.level.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// What the location line shows while no fresh fix is available
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LocationStatus {
    /// Tracker not running
    #[default]
    Idle,
    /// Running, no fix yet
    Acquiring,
    /// Last attempt produced a fix
    Fixed { at: DateTime<Utc> },
    /// Last attempt failed; any earlier sample is kept
    Error(String),
    /// Host has no geolocation
    Unsupported,
}

impl LocationStatus {
    /// Human-readable text for the location line, `None` once a fix is in
    pub fn describe(&self) -> Option<String> {
        match self {
            Self::Idle | Self::Acquiring => Some("Acquiring coordinates...".to_string()),
            Self::Fixed { .. } => None,
            Self::Error(reason) => Some(format!("Location Error: {reason}")),
            Self::Unsupported => Some("Geolocation is not supported on this device.".to_string()),
        }
    }
}

/// Shared state container, created once at app start
pub struct SignalState {
    active: watch::Sender<bool>,
    location: watch::Sender<Option<LocationSample>>,
    location_status: watch::Sender<LocationStatus>,
    battery: watch::Sender<Option<BatterySample>>,
}

impl SignalState {
    pub fn new() -> Self {
        Self {
            active: watch::Sender::new(false),
            location: watch::Sender::new(None),
            location_status: watch::Sender::new(LocationStatus::Idle),
            battery: watch::Sender::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        *self.active.borrow()
    }

    pub fn location(&self) -> Option<LocationSample> {
        *self.location.borrow()
    }

    pub fn location_status(&self) -> LocationStatus {
        self.location_status.borrow().clone()
    }

    pub fn battery(&self) -> Option<BatterySample> {
        *self.battery.borrow()
    }

    pub fn subscribe_active(&self) -> watch::Receiver<bool> {
        self.active.subscribe()
    }

    pub fn subscribe_location(&self) -> watch::Receiver<Option<LocationSample>> {
        self.location.subscribe()
    }

    pub fn subscribe_battery(&self) -> watch::Receiver<Option<BatterySample>> {
        self.battery.subscribe()
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.active.send_replace(active);
    }

    pub(crate) fn record_fix(&self, sample: LocationSample) {
        self.location.send_replace(Some(sample));
        self.location_status
            .send_replace(LocationStatus::Fixed { at: Utc::now() });
    }

    /// Failure keeps the last good sample
    pub(crate) fn record_location_error(&self, reason: String) {
        self.location_status.send_replace(LocationStatus::Error(reason));
    }

    pub(crate) fn set_location_status(&self, status: LocationStatus) {
        self.location_status.send_replace(status);
    }

    pub(crate) fn clear_location(&self) {
        self.location.send_replace(None);
        self.location_status.send_replace(LocationStatus::Idle);
    }

    /// Returns true when the stored sample changed
    pub(crate) fn record_battery(&self, sample: BatterySample) -> bool {
        self.battery.send_if_modified(|current| {
            if *current == Some(sample) {
                false
            } else {
                *current = Some(sample);
                true
            }
        })
    }
}

impl Default for SignalState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_keeps_last_fix() {
        let state = SignalState::new();
        state.record_fix(LocationSample::new(1.0, 2.0));
        state.record_location_error("Timeout expired".into());

        assert_eq!(state.location(), Some(LocationSample::new(1.0, 2.0)));
        assert_eq!(
            state.location_status().describe().as_deref(),
            Some("Location Error: Timeout expired")
        );
    }

    #[test]
    fn test_battery_only_publishes_changes() {
        let state = SignalState::new();
        let mut rx = state.subscribe_battery();

        assert!(state.record_battery(BatterySample::new(0.5, false)));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(!state.record_battery(BatterySample::new(0.5, false)));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_battery_percent_rounds() {
        assert_eq!(BatterySample::new(0.426, true).percent(), 43);
        assert_eq!(BatterySample::new(1.7, false).level, 1.0);
    }

    #[test]
    fn test_status_text_before_first_fix() {
        assert_eq!(
            LocationStatus::Acquiring.describe().as_deref(),
            Some("Acquiring coordinates...")
        );
        assert!(LocationStatus::Fixed { at: Utc::now() }.describe().is_none());
    }
}
