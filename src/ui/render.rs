// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Plain-text rendering of the active display and the status viewer

use std::fmt::Write as _;

use crate::core::{BatterySample, LocationSample, LocationStatus};
use crate::status::StatusSnapshot;

const BAR_CELLS: usize = 10;

/// Bar color band of the battery widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryBand {
    Good,
    Low,
    Critical,
}

impl BatteryBand {
    pub fn of(percent: u8) -> Self {
        if percent > 50 {
            Self::Good
        } else if percent > 20 {
            Self::Low
        } else {
            Self::Critical
        }
    }
}

/// `⚡[######    ] 60%`
pub fn battery_widget(battery: &BatterySample) -> String {
    let percent = battery.percent();
    let filled = (usize::from(percent) * BAR_CELLS + 50) / 100;
    let bolt = if battery.charging { "⚡" } else { "" };
    format!(
        "{}[{}{}] {}%",
        bolt,
        "#".repeat(filled),
        " ".repeat(BAR_CELLS - filled),
        percent
    )
}

/// Coordinates to five decimals, or whatever the tracker last reported
pub fn location_line(location: Option<LocationSample>, status: &LocationStatus) -> String {
    match location {
        Some(loc) => format!("{:.5}, {:.5}", loc.latitude, loc.longitude),
        None => status
            .describe()
            .unwrap_or_else(|| "Acquiring coordinates...".to_string()),
    }
}

pub fn maps_link(location: &LocationSample) -> String {
    format!(
        "https://www.google.com/maps?q={},{}",
        location.latitude, location.longitude
    )
}

/// Read-only page for a received status link
pub fn status_view(snapshot: &StatusSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Emergency Alert Status");
    let _ = writeln!(out);

    let _ = writeln!(out, "MESSAGE");
    let message = if snapshot.message.is_empty() {
        "No message provided."
    } else {
        snapshot.message.as_str()
    };
    let _ = writeln!(out, "  {}", message);
    let _ = writeln!(out);

    let _ = writeln!(out, "LAST KNOWN LOCATION");
    match &snapshot.location {
        Some(loc) => {
            let _ = writeln!(out, "  {:.6}, {:.6}", loc.latitude, loc.longitude);
            let _ = writeln!(out, "  Open in Google Maps: {}", maps_link(loc));
        }
        None => {
            let _ = writeln!(out, "  Location not available.");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "DEVICE BATTERY");
    match &snapshot.battery {
        Some(battery) => {
            let _ = writeln!(out, "  {}", battery_widget(battery));
        }
        None => {
            let _ = writeln!(out, "  Battery status not available.");
        }
    }
    let _ = writeln!(out);
    let _ = write!(out, "This is a status page generated by the Distress Signal app.");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_widget() {
        assert_eq!(battery_widget(&BatterySample::new(0.42, false)), "[####      ] 42%");
        assert_eq!(battery_widget(&BatterySample::new(1.0, true)), "⚡[##########] 100%");
        assert_eq!(BatteryBand::of(42), BatteryBand::Low);
        assert_eq!(BatteryBand::of(20), BatteryBand::Critical);
        assert_eq!(BatteryBand::of(51), BatteryBand::Good);
    }

    #[test]
    fn test_location_line() {
        assert_eq!(
            location_line(Some(LocationSample::new(37.7749, -122.4194)), &LocationStatus::Idle),
            "37.77490, -122.41940"
        );
        assert_eq!(
            location_line(None, &LocationStatus::Error("Timeout expired".into())),
            "Location Error: Timeout expired"
        );
        assert_eq!(
            location_line(None, &LocationStatus::Acquiring),
            "Acquiring coordinates..."
        );
    }

    #[test]
    fn test_status_view_full() {
        let view = status_view(&StatusSnapshot::new(
            "Help, car broke down",
            Some(LocationSample::new(37.7749, -122.4194)),
            Some(BatterySample::new(0.42, false)),
        ));
        assert!(view.starts_with("Emergency Alert Status"));
        assert!(view.contains("  Help, car broke down"));
        assert!(view.contains("37.774900, -122.419400"));
        assert!(view.contains("https://www.google.com/maps?q=37.7749,-122.4194"));
        assert!(view.contains("42%"));
    }

    #[test]
    fn test_status_view_empty() {
        let view = status_view(&StatusSnapshot::default());
        assert!(view.contains("No message provided."));
        assert!(view.contains("Location not available."));
        assert!(view.contains("Battery status not available."));
    }
}
