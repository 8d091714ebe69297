// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Vibration cadence tables

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// SOS in Morse code, alternating on/off durations in milliseconds.
pub const SOS_PATTERN_MS: [u64; 17] = [
    100, 50, 100, 50, 100, // S
    200,                   // letter gap
    300, 50, 300, 50, 300, // O
    200,                   // letter gap
    100, 50, 100, 50, 100, // S
];

/// Trailing pause appended to one SOS cycle.
pub const SOS_TRAILING_PAUSE_MS: u64 = 500;

/// One second buzz.
pub const CONTINUOUS_PATTERN_MS: [u64; 1] = [1000];

/// Continuous cycle: 1 s on, 200 ms off.
pub const CONTINUOUS_CYCLE_MS: u64 = 1000 + 200;

/// Named vibration cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VibrationPattern {
    #[default]
    Sos,
    Continuous,
}

impl VibrationPattern {
    /// On/off durations issued to the vibrator in one go
    pub fn timings(self) -> &'static [u64] {
        match self {
            Self::Sos => &SOS_PATTERN_MS,
            Self::Continuous => &CONTINUOUS_PATTERN_MS,
        }
    }

    /// Period between two pattern issues
    pub fn cycle(self) -> Duration {
        let ms = match self {
            Self::Sos => SOS_PATTERN_MS.iter().sum::<u64>() + SOS_TRAILING_PAUSE_MS,
            Self::Continuous => CONTINUOUS_CYCLE_MS,
        };
        Duration::from_millis(ms)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sos => "SOS",
            Self::Continuous => "CONTINUOUS",
        }
    }
}

impl fmt::Display for VibrationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VibrationPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SOS" => Ok(Self::Sos),
            "CONTINUOUS" => Ok(Self::Continuous),
            other => Err(format!("unknown vibration pattern: {other}")),
        }
    }
}
