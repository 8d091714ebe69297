// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Output coordinators - siren, vibration, location - plus the battery listener

pub mod patterns;
mod siren;
mod vibration;
mod location;
mod battery;

pub use patterns::VibrationPattern;
pub use siren::{AudioSiren, SirenState};
pub use vibration::VibrationScheduler;
pub use location::LocationTracker;
pub use battery::BatteryMonitor;
