// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Distress - personal safety signaling
//!
//! One confirmed activation drives an audible siren, a repeating vibration pattern
//! and continuous location tracking as a single alert session. The current message,
//! last fix and battery level can be packed into a self-contained status link and
//! texted to emergency contacts; anyone opening the link sees a read-only view with
//! no server involved.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Session Controller                    │
//! │  request → confirm → active            deactivate → idle │
//! ├──────────────┬───────────────────┬───────────────────────┤
//! │ Audio Siren  │ Vibration Sched.  │ Location Tracker      │
//! └──────┬───────┴─────────┬─────────┴───────────┬───────────┘
//!        ↓                 ↓                     ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  Capabilities (audio, vibration, geolocation, battery)   │
//! └──────────────────────────────────────────────────────────┘
//!        SignalState (watch) ──→ Status Codec ──→ status link
//!        EventBus (broadcast) ──→ console
//! ```

pub mod config;
pub mod core;
pub mod db;
pub mod platform;
pub mod signals;
pub mod status;
pub mod ui;

// Re-exports for convenience
pub use config::Config;
pub use core::{EventBus, SessionController, Settings, SignalEvent, SignalState};
pub use db::{Database, MemoryStore, SettingsStore};
pub use platform::Capabilities;
pub use status::StatusSnapshot;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display name
pub const NAME: &str = "Distress Signal";
