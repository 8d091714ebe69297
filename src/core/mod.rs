// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Core module - shared state, events, scheduling and the session controller

mod controller;
mod event_bus;
pub mod scheduler;
mod session;
mod state;

pub use controller::{ActivationState, AlertError, SessionController, ShareOutcome};
pub use event_bus::{Channel, Event, EventBus, SignalEvent};
pub use session::{ContactList, Settings, TextColor, DEFAULT_MESSAGE};
pub use state::{BatterySample, LocationSample, LocationStatus, SignalState};
