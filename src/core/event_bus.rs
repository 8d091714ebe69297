// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Event bus for session notifications

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::state::{BatterySample, LocationSample};

/// Output channel of an alert session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Siren,
    Vibration,
    Location,
}

/// Something observers may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalEvent {
    ConfirmationRequested,
    ConfirmationDeclined,
    Activated { session_id: String },
    Deactivated { session_id: String },
    /// A channel could not start; the session continues without it
    Degraded { channel: Channel, reason: String },
    LocationUpdated(LocationSample),
    LocationFailed(String),
    BatteryUpdated(BatterySample),
}

/// Envelope with sequence number and time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: SignalEvent,
}

/// Broadcast hub. Publishing with no subscribers is not an error.
pub struct EventBus {
    tx: broadcast::Sender<Event>,
    counter: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            counter: AtomicU64::new(0),
        }
    }

    pub fn publish(&self, payload: SignalEvent) {
        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send(Event {
            id,
            timestamp: Utc::now(),
            payload,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
