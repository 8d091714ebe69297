// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Continuous position watch

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::core::scheduler::{spawn_guarded, Epoch, TaskHandle};
use crate::core::{EventBus, LocationStatus, SignalEvent, SignalState};
use crate::platform::{LocationError, PlatformError, PositionOptions, PositionSource};

pub struct LocationTracker {
    source: Option<Arc<dyn PositionSource>>,
    state: Arc<SignalState>,
    events: Arc<EventBus>,
    options: PositionOptions,
    fix_interval: Duration,
    epoch: Epoch,
    watch: Option<TaskHandle>,
}

impl LocationTracker {
    pub fn new(
        source: Option<Arc<dyn PositionSource>>,
        state: Arc<SignalState>,
        events: Arc<EventBus>,
        options: PositionOptions,
        fix_interval: Duration,
    ) -> Self {
        Self {
            source,
            state,
            events,
            options,
            fix_interval,
            epoch: Epoch::new(),
            watch: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.watch.is_some()
    }

    /// Start watching from a clean slate. No-op when already watching.
    pub fn start(&mut self) -> Result<(), PlatformError> {
        if self.is_running() {
            debug!("Location watch already running");
            return Ok(());
        }

        self.state.clear_location();
        let Some(source) = self.source.clone() else {
            self.state.set_location_status(LocationStatus::Unsupported);
            return Err(PlatformError::Unsupported("geolocation"));
        };
        self.state.set_location_status(LocationStatus::Acquiring);

        let state = self.state.clone();
        let events = self.events.clone();
        let options = self.options;
        let interval = self.fix_interval;

        let watch = spawn_guarded("location", &self.epoch, move |guard| async move {
            loop {
                let outcome = match timeout(options.timeout, source.fix(&options)).await {
                    Ok(result) => result,
                    Err(_) => Err(LocationError::Timeout),
                };

                // Stopped while the fix was pending
                if !guard.is_current() {
                    debug!("Discarding stale location result");
                    break;
                }

                match outcome {
                    Ok(sample) if sample.is_valid() => {
                        debug!("Location fix {:.5}, {:.5}", sample.latitude, sample.longitude);
                        state.record_fix(sample);
                        events.publish(SignalEvent::LocationUpdated(sample));
                    }
                    Ok(sample) => {
                        let reason = format!(
                            "invalid coordinates {}, {}",
                            sample.latitude, sample.longitude
                        );
                        warn!("Geolocation error: {}", reason);
                        state.record_location_error(reason.clone());
                        events.publish(SignalEvent::LocationFailed(reason));
                    }
                    Err(e) => {
                        warn!("Geolocation error: {}", e);
                        state.record_location_error(e.to_string());
                        events.publish(SignalEvent::LocationFailed(e.to_string()));
                    }
                }

                sleep(interval).await;
            }
        });

        self.watch = Some(watch);
        info!(
            "Location watch started (high accuracy {}, timeout {:?})",
            self.options.high_accuracy, self.options.timeout
        );
        Ok(())
    }

    /// Cancel the watch and forget the session's position
    pub fn stop(&mut self) {
        if let Some(mut watch) = self.watch.take() {
            watch.cancel();
            info!("Location watch stopped");
        }
        self.state.clear_location();
    }
}

impl Drop for LocationTracker {
    fn drop(&mut self) {
        if let Some(mut watch) = self.watch.take() {
            watch.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LocationSample;
    use crate::platform::SimulatedPosition;

    fn tracker(source: Arc<SimulatedPosition>, state: &Arc<SignalState>) -> LocationTracker {
        LocationTracker::new(
            Some(source as Arc<dyn PositionSource>),
            state.clone(),
            Arc::new(EventBus::default()),
            PositionOptions::default(),
            Duration::from_secs(1),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_keeps_previous_fix() {
        let source = Arc::new(SimulatedPosition::scripted(vec![
            Ok(LocationSample::new(10.0, 20.0)),
            Err(LocationError::PermissionDenied),
        ]));
        let state = Arc::new(SignalState::new());
        let mut tracker = tracker(source, &state);

        tracker.start().unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(state.location(), Some(LocationSample::new(10.0, 20.0)));
        assert!(state.location_status().describe().is_none());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(state.location(), Some(LocationSample::new(10.0, 20.0)));
        assert_eq!(
            state.location_status().describe().as_deref(),
            Some("Location Error: User denied Geolocation")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_recoverable() {
        let source = Arc::new(
            SimulatedPosition::fixed(LocationSample::new(1.0, 2.0))
                .with_latency(Duration::from_secs(30)),
        );
        let state = Arc::new(SignalState::new());
        let mut tracker = tracker(source.clone(), &state);

        tracker.start().unwrap();
        assert_eq!(
            state.location_status().describe().as_deref(),
            Some("Acquiring coordinates...")
        );

        tokio::time::sleep(Duration::from_millis(20_100)).await;
        assert_eq!(
            state.location_status(),
            LocationStatus::Error("Timeout expired".to_string())
        );
        assert!(tracker.is_running());

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert!(source.attempts() >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_discards_pending_fix() {
        let source = Arc::new(
            SimulatedPosition::fixed(LocationSample::new(1.0, 2.0))
                .with_latency(Duration::from_secs(5)),
        );
        let state = Arc::new(SignalState::new());
        let mut tracker = tracker(source, &state);

        tracker.start().unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        tracker.stop();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(state.location(), None);
        assert_eq!(state.location_status(), LocationStatus::Idle);
    }

    #[tokio::test]
    async fn test_unsupported() {
        let state = Arc::new(SignalState::new());
        let mut tracker = LocationTracker::new(
            None,
            state.clone(),
            Arc::new(EventBus::default()),
            PositionOptions::default(),
            Duration::from_secs(1),
        );
        assert!(tracker.start().is_err());
        assert_eq!(state.location_status(), LocationStatus::Unsupported);
        tracker.stop();
    }
}
