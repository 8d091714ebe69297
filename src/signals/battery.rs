// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Battery listener, independent of alert sessions

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::scheduler::{spawn_guarded, Epoch, TaskHandle};
use crate::core::{EventBus, SignalEvent, SignalState};
use crate::platform::BatterySource;

pub struct BatteryMonitor {
    source: Option<Arc<dyn BatterySource>>,
    state: Arc<SignalState>,
    events: Arc<EventBus>,
    poll_interval: Duration,
    epoch: Epoch,
    task: Option<TaskHandle>,
}

impl BatteryMonitor {
    pub fn new(
        source: Option<Arc<dyn BatterySource>>,
        state: Arc<SignalState>,
        events: Arc<EventBus>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            state,
            events,
            poll_interval,
            epoch: Epoch::new(),
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Begin publishing samples. Without a battery source the sample stays absent.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let Some(source) = self.source.clone() else {
            debug!("No battery source; battery status unavailable");
            return;
        };

        let state = self.state.clone();
        let events = self.events.clone();
        let interval = self.poll_interval;

        self.task = Some(spawn_guarded("battery", &self.epoch, move |guard| async move {
            let mut failing = false;
            loop {
                match source.read().await {
                    Ok(sample) => {
                        failing = false;
                        if guard.is_current() && state.record_battery(sample) {
                            debug!("Battery {}% charging {}", sample.percent(), sample.charging);
                            events.publish(SignalEvent::BatteryUpdated(sample));
                        }
                    }
                    Err(e) if !failing => {
                        failing = true;
                        warn!("Battery read failed: {}", e);
                    }
                    Err(_) => {}
                }
                if !guard.is_current() {
                    break;
                }
                tokio::time::sleep(interval).await;
            }
        }));
        info!("Battery monitor started");
    }

    pub fn stop(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }
}

impl Drop for BatteryMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BatterySample;
    use crate::platform::SimulatedBattery;

    #[tokio::test(start_paused = true)]
    async fn test_publishes_changes_only() {
        let battery = Arc::new(SimulatedBattery::fixed(0.8, false));
        let state = Arc::new(SignalState::new());
        let events = Arc::new(EventBus::default());
        let mut rx = events.subscribe();

        let mut monitor = BatteryMonitor::new(
            Some(battery.clone() as Arc<dyn BatterySource>),
            state.clone(),
            events,
            Duration::from_secs(1),
        );
        monitor.start();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(state.battery(), Some(BatterySample::new(0.8, false)));

        battery.set(0.8, true);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(state.battery(), Some(BatterySample::new(0.8, true)));

        let mut updates = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event.payload, SignalEvent::BatteryUpdated(_)) {
                updates += 1;
            }
        }
        assert_eq!(updates, 2);
    }

    #[test]
    fn test_without_source() {
        let mut monitor = BatteryMonitor::new(
            None,
            Arc::new(SignalState::new()),
            Arc::new(EventBus::default()),
            Duration::from_secs(1),
        );
        monitor.start();
        assert!(!monitor.is_running());
    }
}
