// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Repeating vibration pattern

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::patterns::VibrationPattern;
use crate::core::scheduler::{spawn_repeating, Epoch, TaskHandle};
use crate::platform::{PlatformError, Vibrator};

pub struct VibrationScheduler {
    vibrator: Option<Arc<dyn Vibrator>>,
    epoch: Epoch,
    schedule: Option<TaskHandle>,
    pattern: Option<VibrationPattern>,
}

impl VibrationScheduler {
    pub fn new(vibrator: Option<Arc<dyn Vibrator>>) -> Self {
        Self {
            vibrator,
            epoch: Epoch::new(),
            schedule: None,
            pattern: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    /// Pattern captured at the last start, if running
    pub fn pattern(&self) -> Option<VibrationPattern> {
        self.pattern
    }

    /// Issue the pattern now, then once per cycle. No-op when running.
    pub fn start(&mut self, pattern: VibrationPattern) -> Result<(), PlatformError> {
        if self.is_running() {
            debug!("Vibration already running with {:?}", self.pattern);
            return Ok(());
        }
        let vibrator = self
            .vibrator
            .clone()
            .ok_or(PlatformError::Unsupported("vibration"))?;

        vibrator.vibrate(pattern.timings())?;

        let ticking = vibrator.clone();
        let schedule = spawn_repeating("vibration", &self.epoch, pattern.cycle(), move || {
            if let Err(e) = ticking.vibrate(pattern.timings()) {
                warn!("Vibration command failed: {}", e);
            }
        });

        self.schedule = Some(schedule);
        self.pattern = Some(pattern);
        info!("Vibration started ({}, every {:?})", pattern, pattern.cycle());
        Ok(())
    }

    /// Cancel the schedule and silence any vibration in flight
    pub fn stop(&mut self) {
        let Some(mut schedule) = self.schedule.take() else {
            return;
        };
        schedule.cancel();
        self.pattern = None;
        if let Some(vibrator) = &self.vibrator {
            if let Err(e) = vibrator.cancel() {
                warn!("Failed to cancel vibration: {}", e);
            }
        }
        info!("Vibration stopped");
    }
}

impl Drop for VibrationScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SimulatedVibrator;
    use crate::signals::patterns::SOS_PATTERN_MS;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_sos_repeats_on_cycle() {
        let motor = Arc::new(SimulatedVibrator::new());
        let mut scheduler = VibrationScheduler::new(Some(motor.clone() as Arc<dyn Vibrator>));

        scheduler.start(VibrationPattern::Sos).unwrap();
        assert_eq!(motor.commands().len(), 1);

        tokio::time::sleep(Duration::from_millis(2700 * 2 + 10)).await;
        let commands = motor.commands();
        assert_eq!(commands.len(), 3);
        assert!(commands.iter().all(|c| c == &SOS_PATTERN_MS.to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_silences() {
        let motor = Arc::new(SimulatedVibrator::new());
        let mut scheduler = VibrationScheduler::new(Some(motor.clone() as Arc<dyn Vibrator>));

        scheduler.start(VibrationPattern::Continuous).unwrap();
        scheduler.stop();
        assert_eq!(motor.last(), Some(vec![0]));
        assert!(!scheduler.is_running());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(motor.commands().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pattern_fixed_until_restart() {
        let motor = Arc::new(SimulatedVibrator::new());
        let mut scheduler = VibrationScheduler::new(Some(motor.clone() as Arc<dyn Vibrator>));

        scheduler.start(VibrationPattern::Continuous).unwrap();
        scheduler.start(VibrationPattern::Sos).unwrap();
        assert_eq!(scheduler.pattern(), Some(VibrationPattern::Continuous));

        scheduler.stop();
        scheduler.start(VibrationPattern::Sos).unwrap();
        assert_eq!(scheduler.pattern(), Some(VibrationPattern::Sos));
    }

    #[test]
    fn test_unsupported_stop_is_noop() {
        let mut scheduler = VibrationScheduler::new(None);
        scheduler.stop();
        assert!(!scheduler.is_running());
    }
}
