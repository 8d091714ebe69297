// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Two-tone siren

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::config::SirenConfig;
use crate::core::scheduler::{spawn_repeating, Epoch, TaskHandle};
use crate::platform::{AudioOutput, PlatformError, Tone};

/// Siren lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SirenState {
    Stopped,
    Running,
}

/// Alternates between two frequencies on a fixed cadence
pub struct AudioSiren {
    output: Option<Arc<dyn AudioOutput>>,
    config: SirenConfig,
    epoch: Epoch,
    tone: Option<Arc<Mutex<Box<dyn Tone>>>>,
    ticker: Option<TaskHandle>,
}

impl AudioSiren {
    pub fn new(output: Option<Arc<dyn AudioOutput>>, config: SirenConfig) -> Self {
        Self {
            output,
            config,
            epoch: Epoch::new(),
            tone: None,
            ticker: None,
        }
    }

    pub fn state(&self) -> SirenState {
        if self.tone.is_some() {
            SirenState::Running
        } else {
            SirenState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SirenState::Running
    }

    /// No-op when already running or silent. Errors leave the siren stopped.
    pub fn start(&mut self, silent: bool) -> Result<(), PlatformError> {
        if silent {
            debug!("Siren suppressed by silent mode");
            return Ok(());
        }
        if self.is_running() {
            debug!("Siren already running");
            return Ok(());
        }

        let output = self
            .output
            .as_ref()
            .ok_or(PlatformError::Unsupported("audio"))?;
        let mut tone = output.open()?;
        tone.set_gain(self.config.gain);
        tone.set_frequency(self.config.high_hz);
        let tone = Arc::new(Mutex::new(tone));

        let (high, low) = (self.config.high_hz, self.config.low_hz);
        let ramp = Duration::from_millis(self.config.ramp_ms);
        let mut to_low = true;
        let ticking = tone.clone();
        let ticker = spawn_repeating(
            "siren",
            &self.epoch,
            Duration::from_millis(self.config.cadence_ms),
            move || {
                let next = if to_low { low } else { high };
                ticking.lock().ramp_frequency(next, ramp);
                to_low = !to_low;
            },
        );

        self.tone = Some(tone);
        self.ticker = Some(ticker);
        info!("Siren started");
        Ok(())
    }

    /// Cancel the cadence and close the oscillator. Returns once silent.
    pub fn stop(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
        if let Some(tone) = self.tone.take() {
            if let Err(e) = tone.lock().close() {
                error!("Failed to close siren audio: {}", e);
            }
            info!("Siren stopped");
        }
    }
}

impl Drop for AudioSiren {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SimulatedAudio;

    fn siren(audio: &Arc<SimulatedAudio>) -> AudioSiren {
        AudioSiren::new(
            Some(audio.clone() as Arc<dyn AudioOutput>),
            SirenConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_alternates_frequencies() {
        let audio = Arc::new(SimulatedAudio::new());
        let mut siren = siren(&audio);
        siren.start(false).unwrap();

        tokio::time::sleep(Duration::from_millis(1250)).await;
        assert_eq!(audio.frequencies(), vec![800.0, 600.0, 800.0, 600.0]);

        siren.stop();
        assert_eq!(audio.live_tones(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_and_double_start() {
        let audio = Arc::new(SimulatedAudio::new());
        let mut siren = siren(&audio);

        siren.start(true).unwrap();
        assert!(!siren.is_running());
        assert_eq!(audio.opened(), 0);

        siren.start(false).unwrap();
        siren.start(false).unwrap();
        assert_eq!(audio.opened(), 1);
        assert_eq!(audio.live_tones(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let audio = Arc::new(SimulatedAudio::new());
        let mut siren = siren(&audio);
        siren.stop();
        siren.start(false).unwrap();
        siren.stop();
        siren.stop();
        assert_eq!(siren.state(), SirenState::Stopped);
        assert_eq!(audio.live_tones(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(audio.frequencies(), vec![800.0]);
    }

    #[tokio::test]
    async fn test_unsupported_and_failing_audio() {
        let mut none = AudioSiren::new(None, SirenConfig::default());
        assert_eq!(none.start(false), Err(PlatformError::Unsupported("audio")));
        assert!(!none.is_running());

        let failing = Arc::new(SimulatedAudio::failing());
        let mut siren = siren(&failing);
        assert!(siren.start(false).is_err());
        assert!(!siren.is_running());
    }
}
