// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Simulated host devices for demo mode and tests
//!
//! Each simulator keeps enough bookkeeping (open tones, issued vibration commands,
//! fix attempts) to make the coordinators' behavior observable.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::prelude::*;
use rand_distr::Normal;
use tracing::{debug, trace};

use super::{
    AudioOutput, BatterySource, Clipboard, LocationError, PlatformError, PositionOptions,
    PositionSource, Tone, Vibrator,
};
use crate::core::{BatterySample, LocationSample};

/// Audio device that counts live oscillators instead of making sound
pub struct SimulatedAudio {
    live: Arc<AtomicUsize>,
    opened: AtomicUsize,
    frequencies: Arc<Mutex<Vec<f32>>>,
    fail: bool,
}

impl SimulatedAudio {
    pub fn new() -> Self {
        Self {
            live: Arc::new(AtomicUsize::new(0)),
            opened: AtomicUsize::new(0),
            frequencies: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// A device whose `open` always fails, like a blocked audio context
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Oscillators currently sounding
    pub fn live_tones(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Oscillators opened over the device lifetime
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Every frequency target set or ramped to, in order
    pub fn frequencies(&self) -> Vec<f32> {
        self.frequencies.lock().clone()
    }
}

impl Default for SimulatedAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for SimulatedAudio {
    fn open(&self) -> Result<Box<dyn Tone>, PlatformError> {
        if self.fail {
            return Err(PlatformError::Device("audio context blocked".to_string()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimulatedTone {
            live: self.live.clone(),
            frequencies: self.frequencies.clone(),
            closed: false,
        }))
    }
}

struct SimulatedTone {
    live: Arc<AtomicUsize>,
    frequencies: Arc<Mutex<Vec<f32>>>,
    closed: bool,
}

impl Tone for SimulatedTone {
    fn set_gain(&mut self, gain: f32) {
        trace!("simulated tone gain {}", gain);
    }

    fn set_frequency(&mut self, hz: f32) {
        self.frequencies.lock().push(hz);
    }

    fn ramp_frequency(&mut self, hz: f32, over: Duration) {
        trace!("simulated tone ramp to {} Hz over {:?}", hz, over);
        self.frequencies.lock().push(hz);
    }

    fn close(&mut self) -> Result<(), PlatformError> {
        if !self.closed {
            self.closed = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl Drop for SimulatedTone {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Vibration motor that records every command
#[derive(Default)]
pub struct SimulatedVibrator {
    commands: Mutex<Vec<Vec<u64>>>,
}

impl SimulatedVibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<Vec<u64>> {
        self.commands.lock().clone()
    }

    /// Most recent command, `[0]` after a cancel
    pub fn last(&self) -> Option<Vec<u64>> {
        self.commands.lock().last().cloned()
    }
}

impl Vibrator for SimulatedVibrator {
    fn vibrate(&self, pattern: &[u64]) -> Result<(), PlatformError> {
        debug!("simulated vibrate {:?}", pattern);
        self.commands.lock().push(pattern.to_vec());
        Ok(())
    }
}

enum PositionMode {
    Fixed(LocationSample),
    Jitter {
        origin: LocationSample,
        sigma: f64,
        error_probability: f64,
        rng: Mutex<StdRng>,
    },
    Scripted(Mutex<VecDeque<Result<LocationSample, LocationError>>>),
}

/// Position provider backed by a fixed point, a random walk, or a script
pub struct SimulatedPosition {
    mode: PositionMode,
    latency: Duration,
    attempts: AtomicUsize,
}

impl SimulatedPosition {
    pub fn fixed(sample: LocationSample) -> Self {
        Self::with_mode(PositionMode::Fixed(sample))
    }

    /// Fixes scattered around `origin` with `sigma` degrees of noise
    pub fn jitter(origin: LocationSample, sigma: f64, error_probability: f64) -> Self {
        Self::with_mode(PositionMode::Jitter {
            origin,
            sigma,
            error_probability,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// Plays the outcomes in order, then repeats the last one
    pub fn scripted(outcomes: Vec<Result<LocationSample, LocationError>>) -> Self {
        Self::with_mode(PositionMode::Scripted(Mutex::new(outcomes.into())))
    }

    /// Each fix takes this long before resolving
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn with_mode(mode: PositionMode) -> Self {
        Self {
            mode,
            latency: Duration::ZERO,
            attempts: AtomicUsize::new(0),
        }
    }

    fn next_outcome(&self) -> Result<LocationSample, LocationError> {
        match &self.mode {
            PositionMode::Fixed(sample) => Ok(*sample),
            PositionMode::Jitter {
                origin,
                sigma,
                error_probability,
                rng,
            } => {
                let mut rng = rng.lock();
                if rng.gen::<f64>() < *error_probability {
                    return Err(LocationError::Unavailable("no satellite lock".to_string()));
                }
                let noise = Normal::new(0.0, *sigma).ok();
                let mut offset = || noise.map(|n| n.sample(&mut *rng)).unwrap_or(0.0);
                let lat = origin.latitude + offset();
                let lon = origin.longitude + offset();
                Ok(LocationSample::new(lat.clamp(-90.0, 90.0), lon.clamp(-180.0, 180.0)))
            }
            PositionMode::Scripted(script) => {
                let mut script = script.lock();
                if script.len() > 1 {
                    script.pop_front().unwrap_or(Err(LocationError::Timeout))
                } else {
                    script
                        .front()
                        .cloned()
                        .unwrap_or_else(|| Err(LocationError::Unavailable("no fix".to_string())))
                }
            }
        }
    }
}

#[async_trait]
impl PositionSource for SimulatedPosition {
    async fn fix(&self, options: &PositionOptions) -> Result<LocationSample, LocationError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        trace!("simulated fix, high accuracy {}", options.high_accuracy);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.next_outcome()
    }
}

/// Battery that drains a little on every read
pub struct SimulatedBattery {
    state: Mutex<BatterySample>,
    drain_per_read: f64,
}

impl SimulatedBattery {
    pub fn fixed(level: f64, charging: bool) -> Self {
        Self::draining_from(BatterySample::new(level, charging), 0.0)
    }

    pub fn draining(level: f64, drain_per_read: f64) -> Self {
        Self::draining_from(BatterySample::new(level, false), drain_per_read)
    }

    fn draining_from(sample: BatterySample, drain_per_read: f64) -> Self {
        Self {
            state: Mutex::new(sample),
            drain_per_read,
        }
    }

    /// Simulate the host reporting a change
    pub fn set(&self, level: f64, charging: bool) {
        *self.state.lock() = BatterySample::new(level, charging);
    }
}

#[async_trait]
impl BatterySource for SimulatedBattery {
    async fn read(&self) -> Result<BatterySample, PlatformError> {
        let mut state = self.state.lock();
        let current = *state;
        if !current.charging && self.drain_per_read > 0.0 {
            *state = BatterySample::new(current.level - self.drain_per_read, false);
        }
        Ok(current)
    }
}

/// Clipboard that keeps the last written text
#[derive(Default)]
pub struct SimulatedClipboard {
    last: Mutex<Option<String>>,
}

impl SimulatedClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.last.lock().clone()
    }
}

#[async_trait]
impl Clipboard for SimulatedClipboard {
    async fn write_text(&self, text: &str) -> Result<(), PlatformError> {
        *self.last.lock() = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_drop_releases() {
        let audio = SimulatedAudio::new();
        let tone = audio.open().unwrap();
        assert_eq!(audio.live_tones(), 1);
        drop(tone);
        assert_eq!(audio.live_tones(), 0);
    }

    #[test]
    fn test_failing_audio() {
        let audio = SimulatedAudio::failing();
        assert!(audio.open().is_err());
        assert_eq!(audio.opened(), 0);
    }

    #[tokio::test]
    async fn test_script_repeats_last() {
        let source = SimulatedPosition::scripted(vec![
            Err(LocationError::Timeout),
            Ok(LocationSample::new(1.0, 1.0)),
        ]);
        let opts = PositionOptions::default();

        assert_eq!(source.fix(&opts).await, Err(LocationError::Timeout));
        assert_eq!(source.fix(&opts).await, Ok(LocationSample::new(1.0, 1.0)));
        assert_eq!(source.fix(&opts).await, Ok(LocationSample::new(1.0, 1.0)));
        assert_eq!(source.attempts(), 3);
    }

    #[tokio::test]
    async fn test_jitter_stays_near_origin() {
        let origin = LocationSample::new(37.7749, -122.4194);
        let source = SimulatedPosition::jitter(origin, 0.0001, 0.0);
        let fix = source.fix(&PositionOptions::default()).await.unwrap();
        assert!((fix.latitude - origin.latitude).abs() < 0.01);
        assert!((fix.longitude - origin.longitude).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_battery_drains_until_charging() {
        let battery = SimulatedBattery::draining(0.5, 0.1);
        assert_eq!(battery.read().await.unwrap().level, 0.5);
        assert!((battery.read().await.unwrap().level - 0.4).abs() < 1e-9);

        battery.set(0.4, true);
        assert_eq!(battery.read().await.unwrap(), BatterySample::new(0.4, true));
        assert_eq!(battery.read().await.unwrap(), BatterySample::new(0.4, true));
    }
}
