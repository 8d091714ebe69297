// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Native audio output through cpal
//!
//! cpal streams are not `Send` on every backend, so each tone owns a dedicated
//! thread that builds, plays and finally drops its stream. The tone talks to the
//! audio callback through a shared oscillator state.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use super::{AudioOutput, PlatformError, Tone};

#[derive(Debug)]
struct Oscillator {
    phase: f32,
    frequency: f32,
    target: f32,
    /// Hz added per sample while ramping
    step: f32,
    gain: f32,
}

impl Oscillator {
    fn next_sample(&mut self, sample_rate: f32) -> f32 {
        if self.step != 0.0 {
            self.frequency += self.step;
            let reached = (self.step > 0.0 && self.frequency >= self.target)
                || (self.step < 0.0 && self.frequency <= self.target);
            if reached {
                self.frequency = self.target;
                self.step = 0.0;
            }
        }
        self.phase = (self.phase + self.frequency / sample_rate).fract();
        (self.phase * std::f32::consts::TAU).sin() * self.gain
    }
}

/// Default output device of the default host
pub struct CpalAudio;

impl CpalAudio {
    pub fn probe() -> Option<Self> {
        let host = cpal::default_host();
        match host.default_output_device() {
            Some(device) => {
                info!(
                    "Audio output: {}",
                    device.name().unwrap_or_else(|_| "unknown".to_string())
                );
                Some(Self)
            }
            None => None,
        }
    }
}

impl AudioOutput for CpalAudio {
    fn open(&self) -> Result<Box<dyn Tone>, PlatformError> {
        let osc = Arc::new(Mutex::new(Oscillator {
            phase: 0.0,
            frequency: 0.0,
            target: 0.0,
            step: 0.0,
            gain: 0.0,
        }));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<f32, PlatformError>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread_osc = osc.clone();
        let thread = std::thread::Builder::new()
            .name("siren-audio".to_string())
            .spawn(move || run_stream(thread_osc, ready_tx, stop_rx))
            .map_err(|e| PlatformError::Device(e.to_string()))?;

        let sample_rate = ready_rx
            .recv()
            .map_err(|_| PlatformError::Device("audio thread exited".to_string()))??;

        Ok(Box::new(CpalTone {
            osc,
            sample_rate,
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        }))
    }
}

fn run_stream(
    osc: Arc<Mutex<Oscillator>>,
    ready: mpsc::Sender<Result<f32, PlatformError>>,
    stop: mpsc::Receiver<()>,
) {
    let host = cpal::default_host();
    let Some(device) = host.default_output_device() else {
        let _ = ready.send(Err(PlatformError::Unsupported("audio output")));
        return;
    };
    let supported = match device.default_output_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = ready.send(Err(device_err(&e)));
            return;
        }
    };
    if supported.sample_format() != cpal::SampleFormat::F32 {
        let _ = ready.send(Err(PlatformError::Unsupported("non-f32 audio output")));
        return;
    }

    let config: cpal::StreamConfig = supported.into();
    let sample_rate = config.sample_rate.0 as f32;
    let channels = config.channels as usize;

    let callback_osc = osc.clone();
    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let mut osc = callback_osc.lock();
            for frame in data.chunks_mut(channels) {
                let value = osc.next_sample(sample_rate);
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        },
        |e| error!("Audio stream error: {}", e),
        None,
    );
    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let _ = ready.send(Err(device_err(&e)));
            return;
        }
    };
    if let Err(e) = stream.play() {
        let _ = ready.send(Err(device_err(&e)));
        return;
    }

    let _ = ready.send(Ok(sample_rate));
    // Blocks until the tone is closed or dropped
    let _ = stop.recv();
    osc.lock().gain = 0.0;
    drop(stream);
    debug!("Audio stream released");
}

fn device_err(e: &impl std::fmt::Display) -> PlatformError {
    PlatformError::Device(e.to_string())
}

struct CpalTone {
    osc: Arc<Mutex<Oscillator>>,
    sample_rate: f32,
    stop_tx: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Tone for CpalTone {
    fn set_gain(&mut self, gain: f32) {
        self.osc.lock().gain = gain.clamp(0.0, 1.0);
    }

    fn set_frequency(&mut self, hz: f32) {
        let mut osc = self.osc.lock();
        osc.frequency = hz;
        osc.target = hz;
        osc.step = 0.0;
    }

    fn ramp_frequency(&mut self, hz: f32, over: Duration) {
        let mut osc = self.osc.lock();
        let samples = (over.as_secs_f32() * self.sample_rate).max(1.0);
        osc.target = hz;
        osc.step = (hz - osc.frequency) / samples;
    }

    fn close(&mut self) -> Result<(), PlatformError> {
        self.osc.lock().gain = 0.0;
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| PlatformError::Device("audio thread panicked".to_string()))?;
        }
        Ok(())
    }
}

impl Drop for CpalTone {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_reaches_target() {
        let mut osc = Oscillator {
            phase: 0.0,
            frequency: 800.0,
            target: 600.0,
            step: -200.0 / 4800.0,
            gain: 0.5,
        };
        for _ in 0..5000 {
            osc.next_sample(48_000.0);
        }
        assert_eq!(osc.frequency, 600.0);
        assert_eq!(osc.step, 0.0);
    }
}
