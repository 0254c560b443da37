//! Audio block sources
//!
//! The capture thread only needs something that hands it PCM16 mono blocks;
//! device drivers live behind [`AudioSource`].

use std::f32::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::settings::AudioSettings;

/// Capture failures
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The input device could not be opened
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),
    /// A single block could not be read
    #[error("failed to read audio block: {0}")]
    Read(String),
}

/// A producer of fixed-size PCM16 mono blocks
pub trait AudioSource: Send + 'static {
    /// Acquire the device
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Fill `block` with the next block of samples, blocking until ready
    fn read_block(&mut self, block: &mut Vec<i16>) -> Result<(), CaptureError>;

    /// Release the device
    fn close(&mut self) {}
}

/// Shared amplitude knob for a [`ToneSource`]
#[derive(Debug, Clone, Default)]
pub struct ToneAmplitude(Arc<AtomicU32>);

impl ToneAmplitude {
    pub fn set(&self, amplitude: f32) {
        let amplitude = if amplitude.is_finite() {
            amplitude.clamp(0.0, i16::MAX as f32)
        } else {
            0.0
        };
        self.0.store(amplitude.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// Synthetic microphone: a sine tone whose amplitude can be changed live
pub struct ToneSource {
    frequency: f32,
    sample_rate: f32,
    block_size: usize,
    amplitude: ToneAmplitude,
    /// Sleep one block duration per read, like a real device
    paced: bool,
    phase: f32,
}

impl ToneSource {
    pub fn new(frequency: f32, settings: &AudioSettings, paced: bool) -> Self {
        Self {
            frequency,
            sample_rate: settings.sample_rate as f32,
            block_size: settings.block_size,
            amplitude: ToneAmplitude::default(),
            paced,
            phase: 0.0,
        }
    }

    /// Handle for adjusting the tone amplitude from another thread
    pub fn amplitude(&self) -> ToneAmplitude {
        self.amplitude.clone()
    }

    /// Amplitude whose band-passed RMS maps to `level` (0-100)
    pub fn amplitude_for_level(level: f32, scale: f32) -> f32 {
        level.clamp(0.0, 100.0) / 100.0 * scale * std::f32::consts::SQRT_2
    }
}

impl AudioSource for ToneSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        log::debug!("Tone source opened at {} Hz", self.frequency);
        Ok(())
    }

    fn read_block(&mut self, block: &mut Vec<i16>) -> Result<(), CaptureError> {
        if self.paced {
            thread::sleep(Duration::from_secs_f32(
                self.block_size as f32 / self.sample_rate,
            ));
        }

        let amplitude = self.amplitude.get();
        let step = TAU * self.frequency / self.sample_rate;
        block.clear();
        for _ in 0..self.block_size {
            block.push((amplitude * self.phase.sin()).round() as i16);
            self.phase = (self.phase + step) % TAU;
        }
        Ok(())
    }
}
