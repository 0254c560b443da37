//! Voice level extraction
//!
//! Each PCM block goes through an FFT band-pass, an RMS measurement and a
//! fixed-depth moving average. The average lags the voice by up
//! to `window` blocks.

use std::collections::VecDeque;
use std::sync::Arc;

use rustfft::{Fft, FftPlanner, Length};
use rustfft::num_complex::Complex;

use crate::settings::AudioSettings;

/// Turns raw PCM16 blocks into a smoothed 0-100 level
pub struct LevelExtractor {
    planner: FftPlanner<f32>,
    /// Forward and inverse plans for the current block length
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    sample_rate: f32,
    band_low: f32,
    band_high: f32,
    scale: f32,
    depth: usize,
    /// Normalized block levels, oldest first
    window: VecDeque<f32>,
    level: f32,
    /// Reused FFT buffer
    spectrum: Vec<Complex<f32>>,
}

impl LevelExtractor {
    pub fn new(settings: &AudioSettings) -> Self {
        let depth = settings.window.max(1);
        log::debug!(
            "LevelExtractor created: sample_rate={}, band={}..{} Hz, window={}",
            settings.sample_rate,
            settings.band_low,
            settings.band_high,
            depth
        );
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(settings.block_size);
        let inverse = planner.plan_fft_inverse(settings.block_size);
        Self {
            planner,
            forward,
            inverse,
            sample_rate: settings.sample_rate as f32,
            band_low: settings.band_low,
            band_high: settings.band_high,
            scale: settings.scale,
            depth,
            window: VecDeque::with_capacity(depth),
            level: 0.0,
            spectrum: Vec::with_capacity(settings.block_size),
        }
    }

    /// Current smoothed level (0-100)
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Number of blocks currently averaged
    #[inline]
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Feed one block and return the new smoothed level
    pub fn ingest(&mut self, block: &[i16]) -> f32 {
        let normalized = self.block_level(block);
        if !normalized.is_finite() {
            // Keep the previous reading
            return self.level;
        }

        if self.window.len() == self.depth {
            self.window.pop_front();
        }
        self.window.push_back(normalized);

        let mean = self.window.iter().sum::<f32>() / self.window.len() as f32;
        self.level = mean.clamp(0.0, 100.0);
        self.level
    }

    /// Normalized level of a single block (band-passed RMS, 0-100)
    pub fn block_level(&mut self, block: &[i16]) -> f32 {
        let energy = self.band_rms(block);
        ((energy / self.scale) * 100.0).min(100.0)
    }

    /// RMS of the block after zeroing every bin outside the pass band
    fn band_rms(&mut self, block: &[i16]) -> f32 {
        let n = block.len();
        if n == 0 {
            return 0.0;
        }

        self.spectrum.clear();
        self.spectrum
            .extend(block.iter().map(|&s| Complex::new(s as f32, 0.0)));

        if self.forward.len() != n {
            log::debug!("Re-planning FFT for {} sample blocks", n);
            self.forward = self.planner.plan_fft_forward(n);
            self.inverse = self.planner.plan_fft_inverse(n);
        }
        self.forward.process(&mut self.spectrum);

        // Bin k and its mirror n - k share the same absolute frequency
        let bin_hz = self.sample_rate / n as f32;
        for (k, bin) in self.spectrum.iter_mut().enumerate() {
            let freq = k.min(n - k) as f32 * bin_hz;
            if freq < self.band_low || freq > self.band_high {
                *bin = Complex::new(0.0, 0.0);
            }
        }

        self.inverse.process(&mut self.spectrum);

        // rustfft leaves the inverse unnormalized
        let norm = 1.0 / n as f32;
        let sum_sq: f32 = self
            .spectrum
            .iter()
            .map(|c| {
                let re = c.re * norm;
                re * re
            })
            .sum();
        (sum_sq / n as f32).sqrt()
    }
}
