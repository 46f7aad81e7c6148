//! Byte spectrum analyser
//!
//! Turns a stream of time-domain samples into the unsigned byte spectrum the
//! renderer consumes: Blackman window, forward FFT, magnitude scaled by 1/N,
//! exponential smoothing over time, conversion to decibels and a linear map of
//! the `[min_decibels, max_decibels]` window onto `0..=255`.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::config::CaptureConfig;

/// FFT analyser producing byte magnitudes (one per bin, half the FFT size)
pub struct ByteSpectrumAnalyser {
    /// FFT instance
    fft: Arc<dyn Fft<f32>>,

    /// Configuration
    config: CaptureConfig,

    /// Input sample buffer (ring buffer holding the latest `fft_size` samples)
    input_buffer: Vec<f32>,

    /// Write position in ring buffer
    buffer_write_pos: usize,

    /// FFT complex buffer
    fft_buffer: Vec<Complex<f32>>,

    /// FFT scratch buffer
    scratch_buffer: Vec<Complex<f32>>,

    /// Blackman window coefficients
    window: Vec<f32>,

    /// Smoothed magnitude buffer (linear)
    smoothed_magnitudes: Vec<f32>,

    /// Byte spectrum handed out to callers
    byte_spectrum: Vec<u8>,

    /// Debug: sample count
    total_samples: u64,

    /// Debug: FFT count
    fft_count: u64,
}

impl ByteSpectrumAnalyser {
    /// Create an analyser. The config is expected to be validated already.
    pub fn new(config: CaptureConfig) -> Self {
        let fft_size = config.fft_size;
        let half_size = fft_size / 2;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        debug!(
            "ByteSpectrumAnalyser created: fft_size={}, smoothing={}, db_window=[{}, {}]",
            fft_size, config.smoothing, config.min_decibels, config.max_decibels
        );

        Self {
            fft,
            input_buffer: vec![0.0; fft_size],
            buffer_write_pos: 0,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch_buffer: vec![Complex::new(0.0, 0.0); scratch_len],
            window: blackman_window(fft_size),
            smoothed_magnitudes: vec![0.0; half_size],
            byte_spectrum: vec![0; half_size],
            total_samples: 0,
            fft_count: 0,
            config,
        }
    }

    /// Append time-domain samples. Only the most recent `fft_size` are kept.
    pub fn push_samples(&mut self, samples: &[f32]) {
        let fft_size = self.config.fft_size;
        // Older samples would be overwritten anyway
        let start = samples.len().saturating_sub(fft_size);
        for &sample in &samples[start..] {
            self.input_buffer[self.buffer_write_pos] = if sample.is_finite() { sample } else { 0.0 };
            self.buffer_write_pos = (self.buffer_write_pos + 1) % fft_size;
        }
        self.total_samples += samples.len() as u64;
    }

    /// Transform the current window and return the refreshed byte spectrum.
    pub fn byte_frequency_data(&mut self) -> &[u8] {
        self.fft_count += 1;
        let fft_size = self.config.fft_size;

        // The write position is where we'll write NEXT, so the oldest sample sits there
        for i in 0..fft_size {
            let src_idx = (self.buffer_write_pos + i) % fft_size;
            self.fft_buffer[i] = Complex::new(self.input_buffer[src_idx] * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch_buffer);

        let norm_factor = 1.0 / fft_size as f32;
        let smoothing = self.config.smoothing;
        let db_span = self.config.max_decibels - self.config.min_decibels;
        let byte_scale = 255.0 / db_span;

        for (i, smoothed) in self.smoothed_magnitudes.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[i].norm() * norm_factor;
            let mut next = smoothing * *smoothed + (1.0 - smoothing) * magnitude;
            if !next.is_finite() {
                next = 0.0;
            }
            *smoothed = next;

            let db = 20.0 * next.log10();
            let scaled = byte_scale * (db - self.config.min_decibels);
            // -inf for silent bins lands on 0 through the clamp
            self.byte_spectrum[i] = if scaled.is_nan() {
                0
            } else {
                scaled.floor().clamp(0.0, 255.0) as u8
            };
        }

        if self.fft_count % 600 == 0 {
            trace!(
                "Analyser: {} FFTs over {}k samples",
                self.fft_count,
                self.total_samples / 1000
            );
        }

        &self.byte_spectrum
    }

    /// Number of bins per snapshot
    pub fn bin_count(&self) -> usize {
        self.byte_spectrum.len()
    }

    /// Transform size
    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }
}

/// Blackman window (alpha = 0.16) over `size` points
fn blackman_window(size: usize) -> Vec<f32> {
    let a0 = 0.42f32;
    let a1 = 0.5f32;
    let a2 = 0.08f32;
    (0..size)
        .map(|i| {
            let t = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            a0 - a1 * t.cos() + a2 * (2.0 * t).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, amplitude: f32, count: usize) -> Vec<f32> {
        (0..count)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin() * amplitude)
            .collect()
    }

    fn unsmoothed() -> CaptureConfig {
        CaptureConfig {
            smoothing: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_bin_count_is_half_fft() {
        let analyser = ByteSpectrumAnalyser::new(CaptureConfig::default());
        assert_eq!(analyser.bin_count(), 1024);
        assert_eq!(analyser.fft_size(), 2048);
    }

    #[test]
    fn test_silence_is_all_zero() {
        let mut analyser = ByteSpectrumAnalyser::new(unsmoothed());
        analyser.push_samples(&vec![0.0; 4096]);
        assert!(analyser.byte_frequency_data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let sample_rate = 48000.0;
        let mut analyser = ByteSpectrumAnalyser::new(unsmoothed());
        analyser.push_samples(&sine(1000.0, sample_rate, 0.5, 4096));

        let data = analyser.byte_frequency_data().to_vec();
        let (peak_bin, &peak) = data
            .iter()
            .enumerate()
            .max_by_key(|&(_, v)| *v)
            .unwrap();

        // 1000 Hz * 2048 / 48000 = 42.7
        assert!((41..=44).contains(&peak_bin), "peak at bin {}", peak_bin);
        assert!(peak > 200, "peak magnitude {}", peak);
        // 10 kHz is far outside the main lobe
        assert!(data[427] < 50, "leakage at 10 kHz: {}", data[427]);
    }

    #[test]
    fn test_smoothing_ramps_up() {
        let sample_rate = 48000.0;
        let mut analyser = ByteSpectrumAnalyser::new(CaptureConfig {
            smoothing: 0.9,
            ..Default::default()
        });
        analyser.push_samples(&sine(1000.0, sample_rate, 0.01, 2048));

        let first = analyser.byte_frequency_data()[43];
        let second = analyser.byte_frequency_data()[43];
        assert!(second > first, "smoothing should rise: {} -> {}", first, second);
    }

    #[test]
    fn test_resilience_to_bad_input() {
        let mut analyser = ByteSpectrumAnalyser::new(unsmoothed());
        analyser.push_samples(&[f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.0]);
        assert!(analyser.byte_frequency_data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_short_pushes_accumulate() {
        let sample_rate = 48000.0;
        let samples = sine(1000.0, sample_rate, 0.5, 2048);
        let mut chunked = ByteSpectrumAnalyser::new(unsmoothed());
        for chunk in samples.chunks(256) {
            chunked.push_samples(chunk);
        }
        let mut whole = ByteSpectrumAnalyser::new(unsmoothed());
        whole.push_samples(&samples);

        assert_eq!(chunked.byte_frequency_data(), whole.byte_frequency_data());
    }

    #[test]
    fn test_window_shape() {
        let window = blackman_window(1024);
        assert!(window[0].abs() < 1e-6);
        assert!((window[512] - 1.0).abs() < 1e-3);
    }
}
