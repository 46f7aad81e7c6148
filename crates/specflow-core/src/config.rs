//! Tunable constants for capture and rendering.
//!
//! Every value here has a documented default. The thresholds, band limits and
//! alpha slope were picked by ear and eye; they are exposed so they can be
//! changed from the settings file without touching the renderer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Frequency band is empty, inverted or starts at zero
    #[error("Invalid frequency band: {low} Hz - {high} Hz")]
    InvalidBand {
        /// Lower bound in Hz
        low: f32,
        /// Upper bound in Hz
        high: f32,
    },

    /// Medium threshold above high threshold
    #[error("Medium threshold {medium} must not exceed high threshold {high}")]
    InvalidThresholds {
        /// Medium colour threshold
        medium: u8,
        /// High colour threshold
        high: u8,
    },

    /// Sub-step factor is not positive, finite and at most 16
    #[error("Sub-step factor must be in (0, {max}], got {0}", max = MAX_SUB_STEP_FACTOR)]
    InvalidSubStepFactor(f64),

    /// FFT size is not a power of two or too small
    #[error("FFT size must be a power of two >= 32, got {0}")]
    InvalidFftSize(usize),

    /// Smoothing outside [0, 1)
    #[error("Smoothing must be in [0, 1), got {0}")]
    InvalidSmoothing(f32),

    /// Decibel window is empty or inverted
    #[error("Invalid decibel range: {min} dB - {max} dB")]
    InvalidDecibelRange {
        /// Lower end of the window
        min: f32,
        /// Upper end of the window
        max: f32,
    },
}

/// Upper bound on columns drawn per frame; each one costs an FFT
pub const MAX_SUB_STEP_FACTOR: f64 = 16.0;

/// RGB colours for the three magnitude bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Colour for magnitudes below the medium threshold
    pub low: [u8; 3],
    /// Colour for magnitudes below the high threshold
    pub medium: [u8; 3],
    /// Colour for everything else
    pub high: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            low: [0, 102, 204],
            medium: [255, 255, 0],
            high: [255, 0, 0],
        }
    }
}

/// Renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrogramConfig {
    /// Lowest frequency drawn (Hz, inclusive). Maps to the bottom row.
    pub low_bound_hz: f32,
    /// Highest frequency drawn (Hz, inclusive). Maps to the top row.
    pub high_bound_hz: f32,
    /// Magnitudes below this use the low colour
    pub medium_threshold: u8,
    /// Magnitudes below this (and at or above `medium_threshold`) use the medium colour
    pub high_threshold: u8,
    /// Average number of columns added per displayed frame
    pub sub_step_factor: f64,
    /// Band colours
    pub palette: Palette,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            low_bound_hz: 149.0,
            high_bound_hz: 20000.0,
            medium_threshold: 100,
            high_threshold: 170,
            sub_step_factor: 1.1,
            palette: Palette::default(),
        }
    }
}

impl SpectrogramConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let band_ok = self.low_bound_hz.is_finite()
            && self.high_bound_hz.is_finite()
            && self.low_bound_hz > 0.0
            && self.low_bound_hz < self.high_bound_hz;
        if !band_ok {
            return Err(ConfigError::InvalidBand {
                low: self.low_bound_hz,
                high: self.high_bound_hz,
            });
        }
        if self.medium_threshold > self.high_threshold {
            return Err(ConfigError::InvalidThresholds {
                medium: self.medium_threshold,
                high: self.high_threshold,
            });
        }
        let factor = self.sub_step_factor;
        if !(factor.is_finite() && factor > 0.0 && factor <= MAX_SUB_STEP_FACTOR) {
            return Err(ConfigError::InvalidSubStepFactor(self.sub_step_factor));
        }
        Ok(())
    }
}

/// Capture and analyser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Transform size in samples (power of 2). The snapshot has half as many bins.
    pub fft_size: usize,
    /// Time smoothing between consecutive spectra (0.0 = none)
    pub smoothing: f32,
    /// Level mapped to byte value 0
    pub min_decibels: f32,
    /// Level mapped to byte value 255
    pub max_decibels: f32,
    /// Input device name, `None` for the host default
    pub device_name: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
            device_name: None,
        }
    }
}

impl CaptureConfig {
    /// Number of frequency bins in a snapshot
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(ConfigError::InvalidFftSize(self.fft_size));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing));
        }
        let db_ok = self.min_decibels.is_finite()
            && self.max_decibels.is_finite()
            && self.min_decibels < self.max_decibels;
        if !db_ok {
            return Err(ConfigError::InvalidDecibelRange {
                min: self.min_decibels,
                max: self.max_decibels,
            });
        }
        Ok(())
    }
}
