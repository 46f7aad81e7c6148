//! Synthetic capture source
//!
//! Generates a test signal instead of reading a microphone. Used by the
//! `--synthetic` demo mode and by tests that need a deterministic stream,
//! including a denied permission and a stream that dies mid-session.

use tracing::{debug, info};

use super::analyser::ByteSpectrumAnalyser;
use super::{AudioHandle, CaptureError, CaptureSource, Result};
use crate::config::CaptureConfig;

/// Test signal shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// Constant sine tone
    Tone {
        /// Frequency in Hz
        frequency: f32,
        /// Peak amplitude (0.0 - 1.0)
        amplitude: f32,
    },
    /// Exponential sweep from `from` to `to` Hz, restarting every `period_secs`
    Sweep {
        /// Start frequency in Hz
        from: f32,
        /// End frequency in Hz
        to: f32,
        /// Sweep duration in seconds
        period_secs: f32,
        /// Peak amplitude (0.0 - 1.0)
        amplitude: f32,
    },
    /// Digital silence
    Silence,
}

impl Default for Signal {
    fn default() -> Self {
        Self::Sweep {
            from: 200.0,
            to: 8000.0,
            period_secs: 4.0,
            amplitude: 0.5,
        }
    }
}

/// Capture source backed by a signal generator
#[derive(Debug, Clone)]
pub struct SyntheticCapture {
    config: CaptureConfig,
    sample_rate: u32,
    signal: Signal,
    /// Samples generated per snapshot (one display frame worth)
    samples_per_pull: usize,
    deny_access: bool,
    fail_after: Option<usize>,
}

impl SyntheticCapture {
    /// Create a source producing `signal` at `sample_rate`
    pub fn new(config: CaptureConfig, sample_rate: u32, signal: Signal) -> Self {
        Self {
            config,
            sample_rate,
            signal,
            samples_per_pull: (sample_rate / 60).max(1) as usize,
            deny_access: false,
            fail_after: None,
        }
    }

    /// A source whose `open` always fails with a permission error
    pub fn denied(config: CaptureConfig) -> Self {
        Self {
            deny_access: true,
            ..Self::new(config, 48000, Signal::Silence)
        }
    }

    /// Make opened handles fail with `StreamLost` after `snapshots` pulls
    pub fn with_fault_after(mut self, snapshots: usize) -> Self {
        self.fail_after = Some(snapshots);
        self
    }
}

impl CaptureSource for SyntheticCapture {
    type Handle = SyntheticHandle;

    fn open(&mut self) -> Result<SyntheticHandle> {
        if self.deny_access {
            return Err(CaptureError::PermissionDenied(
                "synthetic source configured to deny access".to_string(),
            ));
        }
        info!(
            "Synthetic capture opened: {:?} @ {}Hz",
            self.signal, self.sample_rate
        );
        Ok(SyntheticHandle {
            analyser: ByteSpectrumAnalyser::new(self.config.clone()),
            sample_rate: self.sample_rate,
            signal: self.signal,
            samples_per_pull: self.samples_per_pull,
            scratch: Vec::with_capacity(self.samples_per_pull),
            sample_index: 0,
            phase: 0.0,
            pulls: 0,
            fail_after: self.fail_after,
            open: true,
        })
    }
}

/// Handle for an open synthetic stream
pub struct SyntheticHandle {
    analyser: ByteSpectrumAnalyser,
    sample_rate: u32,
    signal: Signal,
    samples_per_pull: usize,
    scratch: Vec<f32>,
    sample_index: u64,
    phase: f64,
    pulls: usize,
    fail_after: Option<usize>,
    open: bool,
}

impl SyntheticHandle {
    /// Frequency of sample `index`; time is kept in f64 so long runs stay exact
    fn frequency_at_sample(&self, index: u64) -> f64 {
        match self.signal {
            Signal::Tone { frequency, .. } => f64::from(frequency),
            Signal::Sweep {
                from,
                to,
                period_secs,
                ..
            } => {
                let (from, to, period) = (f64::from(from), f64::from(to), f64::from(period_secs));
                let t = index as f64 / f64::from(self.sample_rate);
                let progress = (t % period) / period;
                from * (to / from).powf(progress)
            }
            Signal::Silence => 0.0,
        }
    }

    fn generate(&mut self) {
        let amplitude = match self.signal {
            Signal::Tone { amplitude, .. } | Signal::Sweep { amplitude, .. } => amplitude,
            Signal::Silence => 0.0,
        };
        let dt = 1.0 / f64::from(self.sample_rate);

        self.scratch.clear();
        for _ in 0..self.samples_per_pull {
            let freq = self.frequency_at_sample(self.sample_index);
            // Integrate phase so sweeps stay continuous
            self.phase = (self.phase + freq * dt).fract();
            let value = (std::f64::consts::TAU * self.phase).sin() as f32;
            self.scratch.push(value * amplitude);
            self.sample_index += 1;
        }
        self.analyser.push_samples(&self.scratch);
    }
}

impl AudioHandle for SyntheticHandle {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn bin_count(&self) -> usize {
        self.analyser.bin_count()
    }

    fn frequency_snapshot(&mut self) -> Result<&[u8]> {
        if !self.open {
            return Err(CaptureError::Closed);
        }
        if let Some(limit) = self.fail_after {
            if self.pulls >= limit {
                return Err(CaptureError::StreamLost(
                    "synthetic device unplugged".to_string(),
                ));
            }
        }
        self.pulls += 1;
        self.generate();
        Ok(self.analyser.byte_frequency_data())
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            debug!("Synthetic capture closed after {} snapshots", self.pulls);
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
