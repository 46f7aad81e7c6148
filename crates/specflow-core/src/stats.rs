//! Session statistics
//!
//! Every non-zero (frequency, magnitude) pair the renderer draws during one
//! capture session lands in a [`SampleLog`]. When the session stops the log is
//! reduced to a [`SessionStats`] record for persistence.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::{debug, warn};

/// Marker written in place of a value that could not be computed
pub const UNAVAILABLE: &str = "unavailable";

/// A statistic rounded to two decimals, or the unavailable marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    /// Computed value (already rounded to two decimals)
    Value(f64),
    /// Nothing to compute from
    Unavailable,
}

impl StatValue {
    /// Round `value` to two decimals
    pub fn rounded(value: f64) -> Self {
        Self::Value((value * 100.0).round() / 100.0)
    }

    /// The numeric value, if available
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Unavailable => None,
        }
    }

    /// Whether this is the unavailable marker
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{:.2}", v),
            Self::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

impl Serialize for StatValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StatValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text == UNAVAILABLE {
            return Ok(Self::Unavailable);
        }
        text.parse::<f64>()
            .map(Self::Value)
            .map_err(serde::de::Error::custom)
    }
}

/// Summary of one capture session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Highest observed frequency (Hz)
    pub max_frequency: StatValue,
    /// Lowest observed frequency (Hz)
    pub min_frequency: StatValue,
    /// Arithmetic mean of observed frequencies (Hz)
    pub mean_frequency: StatValue,
    /// max - min (Hz)
    pub frequency_range: StatValue,
    /// Arithmetic mean of observed magnitudes (0 - 255)
    pub mean_amplitude: StatValue,
}

impl SessionStats {
    /// Every field unavailable
    pub fn unavailable() -> Self {
        Self {
            max_frequency: StatValue::Unavailable,
            min_frequency: StatValue::Unavailable,
            mean_frequency: StatValue::Unavailable,
            frequency_range: StatValue::Unavailable,
            mean_amplitude: StatValue::Unavailable,
        }
    }
}

/// Parallel sequences of observed frequencies and their magnitudes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleLog {
    frequencies: Vec<f64>,
    amplitudes: Vec<u8>,
}

impl SampleLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one observation
    pub fn push(&mut self, frequency: f64, amplitude: u8) {
        self.frequencies.push(frequency);
        self.amplitudes.push(amplitude);
    }

    /// Observed frequencies in arrival order
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Observed magnitudes in arrival order
    pub fn amplitudes(&self) -> &[u8] {
        &self.amplitudes
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether nothing was observed
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Drop all observations
    pub fn clear(&mut self) {
        self.frequencies.clear();
        self.amplitudes.clear();
    }
}

/// Owns the sample log for one session and reduces it on stop
#[derive(Debug, Clone, Default)]
pub struct SessionStatsAggregator {
    log: SampleLog,
}

impl SessionStatsAggregator {
    /// Create an aggregator with an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session: forget everything collected so far.
    pub fn reset(&mut self) {
        self.log.clear();
        debug!("Session sample log cleared");
    }

    /// Read-only view of the log
    pub fn log(&self) -> &SampleLog {
        &self.log
    }

    /// Mutable access for the renderer
    pub fn log_mut(&mut self) -> &mut SampleLog {
        &mut self.log
    }

    /// Reduce the log to summary statistics. The log is left untouched.
    pub fn finalize(&self) -> SessionStats {
        let frequencies = self.log.frequencies();
        let amplitudes = self.log.amplitudes();

        if frequencies.is_empty() || amplitudes.is_empty() {
            warn!("Not enough samples collected for session statistics");
        }

        let mut stats = SessionStats::unavailable();

        if !frequencies.is_empty() {
            let max = frequencies.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = frequencies.iter().copied().fold(f64::INFINITY, f64::min);
            let mean = frequencies.iter().sum::<f64>() / frequencies.len() as f64;

            stats.max_frequency = StatValue::rounded(max);
            stats.min_frequency = StatValue::rounded(min);
            stats.mean_frequency = StatValue::rounded(mean);
            stats.frequency_range = StatValue::rounded(max - min);
        }

        if !amplitudes.is_empty() {
            let sum: u64 = amplitudes.iter().map(|&a| u64::from(a)).sum();
            stats.mean_amplitude = StatValue::rounded(sum as f64 / amplitudes.len() as f64);
        }

        debug!(
            "Session finalized over {} samples: {:?}",
            self.log.len(),
            stats
        );

        stats
    }
}
