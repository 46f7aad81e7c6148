//! Logarithmic frequency axis
//!
//! Maps frequencies inside an inclusive band onto canvas rows so that every
//! octave covers the same number of pixels. Row 0 is the top of the canvas
//! (high bound), the last row is the bottom (low bound).

/// Centre frequency of FFT bin `index` for a snapshot of `bin_count` bins.
pub fn bin_frequency(index: usize, sample_rate: u32, bin_count: usize) -> f64 {
    index as f64 * f64::from(sample_rate) / (2.0 * bin_count as f64)
}

/// Frequency to row mapping for one canvas height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogFrequencyAxis {
    low_hz: f32,
    high_hz: f32,
    height: usize,
    /// log(high / low), cached
    log_span: f32,
}

impl LogFrequencyAxis {
    /// Create an axis. `low_hz` must be positive and below `high_hz`.
    pub fn new(low_hz: f32, high_hz: f32, height: usize) -> Self {
        Self {
            low_hz,
            high_hz,
            height,
            log_span: (high_hz / low_hz).ln(),
        }
    }

    /// Lower band limit (Hz)
    pub fn low_hz(&self) -> f32 {
        self.low_hz
    }

    /// Upper band limit (Hz)
    pub fn high_hz(&self) -> f32 {
        self.high_hz
    }

    /// Canvas height in rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether `freq` lies inside the inclusive band
    pub fn contains(&self, freq: f32) -> bool {
        freq >= self.low_hz && freq <= self.high_hz
    }

    /// Row for `freq`, or `None` outside the band.
    ///
    /// `y = floor((1 - ln(f/low) / ln(high/low)) * height)`, clamped to the
    /// last row so the low bound lands on the bottom row instead of one past it.
    pub fn row_for(&self, freq: f32) -> Option<usize> {
        if !self.contains(freq) || self.height == 0 {
            return None;
        }
        let position = 1.0 - (freq / self.low_hz).ln() / self.log_span;
        let row = (position * self.height as f32).floor().max(0.0) as usize;
        Some(row.min(self.height - 1))
    }

    /// Frequency at the top edge of `row`; inverse of [`Self::row_for`].
    pub fn frequency_at_row(&self, row: usize) -> f32 {
        let position = row as f32 / self.height.max(1) as f32;
        self.low_hz * ((1.0 - position) * self.log_span).exp()
    }
}
