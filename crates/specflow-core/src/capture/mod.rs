//! Audio capture sources.
//!
//! A [`CaptureSource`] hands out an [`AudioHandle`] once microphone access has
//! been granted. The handle produces byte frequency snapshots on demand; the
//! returned slice borrows the handle's internal buffer, which is overwritten on
//! the next pull, so callers cannot keep a snapshot across frames.

use thiserror::Error;

pub mod analyser;
#[cfg(feature = "audio")]
pub mod cpal_backend;
pub mod synthetic;

/// Capture errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Microphone access denied, no input device, or the stream could not be opened
    #[error("Microphone access denied or unavailable: {0}")]
    PermissionDenied(String),

    /// The device reported an error after the stream was running
    #[error("Capture stream lost: {0}")]
    StreamLost(String),

    /// The handle was already closed
    #[error("Capture handle is closed")]
    Closed,
}

/// Result type for capture operations
pub type Result<T> = std::result::Result<T, CaptureError>;

/// A live audio stream that can be sampled for its spectrum.
pub trait AudioHandle {
    /// Input sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Number of bins in a snapshot (half the transform size)
    fn bin_count(&self) -> usize;

    /// Refresh and return the current byte magnitude spectrum.
    fn frequency_snapshot(&mut self) -> Result<&[u8]>;

    /// Release the underlying stream. Calling it twice is a no-op.
    fn close(&mut self);

    /// Whether the handle still owns a stream
    fn is_open(&self) -> bool;
}

/// Something that can ask for microphone access.
pub trait CaptureSource {
    /// Handle type produced on success
    type Handle: AudioHandle;

    /// Request access and open a stream.
    fn open(&mut self) -> Result<Self::Handle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CaptureError::PermissionDenied("no input device".to_string());
        assert_eq!(
            err.to_string(),
            "Microphone access denied or unavailable: no input device"
        );
        assert_eq!(CaptureError::Closed.to_string(), "Capture handle is closed");
    }
}
