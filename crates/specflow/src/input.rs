//! Audio input selection: real microphone or generated test signal.

use specflow_core::capture::synthetic::Signal;
use specflow_core::capture::Result;
use specflow_core::{
    AudioHandle, CaptureConfig, CaptureSource, CpalCapture, CpalHandle, SyntheticCapture,
    SyntheticHandle,
};

/// Sample rate of the generated signal
const SYNTHETIC_SAMPLE_RATE: u32 = 48000;

/// Where audio comes from
pub enum InputSource {
    /// cpal input device
    Microphone(CpalCapture),
    /// Signal generator
    Synthetic(SyntheticCapture),
}

impl InputSource {
    /// Pick the source for this run
    pub fn from_settings(config: &CaptureConfig, synthetic: bool) -> Self {
        if synthetic {
            Self::Synthetic(SyntheticCapture::new(
                config.clone(),
                SYNTHETIC_SAMPLE_RATE,
                Signal::default(),
            ))
        } else {
            Self::Microphone(CpalCapture::new(config.clone()))
        }
    }

    /// Short description for the status line
    pub fn describe(&self, config: &CaptureConfig) -> String {
        match self {
            Self::Microphone(_) => match &config.device_name {
                Some(name) => format!("Input: {}", name),
                None => "Input: default microphone".to_string(),
            },
            Self::Synthetic(_) => "Input: synthetic sweep".to_string(),
        }
    }

    /// Whether results should be kept on disk
    pub fn persists_results(&self) -> bool {
        matches!(self, Self::Microphone(_))
    }
}

impl CaptureSource for InputSource {
    type Handle = InputHandle;

    fn open(&mut self) -> Result<InputHandle> {
        match self {
            Self::Microphone(source) => source.open().map(InputHandle::Microphone),
            Self::Synthetic(source) => source.open().map(InputHandle::Synthetic),
        }
    }
}

/// Open stream of either kind
pub enum InputHandle {
    /// cpal stream
    Microphone(CpalHandle),
    /// Generated stream
    Synthetic(SyntheticHandle),
}

impl AudioHandle for InputHandle {
    fn sample_rate(&self) -> u32 {
        match self {
            Self::Microphone(h) => h.sample_rate(),
            Self::Synthetic(h) => h.sample_rate(),
        }
    }

    fn bin_count(&self) -> usize {
        match self {
            Self::Microphone(h) => h.bin_count(),
            Self::Synthetic(h) => h.bin_count(),
        }
    }

    fn frequency_snapshot(&mut self) -> Result<&[u8]> {
        match self {
            Self::Microphone(h) => h.frequency_snapshot(),
            Self::Synthetic(h) => h.frequency_snapshot(),
        }
    }

    fn close(&mut self) {
        match self {
            Self::Microphone(h) => h.close(),
            Self::Synthetic(h) => h.close(),
        }
    }

    fn is_open(&self) -> bool {
        match self {
            Self::Microphone(h) => h.is_open(),
            Self::Synthetic(h) => h.is_open(),
        }
    }
}
