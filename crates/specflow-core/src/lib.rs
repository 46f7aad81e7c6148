//! SpecFlow Core - Spectrogram Domain Model
//!
//! This crate contains everything that does not need a window, including:
//! - Microphone capture and the byte spectrum analyser
//! - Logarithmic frequency axis and colour banding
//! - The scrolling spectrogram renderer and its pixel canvas
//! - Session statistics and their key-value persistence
//! - Settings and logging configuration

#![warn(missing_docs)]

pub mod axis;
pub mod capture;
pub mod canvas;
pub mod config;
pub mod logging;
pub mod palette;
pub mod renderer;
pub mod scroll;
pub mod session;
pub mod settings;
pub mod stats;
pub mod store;

// --- Re-exports grouped by category ---

// Capture
pub use capture::{
    analyser::ByteSpectrumAnalyser,
    synthetic::{Signal, SyntheticCapture, SyntheticHandle},
    AudioHandle, CaptureError, CaptureSource,
};
#[cfg(feature = "audio")]
pub use capture::cpal_backend::{list_input_devices, CpalCapture, CpalHandle};

// Rendering
pub use axis::{bin_frequency, LogFrequencyAxis};
pub use canvas::{DisplaySurface, PixelCanvas};
pub use palette::{alpha_for, ColorBands};
pub use renderer::{FrameOutcome, RendererState, SpectrogramRenderer, SubStepPacer};
pub use scroll::{PixelColumn, ScrollBuffer};

// Statistics & Persistence
pub use session::{SessionError, SpectrogramSession, ToggleOutcome};
pub use stats::{SampleLog, SessionStats, SessionStatsAggregator, StatValue};
pub use store::{
    load_stats, persist_stats, JsonFileStore, KeyValueStore, MemoryStore, StoreError, STATS_KEY,
};

// Configuration
pub use config::{CaptureConfig, ConfigError, Palette, SpectrogramConfig, MAX_SUB_STEP_FACTOR};
pub use logging::LogConfig;
pub use settings::{AppSettings, SettingsError};
