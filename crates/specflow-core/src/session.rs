//! Capture session orchestration
//!
//! Ties a [`CaptureSource`], the renderer, the statistics aggregator and the
//! key-value store together behind a single toggle.

use thiserror::Error;
use tracing::{error, info, warn};

use crate::canvas::DisplaySurface;
use crate::capture::{AudioHandle, CaptureError, CaptureSource};
use crate::config::{ConfigError, SpectrogramConfig};
use crate::renderer::{FrameOutcome, SpectrogramRenderer};
use crate::stats::{SessionStats, SessionStatsAggregator};
use crate::store::{self, KeyValueStore};

/// Session errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Microphone could not be opened; nothing was started
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Renderer configuration rejected
    #[error("Invalid spectrogram configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// What a toggle did
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// Capture and rendering are running
    Started,
    /// Capture stopped; statistics of the finished session
    Stopped(SessionStats),
}

/// One microphone, one spectrogram, one statistics slot
pub struct SpectrogramSession<S: CaptureSource> {
    source: S,
    handle: Option<S::Handle>,
    renderer: SpectrogramRenderer,
    aggregator: SessionStatsAggregator,
    store: Box<dyn KeyValueStore>,
    last_stats: Option<SessionStats>,
}

impl<S: CaptureSource> SpectrogramSession<S> {
    /// Create an idle session. The previously stored statistics, if readable,
    /// become [`Self::last_stats`].
    pub fn new(
        source: S,
        config: SpectrogramConfig,
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self> {
        config.validate()?;

        let last_stats = match store::load_stats(store.as_ref()) {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Ignoring unreadable stored statistics: {}", e);
                None
            }
        };

        Ok(Self {
            source,
            handle: None,
            renderer: SpectrogramRenderer::new(config),
            aggregator: SessionStatsAggregator::new(),
            store,
            last_stats,
        })
    }

    /// Whether a capture session is active
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && self.renderer.is_running()
    }

    /// Renderer (for the scroll history and axis)
    pub fn renderer(&self) -> &SpectrogramRenderer {
        &self.renderer
    }

    /// Aggregator of the current or last session
    pub fn aggregator(&self) -> &SessionStatsAggregator {
        &self.aggregator
    }

    /// Statistics of the last finished session
    pub fn last_stats(&self) -> Option<&SessionStats> {
        self.last_stats.as_ref()
    }

    /// Backing store
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Live audio handle, if capturing
    pub fn handle(&self) -> Option<&S::Handle> {
        self.handle.as_ref()
    }

    /// Start when idle, stop when running.
    pub fn toggle(&mut self, width: u32, height: u32) -> Result<ToggleOutcome> {
        if self.is_running() {
            let stats = self.stop_capture().unwrap_or_else(SessionStats::unavailable);
            Ok(ToggleOutcome::Stopped(stats))
        } else {
            self.start_capture(width, height)?;
            Ok(ToggleOutcome::Started)
        }
    }

    /// Open the microphone, clear the sample log and start the renderer.
    ///
    /// On a capture error nothing is started and the log is left untouched.
    pub fn start_capture(&mut self, width: u32, height: u32) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let handle = self.source.open().map_err(|e| {
            error!("Could not open audio capture: {}", e);
            e
        })?;

        info!(
            "Capture started: {} Hz, {} bins",
            handle.sample_rate(),
            handle.bin_count()
        );

        self.aggregator.reset();
        self.renderer.start(width, height);
        self.handle = Some(handle);
        Ok(())
    }

    /// Stop rendering, release the microphone and finalize the session.
    ///
    /// Returns `None` when no session was active.
    pub fn stop_capture(&mut self) -> Option<SessionStats> {
        if self.handle.is_none() {
            return None;
        }
        Some(self.finish_session())
    }

    /// Draw one frame. A capture fault ends the session like a stop would.
    pub fn on_frame(&mut self, surface: &mut dyn DisplaySurface) -> FrameOutcome {
        let Some(handle) = self.handle.as_mut() else {
            return FrameOutcome::Skipped;
        };

        let outcome = self
            .renderer
            .frame(handle, surface, self.aggregator.log_mut());

        if let FrameOutcome::Stopped { reason } = &outcome {
            warn!("Capture ended unexpectedly: {}", reason);
            self.finish_session();
        }
        outcome
    }

    /// Repaint the history onto a fresh surface without pulling audio
    pub fn redraw(&self, surface: &mut dyn DisplaySurface) {
        self.renderer.redraw(surface);
    }

    fn finish_session(&mut self) -> SessionStats {
        self.renderer.stop();
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }

        let stats = self.aggregator.finalize();
        if let Err(e) = store::persist_stats(self.store.as_mut(), &stats) {
            error!("Failed to persist session statistics: {}", e);
        }
        info!(
            "Capture stopped after {} samples",
            self.aggregator.log().len()
        );

        self.last_stats = Some(stats);
        stats
    }
}

impl<S: CaptureSource> Drop for SpectrogramSession<S> {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }
    }
}
