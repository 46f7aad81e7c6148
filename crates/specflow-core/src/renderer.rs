//! Scrolling spectrogram renderer
//!
//! Each displayed frame pulls one or more frequency snapshots from the audio
//! handle, turns each into a column of coloured pixels on a logarithmic
//! frequency axis, prepends the columns to the scroll history and redraws the
//! whole history onto a [`DisplaySurface`]. The newest column sits at the right
//! edge, so the image scrolls right to left.
//!
//! The renderer does not schedule itself. The host calls [`SpectrogramRenderer::frame`]
//! once per display refresh and re-arms its own callback; the running flag is
//! checked at the top of every call, which is the only cancellation mechanism.

use tracing::{debug, info, warn};

use crate::axis::{bin_frequency, LogFrequencyAxis};
use crate::canvas::DisplaySurface;
use crate::capture::{AudioHandle, CaptureError};
use crate::config::SpectrogramConfig;
use crate::palette::ColorBands;
use crate::scroll::{PixelColumn, ScrollBuffer};
use crate::stats::SampleLog;

/// Renderer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererState {
    /// Not drawing
    #[default]
    Idle,
    /// Drawing on every frame
    Running,
}

/// Result of one [`SpectrogramRenderer::frame`] call
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The renderer was idle; nothing was touched
    Skipped,
    /// The canvas was redrawn after adding `columns` new columns
    Drawn {
        /// Columns added this frame
        columns: usize,
    },
    /// The audio handle failed; the renderer is now idle
    Stopped {
        /// What went wrong
        reason: CaptureError,
    },
}

/// Spreads a fractional number of sub-steps per frame over time.
///
/// Every frame adds `factor` to a carry and performs `floor(carry)` sub-steps.
/// With a factor of 1.1 nine frames out of ten add one column and the tenth
/// adds two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubStepPacer {
    factor: f64,
    carry: f64,
}

impl SubStepPacer {
    // Absorbs the rounding error of repeated additions (0.1 * 10 != 1.0).
    const EPSILON: f64 = 1e-9;

    /// Create a pacer for `factor` sub-steps per frame on average
    pub fn new(factor: f64) -> Self {
        Self { factor, carry: 0.0 }
    }

    /// Configured average
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Number of sub-steps to run this frame
    pub fn steps_for_frame(&mut self) -> usize {
        self.carry += self.factor;
        let steps = (self.carry + Self::EPSILON).floor().max(0.0);
        self.carry -= steps;
        steps as usize
    }

    /// Forget the accumulated remainder
    pub fn reset(&mut self) {
        self.carry = 0.0;
    }
}

/// Per-session drawing geometry, fixed at start
#[derive(Debug, Clone, Copy)]
struct Geometry {
    width: u32,
    axis: LogFrequencyAxis,
}

/// The spectrogram renderer
#[derive(Debug, Clone)]
pub struct SpectrogramRenderer {
    config: SpectrogramConfig,
    bands: ColorBands,
    state: RendererState,
    pacer: SubStepPacer,
    scroll: ScrollBuffer,
    geometry: Option<Geometry>,
}

impl SpectrogramRenderer {
    /// Create an idle renderer
    pub fn new(config: SpectrogramConfig) -> Self {
        Self {
            bands: ColorBands::from_config(&config),
            pacer: SubStepPacer::new(config.sub_step_factor),
            state: RendererState::Idle,
            scroll: ScrollBuffer::new(0),
            geometry: None,
            config,
        }
    }

    /// Renderer configuration
    pub fn config(&self) -> &SpectrogramConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> RendererState {
        self.state
    }

    /// Whether frames are being drawn
    pub fn is_running(&self) -> bool {
        self.state == RendererState::Running
    }

    /// Column history, newest first
    pub fn scroll(&self) -> &ScrollBuffer {
        &self.scroll
    }

    /// Frequency axis of the current (or last) session
    pub fn axis(&self) -> Option<&LogFrequencyAxis> {
        self.geometry.as_ref().map(|g| &g.axis)
    }

    /// Idle -> Running for a canvas of `width` x `height` pixels.
    ///
    /// The scroll history from a previous session is kept (trimmed to the new
    /// width) so the image continues where it left off. Calling `start` while
    /// already running only updates the geometry.
    pub fn start(&mut self, width: u32, height: u32) {
        self.geometry = Some(Geometry {
            width,
            axis: LogFrequencyAxis::new(
                self.config.low_bound_hz,
                self.config.high_bound_hz,
                height as usize,
            ),
        });
        self.scroll.set_capacity(width as usize);
        self.pacer.reset();

        if self.state == RendererState::Running {
            debug!("Renderer already running, geometry updated to {}x{}", width, height);
            return;
        }
        self.state = RendererState::Running;
        info!("Renderer started on {}x{} canvas", width, height);
    }

    /// Running -> Idle. Frames requested afterwards are skipped.
    pub fn stop(&mut self) {
        if self.state == RendererState::Idle {
            return;
        }
        self.state = RendererState::Idle;
        info!("Renderer stopped with {} columns of history", self.scroll.len());
    }

    /// Run one displayed frame.
    ///
    /// Pulls a snapshot per sub-step, appends the resulting columns and then
    /// redraws the history once. Every non-zero in-band magnitude is appended
    /// to `log`. A failing handle stops the renderer; the columns gathered
    /// before the failure are still drawn.
    pub fn frame<H>(
        &mut self,
        handle: &mut H,
        surface: &mut dyn DisplaySurface,
        log: &mut SampleLog,
    ) -> FrameOutcome
    where
        H: AudioHandle + ?Sized,
    {
        if self.state != RendererState::Running {
            return FrameOutcome::Skipped;
        }
        let Some(geometry) = self.geometry else {
            return FrameOutcome::Skipped;
        };

        let steps = self.pacer.steps_for_frame();
        let sample_rate = handle.sample_rate();
        let mut added = 0;
        let mut failure = None;

        for _ in 0..steps {
            match handle.frequency_snapshot() {
                Ok(snapshot) => {
                    let column =
                        build_column(snapshot, sample_rate, &geometry.axis, &self.bands, log);
                    self.scroll.push(column);
                    added += 1;
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        redraw(&self.scroll, geometry.width, surface);

        match failure {
            Some(reason) => {
                warn!("Audio snapshot failed, stopping renderer: {}", reason);
                self.state = RendererState::Idle;
                FrameOutcome::Stopped { reason }
            }
            None => FrameOutcome::Drawn { columns: added },
        }
    }

    /// Repaint the current history onto `surface` without pulling new data,
    /// newest column at its right edge.
    pub fn redraw(&self, surface: &mut dyn DisplaySurface) {
        let width = surface.size().0;
        redraw(&self.scroll, width, surface);
    }
}

/// Turn one snapshot into a pixel column.
///
/// Bins outside the band are skipped. Several bins can land on the same row at
/// the top of the axis; the last one wins.
pub fn build_column(
    snapshot: &[u8],
    sample_rate: u32,
    axis: &LogFrequencyAxis,
    bands: &ColorBands,
    log: &mut SampleLog,
) -> PixelColumn {
    let mut column = PixelColumn::transparent(axis.height());
    let bin_count = snapshot.len();

    for (i, &magnitude) in snapshot.iter().enumerate() {
        let freq = bin_frequency(i, sample_rate, bin_count);
        let Some(row) = axis.row_for(freq as f32) else {
            continue;
        };
        column.set_pixel(row, bands.pixel_for(magnitude));
        if magnitude > 0 {
            log.push(freq, magnitude);
        }
    }

    column
}

fn redraw(scroll: &ScrollBuffer, width: u32, surface: &mut dyn DisplaySurface) {
    surface.clear();
    let width = width.min(surface.size().0);
    for (x, column) in scroll.iter().enumerate().take(width as usize) {
        surface.put_column(width - x as u32 - 1, column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PixelCanvas;
    use crate::capture::Result as CaptureResult;

    /// Handle replaying a fixed snapshot, failing after `fail_after` pulls
    struct FixedHandle {
        snapshot: Vec<u8>,
        pulls: usize,
        fail_after: Option<usize>,
    }

    impl FixedHandle {
        fn new(snapshot: Vec<u8>) -> Self {
            Self {
                snapshot,
                pulls: 0,
                fail_after: None,
            }
        }
    }

    impl AudioHandle for FixedHandle {
        fn sample_rate(&self) -> u32 {
            48000
        }

        fn bin_count(&self) -> usize {
            self.snapshot.len()
        }

        fn frequency_snapshot(&mut self) -> CaptureResult<&[u8]> {
            if self.fail_after.is_some_and(|n| self.pulls >= n) {
                return Err(CaptureError::StreamLost("unplugged".to_string()));
            }
            self.pulls += 1;
            Ok(&self.snapshot)
        }

        fn close(&mut self) {}

        fn is_open(&self) -> bool {
            true
        }
    }

    fn unit_pacer_config() -> SpectrogramConfig {
        SpectrogramConfig {
            sub_step_factor: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_pacer_default_factor() {
        let mut pacer = SubStepPacer::new(1.1);
        let steps: Vec<usize> = (0..10).map(|_| pacer.steps_for_frame()).collect();
        assert_eq!(steps.iter().sum::<usize>(), 11);
        assert_eq!(steps.iter().filter(|&&s| s == 2).count(), 1);
        assert!(steps.iter().all(|&s| s == 1 || s == 2));
    }

    #[test]
    fn test_pacer_fractional_below_one() {
        let mut pacer = SubStepPacer::new(0.5);
        let steps: Vec<usize> = (0..4).map(|_| pacer.steps_for_frame()).collect();
        assert_eq!(steps, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_frame_while_idle_is_skipped() {
        let mut renderer = SpectrogramRenderer::new(SpectrogramConfig::default());
        let mut handle = FixedHandle::new(vec![50; 1024]);
        let mut canvas = PixelCanvas::new(10, 10);
        let mut log = SampleLog::new();

        let outcome = renderer.frame(&mut handle, &mut canvas, &mut log);
        assert_eq!(outcome, FrameOutcome::Skipped);
        assert_eq!(handle.pulls, 0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_stop_is_observed_on_next_frame() {
        let mut renderer = SpectrogramRenderer::new(unit_pacer_config());
        let mut handle = FixedHandle::new(vec![50; 1024]);
        let mut canvas = PixelCanvas::new(10, 10);
        let mut log = SampleLog::new();

        renderer.start(10, 10);
        assert_eq!(
            renderer.frame(&mut handle, &mut canvas, &mut log),
            FrameOutcome::Drawn { columns: 1 }
        );
        renderer.stop();
        assert_eq!(
            renderer.frame(&mut handle, &mut canvas, &mut log),
            FrameOutcome::Skipped
        );
        assert_eq!(renderer.scroll().len(), 1);
    }

    #[test]
    fn test_newest_column_is_rightmost() {
        let mut renderer = SpectrogramRenderer::new(unit_pacer_config());
        let mut handle = FixedHandle::new(vec![200; 1024]);
        let mut canvas = PixelCanvas::new(8, 16);
        let mut log = SampleLog::new();

        renderer.start(8, 16);
        renderer.frame(&mut handle, &mut canvas, &mut log);

        let right_opaque = (0..16).any(|y| canvas.pixel(7, y).unwrap()[3] == 255);
        let left_empty = (0..16).all(|y| canvas.pixel(6, y).unwrap()[3] == 0);
        assert!(right_opaque);
        assert!(left_empty);
    }

    #[test]
    fn test_out_of_band_bins_never_logged() {
        // Bin 1 at 48 kHz / 1024 bins is 23.4 Hz, bin 1000 is 23.4 kHz
        let mut snapshot = vec![0u8; 1024];
        snapshot[1] = 255;
        snapshot[1000] = 255;
        let mut renderer = SpectrogramRenderer::new(unit_pacer_config());
        let mut handle = FixedHandle::new(snapshot);
        let mut canvas = PixelCanvas::new(4, 64);
        let mut log = SampleLog::new();

        renderer.start(4, 64);
        renderer.frame(&mut handle, &mut canvas, &mut log);
        assert!(log.is_empty());
        assert!(canvas.as_rgba().iter().all(|&b| b == 0 || b == 102 || b == 204));
    }

    #[test]
    fn test_zero_magnitude_is_not_logged() {
        let mut snapshot = vec![0u8; 1024];
        // 440 Hz is bin 18.77, so bin 19 (445.3 Hz) is in band
        snapshot[19] = 0;
        snapshot[20] = 10;
        let axis = LogFrequencyAxis::new(149.0, 20000.0, 100);
        let mut log = SampleLog::new();

        let column = build_column(&snapshot, 48000, &axis, &ColorBands::default(), &mut log);
        assert_eq!(log.len(), 1);
        assert_eq!(log.amplitudes(), &[10]);
        assert_eq!(log.frequencies(), &[bin_frequency(20, 48000, 1024)]);
        assert_eq!(column.height(), 100);
    }

    #[test]
    fn test_snapshot_failure_stops_and_redraws() {
        let mut renderer = SpectrogramRenderer::new(SpectrogramConfig {
            sub_step_factor: 3.0,
            ..Default::default()
        });
        let mut handle = FixedHandle::new(vec![120; 1024]);
        handle.fail_after = Some(2);
        let mut canvas = PixelCanvas::new(5, 32);
        let mut log = SampleLog::new();

        renderer.start(5, 32);
        let outcome = renderer.frame(&mut handle, &mut canvas, &mut log);
        assert!(matches!(
            outcome,
            FrameOutcome::Stopped {
                reason: CaptureError::StreamLost(_)
            }
        ));
        assert_eq!(renderer.state(), RendererState::Idle);
        // The two good columns made it onto the canvas
        assert_eq!(renderer.scroll().len(), 2);
        assert!((0..32).any(|y| canvas.pixel(4, y).unwrap()[3] > 0));
        assert!((0..32).any(|y| canvas.pixel(3, y).unwrap()[3] > 0));
        assert!((0..32).all(|y| canvas.pixel(2, y).unwrap()[3] == 0));
    }

    #[test]
    fn test_history_bounded_and_kept_across_sessions() {
        let mut renderer = SpectrogramRenderer::new(unit_pacer_config());
        let mut handle = FixedHandle::new(vec![80; 1024]);
        let mut canvas = PixelCanvas::new(6, 20);
        let mut log = SampleLog::new();

        renderer.start(6, 20);
        for _ in 0..20 {
            renderer.frame(&mut handle, &mut canvas, &mut log);
        }
        assert_eq!(renderer.scroll().len(), 6);

        renderer.stop();
        renderer.start(6, 20);
        assert_eq!(renderer.scroll().len(), 6);

        // A narrower canvas trims the oldest columns
        renderer.stop();
        renderer.start(3, 20);
        assert_eq!(renderer.scroll().len(), 3);
    }
}
