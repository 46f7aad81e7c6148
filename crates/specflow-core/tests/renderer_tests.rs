use proptest::prelude::*;
use specflow_core::capture::Result as CaptureResult;
use specflow_core::{
    alpha_for, bin_frequency, AudioHandle, ColorBands, FrameOutcome, LogFrequencyAxis,
    PixelCanvas, SampleLog, SpectrogramConfig, SpectrogramRenderer,
};

/// Handle returning caller-provided snapshots in order, repeating the last
struct ScriptedHandle {
    sample_rate: u32,
    snapshots: Vec<Vec<u8>>,
    next: usize,
}

impl ScriptedHandle {
    fn new(sample_rate: u32, snapshots: Vec<Vec<u8>>) -> Self {
        Self {
            sample_rate,
            snapshots,
            next: 0,
        }
    }
}

impl AudioHandle for ScriptedHandle {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn bin_count(&self) -> usize {
        self.snapshots.first().map_or(0, Vec::len)
    }

    fn frequency_snapshot(&mut self) -> CaptureResult<&[u8]> {
        let index = self.next.min(self.snapshots.len() - 1);
        self.next += 1;
        Ok(&self.snapshots[index])
    }

    fn close(&mut self) {}

    fn is_open(&self) -> bool {
        true
    }
}

#[test]
fn test_columns_scroll_right_to_left() {
    let config = SpectrogramConfig {
        sub_step_factor: 1.0,
        ..Default::default()
    };
    let mut renderer = SpectrogramRenderer::new(config);

    // Frame 1 loud, then silence
    let loud = vec![255u8; 1024];
    let quiet = vec![0u8; 1024];
    let mut handle = ScriptedHandle::new(48000, vec![loud, quiet]);
    let mut canvas = PixelCanvas::new(4, 32);
    let mut log = SampleLog::new();

    renderer.start(4, 32);
    let opaque_in = |canvas: &PixelCanvas, x: u32| (0..32).any(|y| canvas.pixel(x, y).unwrap()[3] == 255);

    renderer.frame(&mut handle, &mut canvas, &mut log);
    assert!(opaque_in(&canvas, 3));

    renderer.frame(&mut handle, &mut canvas, &mut log);
    assert!(!opaque_in(&canvas, 3));
    assert!(opaque_in(&canvas, 2));

    renderer.frame(&mut handle, &mut canvas, &mut log);
    renderer.frame(&mut handle, &mut canvas, &mut log);
    assert!(opaque_in(&canvas, 0));

    // Fifth frame pushes the loud column off the left edge
    renderer.frame(&mut handle, &mut canvas, &mut log);
    assert!((0..4).all(|x| !opaque_in(&canvas, x)));
    assert_eq!(renderer.scroll().len(), 4);
}

#[test]
fn test_default_pacing_over_many_frames() {
    let mut renderer = SpectrogramRenderer::new(SpectrogramConfig::default());
    let mut handle = ScriptedHandle::new(44100, vec![vec![10u8; 1024]]);
    let mut canvas = PixelCanvas::new(1000, 8);
    let mut log = SampleLog::new();

    renderer.start(1000, 8);
    let mut columns = 0;
    for _ in 0..100 {
        match renderer.frame(&mut handle, &mut canvas, &mut log) {
            FrameOutcome::Drawn { columns: n } => {
                assert!(n == 1 || n == 2);
                columns += n;
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
    assert_eq!(columns, 110);
    assert_eq!(handle.next, 110);
}

#[test]
fn test_samples_are_logged_with_bin_frequencies() {
    let mut snapshot = vec![0u8; 1024];
    snapshot[100] = 42;
    snapshot[200] = 7;
    let mut renderer = SpectrogramRenderer::new(SpectrogramConfig {
        sub_step_factor: 1.0,
        ..Default::default()
    });
    let mut handle = ScriptedHandle::new(48000, vec![snapshot]);
    let mut canvas = PixelCanvas::new(2, 50);
    let mut log = SampleLog::new();

    renderer.start(2, 50);
    renderer.frame(&mut handle, &mut canvas, &mut log);

    assert_eq!(log.amplitudes(), &[42, 7]);
    assert_eq!(
        log.frequencies(),
        &[
            bin_frequency(100, 48000, 1024),
            bin_frequency(200, 48000, 1024)
        ]
    );
}

fn snapshot_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 16..=1024)
}

proptest! {
    #[test]
    fn prop_logged_frequencies_stay_in_band(
        snapshot in snapshot_strategy(),
        sample_rate in prop::sample::select(vec![22050u32, 44100, 48000, 96000]),
        low in 20.0f32..1000.0,
        span in 2.0f32..200.0,
        height in 1u32..300,
    ) {
        let config = SpectrogramConfig {
            low_bound_hz: low,
            high_bound_hz: low * span,
            sub_step_factor: 1.0,
            ..Default::default()
        };
        let mut renderer = SpectrogramRenderer::new(config);
        let mut handle = ScriptedHandle::new(sample_rate, vec![snapshot.clone()]);
        let mut canvas = PixelCanvas::new(3, height);
        let mut log = SampleLog::new();

        renderer.start(3, height);
        renderer.frame(&mut handle, &mut canvas, &mut log);

        for &freq in log.frequencies() {
            prop_assert!(freq >= f64::from(low) && freq <= f64::from(low * span));
        }
        for &magnitude in log.amplitudes() {
            prop_assert!(magnitude > 0);
        }

        let expected = snapshot
            .iter()
            .enumerate()
            .filter(|&(i, &m)| {
                let f = bin_frequency(i, sample_rate, snapshot.len()) as f32;
                m > 0 && f >= low && f <= low * span
            })
            .count();
        prop_assert_eq!(log.len(), expected);
    }

    #[test]
    fn prop_row_mapping_is_monotonic(
        low in 20.0f32..500.0,
        span in 2.0f32..1000.0,
        height in 1usize..2000,
        a in 0.0f32..1.0,
        b in 0.0f32..1.0,
    ) {
        let high = low * span;
        let axis = LogFrequencyAxis::new(low, high, height);
        let fa = low + (high - low) * a.min(b);
        let fb = low + (high - low) * a.max(b);

        let ra = axis.row_for(fa);
        let rb = axis.row_for(fb);
        prop_assert!(ra.is_some() && rb.is_some());
        let (ra, rb) = (ra.unwrap(), rb.unwrap());
        prop_assert!(rb <= ra);
        prop_assert!(ra < height);
    }

    #[test]
    fn prop_scroll_never_exceeds_width(
        width in 1u32..64,
        frames in 0usize..200,
        factor in 0.1f64..4.0,
    ) {
        let mut renderer = SpectrogramRenderer::new(SpectrogramConfig {
            sub_step_factor: factor,
            ..Default::default()
        });
        let mut handle = ScriptedHandle::new(48000, vec![vec![1u8; 64]]);
        let mut canvas = PixelCanvas::new(width, 4);
        let mut log = SampleLog::new();

        renderer.start(width, 4);
        for _ in 0..frames {
            renderer.frame(&mut handle, &mut canvas, &mut log);
            prop_assert!(renderer.scroll().len() <= width as usize);
        }
    }

    #[test]
    fn prop_alpha_is_clamped_double(magnitude in any::<u8>()) {
        let alpha = alpha_for(magnitude);
        prop_assert_eq!(u16::from(alpha), (u16::from(magnitude) * 2).min(255));
        prop_assert_eq!(ColorBands::default().pixel_for(magnitude)[3], alpha);
    }
}
