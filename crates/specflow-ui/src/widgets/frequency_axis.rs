//! Frequency Axis Widget
//!
//! Tick marks and labels for a logarithmic frequency scale, drawn beside the
//! spectrogram image.

use egui::{Align2, Color32, FontId, Pos2, Sense, Stroke, Vec2, Widget};
use specflow_core::LogFrequencyAxis;

/// Candidate tick frequencies; the ones outside the band are skipped
const TICKS_HZ: [f32; 13] = [
    100.0, 200.0, 300.0, 500.0, 1000.0, 2000.0, 3000.0, 5000.0, 8000.0, 10000.0, 12000.0,
    16000.0, 20000.0,
];

/// Human-readable frequency: "440 Hz", "1 kHz", "1.5 kHz"
pub fn format_hz(hz: f32) -> String {
    if hz >= 1000.0 {
        let khz = hz / 1000.0;
        if (khz - khz.round()).abs() < 0.05 {
            format!("{:.0} kHz", khz)
        } else {
            format!("{:.1} kHz", khz)
        }
    } else {
        format!("{:.0} Hz", hz)
    }
}

/// Vertical position (0 = top, 1 = bottom) of each tick inside the band
pub fn tick_positions(low_hz: f32, high_hz: f32) -> Vec<(f32, f32)> {
    // A tall virtual axis gives sub-pixel precision once scaled to the widget
    const RESOLUTION: usize = 10_000;
    let axis = LogFrequencyAxis::new(low_hz, high_hz, RESOLUTION);
    TICKS_HZ
        .iter()
        .filter_map(|&hz| {
            axis.row_for(hz)
                .map(|row| (hz, row as f32 / (RESOLUTION - 1) as f32))
        })
        .collect()
}

/// Frequency under a pointer `fraction` of the way down a `rows`-tall image
pub fn frequency_at(low_hz: f32, high_hz: f32, rows: usize, fraction: f32) -> f32 {
    let rows = rows.max(1);
    let row = (fraction.clamp(0.0, 1.0) * rows as f32) as usize;
    LogFrequencyAxis::new(low_hz, high_hz, rows).frequency_at_row(row.min(rows - 1))
}

/// Axis strip with labelled ticks
pub struct FrequencyAxis {
    low_hz: f32,
    high_hz: f32,
    height: f32,
    width: f32,
}

impl FrequencyAxis {
    /// Axis for the inclusive band `low_hz..=high_hz`, `height` points tall
    pub fn new(low_hz: f32, high_hz: f32, height: f32) -> Self {
        Self {
            low_hz,
            high_hz,
            height,
            width: 56.0,
        }
    }

    /// Set the strip width
    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }
}

impl Widget for FrequencyAxis {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) =
            ui.allocate_exact_size(Vec2::new(self.width, self.height), Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let color = ui.visuals().weak_text_color();
            let font = FontId::monospace(10.0);

            for (hz, position) in tick_positions(self.low_hz, self.high_hz) {
                let y = rect.top() + position * rect.height();
                let tick_start = Pos2::new(rect.right() - 6.0, y);
                painter.line_segment(
                    [tick_start, Pos2::new(rect.right(), y)],
                    Stroke::new(1.0, color),
                );
                painter.text(
                    Pos2::new(rect.right() - 8.0, y),
                    Align2::RIGHT_CENTER,
                    format_hz(hz),
                    font.clone(),
                    color,
                );
            }

            painter.line_segment(
                [rect.right_top(), rect.right_bottom()],
                Stroke::new(1.0, Color32::from_gray(90)),
            );
        }

        response
    }
}
