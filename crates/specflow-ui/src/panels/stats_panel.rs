//! Stats Panel
//!
//! Shows the statistics of the last finished session and a live sample count.

use egui::Ui;
use specflow_core::{SessionStats, StatValue};

fn with_unit(value: StatValue, unit: &str) -> String {
    match value {
        StatValue::Value(_) => format!("{} {}", value, unit),
        StatValue::Unavailable => value.to_string(),
    }
}

/// (label, formatted value) pairs in display order
pub fn stat_rows(stats: &SessionStats) -> [(&'static str, String); 5] {
    [
        ("Max frequency", with_unit(stats.max_frequency, "Hz")),
        ("Min frequency", with_unit(stats.min_frequency, "Hz")),
        ("Mean frequency", with_unit(stats.mean_frequency, "Hz")),
        ("Frequency range", with_unit(stats.frequency_range, "Hz")),
        ("Mean amplitude", with_unit(stats.mean_amplitude, "/ 255")),
    ]
}

/// Draw the panel
pub fn show(ui: &mut Ui, stats: Option<&SessionStats>, live_samples: Option<usize>) {
    ui.heading("Session");
    ui.add_space(4.0);

    if let Some(count) = live_samples {
        ui.label(format!("Samples collected: {}", count));
        ui.add_space(4.0);
    }

    let Some(stats) = stats else {
        ui.weak("No finished session yet.");
        return;
    };

    egui::Grid::new("session_stats_grid")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            for (label, value) in stat_rows(stats) {
                ui.label(label);
                ui.monospace(value);
                ui.end_row();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_format() {
        let stats = SessionStats {
            max_frequency: StatValue::Value(300.0),
            min_frequency: StatValue::Value(100.0),
            mean_frequency: StatValue::Value(200.0),
            frequency_range: StatValue::Value(200.0),
            mean_amplitude: StatValue::Value(20.0),
        };
        let rows = stat_rows(&stats);
        assert_eq!(rows[0], ("Max frequency", "300.00 Hz".to_string()));
        assert_eq!(rows[4], ("Mean amplitude", "20.00 / 255".to_string()));
    }

    #[test]
    fn test_rows_unavailable() {
        let rows = stat_rows(&SessionStats::unavailable());
        assert!(rows.iter().all(|(_, v)| v == "unavailable"));
    }
}
