//! Control Bar
//!
//! Top strip with the capture toggle and the help buttons.

use crate::UIAction;
use egui::{Color32, RichText, Ui};

/// Label of the capture toggle for the current state
pub fn toggle_label(capturing: bool) -> &'static str {
    if capturing {
        "Stop microphone"
    } else {
        "Start microphone"
    }
}

/// Draw the control bar, pushing any clicked action
pub fn show(ui: &mut Ui, capturing: bool, status: Option<&str>, actions: &mut Vec<UIAction>) {
    ui.horizontal(|ui| {
        let icon = if capturing { "⏹" } else { "🎤" };
        let button = egui::Button::new(format!("{} {}", icon, toggle_label(capturing)));
        let button = if capturing {
            button.fill(Color32::from_rgb(140, 30, 30))
        } else {
            button
        };
        if ui.add(button).clicked() {
            actions.push(UIAction::ToggleCapture);
        }

        if capturing {
            ui.label(RichText::new("● Recording").color(Color32::from_rgb(230, 60, 60)));
        }
        if let Some(status) = status {
            ui.separator();
            ui.weak(status);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Quit").clicked() {
                actions.push(UIAction::Quit);
            }
            if ui.button("ℹ What is a spectrogram?").clicked() {
                actions.push(UIAction::ShowConcept);
            }
            if ui.button("❓ Help").clicked() {
                actions.push(UIAction::ShowHelp);
            }
        });
    });
}
