//! Modal overlays: help, background information and the microphone notice.

use crate::UIAction;
use egui::{Id, Modal, RichText};

/// Which informational overlay is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// How to use the application
    Help,
    /// What a spectrogram shows
    Concept,
}

const HELP_TEXT: &[&str] = &[
    "Press \"Start microphone\" and allow access to your input device.",
    "The image scrolls from right to left; the newest sound enters at the right edge.",
    "Low pitches are drawn near the bottom, high pitches near the top.",
    "Blue marks quiet frequencies, yellow louder ones and red the loudest.",
    "Press \"Stop microphone\" to end the session. Its statistics appear in the side panel and are saved.",
];

const CONCEPT_TEXT: &[&str] = &[
    "A spectrogram shows how the frequency content of a sound changes over time.",
    "Time runs along the horizontal axis and frequency along the vertical axis. \
     The vertical scale is logarithmic, so every octave takes the same height, \
     which is how we hear pitch.",
    "The brightness and colour of each point show how strong that frequency is at that moment.",
];

fn content_modal(ctx: &egui::Context, id: &str, title: &str, paragraphs: &[&str]) -> bool {
    let mut close_clicked = false;
    let response = Modal::new(Id::new(id)).show(ctx, |ui| {
        ui.set_max_width(420.0);
        ui.heading(title);
        ui.add_space(6.0);
        for paragraph in paragraphs {
            ui.label(*paragraph);
            ui.add_space(4.0);
        }
        ui.add_space(6.0);
        ui.vertical_centered(|ui| {
            if ui.button("Close").clicked() {
                close_clicked = true;
            }
        });
    });
    // Backdrop click and Escape also close
    close_clicked || response.should_close()
}

/// Draw the open overlay, pushing `CloseOverlay` when it is dismissed
pub fn show_overlay(ctx: &egui::Context, overlay: Overlay, actions: &mut Vec<UIAction>) {
    let closed = match overlay {
        Overlay::Help => content_modal(ctx, "help_overlay", "How to use SpecFlow", HELP_TEXT),
        Overlay::Concept => content_modal(
            ctx,
            "concept_overlay",
            "What is a spectrogram?",
            CONCEPT_TEXT,
        ),
    };
    if closed {
        actions.push(UIAction::CloseOverlay);
    }
}

/// Blocking notice about the microphone. Only the button dismisses it.
pub fn show_notice(ctx: &egui::Context, message: &str, actions: &mut Vec<UIAction>) {
    Modal::new(Id::new("capture_notice")).show(ctx, |ui| {
        ui.set_max_width(380.0);
        ui.heading("Microphone unavailable");
        ui.add_space(6.0);
        ui.label("Could not access the microphone. Please check the permissions and the input device.");
        ui.add_space(4.0);
        ui.label(RichText::new(message).weak().monospace());
        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            if ui.button("OK").clicked() {
                actions.push(UIAction::DismissNotice);
            }
        });
    });
}
