//! SpecFlow UI - egui Front-End
//!
//! This crate draws everything the user sees:
//! - Control bar with the capture toggle
//! - Spectrogram view with its frequency axis
//! - Session statistics side panel
//! - Help, concept and microphone notice overlays
//!
//! Widgets only record [`UIAction`]s; the application drains them once per
//! frame and decides what to do.

#![warn(missing_docs)]

#[allow(missing_docs)]
pub mod overlays;
#[allow(missing_docs)]
pub mod panels;
#[allow(missing_docs)]
pub mod widgets;

pub use overlays::Overlay;
pub use panels::SpectrogramView;

use specflow_core::{PixelCanvas, SessionStats, SpectrogramConfig};

/// UI actions that can be triggered by the user interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UIAction {
    /// Start capture when idle, stop it when running
    ToggleCapture,
    /// Open the help overlay
    ShowHelp,
    /// Open the "what is a spectrogram" overlay
    ShowConcept,
    /// Close whichever overlay is open
    CloseOverlay,
    /// Acknowledge the microphone notice
    DismissNotice,
    /// Exit application
    Quit,
}

/// UI state for the application
pub struct AppUI {
    /// Pending UI actions to be processed
    pub actions: Vec<UIAction>,
    /// Open informational overlay
    pub overlay: Option<Overlay>,
    /// Blocking microphone notice text
    pub notice: Option<String>,
    /// Whether a capture session is running
    pub capturing: bool,
    /// Statistics of the last finished session
    pub last_stats: Option<SessionStats>,
    /// Samples collected by the running session
    pub live_samples: Option<usize>,
    /// Short status text shown in the control bar (input device, etc.)
    pub status: Option<String>,
    /// Show the statistics side panel
    pub show_stats: bool,
    /// Spectrogram image
    pub spectrogram_view: SpectrogramView,
    low_hz: f32,
    high_hz: f32,
}

impl AppUI {
    /// Create the UI for a spectrogram drawn with `config`
    pub fn new(config: &SpectrogramConfig) -> Self {
        Self {
            actions: Vec::new(),
            overlay: None,
            notice: None,
            capturing: false,
            last_stats: None,
            live_samples: None,
            status: None,
            show_stats: true,
            spectrogram_view: SpectrogramView::new(),
            low_hz: config.low_bound_hz,
            high_hz: config.high_bound_hz,
        }
    }

    /// Take all actions recorded since the last call
    pub fn take_actions(&mut self) -> Vec<UIAction> {
        std::mem::take(&mut self.actions)
    }

    /// Apply an action that only affects the UI itself.
    ///
    /// Returns `false` for actions the application has to handle.
    pub fn handle_view_action(&mut self, action: &UIAction) -> bool {
        match action {
            UIAction::ShowHelp => self.overlay = Some(Overlay::Help),
            UIAction::ShowConcept => self.overlay = Some(Overlay::Concept),
            UIAction::CloseOverlay => self.overlay = None,
            UIAction::DismissNotice => self.notice = None,
            UIAction::ToggleCapture | UIAction::Quit => return false,
        }
        true
    }

    /// Show the blocking microphone notice
    pub fn show_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    /// Canvas size (physical pixels) that fills the spectrogram area
    pub fn desired_canvas_size(&self) -> Option<[u32; 2]> {
        self.spectrogram_view.desired_size()
    }

    /// Build the whole UI for one frame
    pub fn render(&mut self, ctx: &egui::Context, canvas: &PixelCanvas) {
        self.spectrogram_view.upload(ctx, canvas);

        egui::TopBottomPanel::top("control_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            panels::control_bar::show(
                ui,
                self.capturing,
                self.status.as_deref(),
                &mut self.actions,
            );
            ui.add_space(4.0);
        });

        if self.show_stats {
            egui::SidePanel::right("stats_panel")
                .resizable(false)
                .default_width(220.0)
                .show(ctx, |ui| {
                    panels::stats_panel::show(ui, self.last_stats.as_ref(), self.live_samples);
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.spectrogram_view.show(ui, self.low_hz, self.high_hz);
            });

        if let Some(message) = &self.notice {
            overlays::show_notice(ctx, message, &mut self.actions);
        } else if let Some(overlay) = self.overlay {
            overlays::show_overlay(ctx, overlay, &mut self.actions);
        }

        // A focused button already turns Space into its own click
        let space_shortcut = ctx.input(|i| i.key_pressed(egui::Key::Space))
            && ctx.memory(|m| m.focused().is_none());
        if space_shortcut && self.notice.is_none() {
            self.actions.push(UIAction::ToggleCapture);
        }

        // At most one transition per frame
        let mut toggled = false;
        self.actions.retain(|action| {
            *action != UIAction::ToggleCapture || !std::mem::replace(&mut toggled, true)
        });
    }
}
