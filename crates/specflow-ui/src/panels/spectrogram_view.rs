//! Spectrogram View
//!
//! Displays the renderer's pixel canvas as an egui texture with a frequency
//! axis on the left.

use crate::widgets::{format_hz, frequency_at, FrequencyAxis};
use egui::{Color32, ColorImage, Rect, Sense, TextureHandle, TextureOptions, Ui, Vec2};
use specflow_core::PixelCanvas;
use tracing::debug;

const AXIS_WIDTH: f32 = 56.0;

/// Texture-backed spectrogram image
#[derive(Default)]
pub struct SpectrogramView {
    texture: Option<TextureHandle>,
    /// Canvas size in physical pixels that would fill the last layout
    desired_size: Option<[u32; 2]>,
}

impl SpectrogramView {
    /// Create a view with no texture yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the canvas into the texture, (re)allocating it on size changes
    pub fn upload(&mut self, ctx: &egui::Context, canvas: &PixelCanvas) {
        let size = [canvas.width() as usize, canvas.height() as usize];
        let image = ColorImage::from_rgba_unmultiplied(size, canvas.as_rgba());

        if let Some(texture) = self.texture.as_mut().filter(|t| t.size() == size) {
            texture.set(image, TextureOptions::NEAREST);
            return;
        }

        debug!("Allocating spectrogram texture {}x{}", size[0], size[1]);
        self.texture = Some(ctx.load_texture("spectrogram", image, TextureOptions::NEAREST));
    }

    /// Whether a texture has been uploaded
    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// Canvas size (physical pixels) matching the area the view was last given
    pub fn desired_size(&self) -> Option<[u32; 2]> {
        self.desired_size
    }

    /// Draw the axis and image into the remaining space
    pub fn show(&mut self, ui: &mut Ui, low_hz: f32, high_hz: f32) {
        let available = ui.available_size();
        let image_size = Vec2::new((available.x - AXIS_WIDTH).max(1.0), available.y.max(1.0));
        let ppp = ui.ctx().pixels_per_point();
        self.desired_size = Some([
            (image_size.x * ppp).round().max(1.0) as u32,
            (image_size.y * ppp).round().max(1.0) as u32,
        ]);

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            ui.add(FrequencyAxis::new(low_hz, high_hz, image_size.y).width(AXIS_WIDTH));

            let (rect, response) = ui.allocate_exact_size(image_size, Sense::hover());
            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, Color32::from_gray(12));

            if let Some(texture) = &self.texture {
                painter.image(
                    texture.id(),
                    rect,
                    Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
                if let Some(pointer) = response.hover_pos() {
                    let rows = texture.size()[1];
                    let fraction = (pointer.y - rect.top()) / rect.height();
                    let hz = frequency_at(low_hz, high_hz, rows, fraction);
                    painter.text(
                        pointer + Vec2::new(10.0, -10.0),
                        egui::Align2::LEFT_BOTTOM,
                        format_hz(hz),
                        egui::FontId::monospace(12.0),
                        Color32::WHITE,
                    );
                }
            } else {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Press \"Start microphone\" to begin",
                    egui::FontId::proportional(16.0),
                    ui.visuals().weak_text_color(),
                );
            }
        });
    }
}
