//! Application: window, GPU, UI and capture session wired together.

use crate::input::InputSource;
use crate::window::WindowContext;
use anyhow::{Context, Result};
use egui_wgpu::Renderer;
use egui_winit::State;
use specflow_core::{
    AppSettings, FrameOutcome, KeyValueStore, PixelCanvas, SessionError, SpectrogramSession,
    ToggleOutcome,
};
use specflow_render::WgpuBackend;
use specflow_ui::{AppUI, UIAction};
use std::sync::Arc;
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

/// GPU resources, created once the event loop is running
struct Graphics {
    backend: WgpuBackend,
    window: WindowContext,
    egui_context: egui::Context,
    egui_state: State,
    egui_renderer: Renderer,
}

/// The application
pub struct App {
    settings: AppSettings,
    session: SpectrogramSession<InputSource>,
    canvas: PixelCanvas,
    ui: AppUI,
    graphics: Option<Graphics>,
    error: Option<anyhow::Error>,
}

impl App {
    /// Build the headless part of the application
    pub fn new(
        settings: AppSettings,
        source: InputSource,
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self> {
        let status = source.describe(&settings.capture);
        let session = SpectrogramSession::new(source, settings.spectrogram.clone(), store)
            .context("Failed to create capture session")?;

        let mut ui = AppUI::new(&settings.spectrogram);
        ui.status = Some(status);
        ui.last_stats = session.last_stats().copied();

        Ok(Self {
            canvas: PixelCanvas::new(settings.window_width, settings.window_height),
            settings,
            session,
            ui,
            graphics: None,
            error: None,
        })
    }

    /// Fatal error that ended the event loop, if any
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title("SpecFlow - Spectrogram")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.window_width,
                self.settings.window_height,
            ))
            .with_min_inner_size(winit::dpi::LogicalSize::new(480, 320));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("Failed to create window")?,
        );

        let backend = pollster::block_on(WgpuBackend::new(None))
            .context("Failed to initialize GPU backend")?;
        let window_context = WindowContext::new(&backend, window.clone())?;

        let egui_context = egui::Context::default();
        let egui_state = State::new(
            egui_context.clone(),
            egui::viewport::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer = Renderer::new(
            &backend.device,
            window_context.format(),
            egui_wgpu::RendererOptions::default(),
        );

        info!("--- Entering Main Event Loop ---");
        self.graphics = Some(Graphics {
            backend,
            window: window_context,
            egui_context,
            egui_state,
            egui_renderer,
        });
        Ok(())
    }

    /// Pull audio, build the UI and paint one frame
    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.session.is_running() {
            if let FrameOutcome::Stopped { reason } = self.session.on_frame(&mut self.canvas) {
                self.ui.show_notice(reason.to_string());
                self.sync_ui();
            }
        }
        self.ui.live_samples = self
            .session
            .is_running()
            .then(|| self.session.aggregator().log().len());

        let Some(gfx) = self.graphics.as_mut() else {
            return Ok(());
        };

        let raw_input = gfx.egui_state.take_egui_input(&gfx.window.window);
        let full_output = gfx
            .egui_context
            .run(raw_input, |ctx| self.ui.render(ctx, &self.canvas));
        gfx.egui_state
            .handle_platform_output(&gfx.window.window, full_output.platform_output);

        let tris = gfx
            .egui_context
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                gfx.window.surface_config.width,
                gfx.window.surface_config.height,
            ],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = gfx.backend.device.clone();
        let queue = gfx.backend.queue.clone();
        for (id, delta) in &full_output.textures_delta.set {
            gfx.egui_renderer.update_texture(&device, &queue, *id, delta);
        }

        if let Some(frame) = gfx.window.acquire(&device)? {
            let view = frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Egui Encoder"),
            });
            let command_buffers = gfx.egui_renderer.update_buffers(
                &device,
                &queue,
                &mut encoder,
                &tris,
                &screen_descriptor,
            );

            {
                let mut render_pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Egui Render Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color {
                                    r: 0.02,
                                    g: 0.02,
                                    b: 0.03,
                                    a: 1.0,
                                }),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        })],
                        depth_stencil_attachment: None,
                        timestamp_writes: None,
                        occlusion_query_set: None,
                    })
                    .forget_lifetime();
                gfx.egui_renderer
                    .render(&mut render_pass, &tris, &screen_descriptor);
            }

            queue.submit(command_buffers.into_iter().chain(Some(encoder.finish())));
            gfx.window.window.pre_present_notify();
            frame.present();
        }

        for id in &full_output.textures_delta.free {
            gfx.egui_renderer.free_texture(id);
        }

        let repaint_soon = full_output
            .viewport_output
            .get(&egui::viewport::ViewportId::ROOT)
            .is_some_and(|v| v.repaint_delay.is_zero());

        self.handle_actions(event_loop);
        self.fit_canvas_to_view();

        // Re-arm the frame loop while capturing
        if self.session.is_running() || repaint_soon {
            if let Some(gfx) = &self.graphics {
                gfx.window.window.request_redraw();
            }
        }
        Ok(())
    }

    fn handle_actions(&mut self, event_loop: &ActiveEventLoop) {
        for action in self.ui.take_actions() {
            if self.ui.handle_view_action(&action) {
                continue;
            }
            match action {
                UIAction::ToggleCapture => self.toggle_capture(),
                UIAction::Quit => event_loop.exit(),
                _ => {}
            }
        }
    }

    fn toggle_capture(&mut self) {
        let (width, height) = (self.canvas.width(), self.canvas.height());
        match self.session.toggle(width, height) {
            Ok(ToggleOutcome::Started) => info!("Spectrogram started"),
            Ok(ToggleOutcome::Stopped(stats)) => info!("Spectrogram paused: {:?}", stats),
            Err(SessionError::Capture(e)) => {
                self.ui.show_notice(e.to_string());
            }
            Err(e) => error!("Could not toggle capture: {}", e),
        }
        self.sync_ui();
    }

    fn sync_ui(&mut self) {
        self.ui.capturing = self.session.is_running();
        self.ui.last_stats = self.session.last_stats().copied();
    }

    /// While idle, match the canvas to the view so the next session fills it.
    fn fit_canvas_to_view(&mut self) {
        if self.session.is_running() {
            return;
        }
        let Some([width, height]) = self.ui.desired_canvas_size() else {
            return;
        };
        if (width, height) == (self.canvas.width(), self.canvas.height()) {
            return;
        }
        self.canvas = PixelCanvas::new(width, height);
        self.session.redraw(&mut self.canvas);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            error!("Startup failed: {:#}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(gfx) = self.graphics.as_mut() else {
            return;
        };

        let response = gfx.egui_state.on_window_event(&gfx.window.window, &event);
        if response.repaint {
            gfx.window.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                gfx.window
                    .resize(&gfx.backend.device, size.width, size.height);
                gfx.window.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw(event_loop) {
                    error!("Application error: {:#}", e);
                    self.error = Some(e);
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.session.is_running() {
            warn!("Exiting while capturing, finalizing session");
            self.session.stop_capture();
        }
        info!("SpecFlow shutting down");
    }
}
