//! Main window and its wgpu surface.

use anyhow::{Context, Result};
use specflow_render::WgpuBackend;
use std::sync::Arc;
use tracing::{debug, info, warn};
use winit::window::Window;

/// The `winit` window together with its configured surface
pub struct WindowContext {
    /// The `winit` window.
    pub window: Arc<Window>,
    /// The `wgpu` surface associated with the window.
    pub surface: wgpu::Surface<'static>,
    /// The configuration for the `wgpu` surface.
    pub surface_config: wgpu::SurfaceConfiguration,
}

impl WindowContext {
    /// Create and configure a surface for `window`
    pub fn new(backend: &WgpuBackend, window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let surface = backend
            .create_surface(window.clone())
            .context("Failed to create window surface")?;
        let surface_config = backend
            .surface_config(&surface, size.width, size.height)
            .context("Failed to configure window surface")?;
        surface.configure(&backend.device, &surface_config);

        info!(
            "Window surface {}x{} ({:?})",
            surface_config.width, surface_config.height, surface_config.format
        );

        Ok(Self {
            window,
            surface,
            surface_config,
        })
    }

    /// Surface texture format
    pub fn format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// Reconfigure after the window changed size. Zero sizes (minimised) are ignored.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(device, &self.surface_config);
        debug!("Surface resized to {}x{}", width, height);
    }

    /// Next frame to draw into, or `None` when this frame should be skipped
    pub fn acquire(&mut self, device: &wgpu::Device) -> Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(device, &self.surface_config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                debug!("Surface acquire timed out");
                Ok(None)
            }
            Err(e) => Err(anyhow::anyhow!("Failed to acquire surface texture: {}", e)),
        }
    }
}
