//! wgpu device and surface management.

use crate::{RenderError, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Backend groups tried in order. GL goes last because probing it can abort
/// on machines without a display server.
const BACKEND_ATTEMPTS: [wgpu::Backends; 2] = [wgpu::Backends::PRIMARY, wgpu::Backends::GL];

/// Ranks adapters: Discrete > Integrated > Virtual > CPU
pub fn adapter_score(device_type: wgpu::DeviceType) -> i32 {
    match device_type {
        wgpu::DeviceType::DiscreteGpu => 3,
        wgpu::DeviceType::IntegratedGpu => 2,
        wgpu::DeviceType::VirtualGpu => 1,
        wgpu::DeviceType::Cpu | wgpu::DeviceType::Other => 0,
    }
}

/// Pick a surface format egui can draw into without double gamma: a linear
/// 8-bit format if offered, otherwise the first supported one.
pub fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    let linear = |f: &&wgpu::TextureFormat| {
        matches!(
            f,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm
        )
    };
    formats.iter().find(linear).or(formats.first()).copied()
}

/// Adapter chosen by name when present, by [`adapter_score`] otherwise.
fn select_adapter(
    instance: &wgpu::Instance,
    backends: wgpu::Backends,
    preferred_name: Option<&str>,
) -> Option<wgpu::Adapter> {
    let mut adapters = instance.enumerate_adapters(backends);
    debug!("{} adapter(s) on {:?}", adapters.len(), backends);

    if let Some(name) = preferred_name.filter(|n| !n.is_empty()) {
        if let Some(index) = adapters.iter().position(|a| a.get_info().name == name) {
            return Some(adapters.swap_remove(index));
        }
        warn!("GPU '{}' not found, choosing automatically", name);
    }

    adapters
        .into_iter()
        .max_by_key(|a| adapter_score(a.get_info().device_type))
}

/// GPU device, queue and the instance used to create window surfaces
pub struct WgpuBackend {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub adapter_info: wgpu::AdapterInfo,
}

impl WgpuBackend {
    /// Open the best available GPU, trying each backend group in turn.
    pub async fn new(preferred_gpu: Option<&str>) -> Result<Self> {
        let mut last_error = RenderError::DeviceError("No backend attempted".to_string());
        for backends in BACKEND_ATTEMPTS {
            match Self::on_backends(backends, preferred_gpu).await {
                Ok(backend) => return Ok(backend),
                Err(e) => {
                    info!("GPU init on {:?} failed: {}", backends, e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    /// Open a GPU restricted to `backends`
    pub async fn on_backends(backends: wgpu::Backends, preferred_gpu: Option<&str>) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = match select_adapter(&instance, backends, preferred_gpu) {
            Some(adapter) => adapter,
            None => instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::LowPower,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|e| RenderError::DeviceError(format!("No adapter found: {}", e)))?,
        };

        let adapter_info = adapter.get_info();
        info!(
            "Using GPU {} ({:?} via {:?})",
            adapter_info.name, adapter_info.device_type, adapter_info.backend
        );

        // One texture plus egui fits within the downlevel limits
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("SpecFlow Device"),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await
            .map_err(|e| RenderError::DeviceError(e.to_string()))?;

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_info,
        })
    }

    /// Surface bound to `window` for the lifetime of the window
    pub fn create_surface(
        &self,
        window: Arc<winit::window::Window>,
    ) -> Result<wgpu::Surface<'static>> {
        self.instance
            .create_surface(window)
            .map_err(|e| RenderError::SurfaceError(format!("Failed to create surface: {}", e)))
    }

    /// Vsynced configuration for a `width` x `height` surface
    pub fn surface_config(
        &self,
        surface: &wgpu::Surface<'_>,
        width: u32,
        height: u32,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let caps = surface.get_capabilities(&self.adapter);
        let format = pick_surface_format(&caps.formats).ok_or_else(|| {
            RenderError::SurfaceError(format!(
                "{} cannot present to this window",
                self.adapter_info.name
            ))
        })?;

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Opaque),
            view_formats: Vec::new(),
            desired_maximum_frame_latency: 2,
        })
    }
}
