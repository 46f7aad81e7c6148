//! SpecFlow Render - GPU Setup
//!
//! This crate owns the wgpu side of the application:
//! - Adapter selection and device creation
//! - Window surface creation

use thiserror::Error;

pub mod backend;

pub use backend::WgpuBackend;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// No adapter, or the device could not be created
    #[error("Device error: {0}")]
    DeviceError(String),

    /// Surface creation or presentation failed
    #[error("Surface error: {0}")]
    SurfaceError(String),
}

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;
