//! Renderer: the render-surface seam the configurator draws through, and its
//! wgpu implementation (flat-shaded Phong scene pass + egui overlay pass).

use asset::ModelLibrary;
use corelib::{Camera, Color, SceneGraph, light::LightRig};
use thiserror::Error;

mod gpu;
mod overlay;

pub use gpu::GpuState;
pub use overlay::OverlayFrame;

/// Everything one redraw reads.
#[derive(Clone, Copy)]
pub struct FrameInput<'a> {
    pub scene: &'a SceneGraph,
    pub camera: &'a Camera,
    pub lights: &'a LightRig,
    pub meshes: &'a ModelLibrary,
    pub clear_color: Color,
}

/// Output target the scene is drawn into.
pub trait RenderSurface {
    fn resize(&mut self, width: u32, height: u32);

    fn render(&mut self, frame: &FrameInput<'_>) -> Result<(), RenderError>;
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface has no supported formats")]
    NoSurfaceFormat,
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
