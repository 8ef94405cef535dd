//! egui overlay pass drawn on top of the scene.

use egui::{ClippedPrimitive, TextureId, TexturesDelta};
use wgpu::{CommandBuffer, CommandEncoder, Device, Queue, TextureFormat, TextureView};

/// Tessellated UI for one frame, produced by the platform's egui host.
pub struct OverlayFrame {
    pub primitives: Vec<ClippedPrimitive>,
    pub textures_delta: TexturesDelta,
    pub pixels_per_point: f32,
}

pub(crate) struct OverlayPainter {
    renderer: egui_wgpu::Renderer,
    primitives: Vec<ClippedPrimitive>,
    pixels_per_point: f32,
    pending: TexturesDelta,
    to_free: Vec<TextureId>,
}

impl OverlayPainter {
    pub(crate) fn new(device: &Device, format: TextureFormat) -> Self {
        Self {
            renderer: egui_wgpu::Renderer::new(device, format, None, 1, false),
            primitives: Vec::new(),
            pixels_per_point: 1.0,
            pending: TexturesDelta::default(),
            to_free: Vec::new(),
        }
    }

    /// Replace the primitives; texture uploads accumulate until painted.
    pub(crate) fn set_frame(&mut self, frame: OverlayFrame) {
        self.primitives = frame.primitives;
        self.pixels_per_point = frame.pixels_per_point;
        self.pending.append(frame.textures_delta);
    }

    /// Record the overlay pass. Returned buffers must be submitted before
    /// `encoder`.
    pub(crate) fn paint(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        size_in_pixels: [u32; 2],
    ) -> Vec<CommandBuffer> {
        for id in self.to_free.drain(..) {
            self.renderer.free_texture(&id);
        }
        let delta = std::mem::take(&mut self.pending);
        for (id, image_delta) in &delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.to_free = delta.free;

        if self.primitives.is_empty() {
            return Vec::new();
        }
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: self.pixels_per_point,
        };
        let uploads =
            self.renderer
                .update_buffers(device, queue, encoder, &self.primitives, &screen);

        let mut pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("OverlayPass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            })
            .forget_lifetime();
        self.renderer.render(&mut pass, &self.primitives, &screen);
        drop(pass);
        uploads
    }
}
