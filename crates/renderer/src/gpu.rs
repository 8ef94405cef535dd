//! wgpu implementation of [`RenderSurface`].
//! wgpu = 25.x, winit = 0.30.x

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use asset::MeshData;
use bytemuck::{Pod, Zeroable};
use corelib::{Mat4, MeshId, light::LightRig};
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType,
    BlendState, Buffer, BufferBindingType, BufferUsages, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, DepthBiasState, DepthStencilState, Device, DeviceDescriptor,
    Extent3d, Features, FragmentState, Instance, InstanceDescriptor, Limits, LoadOp, Operations,
    PipelineLayoutDescriptor, PowerPreference, PresentMode, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, ShaderModuleDescriptor,
    ShaderSource, ShaderStages, StoreOp, Surface, SurfaceConfiguration, SurfaceError,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor, VertexBufferLayout, VertexState, VertexStepMode, util::DeviceExt,
};
use winit::{dpi::PhysicalSize, window::Window};

use crate::{FrameInput, OverlayFrame, RenderError, RenderSurface, overlay::OverlayPainter};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
const MAX_LIGHTS: usize = LightRig::MAX_POINT_LIGHTS;

/// Vertex: position + normal.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct GpuVertex {
    pos: [f32; 3],
    normal: [f32; 3],
}

impl GpuVertex {
    const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<GpuVertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
    };
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct PointLightUniform {
    /// xyz = position, w = range (0 = unlimited).
    position: [f32; 4],
    /// rgb = linear colour * intensity.
    color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    light_count: [u32; 4],
    lights: [PointLightUniform; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    color: [f32; 4],
    /// x = 1 for flat shading.
    flags: [u32; 4],
}

struct GpuMesh {
    vertex_buf: Buffer,
    index_buf: Buffer,
    index_count: u32,
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    pipeline: RenderPipeline,

    // Per-frame globals
    frame_buf: Buffer,
    frame_bg: BindGroup,

    // Per-object uniforms, addressed with dynamic offsets
    object_bgl: BindGroupLayout,
    object_buf: Buffer,
    object_bg: BindGroup,
    object_stride: u64,
    object_capacity: u64,

    meshes: HashMap<MeshId, GpuMesh>,
    depth_view: TextureView,
    overlay: OverlayPainter,

    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an `Arc<Window>`.
    pub async fn new(window: Arc<Window>, backends: wgpu::Backends) -> Result<Self, RenderError> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("GPU adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Configurator Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or_default(),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        let depth_view = create_depth_view(&device, &surface_config);

        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Showroom WGSL"),
            source: ShaderSource::Wgsl(include_str!("shaders/showroom.wgsl").into()),
        });

        // ==== Frame globals ====
        let frame_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Frame BGL"),
            entries: &[uniform_entry(
                ShaderStages::VERTEX_FRAGMENT,
                false,
                std::mem::size_of::<FrameUniform>(),
            )],
        });
        let frame_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame UBO"),
            contents: bytemuck::bytes_of(&FrameUniform::zeroed()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let frame_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BG"),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buf.as_entire_binding(),
            }],
        });

        // ==== Per-object uniforms ====
        let object_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Object BGL"),
            entries: &[uniform_entry(
                ShaderStages::VERTEX_FRAGMENT,
                true,
                std::mem::size_of::<ObjectUniform>(),
            )],
        });
        let align = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let object_stride = (std::mem::size_of::<ObjectUniform>() as u64).div_ceil(align) * align;
        let object_capacity = 8;
        let (object_buf, object_bg) =
            create_object_storage(&device, &object_bgl, object_stride, object_capacity);

        // ==== Pipeline ====
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Showroom PipelineLayout"),
            bind_group_layouts: &[&frame_bgl, &object_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Showroom Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GpuVertex::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                // Imported meshes do not agree on winding.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let overlay = OverlayPainter::new(&device, surface_format);

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline,
            frame_buf,
            frame_bg,
            object_bgl,
            object_buf,
            object_bg,
            object_stride,
            object_capacity,
            meshes: HashMap::new(),
            depth_view,
            overlay,
            width,
            height,
        })
    }

    /// UI to composite over the next redraws.
    pub fn set_overlay(&mut self, frame: OverlayFrame) {
        self.overlay.set_frame(frame);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        let (w, h) = (self.width, self.height);
        RenderSurface::resize(self, w, h);
    }

    fn upload_mesh(&mut self, id: MeshId, mesh: &MeshData) {
        let vertices: Vec<GpuVertex> = mesh
            .vertices
            .iter()
            .map(|v| GpuVertex {
                pos: v.position,
                normal: v.normal,
            })
            .collect();
        let vertex_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh VB"),
                contents: bytemuck::cast_slice(&vertices),
                usage: BufferUsages::VERTEX,
            });
        let index_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh IB"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: BufferUsages::INDEX,
            });
        log::debug!("Uploaded mesh {:?}: {} vertices", id, vertices.len());
        self.meshes.insert(
            id,
            GpuMesh {
                vertex_buf,
                index_buf,
                index_count: mesh.indices.len() as u32,
            },
        );
    }

    fn ensure_object_capacity(&mut self, count: u64) {
        if count <= self.object_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        let (buf, bg) =
            create_object_storage(&self.device, &self.object_bgl, self.object_stride, capacity);
        self.object_buf = buf;
        self.object_bg = bg;
        self.object_capacity = capacity;
    }
}

impl RenderSurface for GpuState {
    /// Reconfigure surface & recreate depth view.
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    fn render(&mut self, frame: &FrameInput<'_>) -> Result<(), RenderError> {
        // --- geometry for anything new in the scene
        let mut draws: Vec<(MeshId, ObjectUniform)> = Vec::with_capacity(frame.scene.len());
        for (_, object) in frame.scene.iter() {
            if !self.meshes.contains_key(&object.mesh) {
                match frame.meshes.mesh(object.mesh) {
                    Some(mesh) => self.upload_mesh(object.mesh, mesh),
                    None => {
                        log::warn!("'{}' references unknown mesh {:?}", object.name, object.mesh);
                        continue;
                    }
                }
            }
            let [r, g, b] = object.material.color.to_linear();
            draws.push((
                object.mesh,
                ObjectUniform {
                    model: object.transform.matrix().to_cols_array_2d(),
                    normal: Mat4::from_mat3(object.transform.normal_matrix()).to_cols_array_2d(),
                    color: [r, g, b, 1.0],
                    flags: [u32::from(object.material.flat_shading), 0, 0, 0],
                },
            ));
        }

        // --- uniforms
        self.queue.write_buffer(
            &self.frame_buf,
            0,
            bytemuck::bytes_of(&frame_uniform(frame)),
        );
        self.ensure_object_capacity(draws.len() as u64);
        if !draws.is_empty() {
            let stride = self.object_stride as usize;
            let mut staging = vec![0u8; stride * draws.len()];
            for (i, (_, uniform)) in draws.iter().enumerate() {
                let bytes = bytemuck::bytes_of(uniform);
                staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
            }
            self.queue.write_buffer(&self.object_buf, 0, &staging);
        }

        // --- frame & passes
        let surface_tex = match self.surface.get_current_texture() {
            Ok(tex) => tex,
            Err(err) if Self::is_surface_lost(&err) => {
                log::warn!("Surface {:?}; reconfiguring and skipping frame", err);
                self.recreate_surface();
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let view = surface_tex.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let [r, g, b] = frame.clear_color.to_linear();
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("ScenePass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.frame_bg, &[]);
            for (i, (mesh_id, _)) in draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(mesh_id) else {
                    continue;
                };
                let offset = (i as u64 * self.object_stride) as u32;
                rpass.set_bind_group(1, &self.object_bg, &[offset]);
                rpass.set_vertex_buffer(0, mesh.vertex_buf.slice(..));
                rpass.set_index_buffer(mesh.index_buf.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        let uploads = self.overlay.paint(
            &self.device,
            &self.queue,
            &mut encoder,
            &view,
            [self.width, self.height],
        );

        self.queue
            .submit(uploads.into_iter().chain(Some(encoder.finish())));
        surface_tex.present();
        log::trace!("Frame presented: {} object(s)", draws.len());
        Ok(())
    }
}

fn frame_uniform(frame: &FrameInput<'_>) -> FrameUniform {
    let mut lights = [PointLightUniform::zeroed(); MAX_LIGHTS];
    let count = frame.lights.points.len().min(MAX_LIGHTS);
    for (slot, light) in lights.iter_mut().zip(&frame.lights.points) {
        let [r, g, b] = light.color.to_linear();
        let p = light.position;
        *slot = PointLightUniform {
            position: [p.x, p.y, p.z, light.distance],
            color: [r * light.intensity, g * light.intensity, b * light.intensity, 0.0],
        };
    }
    let [ar, ag, ab] = frame.lights.ambient.color.to_linear();
    let ai = frame.lights.ambient.intensity;
    let eye = frame.camera.eye;
    FrameUniform {
        view_proj: frame.camera.proj_view().to_cols_array_2d(),
        camera_pos: [eye.x, eye.y, eye.z, 1.0],
        ambient: [ar * ai, ag * ai, ab * ai, 0.0],
        light_count: [count as u32, 0, 0, 0],
        lights,
    }
}

fn uniform_entry(visibility: ShaderStages, dynamic: bool, size: usize) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

fn create_object_storage(
    device: &Device,
    layout: &BindGroupLayout,
    stride: u64,
    capacity: u64,
) -> (Buffer, BindGroup) {
    let buf = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Object UBO"),
        size: stride * capacity,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Object BG"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buf,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
            }),
        }],
    });
    (buf, bg)
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}
