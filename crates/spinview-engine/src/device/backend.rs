use std::collections::HashMap;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::backend::{DrawSubmission, FrameStatus, ProgramSource, RenderBackend};
use crate::coords::PixelSize;
use crate::mesh::Mesh;
use crate::view::{
    ApiVersion, BufferHandle, ContextId, MeshHandle, ProgramHandle, RenderBufferDesc,
    RenderBufferKind, ViewError,
};

use super::GpuInit;
use super::pipeline::{GpuProgram, PipelineKey};
use super::surface::{self, SurfaceErrorAction};

/// wgpu backend bound to one window.
///
/// The window's surface is the color render buffer: creating a color buffer
/// resizes the swapchain, depth buffers are textures. A backend hosts one
/// context at a time.
pub struct WgpuBackend<'w> {
    window: &'w Window,
    init: GpuInit,
    next_id: u32,
    gpu: Option<GpuContext<'w>>,
}

/// Live wgpu objects behind a [`ContextId`].
struct GpuContext<'w> {
    id: ContextId,

    // Instance and adapter must outlive the device and surface.
    _instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// `None` until `configure_surface`.
    config: Option<wgpu::SurfaceConfiguration>,

    color_buffers: HashMap<BufferHandle, PixelSize>,
    depth_buffers: HashMap<BufferHandle, DepthTarget>,
    meshes: HashMap<MeshHandle, GpuMesh>,
    programs: HashMap<ProgramHandle, GpuProgram>,

    /// Frame recorded by `draw`, waiting for `present`.
    pending: Option<PendingFrame>,
}

struct DepthTarget {
    format: wgpu::TextureFormat,
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

/// A single acquired surface texture with its recorded commands.
///
/// Holding the surface texture blocks acquisition of the next one, so this is
/// presented or dropped within the same frame.
struct PendingFrame {
    color: BufferHandle,
    surface_texture: wgpu::SurfaceTexture,
    encoder: wgpu::CommandEncoder,
}

impl<'w> WgpuBackend<'w> {
    pub fn new(window: &'w Window, init: GpuInit) -> Self {
        Self {
            window,
            init,
            next_id: 0,
            gpu: None,
        }
    }

    fn mint(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn live(&self, ctx: ContextId) -> Result<&GpuContext<'w>, ViewError> {
        match &self.gpu {
            Some(gpu) if gpu.id == ctx => Ok(gpu),
            _ => Err(ViewError::StaleContext(ctx)),
        }
    }

    fn live_mut(&mut self, ctx: ContextId) -> Result<&mut GpuContext<'w>, ViewError> {
        match &mut self.gpu {
            Some(gpu) if gpu.id == ctx => Ok(gpu),
            _ => Err(ViewError::StaleContext(ctx)),
        }
    }

    async fn request_gpu(&self, id: ContextId) -> Result<GpuContext<'w>, ViewError> {
        let setup = |what: &str, e: &dyn std::fmt::Display| ViewError::Setup(format!("{what}: {e}"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: self.init.backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(self.window)
            .map_err(|e| setup("failed to create wgpu surface", &e))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: self.init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| setup("no suitable GPU adapter", &e))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("spinview device"),
                required_features: self.init.required_features,
                required_limits: self.init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| setup("failed to create wgpu device/queue", &e))?;

        Ok(GpuContext {
            id,
            _instance: instance,
            adapter,
            surface,
            device,
            queue,
            config: None,
            color_buffers: HashMap::new(),
            depth_buffers: HashMap::new(),
            meshes: HashMap::new(),
            programs: HashMap::new(),
            pending: None,
        })
    }
}

impl RenderBackend for WgpuBackend<'_> {
    fn create_context(&mut self, api: ApiVersion) -> Result<ContextId, ViewError> {
        if self.gpu.is_some() {
            return Err(ViewError::Setup(
                "window already has a rendering context".into(),
            ));
        }

        let id = ContextId::from_raw(self.mint());
        let gpu = pollster::block_on(self.request_gpu(id))?;

        let info = gpu.adapter.get_info();
        log::info!(
            "{api:?} context {} on {} ({:?})",
            id.raw(),
            info.name,
            info.backend
        );

        self.gpu = Some(gpu);
        Ok(id)
    }

    fn configure_surface(&mut self, ctx: ContextId, size: PixelSize) -> Result<(), ViewError> {
        let init = self.init.clone();
        let gpu = self.live_mut(ctx)?;

        let caps = gpu.surface.get_capabilities(&gpu.adapter);
        let format = surface::choose_surface_format(&caps, init.prefer_srgb)
            .ok_or_else(|| ViewError::Setup("surface reports no supported formats".into()))?;
        let alpha_mode = surface::choose_alpha_mode(&caps, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        gpu.surface.configure(&gpu.device, &config);
        log::debug!("surface configured: {format:?}, {alpha_mode:?}, {size}");
        gpu.config = Some(config);
        Ok(())
    }

    fn create_render_buffer(
        &mut self,
        ctx: ContextId,
        desc: RenderBufferDesc,
    ) -> Result<BufferHandle, ViewError> {
        if desc.size.is_empty() {
            return Err(ViewError::Resource(format!(
                "cannot allocate a {} render buffer",
                desc.size
            )));
        }
        self.live(ctx)?;
        let handle = BufferHandle::from_raw(self.mint());
        let gpu = self.live_mut(ctx)?;

        match desc.kind {
            RenderBufferKind::Color => {
                let GpuContext {
                    surface,
                    device,
                    config,
                    ..
                } = &mut *gpu;
                let config = config
                    .as_mut()
                    .ok_or_else(|| ViewError::Setup("surface is not configured".into()))?;
                surface::apply_size(surface, device, config, desc.size);
                gpu.color_buffers.insert(handle, desc.size);
            }
            RenderBufferKind::Depth(format) => {
                let format = format.to_wgpu();
                let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
                    label: Some("spinview depth buffer"),
                    size: wgpu::Extent3d {
                        width: desc.size.width,
                        height: desc.size.height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                });
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                gpu.depth_buffers.insert(
                    handle,
                    DepthTarget {
                        format,
                        _texture: texture,
                        view,
                    },
                );
            }
        }

        Ok(handle)
    }

    fn release_render_buffer(&mut self, ctx: ContextId, buffer: BufferHandle) {
        let Ok(gpu) = self.live_mut(ctx) else {
            log::warn!("release of buffer {} on stale context {}", buffer.raw(), ctx.raw());
            return;
        };
        let released = gpu.color_buffers.remove(&buffer).is_some()
            || gpu.depth_buffers.remove(&buffer).is_some();
        if !released {
            log::warn!("release of unknown render buffer {}", buffer.raw());
        }
    }

    fn upload_mesh(&mut self, ctx: ContextId, mesh: &Mesh) -> Result<MeshHandle, ViewError> {
        self.live(ctx)?;
        let handle = MeshHandle::from_raw(self.mint());
        let gpu = self.live_mut(ctx)?;

        let vertices = gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("spinview mesh vbo"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("spinview mesh ibo"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        gpu.meshes.insert(
            handle,
            GpuMesh {
                vertices,
                indices,
                index_count: mesh.index_count(),
            },
        );
        Ok(handle)
    }

    fn release_mesh(&mut self, ctx: ContextId, mesh: MeshHandle) {
        let released = match self.live_mut(ctx) {
            Ok(gpu) => gpu.meshes.remove(&mesh).is_some(),
            Err(_) => false,
        };
        if !released {
            log::warn!("release of unknown mesh {}", mesh.raw());
        }
    }

    fn link_program(
        &mut self,
        ctx: ContextId,
        source: &ProgramSource<'_>,
    ) -> Result<ProgramHandle, ViewError> {
        self.live(ctx)?;
        let handle = ProgramHandle::from_raw(self.mint());
        let gpu = self.live_mut(ctx)?;

        let program = GpuProgram::link(&gpu.device, source)?;
        gpu.programs.insert(handle, program);
        log::debug!("linked program `{}` as {}", source.label, handle.raw());
        Ok(handle)
    }

    fn attribute_location(
        &self,
        ctx: ContextId,
        program: ProgramHandle,
        name: &str,
    ) -> Result<Option<u32>, ViewError> {
        Ok(program_of(self.live(ctx)?, program)?.interface().attribute(name))
    }

    fn uniform_location(
        &self,
        ctx: ContextId,
        program: ProgramHandle,
        name: &str,
    ) -> Result<Option<u32>, ViewError> {
        Ok(program_of(self.live(ctx)?, program)?.interface().uniform(name))
    }

    fn draw(
        &mut self,
        ctx: ContextId,
        submission: &DrawSubmission<'_>,
    ) -> Result<FrameStatus, ViewError> {
        let gpu = self.live_mut(ctx)?;
        // A frame that was drawn but never presented is dropped here.
        gpu.pending = None;

        let color = submission.color.handle;
        let Some(&color_size) = gpu.color_buffers.get(&color) else {
            return Err(ViewError::UnknownHandle {
                kind: "render buffer",
                raw: color.raw(),
            });
        };
        let Some(config) = gpu.config.as_ref() else {
            return Err(ViewError::Setup("surface is not configured".into()));
        };
        if PixelSize::new(config.width, config.height) != color_size {
            log::debug!("color buffer {color_size} does not match surface; skipping frame");
            return Ok(FrameStatus::Skipped);
        }
        let color_format = config.format;

        let surface_texture = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => {
                return match surface::map_surface_error(&gpu.surface, &gpu.device, config, err) {
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        Ok(FrameStatus::Skipped)
                    }
                    SurfaceErrorAction::Fatal => {
                        Err(ViewError::Resource("surface out of memory".into()))
                    }
                };
            }
        };
        let color_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("spinview frame encoder"),
            });

        let program = match submission.program {
            Some(p) => Some(gpu.programs.get_mut(&p).ok_or(ViewError::UnknownHandle {
                kind: "program",
                raw: p.raw(),
            })?),
            None => None,
        };

        // Depth only applies when the program asked for it and the view has a buffer.
        let depth = match (&program, submission.depth) {
            (Some(p), Some(d)) if p.interface().depth_test() => Some(
                gpu.depth_buffers
                    .get(&d.handle)
                    .ok_or(ViewError::UnknownHandle {
                        kind: "render buffer",
                        raw: d.handle.raw(),
                    })?,
            ),
            _ => None,
        };

        let mesh = match submission.mesh {
            Some(m) => Some(gpu.meshes.get(&m).ok_or(ViewError::UnknownHandle {
                kind: "mesh",
                raw: m.raw(),
            })?),
            None => None,
        };

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("spinview frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(submission.clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: depth.map(|d| wgpu::RenderPassDepthStencilAttachment {
                    view: &d.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let slots = submission.slots;
            if let (Some(program), Some(mesh), Some(position)) =
                (program, mesh, slots.position.location())
            {
                program.write_uniform(&gpu.queue, slots.projection, submission.projection);
                program.write_uniform(&gpu.queue, slots.model_view, submission.model_view);

                let key = PipelineKey {
                    position,
                    color: slots.color.location(),
                    color_format,
                    depth_format: depth.map(|d| d.format),
                };
                let pipeline = program.pipeline(&gpu.device, key);

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, program.bind_group(), &[]);
                rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
                rpass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        gpu.pending = Some(PendingFrame {
            color,
            surface_texture,
            encoder,
        });
        Ok(FrameStatus::Presented)
    }

    fn present(&mut self, ctx: ContextId, color: BufferHandle) -> Result<(), ViewError> {
        let window = self.window;
        let gpu = self.live_mut(ctx)?;

        let frame = match gpu.pending.take() {
            Some(f) if f.color == color => f,
            _ => {
                return Err(ViewError::UnknownHandle {
                    kind: "pending frame",
                    raw: color.raw(),
                });
            }
        };

        gpu.queue.submit(std::iter::once(frame.encoder.finish()));
        window.pre_present_notify();
        frame.surface_texture.present();
        Ok(())
    }

    fn release_context(&mut self, ctx: ContextId) {
        match &self.gpu {
            Some(gpu) if gpu.id == ctx => {
                // Dropping the context drops every object created on it.
                self.gpu = None;
                log::debug!("released context {}", ctx.raw());
            }
            _ => log::warn!("release of unknown context {}", ctx.raw()),
        }
    }
}

fn program_of<'a>(gpu: &'a GpuContext<'_>, program: ProgramHandle) -> Result<&'a GpuProgram, ViewError> {
    gpu.programs.get(&program).ok_or(ViewError::UnknownHandle {
        kind: "program",
        raw: program.raw(),
    })
}
