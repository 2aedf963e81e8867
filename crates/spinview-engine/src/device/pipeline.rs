use std::collections::HashMap;

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::backend::{ProgramInterface, ProgramSource};
use crate::mesh::Vertex;
use crate::view::{UniformSlot, ViewError};

/// Every uniform is one column-major `mat4x4<f32>`.
const MAT4_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

/// Inputs that change the compiled pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(super) struct PipelineKey {
    pub position: u32,
    pub color: Option<u32>,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
}

/// A linked program: shader module, one uniform buffer per declared uniform,
/// and the pipelines built for it so far.
pub(super) struct GpuProgram {
    interface: ProgramInterface,
    label: String,
    module: wgpu::ShaderModule,
    vertex_entry: String,
    fragment_entry: String,

    pipeline_layout: wgpu::PipelineLayout,
    uniform_buffers: HashMap<u32, wgpu::Buffer>,
    bind_group: wgpu::BindGroup,

    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl GpuProgram {
    pub fn link(device: &wgpu::Device, source: &ProgramSource<'_>) -> Result<Self, ViewError> {
        let interface = ProgramInterface::from_source(source)?;
        let label = source.label;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.wgsl.into()),
        });

        let bindings = interface.uniform_bindings();
        let min_binding_size = std::num::NonZeroU64::new(MAT4_SIZE);

        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = bindings
            .iter()
            .map(|&binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size,
                },
                count: None,
            })
            .collect();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &layout_entries,
        });

        let identity = Mat4::IDENTITY.to_cols_array();
        let uniform_buffers: HashMap<u32, wgpu::Buffer> = bindings
            .iter()
            .map(|&binding| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(&identity),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                (binding, buffer)
            })
            .collect();

        let group_entries: Vec<wgpu::BindGroupEntry<'_>> = uniform_buffers
            .iter()
            .map(|(&binding, buffer)| wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bind_group_layout,
            entries: &group_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        Ok(Self {
            interface,
            label: label.to_owned(),
            module,
            vertex_entry: source.vertex_entry.to_owned(),
            fragment_entry: source.fragment_entry.to_owned(),
            pipeline_layout,
            uniform_buffers,
            bind_group,
            pipelines: HashMap::new(),
        })
    }

    #[inline]
    pub fn interface(&self) -> &ProgramInterface {
        &self.interface
    }

    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Uploads `value` to the uniform at `slot`. Unresolved slots are skipped.
    pub fn write_uniform(&self, queue: &wgpu::Queue, slot: UniformSlot, value: Mat4) {
        let Some(buffer) = slot.binding().and_then(|b| self.uniform_buffers.get(&b)) else {
            return;
        };
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&value.to_cols_array()));
    }

    /// Returns the pipeline for `key`, building it on first use.
    pub fn pipeline(&mut self, device: &wgpu::Device, key: PipelineKey) -> &wgpu::RenderPipeline {
        let Self {
            label,
            module,
            vertex_entry,
            fragment_entry,
            pipeline_layout,
            pipelines,
            ..
        } = self;

        pipelines.entry(key).or_insert_with(|| {
            log::debug!("building pipeline for `{label}`: {key:?}");
            build_pipeline(
                device,
                label,
                module,
                pipeline_layout,
                vertex_entry,
                fragment_entry,
                key,
            )
        })
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    label: &str,
    module: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    vertex_entry: &str,
    fragment_entry: &str,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let mut attributes = vec![wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: key.position,
    }];
    if let Some(location) = key.color {
        attributes.push(wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: Vertex::COLOR_OFFSET,
            shader_location: location,
        });
    }

    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: Vertex::STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &attributes,
    };

    let depth_stencil = key.depth_format.map(|format| wgpu::DepthStencilState {
        format,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module,
            entry_point: Some(vertex_entry),
            compilation_options: Default::default(),
            buffers: &[vertex_layout],
        },

        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fragment_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: key.color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
