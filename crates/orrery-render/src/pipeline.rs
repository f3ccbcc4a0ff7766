//! Shader sources, GPU uniform layouts, and render pipeline creation.
//!
//! Pipelines are created lazily, one per [`PipelineKey`], because depth and
//! blend state are baked into a wgpu pipeline while the scene toggles them
//! per layer.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};

use crate::backend::{FrameUniforms, RenderState, ShaderFamily};
use crate::buffer::{InstanceRaw, Vertex};
use crate::depth::DepthBuffer;

/// WGSL for every mesh-based family.
pub const MESH_SHADER_SOURCE: &str = include_str!("mesh.wgsl");

/// WGSL for the skybox.
pub const SKYBOX_SHADER_SOURCE: &str = include_str!("skybox.wgsl");

/// GPU layout of [`FrameUniforms`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniformsRaw {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub skybox_inv_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub light_pos: [f32; 4],
    /// rgb: light color, w: ambient.
    pub light_color: [f32; 4],
}

impl From<&FrameUniforms> for FrameUniformsRaw {
    fn from(u: &FrameUniforms) -> Self {
        Self {
            view_proj: u.view_projection.to_cols_array_2d(),
            view: u.view.to_cols_array_2d(),
            skybox_inv_view_proj: u.skybox_inverse_view_projection.to_cols_array_2d(),
            camera_pos: u.camera_position.extend(1.0).to_array(),
            light_pos: u.light_position.extend(1.0).to_array(),
            light_color: u.light_color.extend(u.ambient).to_array(),
        }
    }
}

/// Per-draw uniforms, written at a dynamic offset.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DrawUniformsRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: emissive flag.
    pub params: [f32; 4],
}

/// Bind group layouts shared by every pipeline.
///
/// Group 0 holds frame uniforms, group 1 the per-draw uniforms at a dynamic
/// offset, group 2 the material texture and sampler.
pub struct BindLayouts {
    pub frame: wgpu::BindGroupLayout,
    pub draw: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
    pub cube: wgpu::BindGroupLayout,
}

impl BindLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(
                        std::mem::size_of::<FrameUniformsRaw>() as u64
                    ),
                },
                count: None,
            }],
        });

        let draw = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(
                        std::mem::size_of::<DrawUniformsRaw>() as u64
                    ),
                },
                count: None,
            }],
        });

        let texture = texture_layout(
            device,
            "texture-bind-group-layout",
            wgpu::TextureViewDimension::D2,
        );
        let cube = texture_layout(
            device,
            "cube-bind-group-layout",
            wgpu::TextureViewDimension::Cube,
        );

        Self {
            frame,
            draw,
            texture,
            cube,
        }
    }
}

fn texture_layout(
    device: &wgpu::Device,
    label: &str,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Everything that selects a distinct pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub family: ShaderFamily,
    pub state: RenderState,
}

impl PipelineKey {
    pub fn topology(&self) -> wgpu::PrimitiveTopology {
        match self.family {
            ShaderFamily::Line => wgpu::PrimitiveTopology::LineList,
            _ => wgpu::PrimitiveTopology::TriangleList,
        }
    }

    pub fn cull_mode(&self) -> Option<wgpu::Face> {
        match self.family {
            ShaderFamily::Lit | ShaderFamily::LitInstanced => Some(wgpu::Face::Back),
            _ => None,
        }
    }

    pub fn depth_stencil(&self) -> wgpu::DepthStencilState {
        let (depth_write_enabled, depth_compare) = if self.state.depth_test {
            (
                self.family != ShaderFamily::Skybox,
                self.state.depth_compare.to_wgpu(),
            )
        } else {
            (false, wgpu::CompareFunction::Always)
        };
        wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    pub fn blend(&self) -> Option<wgpu::BlendState> {
        self.state
            .blending
            .then_some(wgpu::BlendState::ALPHA_BLENDING)
    }

    fn entry_points(&self) -> (&'static str, &'static str) {
        match self.family {
            ShaderFamily::Lit => ("vs_mesh", "fs_lit"),
            ShaderFamily::LitInstanced => ("vs_instanced", "fs_lit"),
            ShaderFamily::Line | ShaderFamily::Flat => ("vs_mesh", "fs_flat"),
            ShaderFamily::Skybox => ("vs_skybox", "fs_skybox"),
        }
    }
}

/// Compiled shader modules.
pub struct Shaders {
    pub mesh: wgpu::ShaderModule,
    pub skybox: wgpu::ShaderModule,
}

impl Shaders {
    pub fn new(device: &wgpu::Device) -> Self {
        let mesh = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh-shader"),
            source: wgpu::ShaderSource::Wgsl(MESH_SHADER_SOURCE.into()),
        });
        let skybox = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skybox-shader"),
            source: wgpu::ShaderSource::Wgsl(SKYBOX_SHADER_SOURCE.into()),
        });
        Self { mesh, skybox }
    }
}

/// Build the pipeline for `key`.
pub fn create_pipeline(
    device: &wgpu::Device,
    shaders: &Shaders,
    layouts: &BindLayouts,
    surface_format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let material_layout = if key.family == ShaderFamily::Skybox {
        &layouts.cube
    } else {
        &layouts.texture
    };
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("scene-pipeline-layout"),
        bind_group_layouts: &[&layouts.frame, &layouts.draw, material_layout],
        immediate_size: 0,
    });

    let module = if key.family == ShaderFamily::Skybox {
        &shaders.skybox
    } else {
        &shaders.mesh
    };
    let buffers: &[wgpu::VertexBufferLayout<'static>] = match key.family {
        ShaderFamily::Skybox => &[],
        ShaderFamily::LitInstanced => &[Vertex::layout(), InstanceRaw::layout()],
        _ => &[Vertex::layout()],
    };
    let (vs_entry, fs_entry) = key.entry_points();
    let label = format!("{:?}-pipeline", key.family);

    log::debug!("Creating pipeline for {key:?}");

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some(vs_entry),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: key.topology(),
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: key.cull_mode(),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(key.depth_stencil()),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: key.blend(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}
