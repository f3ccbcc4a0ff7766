//! [`RenderBackend`] on top of wgpu.
//!
//! wgpu bakes depth and blend state into pipelines and only lets one render
//! pass be recorded against the frame encoder at a time, while the scene
//! toggles state between layers and wants to issue draws one by one. The
//! backend bridges the two by recording each draw together with the state in
//! effect when it was issued, then encoding everything into a single pass in
//! [`present`](RenderBackend::present), in issue order.

use std::collections::HashMap;

use glam::Mat4;

use crate::backend::{
    BackendError, DepthCompare, FrameUniforms, InstanceKey, Material, MaterialKey, MaterialTexture,
    MeshKey, RenderBackend, RenderState, ResourceUploader, ShaderFamily, check_material_texture,
};
use crate::buffer::{GpuMesh, InstanceBuffer, MeshData};
use crate::depth::DepthBuffer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::RenderPassBuilder;
use crate::pipeline::{
    BindLayouts, DrawUniformsRaw, FrameUniformsRaw, PipelineKey, Shaders, create_pipeline,
};
use crate::texture::{TextureData, upload_cubemap, upload_texture_2d};

/// Draws the per-draw uniform buffer starts with room for.
const INITIAL_DRAW_CAPACITY: u64 = 256;

struct GpuMaterial {
    family: ShaderFamily,
    color: [f32; 4],
    emissive: bool,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug, Clone, Copy)]
struct RecordedDraw {
    mesh: MeshKey,
    material: MaterialKey,
    model: Mat4,
    instances: Option<InstanceKey>,
    state: RenderState,
}

/// Per-draw uniforms packed at aligned dynamic offsets.
struct DrawUniformBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: u64,
}

impl DrawUniformBuffer {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: u64) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let size = std::mem::size_of::<DrawUniformsRaw>() as u64;
        let stride = size.div_ceil(alignment) * alignment;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw-uniforms"),
            size: stride * capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw-uniforms-bind-group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size),
                }),
            }],
        });

        Self {
            buffer,
            bind_group,
            stride,
            capacity,
        }
    }

    fn ensure_capacity(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        draws: u64,
    ) {
        if draws <= self.capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        log::debug!("Growing draw uniform buffer to {capacity} draws");
        *self = Self::new(device, layout, capacity);
    }
}

/// The wgpu renderer.
pub struct WgpuBackend {
    context: RenderContext,
    depth: DepthBuffer,
    layouts: BindLayouts,
    shaders: Shaders,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    meshes: HashMap<MeshKey, GpuMesh>,
    materials: HashMap<MaterialKey, GpuMaterial>,
    instances: HashMap<InstanceKey, InstanceBuffer>,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_uniforms: DrawUniformBuffer,
    linear_sampler: wgpu::Sampler,
    nearest_sampler: wgpu::Sampler,
    frame_uniforms: FrameUniforms,
    state: RenderState,
    clear_color: [f32; 4],
    draws: Vec<RecordedDraw>,
}

impl WgpuBackend {
    pub fn new(context: RenderContext) -> Self {
        use wgpu::util::DeviceExt;

        let device = &context.device;
        let (width, height) = context.size();
        let depth = DepthBuffer::new(device, width, height);
        let layouts = BindLayouts::new(device);
        let shaders = Shaders::new(device);

        let frame_uniforms = FrameUniforms::default();
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame-uniforms"),
            contents: bytemuck::cast_slice(&[FrameUniformsRaw::from(&frame_uniforms)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-uniforms-bind-group"),
            layout: &layouts.frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let draw_uniforms = DrawUniformBuffer::new(device, &layouts.draw, INITIAL_DRAW_CAPACITY);

        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler-linear"),
            address_mode_u: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });
        let nearest_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler-nearest"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        log::info!("wgpu backend ready ({width}x{height}, {:?})", context.surface_format);

        Self {
            context,
            depth,
            layouts,
            shaders,
            pipelines: HashMap::new(),
            meshes: HashMap::new(),
            materials: HashMap::new(),
            instances: HashMap::new(),
            frame_buffer,
            frame_bind_group,
            draw_uniforms,
            linear_sampler,
            nearest_sampler,
            frame_uniforms,
            state: RenderState::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            draws: Vec::new(),
        }
    }

    /// Resize the surface and depth buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.depth.resize(&self.context.device, width, height);
    }

    pub fn size(&self) -> (u32, u32) {
        self.context.size()
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    fn record(&mut self, draw: RecordedDraw) -> Result<(), BackendError> {
        let mesh = self
            .meshes
            .get(&draw.mesh)
            .ok_or(BackendError::MissingMesh(draw.mesh))?;
        if mesh.index_count == 0 {
            return Err(BackendError::EmptyMesh(draw.mesh));
        }
        if !self.materials.contains_key(&draw.material) {
            return Err(BackendError::MissingMaterial(draw.material));
        }
        if let Some(key) = draw.instances
            && !self.instances.contains_key(&key)
        {
            return Err(BackendError::MissingInstances(key));
        }
        self.draws.push(draw);
        Ok(())
    }

    fn ensure_pipelines(&mut self) {
        for draw in &self.draws {
            let Some(material) = self.materials.get(&draw.material) else {
                continue;
            };
            let key = PipelineKey {
                family: material.family,
                state: draw.state,
            };
            self.pipelines.entry(key).or_insert_with(|| {
                create_pipeline(
                    &self.context.device,
                    &self.shaders,
                    &self.layouts,
                    self.context.surface_format,
                    key,
                )
            });
        }
    }

    fn write_uniforms(&mut self) {
        let queue = &self.context.queue;
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::cast_slice(&[FrameUniformsRaw::from(&self.frame_uniforms)]),
        );

        self.draw_uniforms.ensure_capacity(
            &self.context.device,
            &self.layouts.draw,
            self.draws.len() as u64,
        );

        let stride = self.draw_uniforms.stride as usize;
        let mut bytes = vec![0u8; stride * self.draws.len()];
        for (i, draw) in self.draws.iter().enumerate() {
            let (color, emissive) = self
                .materials
                .get(&draw.material)
                .map(|m| (m.color, m.emissive))
                .unwrap_or(([1.0; 4], false));
            let raw = DrawUniformsRaw {
                model: draw.model.to_cols_array_2d(),
                color,
                params: [if emissive { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
            };
            let offset = i * stride;
            bytes[offset..offset + std::mem::size_of::<DrawUniformsRaw>()]
                .copy_from_slice(bytemuck::bytes_of(&raw));
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.draw_uniforms.buffer, 0, &bytes);
        }
    }

    fn encode_and_submit(&mut self) -> Result<(), SurfaceError> {
        let frame = self.context.acquire_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame-encoder"),
                });

        {
            let mut pass = RenderPassBuilder::new()
                .clear_color(self.clear_color)
                .depth(&self.depth.view, DepthBuffer::CLEAR_VALUE)
                .label("scene-pass")
                .begin(&mut encoder, &view);

            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for (i, draw) in self.draws.iter().enumerate() {
                let (Some(mesh), Some(material)) =
                    (self.meshes.get(&draw.mesh), self.materials.get(&draw.material))
                else {
                    continue;
                };
                let key = PipelineKey {
                    family: material.family,
                    state: draw.state,
                };
                let Some(pipeline) = self.pipelines.get(&key) else {
                    continue;
                };

                pass.set_pipeline(pipeline);
                let offset = (i as u64 * self.draw_uniforms.stride) as u32;
                pass.set_bind_group(1, &self.draw_uniforms.bind_group, &[offset]);
                pass.set_bind_group(2, &material.bind_group, &[]);

                match draw.instances.and_then(|key| self.instances.get(&key)) {
                    Some(instances) => {
                        pass.set_vertex_buffer(1, instances.buffer.slice(..));
                        mesh.draw(&mut pass, 0..instances.count);
                    }
                    None => mesh.draw(&mut pass, 0..1),
                }
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl RenderBackend for WgpuBackend {
    fn clear(&mut self, color: [f32; 4]) {
        self.clear_color = color;
        self.draws.clear();
        self.state = RenderState::default();
    }

    fn set_frame_uniforms(&mut self, uniforms: &FrameUniforms) {
        self.frame_uniforms = *uniforms;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.state.depth_test = enabled;
    }

    fn set_blending(&mut self, enabled: bool) {
        self.state.blending = enabled;
    }

    fn set_depth_compare(&mut self, compare: DepthCompare) {
        self.state.depth_compare = compare;
    }

    fn depth_compare(&self) -> DepthCompare {
        self.state.depth_compare
    }

    fn draw(
        &mut self,
        mesh: MeshKey,
        material: MaterialKey,
        model: Mat4,
    ) -> Result<(), BackendError> {
        self.record(RecordedDraw {
            mesh,
            material,
            model,
            instances: None,
            state: self.state,
        })
    }

    fn draw_instanced(
        &mut self,
        mesh: MeshKey,
        material: MaterialKey,
        instances: InstanceKey,
    ) -> Result<(), BackendError> {
        self.record(RecordedDraw {
            mesh,
            material,
            model: Mat4::IDENTITY,
            instances: Some(instances),
            state: self.state,
        })
    }

    fn present(&mut self) {
        self.ensure_pipelines();
        self.write_uniforms();
        match self.encode_and_submit() {
            Ok(()) => {}
            Err(SurfaceError::Timeout) => log::debug!("Surface timeout, skipping frame"),
            Err(e) => log::warn!("Dropped frame: {e}"),
        }
        self.draws.clear();
    }
}

impl ResourceUploader for WgpuBackend {
    fn upload_mesh(&mut self, key: MeshKey, mesh: &MeshData) -> Result<(), BackendError> {
        if mesh.is_empty() {
            return Err(BackendError::EmptyMesh(key));
        }
        let gpu = GpuMesh::upload(&self.context.device, &format!("{key:?}"), mesh);
        self.meshes.insert(key, gpu);
        Ok(())
    }

    fn upload_material(
        &mut self,
        key: MaterialKey,
        material: &Material,
    ) -> Result<(), BackendError> {
        check_material_texture(key, material)?;
        let device = &self.context.device;
        let queue = &self.context.queue;
        let label = format!("{key:?}");

        let (layout, view, sampler) = match &material.texture {
            MaterialTexture::Cube(cube) => {
                let (_texture, view) = upload_cubemap(device, queue, &label, cube);
                (&self.layouts.cube, view, &self.linear_sampler)
            }
            MaterialTexture::Rgba(data) => {
                let (_texture, view) = upload_texture_2d(device, queue, &label, data);
                let sampler = if data.nearest {
                    &self.nearest_sampler
                } else {
                    &self.linear_sampler
                };
                (&self.layouts.texture, view, sampler)
            }
            MaterialTexture::None => {
                let white = TextureData::solid(1, 1, [255, 255, 255, 255]);
                let (_texture, view) = upload_texture_2d(device, queue, &label, &white);
                (&self.layouts.texture, view, &self.linear_sampler)
            }
        };

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-bind-group")),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        self.materials.insert(
            key,
            GpuMaterial {
                family: material.family,
                color: material.color,
                emissive: material.emissive,
                bind_group,
            },
        );
        Ok(())
    }

    fn upload_instances(
        &mut self,
        key: InstanceKey,
        instances: &[Mat4],
    ) -> Result<(), BackendError> {
        let buffer = InstanceBuffer::upload(&self.context.device, &format!("{key:?}"), instances);
        log::debug!("Uploaded {} instances for {key:?}", buffer.count);
        self.instances.insert(key, buffer);
        Ok(())
    }
}
