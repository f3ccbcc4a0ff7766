//! The renderer primitive consumed by the scene.
//!
//! [`RenderBackend`] is the narrow set of state toggles and draw entry points
//! the per-frame sequence needs. Resource creation goes through the separate
//! [`ResourceUploader`] trait and happens once, before the first frame.

use glam::{Mat4, Vec3};

use crate::buffer::MeshData;
use crate::camera::Camera;
use crate::texture::{CubemapData, TextureData, TextureError};

/// Identifies an uploaded mesh. Payloads are body indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKey {
    /// Unit icosphere shared by every body.
    Sphere,
    /// Unit circle in the XZ plane, drawn as lines.
    OrbitCircle,
    /// Annulus for the ring system of one body.
    Ring(u32),
    /// Unit quad in the XY plane for labels.
    Quad,
    /// Low-poly rock instanced by the belts.
    Rock,
    /// Fullscreen triangle generated in the vertex shader.
    Fullscreen,
}

/// Identifies an uploaded material. Payloads are body or belt indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialKey {
    Body(u32),
    Orbit(u32),
    Ring(u32),
    Label(u32),
    Belt(u32),
    Skybox,
}

/// Identifies an uploaded per-instance transform buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey(pub u32);

/// Depth comparison applied to incoming fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthCompare {
    /// Pass when nearer than the stored depth. The default.
    #[default]
    Less,
    /// Also pass at equal depth. Lets geometry at the far plane through a
    /// buffer cleared to 1.0.
    LessEqual,
    Always,
}

impl DepthCompare {
    pub fn to_wgpu(self) -> wgpu::CompareFunction {
        match self {
            Self::Less => wgpu::CompareFunction::Less,
            Self::LessEqual => wgpu::CompareFunction::LessEqual,
            Self::Always => wgpu::CompareFunction::Always,
        }
    }
}

/// Global state in effect for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderState {
    pub depth_test: bool,
    pub blending: bool,
    pub depth_compare: DepthCompare,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: true,
            blending: false,
            depth_compare: DepthCompare::Less,
        }
    }
}

/// Which shader program a material is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderFamily {
    /// Textured and lit by the sun, unless emissive.
    Lit,
    /// Lit, with per-instance model matrices.
    LitInstanced,
    /// Unlit line list (orbits).
    Line,
    /// Unlit, double-sided, textured (rings and labels).
    Flat,
    /// Cubemap sampled along the view ray at the far plane.
    Skybox,
}

/// Texture bound with a material.
#[derive(Debug, Clone)]
pub enum MaterialTexture {
    /// 1x1 white; the material color alone decides the output.
    None,
    Rgba(TextureData),
    Cube(CubemapData),
}

/// Everything needed to create one material's GPU bindings.
#[derive(Debug, Clone)]
pub struct Material {
    pub family: ShaderFamily,
    /// Linear RGBA multiplied with the texture.
    pub color: [f32; 4],
    /// Skip lighting.
    pub emissive: bool,
    pub texture: MaterialTexture,
}

impl Material {
    pub fn new(family: ShaderFamily, color: [f32; 4]) -> Self {
        Self {
            family,
            color,
            emissive: false,
            texture: MaterialTexture::None,
        }
    }

    pub fn with_texture(mut self, texture: MaterialTexture) -> Self {
        self.texture = texture;
        self
    }

    pub fn emissive(mut self, emissive: bool) -> Self {
        self.emissive = emissive;
        self
    }
}

/// Shared per-frame shader inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub view_projection: Mat4,
    pub view: Mat4,
    /// Inverse of projection times the translation-free view.
    pub skybox_inverse_view_projection: Mat4,
    pub camera_position: Vec3,
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub ambient: f32,
}

impl FrameUniforms {
    /// Uniforms for `camera` with a point light at `light_position`.
    pub fn from_camera(
        camera: &Camera,
        light_position: Vec3,
        light_color: Vec3,
        ambient: f32,
    ) -> Self {
        Self {
            view_projection: camera.view_projection_matrix(),
            view: camera.view_matrix(),
            skybox_inverse_view_projection: camera.skybox_inverse_view_projection(),
            camera_position: camera.position,
            light_position,
            light_color,
            ambient,
        }
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            skybox_inverse_view_projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            light_position: Vec3::ZERO,
            light_color: Vec3::ONE,
            ambient: 0.0,
        }
    }
}

/// A draw or upload that could not be honoured.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("no mesh uploaded for {0:?}")]
    MissingMesh(MeshKey),
    #[error("no material uploaded for {0:?}")]
    MissingMaterial(MaterialKey),
    #[error("no instance buffer uploaded for {0:?}")]
    MissingInstances(InstanceKey),
    #[error("mesh {0:?} has no vertices")]
    EmptyMesh(MeshKey),
    #[error("material {key:?} uses {family:?}, which needs a {expected} texture")]
    WrongTextureKind {
        key: MaterialKey,
        family: ShaderFamily,
        expected: &'static str,
    },
    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// The renderer primitive driven once per frame by the pass sequencer.
///
/// State setters affect every following draw until changed. Draws referencing
/// a resource that was never uploaded return an error and are skipped; the
/// rest of the frame still renders.
pub trait RenderBackend {
    /// Start a frame: clear color to `color` and depth to the far plane.
    fn clear(&mut self, color: [f32; 4]);

    fn set_frame_uniforms(&mut self, uniforms: &FrameUniforms);

    fn set_depth_test(&mut self, enabled: bool);

    fn set_blending(&mut self, enabled: bool);

    fn set_depth_compare(&mut self, compare: DepthCompare);

    fn depth_compare(&self) -> DepthCompare;

    fn draw(
        &mut self,
        mesh: MeshKey,
        material: MaterialKey,
        model: Mat4,
    ) -> Result<(), BackendError>;

    fn draw_instanced(
        &mut self,
        mesh: MeshKey,
        material: MaterialKey,
        instances: InstanceKey,
    ) -> Result<(), BackendError>;

    /// Submit everything drawn since [`clear`](Self::clear) and show it.
    fn present(&mut self);
}

/// One-time creation of the GPU resources that draws refer to by key.
pub trait ResourceUploader {
    fn upload_mesh(&mut self, key: MeshKey, mesh: &MeshData) -> Result<(), BackendError>;

    fn upload_material(
        &mut self,
        key: MaterialKey,
        material: &Material,
    ) -> Result<(), BackendError>;

    fn upload_instances(
        &mut self,
        key: InstanceKey,
        instances: &[Mat4],
    ) -> Result<(), BackendError>;
}

/// Check a material's texture matches what its shader family samples.
pub(crate) fn check_material_texture(
    key: MaterialKey,
    material: &Material,
) -> Result<(), BackendError> {
    let ok = match (&material.texture, material.family) {
        (MaterialTexture::Cube(_), ShaderFamily::Skybox) => true,
        (_, ShaderFamily::Skybox) => false,
        (MaterialTexture::Cube(_), _) => false,
        _ => true,
    };
    if ok {
        return Ok(());
    }
    Err(BackendError::WrongTextureKind {
        key,
        family: material.family,
        expected: if material.family == ShaderFamily::Skybox {
            "cube"
        } else {
            "2D"
        },
    })
}
