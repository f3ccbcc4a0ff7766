//! Everything the scene can draw, as one sum type.

use glam::Mat4;
use orrery_orbit::BodyId;
use orrery_render::{BackendError, InstanceKey, MaterialKey, MeshKey, RenderBackend};

/// A single draw, carrying only what its kind needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Renderable {
    Body { id: BodyId, model: Mat4 },
    Orbit { id: BodyId, model: Mat4 },
    Ring { id: BodyId, model: Mat4 },
    Label { id: BodyId, model: Mat4 },
    BeltBatch { index: u32 },
    Skybox,
}

impl Renderable {
    pub fn mesh(&self) -> MeshKey {
        match self {
            Self::Body { .. } => MeshKey::Sphere,
            Self::Orbit { .. } => MeshKey::OrbitCircle,
            Self::Ring { id, .. } => MeshKey::Ring(id.0),
            Self::Label { .. } => MeshKey::Quad,
            Self::BeltBatch { .. } => MeshKey::Rock,
            Self::Skybox => MeshKey::Fullscreen,
        }
    }

    pub fn material(&self) -> MaterialKey {
        match self {
            Self::Body { id, .. } => MaterialKey::Body(id.0),
            Self::Orbit { id, .. } => MaterialKey::Orbit(id.0),
            Self::Ring { id, .. } => MaterialKey::Ring(id.0),
            Self::Label { id, .. } => MaterialKey::Label(id.0),
            Self::BeltBatch { index } => MaterialKey::Belt(*index),
            Self::Skybox => MaterialKey::Skybox,
        }
    }

    /// The body this draw belongs to, if any.
    pub fn body(&self) -> Option<BodyId> {
        match self {
            Self::Body { id, .. }
            | Self::Orbit { id, .. }
            | Self::Ring { id, .. }
            | Self::Label { id, .. } => Some(*id),
            Self::BeltBatch { .. } | Self::Skybox => None,
        }
    }
}

/// Issue the backend draw for `renderable`.
pub fn dispatch(
    renderable: &Renderable,
    backend: &mut dyn RenderBackend,
) -> Result<(), BackendError> {
    let mesh = renderable.mesh();
    let material = renderable.material();
    match *renderable {
        Renderable::Body { model, .. }
        | Renderable::Orbit { model, .. }
        | Renderable::Ring { model, .. }
        | Renderable::Label { model, .. } => backend.draw(mesh, material, model),
        Renderable::BeltBatch { index } => {
            backend.draw_instanced(mesh, material, InstanceKey(index))
        }
        Renderable::Skybox => backend.draw(mesh, material, Mat4::IDENTITY),
    }
}
