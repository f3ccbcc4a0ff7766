//! A [`RenderBackend`] that records calls instead of drawing.
//!
//! Used for headless runs and to check frame sequencing without a GPU.

use std::collections::{HashMap, HashSet};

use glam::Mat4;

use crate::backend::{
    BackendError, DepthCompare, FrameUniforms, InstanceKey, Material, MaterialKey, MeshKey,
    RenderBackend, RenderState, ResourceUploader, ShaderFamily, check_material_texture,
};
use crate::buffer::MeshData;

/// One call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Clear([f32; 4]),
    SetFrameUniforms(FrameUniforms),
    SetDepthTest(bool),
    SetBlending(bool),
    SetDepthCompare(DepthCompare),
    /// A draw with the state that was in effect when it was issued.
    Draw {
        mesh: MeshKey,
        material: MaterialKey,
        model: Mat4,
        state: RenderState,
    },
    DrawInstanced {
        mesh: MeshKey,
        material: MaterialKey,
        instances: InstanceKey,
        state: RenderState,
    },
    Present,
}

impl BackendCall {
    /// The material of a draw call.
    pub fn material(&self) -> Option<MaterialKey> {
        match self {
            Self::Draw { material, .. } | Self::DrawInstanced { material, .. } => Some(*material),
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.material().is_some()
    }
}

/// Records every call and uploaded resource key.
///
/// A permissive recorder accepts draws of anything; a strict one rejects
/// draws that reference resources never uploaded, the way the GPU backend
/// does.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    state: RenderState,
    meshes: HashSet<MeshKey>,
    materials: HashMap<MaterialKey, ShaderFamily>,
    instances: HashMap<InstanceKey, usize>,
    strict: bool,
    frames: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that validates resource keys on draw.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// Draw calls only, in issue order.
    pub fn draws(&self) -> impl Iterator<Item = &BackendCall> {
        self.calls.iter().filter(|call| call.is_draw())
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn frames_presented(&self) -> u32 {
        self.frames
    }

    pub fn has_mesh(&self, key: MeshKey) -> bool {
        self.meshes.contains(&key)
    }

    pub fn material_family(&self, key: MaterialKey) -> Option<ShaderFamily> {
        self.materials.get(&key).copied()
    }

    pub fn instance_count(&self, key: InstanceKey) -> Option<usize> {
        self.instances.get(&key).copied()
    }

    fn check_draw(&self, mesh: MeshKey, material: MaterialKey) -> Result<(), BackendError> {
        if !self.strict {
            return Ok(());
        }
        if !self.meshes.contains(&mesh) {
            return Err(BackendError::MissingMesh(mesh));
        }
        if !self.materials.contains_key(&material) {
            return Err(BackendError::MissingMaterial(material));
        }
        Ok(())
    }
}

impl RenderBackend for RecordingBackend {
    fn clear(&mut self, color: [f32; 4]) {
        self.state = RenderState::default();
        self.calls.push(BackendCall::Clear(color));
    }

    fn set_frame_uniforms(&mut self, uniforms: &FrameUniforms) {
        self.calls.push(BackendCall::SetFrameUniforms(*uniforms));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.state.depth_test = enabled;
        self.calls.push(BackendCall::SetDepthTest(enabled));
    }

    fn set_blending(&mut self, enabled: bool) {
        self.state.blending = enabled;
        self.calls.push(BackendCall::SetBlending(enabled));
    }

    fn set_depth_compare(&mut self, compare: DepthCompare) {
        self.state.depth_compare = compare;
        self.calls.push(BackendCall::SetDepthCompare(compare));
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
        self.check_draw(mesh, material)?;
        self.calls.push(BackendCall::Draw {
            mesh,
            material,
            model,
            state: self.state,
        });
        Ok(())
    }

    fn draw_instanced(
        &mut self,
        mesh: MeshKey,
        material: MaterialKey,
        instances: InstanceKey,
    ) -> Result<(), BackendError> {
        self.check_draw(mesh, material)?;
        if self.strict && !self.instances.contains_key(&instances) {
            return Err(BackendError::MissingInstances(instances));
        }
        self.calls.push(BackendCall::DrawInstanced {
            mesh,
            material,
            instances,
            state: self.state,
        });
        Ok(())
    }

    fn present(&mut self) {
        self.frames += 1;
        self.calls.push(BackendCall::Present);
    }
}

impl ResourceUploader for RecordingBackend {
    fn upload_mesh(&mut self, key: MeshKey, mesh: &MeshData) -> Result<(), BackendError> {
        if mesh.is_empty() {
            return Err(BackendError::EmptyMesh(key));
        }
        self.meshes.insert(key);
        Ok(())
    }

    fn upload_material(
        &mut self,
        key: MaterialKey,
        material: &Material,
    ) -> Result<(), BackendError> {
        check_material_texture(key, material)?;
        self.materials.insert(key, material.family);
        Ok(())
    }

    fn upload_instances(
        &mut self,
        key: InstanceKey,
        instances: &[Mat4],
    ) -> Result<(), BackendError> {
        self.instances.insert(key, instances.len());
        Ok(())
    }
}
