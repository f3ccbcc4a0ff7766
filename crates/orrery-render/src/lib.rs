//! Rendering for the orrery: the camera, the [`RenderBackend`] primitive the
//! scene draws through, and its wgpu implementation.

pub mod backend;
pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod pipeline;
pub mod recording;
pub mod texture;
pub mod wgpu_backend;

pub use backend::{
    BackendError, DepthCompare, FrameUniforms, InstanceKey, Material, MaterialKey,
    MaterialTexture, MeshKey, RenderBackend, RenderState, ResourceUploader, ShaderFamily,
};
pub use buffer::{MeshData, Topology, Vertex};
pub use camera::Camera;
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use recording::{BackendCall, RecordingBackend};
pub use texture::{CubemapData, TextureData, TextureError};
pub use wgpu_backend::WgpuBackend;
