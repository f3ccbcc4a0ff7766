//! The orrery scene: bodies with their orbits, rings and labels, the belts and
//! the skybox, plus the depth-sorted per-frame render sequence.

pub mod belt;
pub mod draw_list;
pub mod entity;
pub mod label;
pub mod mesh;
pub mod orbit;
pub mod scene;
pub mod sequencer;
pub mod starfield;
pub mod surface;

pub use belt::{Belt, BeltConfig};
pub use draw_list::{DepthSortKey, DepthSortedDrawList, build_order};
pub use entity::{Renderable, dispatch};
pub use label::{Billboard, rasterize_label};
pub use orbit::{Orbit, RingSystem};
pub use scene::{Scene, SceneSettings};
pub use sequencer::{FramePhase, FrameStats, RenderPassSequencer};
