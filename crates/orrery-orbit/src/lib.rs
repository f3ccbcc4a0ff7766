//! Circular-orbit kinematics, the celestial body table, and the parent/child
//! transform hierarchy that positions every body each frame.

pub mod body;
pub mod clock;
pub mod descriptor;
pub mod error;
pub mod hierarchy;
pub mod kinematics;
pub mod table;

pub use body::{BodyId, CelestialBody};
pub use clock::SimClock;
pub use descriptor::{BodyDescriptor, DEFAULT_BODY_TABLE_RON, RingDescriptor};
pub use error::BodyTableError;
pub use hierarchy::{BodyHierarchy, BodyTransform, compute_world_transform};
pub use kinematics::{angular_frequency, compute_position, compute_spin, orbit_plane_rotation};
pub use table::{BodyTable, BodyTableBuilder};
