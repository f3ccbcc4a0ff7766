//! Parent-relative world transforms.

use glam::{DQuat, DVec3, Mat4, Quat, Vec3};

use crate::body::{BodyId, CelestialBody};
use crate::kinematics::{body_orientation, compute_position};
use crate::table::BodyTable;

/// A body's world placement for one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    /// World-space center of the body.
    pub position: DVec3,
    /// Offset from the parent's center (equal to `position` for root bodies).
    pub local_offset: DVec3,
    /// Tilt then spin.
    pub orientation: DQuat,
    /// Radius used as the uniform scale of the unit sphere mesh.
    pub radius: f64,
}

impl BodyTransform {
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        local_offset: DVec3::ZERO,
        orientation: DQuat::IDENTITY,
        radius: 0.0,
    };

    /// Single-precision model matrix `T(position) * R(orientation) * S(radius)`.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.radius as f32),
            self.orientation.as_quat(),
            self.position.as_vec3(),
        )
    }

    pub fn position_f32(&self) -> Vec3 {
        self.position.as_vec3()
    }

    /// Axial tilt only, without spin. Ring systems use this.
    pub fn tilt(body: &CelestialBody) -> Quat {
        Quat::from_rotation_z(body.obliquity_rad as f32)
    }
}

/// World transform of `body` at `t_days`, given its parent's world position.
///
/// `parent_position` is the origin for root bodies.
pub fn compute_world_transform(
    body: &CelestialBody,
    parent_position: DVec3,
    t_days: f64,
) -> BodyTransform {
    let local_offset = compute_position(body, t_days);
    BodyTransform {
        position: parent_position + local_offset,
        local_offset,
        orientation: body_orientation(body, t_days),
        radius: body.radius,
    }
}

/// Current world transforms for every body in a table.
///
/// [`update`](Self::update) evaluates bodies in the table's parents-first
/// order, so each child reads its parent's transform for the same instant.
#[derive(Debug, Clone, Default)]
pub struct BodyHierarchy {
    transforms: Vec<BodyTransform>,
}

impl BodyHierarchy {
    pub fn new(table: &BodyTable) -> Self {
        Self {
            transforms: vec![BodyTransform::IDENTITY; table.len()],
        }
    }

    /// Recompute every body's world transform for simulated time `t_days`.
    pub fn update(&mut self, table: &BodyTable, t_days: f64) {
        self.transforms.resize(table.len(), BodyTransform::IDENTITY);

        for &id in table.evaluation_order() {
            let body = table.get(id);
            let parent_position = body
                .parent
                .map(|p| self.transforms[p.index()].position)
                .unwrap_or(DVec3::ZERO);
            self.transforms[id.index()] = compute_world_transform(body, parent_position, t_days);
        }
    }

    /// Transform of `id`, or the identity for unknown ids.
    pub fn transform(&self, id: BodyId) -> &BodyTransform {
        self.transforms
            .get(id.index())
            .unwrap_or(&BodyTransform::IDENTITY)
    }

    pub fn world_position(&self, id: BodyId) -> DVec3 {
        self.transform(id).position
    }

    /// World position of the point `body` orbits around.
    pub fn orbit_center(&self, body: &CelestialBody) -> DVec3 {
        body.parent
            .map(|p| self.world_position(p))
            .unwrap_or(DVec3::ZERO)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}
