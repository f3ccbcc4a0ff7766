//! Camera for view and projection matrix generation.
//!
//! Depth is standard: the near plane maps to 0.0 and the far plane to 1.0, so
//! the depth buffer clears to 1.0 and the default comparison is `Less`.

use glam::{Mat4, Quat, Vec3};

use crate::backend::FrameUniforms;

/// A perspective camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World position.
    pub position: Vec3,
    /// Rotation as a unit quaternion. Identity looks down -Z.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// View matrix with the translation stripped, for geometry at infinity.
    pub fn infinite_view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation.inverse())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    /// Compute the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Maps clip-space points back to world directions, ignoring position.
    pub fn skybox_inverse_view_projection(&self) -> Mat4 {
        (self.projection_matrix() * self.infinite_view_matrix()).inverse()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// The up direction vector (+Y in camera space).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// The right direction vector (+X in camera space).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Update the aspect ratio. Zero-height viewports (minimized windows)
    /// leave the previous ratio in place.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    /// Per-frame shader inputs for this camera lit by a point light.
    pub fn to_uniform(
        &self,
        light_position: Vec3,
        light_color: Vec3,
        ambient: f32,
    ) -> FrameUniforms {
        FrameUniforms::from_camera(self, light_position, light_color, ambient)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 10000.0,
        }
    }
}
