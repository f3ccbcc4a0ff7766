//! Circular-orbit kinematics.
//!
//! Every orbit is a circle of radius `distance` around the parent. The orbit
//! plane starts as the XZ plane (the body sits at `+Z` at `t = 0`) and is then
//! tilted about the Z axis by the inclination. [`orbit_plane_rotation`] is the
//! same tilt, so a unit circle in XZ rotated by it and scaled by `distance`
//! passes exactly through every position [`compute_position`] returns.
//!
//! Time is in Earth days. All functions are pure: the same inputs always give
//! bit-identical outputs.

use std::f64::consts::TAU;

use glam::{DQuat, DVec3};

use crate::body::CelestialBody;

/// Radians per day for a period in days. A zero period means no motion.
///
/// The sign of the period carries through, so negative spin periods give
/// retrograde rotation.
pub fn angular_frequency(period_days: f64) -> f64 {
    if period_days == 0.0 {
        0.0
    } else {
        TAU / period_days
    }
}

/// Position of `body` relative to its parent at simulated time `t_days`.
pub fn compute_position(body: &CelestialBody, t_days: f64) -> DVec3 {
    let angle = body.orbital_omega * t_days;
    let (sin, cos) = angle.sin_cos();
    DVec3::new(sin * body.distance_cos, sin * body.distance_sin, cos * body.distance)
}

/// Spin angle about the body's polar axis at simulated time `t_days`.
pub fn compute_spin(body: &CelestialBody, t_days: f64) -> f64 {
    body.spin_omega * t_days
}

/// Rotation taking the reference XZ orbit plane to the body's inclined plane.
pub fn orbit_plane_rotation(inclination_rad: f64) -> DQuat {
    DQuat::from_rotation_z(inclination_rad)
}

/// Body orientation: axial tilt about Z, then spin about the tilted pole.
pub fn body_orientation(body: &CelestialBody, t_days: f64) -> DQuat {
    DQuat::from_rotation_z(body.obliquity_rad) * DQuat::from_rotation_y(compute_spin(body, t_days))
}
