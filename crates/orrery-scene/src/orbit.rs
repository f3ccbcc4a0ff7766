//! Orbit paths and ring systems, both attached to a body.

use glam::{DVec3, Mat4, Quat, Vec3};
use orrery_orbit::{BodyId, BodyTransform, CelestialBody, RingDescriptor, orbit_plane_rotation};

/// The circular path a body travels around its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub body: BodyId,
    pub radius: f64,
    /// Constant tilt of the orbit plane.
    pub rotation: Quat,
}

impl Orbit {
    /// The orbit of `body`, or `None` for a body that does not move.
    pub fn for_body(body: &CelestialBody) -> Option<Self> {
        if body.is_origin_body() {
            return None;
        }
        Some(Self {
            body: body.id,
            radius: body.distance,
            rotation: orbit_plane_rotation(body.inclination_rad).as_quat(),
        })
    }

    /// Unit circle placed at the parent's current position, tilted, then
    /// scaled to the orbital distance.
    pub fn model_matrix(&self, center: DVec3) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.radius as f32),
            self.rotation,
            center.as_vec3(),
        )
    }
}

/// A planetary ring system, in the body's equatorial plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSystem {
    pub body: BodyId,
    pub descriptor: RingDescriptor,
    tilt: Quat,
}

impl RingSystem {
    pub fn for_body(body: &CelestialBody) -> Option<Self> {
        let descriptor = body.rings?;
        Some(Self {
            body: body.id,
            descriptor,
            tilt: BodyTransform::tilt(body),
        })
    }

    /// Rings follow the body's axial tilt but not its spin. The annulus mesh
    /// already carries the absolute radii, so there is no scale.
    pub fn model_matrix(&self, body: &BodyTransform) -> Mat4 {
        Mat4::from_rotation_translation(self.tilt, body.position_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_orbit::hierarchy::compute_world_transform;
    use orrery_orbit::{BodyDescriptor, compute_position};

    fn body(distance: f64, period: f64, inclination: f64) -> CelestialBody {
        let descriptor =
            BodyDescriptor::new("Body", 1.0, distance, period).with_inclination(inclination);
        CelestialBody::new(BodyId(3), &descriptor, None)
    }

    #[test]
    fn test_origin_body_has_no_orbit() {
        assert!(Orbit::for_body(&body(0.0, 0.0, 0.0)).is_none());
        assert!(Orbit::for_body(&body(10.0, 100.0, 0.0)).is_some());
    }

    #[test]
    fn test_stationary_root_away_from_origin_has_orbit() {
        let orbit = Orbit::for_body(&body(25.0, 0.0, 0.0)).unwrap();
        assert_eq!(orbit.radius, 25.0);
    }

    #[test]
    fn test_body_sits_on_its_drawn_orbit() {
        let b = body(20.0, 50.0, 17.0);
        let orbit = Orbit::for_body(&b).unwrap();
        let center = DVec3::new(3.0, -1.0, 2.0);
        let model = orbit.model_matrix(center);

        for step in 0..16 {
            let t = step as f64 * 50.0 / 16.0;
            let angle = b.orbital_omega * t;
            // The vertex the circle mesh has at this angle.
            let local = Vec3::new(angle.sin() as f32, 0.0, angle.cos() as f32);
            let drawn = model.transform_point3(local);
            let actual = (center + compute_position(&b, t)).as_vec3();
            assert!(
                (drawn - actual).length() < 1e-3,
                "t={t}: drawn {drawn} vs body {actual}"
            );
        }
    }

    #[test]
    fn test_ring_follows_body_without_spin() {
        let mut descriptor =
            BodyDescriptor::new("Ringed", 2.0, 60.0, 10_000.0).with_spin(26.7, 0.44);
        descriptor.rings = Some(RingDescriptor {
            inner_radius: 3.0,
            outer_radius: 5.0,
            color: [1.0; 3],
            opacity: 0.7,
        });
        let b = CelestialBody::new(BodyId(6), &descriptor, None);
        let ring = RingSystem::for_body(&b).unwrap();

        let at = |t: f64| ring.model_matrix(&compute_world_transform(&b, DVec3::ZERO, t));

        let m0 = at(0.0);
        let m1 = at(0.2);
        // Same orientation at different spin angles.
        assert!((m0.x_axis - m1.x_axis).length() < 1e-6);
        assert!((m0.y_axis - m1.y_axis).length() < 1e-6);
        // Tilted by the obliquity.
        let normal = m0.transform_vector3(Vec3::Y);
        let tilt = normal.angle_between(Vec3::Y).to_degrees();
        assert!((tilt - 26.7).abs() < 1e-2);
    }
}
