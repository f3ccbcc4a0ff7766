//! A single celestial body with its precomputed orbital parameters.

use std::fmt;

use crate::descriptor::{BodyDescriptor, RingDescriptor};
use crate::kinematics::angular_frequency;

/// Stable index of a body inside its [`BodyTable`](crate::BodyTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u32);

impl BodyId {
    /// Id of the sentinel body returned by failed lookups.
    pub const UNDEFINED: BodyId = BodyId(u32::MAX);

    /// Position of this body in the table's storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_undefined(self) -> bool {
        self == Self::UNDEFINED
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            write!(f, "#undefined")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

static UNDEFINED_BODY: CelestialBody = CelestialBody {
    id: BodyId::UNDEFINED,
    name: String::new(),
    radius: 0.0,
    distance: 0.0,
    obliquity_deg: 0.0,
    orbital_period_days: 0.0,
    spin_period_days: 0.0,
    inclination_deg: 0.0,
    parent: None,
    color: [1.0, 0.0, 1.0],
    emissive: false,
    rings: None,
    orbital_omega: 0.0,
    spin_omega: 0.0,
    inclination_rad: 0.0,
    obliquity_rad: 0.0,
    distance_cos: 0.0,
    distance_sin: 0.0,
};

/// A sun, planet, moon, or dwarf planet.
///
/// Everything except the current transform is fixed at construction. The
/// angular frequencies and the inclined-distance components are derived once
/// so per-frame evaluation is a handful of multiplies and a sin/cos pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    pub id: BodyId,
    pub name: String,
    pub radius: f64,
    pub distance: f64,
    pub obliquity_deg: f64,
    pub orbital_period_days: f64,
    pub spin_period_days: f64,
    pub inclination_deg: f64,
    /// The body this one orbits, if any.
    pub parent: Option<BodyId>,
    pub color: [f32; 3],
    pub emissive: bool,
    pub rings: Option<RingDescriptor>,

    /// Radians per day around the parent (0 for a stationary body).
    pub orbital_omega: f64,
    /// Radians per day about the polar axis. Sign follows the spin period.
    pub spin_omega: f64,
    pub inclination_rad: f64,
    pub obliquity_rad: f64,
    /// `distance * cos(inclination)`
    pub distance_cos: f64,
    /// `distance * sin(inclination)`
    pub distance_sin: f64,
}

impl CelestialBody {
    /// Build a body from its descriptor. Parent resolution happens in the
    /// table builder, so the resolved id is passed in.
    pub fn new(id: BodyId, descriptor: &BodyDescriptor, parent: Option<BodyId>) -> Self {
        let inclination_rad = descriptor.inclination_deg.to_radians();
        Self {
            id,
            name: descriptor.name.clone(),
            radius: descriptor.radius,
            distance: descriptor.distance,
            obliquity_deg: descriptor.obliquity_deg,
            orbital_period_days: descriptor.orbital_period_days,
            spin_period_days: descriptor.spin_period_days,
            inclination_deg: descriptor.inclination_deg,
            parent,
            color: descriptor.color,
            emissive: descriptor.emissive,
            rings: descriptor.rings,
            orbital_omega: angular_frequency(descriptor.orbital_period_days),
            spin_omega: angular_frequency(descriptor.spin_period_days),
            inclination_rad,
            obliquity_rad: descriptor.obliquity_deg.to_radians(),
            distance_cos: descriptor.distance * inclination_rad.cos(),
            distance_sin: descriptor.distance * inclination_rad.sin(),
        }
    }

    /// The placeholder returned when a lookup misses. Zero radius, never moves.
    pub fn undefined() -> &'static CelestialBody {
        &UNDEFINED_BODY
    }

    pub fn is_undefined(&self) -> bool {
        self.id.is_undefined()
    }

    /// Bodies without a parent orbit the origin.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The root body sitting at the origin, with no orbit to draw (the sun).
    /// A stationary root placed away from the origin still has a path.
    pub fn is_origin_body(&self) -> bool {
        self.parent.is_none() && self.distance == 0.0
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            write!(f, "<undefined body>")
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use super::*;

    #[test]
    fn test_derived_parameters() {
        let desc = BodyDescriptor::new("Earth", 1.0, 10.0, 365.0).with_inclination(30.0);
        let body = CelestialBody::new(BodyId(3), &desc, None);

        assert!((body.orbital_omega - TAU / 365.0).abs() < 1e-15);
        assert!((body.distance_cos - 10.0 * 30f64.to_radians().cos()).abs() < 1e-12);
        assert!((body.distance_sin - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_period_means_zero_frequency() {
        let desc = BodyDescriptor::new("Sun", 5.0, 0.0, 0.0);
        let body = CelestialBody::new(BodyId(0), &desc, None);
        assert_eq!(body.orbital_omega, 0.0);
        assert_eq!(body.spin_omega, 0.0);
        assert!(body.is_origin_body());
    }

    #[test]
    fn test_retrograde_spin_is_negative() {
        let desc = BodyDescriptor::new("Venus", 1.0, 16.0, 224.7).with_spin(2.6, -243.0);
        let body = CelestialBody::new(BodyId(1), &desc, None);
        assert!(body.spin_omega < 0.0);
    }

    #[test]
    fn test_undefined_sentinel() {
        let sentinel = CelestialBody::undefined();
        assert!(sentinel.is_undefined());
        assert_eq!(sentinel.radius, 0.0);
        assert_eq!(sentinel.orbital_omega, 0.0);
        assert_eq!(sentinel.to_string(), "<undefined body>");
    }

    #[test]
    fn test_stationary_root_off_origin_is_not_origin_body() {
        let desc = BodyDescriptor::new("Beacon", 1.0, 40.0, 0.0);
        let body = CelestialBody::new(BodyId(3), &desc, None);
        assert_eq!(body.orbital_omega, 0.0);
        assert!(!body.is_origin_body());
    }

    #[test]
    fn test_moon_is_not_origin_body() {
        let desc = BodyDescriptor::new("Moon", 0.3, 0.0, 27.3);
        let body = CelestialBody::new(BodyId(2), &desc, Some(BodyId(1)));
        assert!(!body.is_origin_body());
    }
}
