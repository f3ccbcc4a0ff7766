//! Serialized body descriptors and the built-in Solar System table.

use serde::{Deserialize, Serialize};

use crate::error::BodyTableError;

/// The built-in Solar System, in compressed scene units.
pub const DEFAULT_BODY_TABLE_RON: &str = include_str!("bodies.ron");

/// One row of the body table as it appears on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    pub name: String,
    pub radius: f64,
    /// Distance from the parent (or from the origin for root bodies).
    pub distance: f64,
    #[serde(default)]
    pub obliquity_deg: f64,
    /// Earth days per revolution. Zero means the body never moves.
    #[serde(default)]
    pub orbital_period_days: f64,
    /// Earth days per rotation. Negative values spin retrograde.
    #[serde(default)]
    pub spin_period_days: f64,
    #[serde(default)]
    pub inclination_deg: f64,
    /// Name of the body this one orbits.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    /// Self-lit bodies ignore the sun light (the sun itself).
    #[serde(default)]
    pub emissive: bool,
    #[serde(default)]
    pub rings: Option<RingDescriptor>,
}

/// A flat ring system lying in a body's equatorial plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingDescriptor {
    pub inner_radius: f64,
    pub outer_radius: f64,
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_color() -> [f32; 3] {
    [0.7, 0.7, 0.7]
}

fn default_opacity() -> f32 {
    0.6
}

impl BodyDescriptor {
    /// A plain grey body with no parent, tilt, or rings.
    pub fn new(
        name: impl Into<String>,
        radius: f64,
        distance: f64,
        orbital_period_days: f64,
    ) -> Self {
        Self {
            name: name.into(),
            radius,
            distance,
            obliquity_deg: 0.0,
            orbital_period_days,
            spin_period_days: 0.0,
            inclination_deg: 0.0,
            parent: None,
            color: default_color(),
            emissive: false,
            rings: None,
        }
    }

    /// Set the parent body by name.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the orbital inclination in degrees.
    pub fn with_inclination(mut self, inclination_deg: f64) -> Self {
        self.inclination_deg = inclination_deg;
        self
    }

    /// Set the axial tilt and spin period.
    pub fn with_spin(mut self, obliquity_deg: f64, spin_period_days: f64) -> Self {
        self.obliquity_deg = obliquity_deg;
        self.spin_period_days = spin_period_days;
        self
    }

    /// Check that every numeric field is usable.
    ///
    /// Radii and distances must be finite and non-negative; angles and periods
    /// must be finite. Ring radii must be ordered.
    pub fn validate(&self) -> Result<(), BodyTableError> {
        let non_negative = [("radius", self.radius), ("distance", self.distance)];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(self.invalid(field, value));
            }
        }

        let finite = [
            ("obliquity_deg", self.obliquity_deg),
            ("orbital_period_days", self.orbital_period_days),
            ("spin_period_days", self.spin_period_days),
            ("inclination_deg", self.inclination_deg),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(self.invalid(field, value));
            }
        }

        if let Some(rings) = &self.rings {
            if !rings.inner_radius.is_finite() || rings.inner_radius < 0.0 {
                return Err(self.invalid("rings.inner_radius", rings.inner_radius));
            }
            if !rings.outer_radius.is_finite() || rings.outer_radius <= rings.inner_radius {
                return Err(self.invalid("rings.outer_radius", rings.outer_radius));
            }
        }

        Ok(())
    }

    fn invalid(&self, field: &'static str, value: f64) -> BodyTableError {
        BodyTableError::InvalidField {
            name: self.name.clone(),
            field,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_parses() {
        let bodies: Vec<BodyDescriptor> = ron::from_str(DEFAULT_BODY_TABLE_RON).unwrap();
        assert!(bodies.len() >= 28);
        assert_eq!(bodies[0].name, "Sun");
        assert_eq!(bodies[0].orbital_period_days, 0.0);
        assert!(bodies[0].emissive);
        for body in &bodies {
            body.validate().unwrap();
        }
    }

    #[test]
    fn test_builtin_ringed_bodies() {
        let bodies: Vec<BodyDescriptor> = ron::from_str(DEFAULT_BODY_TABLE_RON).unwrap();
        let ringed: Vec<&str> = bodies
            .iter()
            .filter(|b| b.rings.is_some())
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(ringed, vec!["Saturn", "Uranus"]);
    }

    #[test]
    fn test_optional_fields_default() {
        let body: BodyDescriptor =
            ron::from_str("(name: \"Rock\", radius: 0.5, distance: 12.0)").unwrap();
        assert_eq!(body.parent, None);
        assert_eq!(body.orbital_period_days, 0.0);
        assert_eq!(body.color, default_color());
        assert!(body.rings.is_none());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let body = BodyDescriptor::new("Bad", -1.0, 5.0, 10.0);
        match body.validate() {
            Err(BodyTableError::InvalidField { field, .. }) => assert_eq!(field, "radius"),
            other => panic!("Expected InvalidField, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_period_rejected() {
        let body = BodyDescriptor::new("Bad", 1.0, 5.0, f64::NAN);
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_inverted_rings_rejected() {
        let mut body = BodyDescriptor::new("Ringed", 1.0, 5.0, 10.0);
        body.rings = Some(RingDescriptor {
            inner_radius: 3.0,
            outer_radius: 2.0,
            color: default_color(),
            opacity: 0.5,
        });
        assert!(body.validate().is_err());
    }
}
