//! Instanced particle belts laid out once inside a torus.

use std::f32::consts::TAU;

use glam::{Mat4, Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Layout parameters for one belt.
///
/// The same config always produces the same instances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeltConfig {
    pub count: u32,
    /// Distance from the sun to the center of the torus tube.
    pub major_radius: f32,
    /// Radius of the torus tube.
    pub minor_radius: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub seed: u64,
}

impl BeltConfig {
    /// Main asteroid belt between Mars and Jupiter.
    pub fn asteroid(count: u32, seed: u64) -> Self {
        Self {
            count,
            major_radius: 38.0,
            minor_radius: 3.0,
            min_scale: 0.04,
            max_scale: 0.16,
            seed,
        }
    }

    /// Kuiper belt beyond Neptune.
    pub fn kuiper(count: u32, seed: u64) -> Self {
        Self {
            count,
            major_radius: 132.0,
            minor_radius: 14.0,
            min_scale: 0.08,
            max_scale: 0.3,
            seed,
        }
    }
}

/// One belt's instance transforms, computed at construction and never
/// changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Belt {
    pub name: &'static str,
    pub config: BeltConfig,
    instances: Vec<Mat4>,
}

impl Belt {
    pub fn generate(name: &'static str, config: BeltConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut instances = Vec::with_capacity(config.count as usize);

        for _ in 0..config.count {
            // Uniform over the tube's cross-section disk.
            let around = rng.random::<f32>() * TAU;
            let tube_angle = rng.random::<f32>() * TAU;
            let tube_radius = config.minor_radius * rng.random::<f32>().sqrt();
            let radial = config.major_radius + tube_radius * tube_angle.cos();
            let height = tube_radius * tube_angle.sin();
            let position = Vec3::new(around.sin() * radial, height, around.cos() * radial);

            let scale =
                config.min_scale + (config.max_scale - config.min_scale) * rng.random::<f32>();

            let axis = Vec3::new(
                rng.random::<f32>() * 2.0 - 1.0,
                rng.random::<f32>() * 2.0 - 1.0,
                rng.random::<f32>() * 2.0 - 1.0,
            )
            .try_normalize()
            .unwrap_or(Vec3::Y);
            let rotation = Quat::from_axis_angle(axis, rng.random::<f32>() * TAU);

            instances.push(Mat4::from_scale_rotation_translation(
                Vec3::splat(scale),
                rotation,
                position,
            ));
        }

        log::debug!(
            "Generated {} {name} instances (seed {:#x})",
            instances.len(),
            config.seed
        );

        Self {
            name,
            config,
            instances,
        }
    }

    pub fn instances(&self) -> &[Mat4] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> BeltConfig {
        BeltConfig {
            count: 500,
            major_radius: 40.0,
            minor_radius: 4.0,
            min_scale: 0.1,
            max_scale: 0.5,
            seed,
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = Belt::generate("a", config(11));
        let b = Belt::generate("b", config(11));
        assert_eq!(a.instances(), b.instances());
    }

    #[test]
    fn test_different_seed_different_layout() {
        let a = Belt::generate("a", config(1));
        let b = Belt::generate("b", config(2));
        assert_ne!(a.instances(), b.instances());
    }

    #[test]
    fn test_instances_inside_torus() {
        let cfg = config(3);
        let belt = Belt::generate("test", cfg);
        assert_eq!(belt.len(), 500);

        for m in belt.instances() {
            let (scale, _, position) = m.to_scale_rotation_translation();
            let radial = Vec3::new(position.x, 0.0, position.z).length();
            let tube = ((radial - cfg.major_radius).powi(2) + position.y.powi(2)).sqrt();
            assert!(tube <= cfg.minor_radius + 1e-3, "instance outside tube: {tube}");
            assert!(scale.x >= cfg.min_scale - 1e-4 && scale.x <= cfg.max_scale + 1e-4);
        }
    }

    #[test]
    fn test_empty_belt() {
        let belt = Belt::generate("none", BeltConfig::asteroid(0, 1));
        assert!(belt.is_empty());
    }

    #[test]
    fn test_builtin_belts_bracket_their_regions() {
        let asteroid = BeltConfig::asteroid(1, 0);
        let kuiper = BeltConfig::kuiper(1, 0);
        assert!(asteroid.major_radius - asteroid.minor_radius > 28.0);
        assert!(asteroid.major_radius + asteroid.minor_radius < 48.0);
        assert!(kuiper.major_radius - kuiper.minor_radius > 100.0);
    }
}
