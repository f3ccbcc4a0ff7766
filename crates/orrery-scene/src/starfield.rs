//! Procedural starfield baked into the skybox cubemap.

use glam::Vec3;
use orrery_render::CubemapData;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const DEFAULT_STAR_COUNT: u32 = 6000;
pub const DEFAULT_FACE_SIZE: u32 = 512;

/// A star on the sky sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub direction: Vec3,
    /// 0 is the dimmest star, 1 the brightest.
    pub brightness: f32,
    pub color: [f32; 3],
}

/// Deterministic star catalog for a seed.
pub fn generate_stars(seed: u64, count: u32) -> Vec<Star> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let theta = rng.random::<f32>() * std::f32::consts::TAU;
            let phi = (1.0 - 2.0 * rng.random::<f32>()).acos();
            let direction = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());

            // Many dim stars, few bright ones.
            let brightness = rng.random::<f32>().powf(4.0);
            let color = blackbody_to_rgb(2500.0 + brightness * 25000.0);

            Star {
                direction,
                brightness,
                color,
            }
        })
        .collect()
}

/// Approximate sRGB color of a blackbody at `temperature_k`.
pub fn blackbody_to_rgb(temperature_k: f32) -> [f32; 3] {
    let t = temperature_k / 100.0;
    let r = if t <= 66.0 {
        1.0
    } else {
        (329.698_73 * (t - 60.0).powf(-0.133_204_76) / 255.0).clamp(0.0, 1.0)
    };
    let g = if t <= 66.0 {
        (99.470_8 * t.ln() - 161.119_57).clamp(0.0, 255.0) / 255.0
    } else {
        (288.122_17 * (t - 60.0).powf(-0.075_514_85) / 255.0).clamp(0.0, 1.0)
    };
    let b = if t >= 66.0 {
        1.0
    } else if t <= 19.0 {
        0.0
    } else {
        (138.517_73 * (t - 10.0).ln() - 305.044_8).clamp(0.0, 255.0) / 255.0
    };
    [r, g, b]
}

/// Cube face index (+X, -X, +Y, -Y, +Z, -Z) and face UV in `[0, 1]` for a
/// direction, following the wgpu cubemap sampling convention.
pub fn direction_to_cube_face_uv(dir: Vec3) -> (usize, f32, f32) {
    let abs = dir.abs();
    let (face, u, v) = if abs.x >= abs.y && abs.x >= abs.z {
        if dir.x > 0.0 {
            (0, -dir.z / abs.x, -dir.y / abs.x)
        } else {
            (1, dir.z / abs.x, -dir.y / abs.x)
        }
    } else if abs.y >= abs.z {
        if dir.y > 0.0 {
            (2, dir.x / abs.y, dir.z / abs.y)
        } else {
            (3, dir.x / abs.y, -dir.z / abs.y)
        }
    } else if dir.z > 0.0 {
        (4, dir.x / abs.z, -dir.y / abs.z)
    } else {
        (5, -dir.x / abs.z, -dir.y / abs.z)
    };
    (face, u * 0.5 + 0.5, v * 0.5 + 0.5)
}

/// Splat `stars` into six `face_size` square RGBA8 faces on black.
pub fn bake_cubemap(stars: &[Star], face_size: u32) -> CubemapData {
    let face_size = face_size.max(1);
    let pixel_count = (face_size * face_size) as usize;
    let mut faces: Vec<Vec<[f32; 3]>> = vec![vec![[0.0; 3]; pixel_count]; 6];

    let mut add = |face: usize, x: i64, y: i64, color: [f32; 3], amount: f32| {
        if x < 0 || y < 0 || x >= face_size as i64 || y >= face_size as i64 {
            return;
        }
        let pixel = &mut faces[face][(y as u32 * face_size + x as u32) as usize];
        for (channel, c) in pixel.iter_mut().zip(color) {
            *channel = (*channel + c * amount).min(1.0);
        }
    };

    for star in stars {
        let (face, u, v) = direction_to_cube_face_uv(star.direction);
        let x = (u * face_size as f32).min(face_size as f32 - 1.0) as i64;
        let y = (v * face_size as f32).min(face_size as f32 - 1.0) as i64;

        add(face, x, y, star.color, 0.35 + star.brightness * 6.0);
        if star.brightness > 0.3 {
            let glow = star.brightness * 0.6;
            for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                add(face, x + dx, y + dy, star.color, glow);
            }
        }
    }

    let faces = faces
        .into_iter()
        .map(|face| {
            face.iter()
                .flat_map(|p| {
                    [
                        (p[0] * 255.0) as u8,
                        (p[1] * 255.0) as u8,
                        (p[2] * 255.0) as u8,
                        255,
                    ]
                })
                .collect()
        })
        .collect();

    CubemapData { face_size, faces }
}
