//! Generated surface textures for bodies and ring systems.

use glam::DVec3;
use noise::{NoiseFn, Simplex};
use orrery_orbit::{CelestialBody, RingDescriptor};
use orrery_render::TextureData;

pub const SURFACE_WIDTH: u32 = 128;
pub const SURFACE_HEIGHT: u32 = 64;
pub const RING_WIDTH: u32 = 128;

/// Bodies at least this large get gas-giant banding.
const GIANT_RADIUS: f64 = 2.0;

/// Fractal simplex noise seeded per body, normalized to `[-1, 1]`.
struct SurfaceNoise {
    noise: Simplex,
    octaves: u32,
}

impl SurfaceNoise {
    fn new(seed: u32, octaves: u32) -> Self {
        Self {
            noise: Simplex::new(seed),
            octaves: octaves.max(1),
        }
    }

    fn sample(&self, point: DVec3) -> f32 {
        let mut total = 0.0;
        let mut norm = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        for _ in 0..self.octaves {
            let p = point * frequency;
            total += self.noise.get([p.x, p.y, p.z]) * amplitude;
            norm += amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }
        (total / norm).clamp(-1.0, 1.0) as f32
    }
}

/// Texel center on the unit sphere, so the noise has no seam at the
/// wrap-around column.
fn sphere_point(x: u32, y: u32) -> DVec3 {
    let lon = (x as f64 + 0.5) / SURFACE_WIDTH as f64 * std::f64::consts::TAU;
    let lat = ((y as f64 + 0.5) / SURFACE_HEIGHT as f64 - 0.5) * std::f64::consts::PI;
    DVec3::new(lat.cos() * lon.cos(), lat.sin(), lat.cos() * lon.sin())
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Latitude bands over the body's base color, with per-texel speckle.
pub fn body_surface(body: &CelestialBody) -> TextureData {
    let (bands, band_strength, speckle) = if body.emissive {
        (2.0, 0.04, 0.06)
    } else if body.radius >= GIANT_RADIUS {
        (11.0, 0.14, 0.03)
    } else {
        (3.0, 0.05, 0.10)
    };
    let noise = SurfaceNoise::new(body.id.0, 4);
    // A per-body phase keeps same-colored bodies from looking identical.
    let phase = noise.sample(DVec3::new(0.5, 17.25, -3.5)) * std::f32::consts::PI;

    let mut pixels = Vec::with_capacity((SURFACE_WIDTH * SURFACE_HEIGHT * 4) as usize);
    for y in 0..SURFACE_HEIGHT {
        let latitude = y as f32 / (SURFACE_HEIGHT - 1) as f32;
        let band = (latitude * bands * std::f32::consts::PI + phase).sin() * band_strength;
        for x in 0..SURFACE_WIDTH {
            let shade = 1.0 + band + noise.sample(sphere_point(x, y) * 6.0) * speckle;
            pixels.extend_from_slice(&[
                to_byte(body.color[0] * shade),
                to_byte(body.color[1] * shade),
                to_byte(body.color[2] * shade),
                255,
            ]);
        }
    }

    TextureData {
        width: SURFACE_WIDTH,
        height: SURFACE_HEIGHT,
        pixels,
        nearest: false,
    }
}

/// Radial opacity profile for a ring system, one texel per radial step.
///
/// Color comes from the material; the texture carries ringlets in alpha and a
/// dark gap about two thirds of the way out.
pub fn ring_profile(ring: &RingDescriptor, seed: u32) -> TextureData {
    let noise = SurfaceNoise::new(seed, 3);
    let mut pixels = Vec::with_capacity((RING_WIDTH * 4) as usize);
    for x in 0..RING_WIDTH {
        let u = x as f32 / (RING_WIDTH - 1) as f32;
        let ringlet = 0.75 + 0.25 * noise.sample(DVec3::new(u as f64 * 24.0, 0.5, 0.0));
        let gap = if (0.62..0.68).contains(&u) { 0.1 } else { 1.0 };
        let edge_fade = (u * 8.0).min((1.0 - u) * 8.0).min(1.0);
        let alpha = ring.opacity * ringlet * gap * edge_fade;
        pixels.extend_from_slice(&[255, 255, 255, to_byte(alpha)]);
    }

    TextureData {
        width: RING_WIDTH,
        height: 1,
        pixels,
        nearest: false,
    }
}
