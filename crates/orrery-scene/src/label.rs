//! Name labels: bitmap text rasterization and camera-facing billboards.

use glam::{Mat4, Vec3, Vec4};
use orrery_orbit::BodyId;
use orrery_render::TextureData;

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
const GLYPH_SPACING: u32 = 1;
const PADDING: u32 = 1;

/// 5x7 glyph rows, top to bottom, bit 4 is the leftmost column.
fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        ' ' => [0x00; 7],
        _ => return None,
    };
    Some(rows)
}

/// Rasterize `text` into an RGBA8 image: opaque white glyphs on a transparent
/// background, one texel per font pixel, sampled with nearest filtering.
///
/// Characters outside the glyph table are drawn as spaces.
pub fn rasterize_label(text: &str) -> TextureData {
    let chars: Vec<char> = text.chars().collect();
    let count = chars.len() as u32;
    let text_width = (count * (GLYPH_WIDTH + GLYPH_SPACING)).saturating_sub(GLYPH_SPACING);
    let width = text_width + PADDING * 2;
    let height = GLYPH_HEIGHT + PADDING * 2;

    let mut pixels = vec![0u8; (width * height * 4) as usize];
    for (i, &c) in chars.iter().enumerate() {
        let Some(rows) = glyph(c) else {
            log::debug!("No glyph for {c:?} in label {text:?}");
            continue;
        };
        let origin_x = PADDING + i as u32 * (GLYPH_WIDTH + GLYPH_SPACING);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let x = origin_x + col;
                let y = PADDING + row as u32;
                let offset = ((y * width + x) * 4) as usize;
                pixels[offset..offset + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }
    }

    TextureData {
        width,
        height,
        pixels,
        nearest: true,
    }
}

/// A body's name label, kept facing the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Billboard {
    pub body: BodyId,
    /// Texture width over height.
    pub aspect: f32,
}

impl Billboard {
    pub fn new(body: BodyId, texture: &TextureData) -> Self {
        Self {
            body,
            aspect: texture.width as f32 / texture.height.max(1) as f32,
        }
    }

    /// Model matrix for the label of a body at `body_position` with
    /// `body_radius`, seen from `camera_position`.
    ///
    /// The quad spans the camera's current right and up vectors, so it faces
    /// the viewer whatever the body's own orientation. Its height is
    /// proportional to the camera distance, keeping the on-screen size fixed,
    /// and it floats just above the body's silhouette.
    pub fn model_matrix(
        &self,
        body_position: Vec3,
        body_radius: f32,
        camera_position: Vec3,
        camera_right: Vec3,
        camera_up: Vec3,
        label_scale: f32,
    ) -> Mat4 {
        let distance = body_position.distance(camera_position);
        let height = distance * label_scale;
        let width = height * self.aspect;
        let normal = camera_right.cross(camera_up);
        let center = body_position + camera_up * (body_radius + height * 0.75);

        Mat4::from_cols(
            (camera_right * width).extend(0.0),
            (camera_up * height).extend(0.0),
            normal.extend(0.0),
            Vec4::from((center, 1.0)),
        )
    }
}
