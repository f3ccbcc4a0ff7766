//! Procedural meshes: body spheres, orbit circles, ring annuli, label quads
//! and belt rocks.

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use glam::Vec3;
use orrery_render::{MeshData, Vertex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Unit icosphere with equirectangular UVs.
///
/// Subdivision 4 gives 5120 triangles, plenty for a body a few hundred pixels
/// across.
pub fn icosphere(subdivisions: u32) -> MeshData {
    let (positions, indices) = icosahedron(subdivisions);

    let vertices = positions
        .iter()
        .map(|p| {
            let u = 0.5 + p.z.atan2(p.x) / TAU;
            let v = 0.5 - p.y.clamp(-1.0, 1.0).asin() / PI;
            Vertex::new(p.to_array(), p.to_array(), [u, v])
        })
        .collect();

    MeshData::triangles(vertices, indices)
}

/// Unit circle in the XZ plane as independent line segments.
pub fn orbit_circle(segments: u32) -> MeshData {
    let segments = segments.max(3);
    let vertices = (0..segments)
        .map(|i| {
            let angle = i as f32 / segments as f32 * TAU;
            let (sin, cos) = angle.sin_cos();
            // Same parametrisation as the orbital position: +Z at angle 0.
            Vertex::new([sin, 0.0, cos], [0.0, 1.0, 0.0], [i as f32 / segments as f32, 0.0])
        })
        .collect();
    let indices = (0..segments)
        .flat_map(|i| [i, (i + 1) % segments])
        .collect();
    MeshData::lines(vertices, indices)
}

/// Flat annulus in the XZ plane between `inner` and `outer`.
///
/// `u` runs from 0 at the inner edge to 1 at the outer edge, so a ring texture
/// only needs to vary along its width.
pub fn annulus(inner: f32, outer: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments as usize + 1) * 2);
    let mut indices = Vec::with_capacity(segments as usize * 6);

    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let (sin, cos) = (t * TAU).sin_cos();
        vertices.push(Vertex::new([sin * inner, 0.0, cos * inner], [0.0, 1.0, 0.0], [0.0, t]));
        vertices.push(Vertex::new([sin * outer, 0.0, cos * outer], [0.0, 1.0, 0.0], [1.0, t]));
    }

    for i in 0..segments {
        let a = i * 2;
        let (b, c, d) = (a + 1, a + 2, a + 3);
        indices.extend_from_slice(&[a, b, c, c, b, d]);
    }

    MeshData::triangles(vertices, indices)
}

/// Unit quad in the XY plane facing +Z, centered on the origin.
pub fn quad() -> MeshData {
    let normal = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex::new([-0.5, -0.5, 0.0], normal, [0.0, 1.0]),
        Vertex::new([0.5, -0.5, 0.0], normal, [1.0, 1.0]),
        Vertex::new([0.5, 0.5, 0.0], normal, [1.0, 0.0]),
        Vertex::new([-0.5, 0.5, 0.0], normal, [0.0, 0.0]),
    ];
    MeshData::triangles(vertices, vec![0, 1, 2, 0, 2, 3])
}

/// Lumpy unit rock: an icosahedron with each vertex pushed in or out.
pub fn rock(seed: u64) -> MeshData {
    let (positions, indices) = icosahedron(1);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let vertices = positions
        .iter()
        .map(|p| {
            let scale = 0.7 + rng.random::<f32>() * 0.45;
            let position = *p * scale;
            Vertex::new(position.to_array(), p.to_array(), [0.5, 0.5])
        })
        .collect();

    MeshData::triangles(vertices, indices)
}

fn icosahedron(subdivisions: u32) -> (Vec<Vec3>, Vec<u32>) {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let mut positions: Vec<Vec3> = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .iter()
    .map(|p| p.normalize())
    .collect();

    let mut indices: Vec<u32> = vec![
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7,
        1, 8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9,
        8, 1,
    ];

    for _ in 0..subdivisions {
        subdivide(&mut positions, &mut indices);
    }

    (positions, indices)
}

/// Split every triangle into four at its edge midpoints.
fn subdivide(positions: &mut Vec<Vec3>, indices: &mut Vec<u32>) {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut next = Vec::with_capacity(indices.len() * 4);

    let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
        let key = (a.min(b), a.max(b));
        *midpoints.entry(key).or_insert_with(|| {
            positions.push((positions[a as usize] + positions[b as usize]).normalize());
            positions.len() as u32 - 1
        })
    };

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let ab = midpoint(a, b, positions);
        let bc = midpoint(b, c, positions);
        let ca = midpoint(c, a, positions);

        next.extend_from_slice(&[a, ab, ca, b, bc, ab, c, ca, bc, ab, bc, ca]);
    }

    *indices = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_render::Topology;

    #[test]
    fn test_icosphere_vertices_on_unit_sphere() {
        let mesh = icosphere(3);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 1.0).abs() < 1e-5, "vertex off the unit sphere: {len}");
        }
    }

    #[test]
    fn test_icosphere_triangle_count() {
        assert_eq!(icosphere(0).indices.len() / 3, 20);
        assert_eq!(icosphere(4).indices.len() / 3, 20 * 4usize.pow(4));
    }

    #[test]
    fn test_icosphere_indices_and_uvs_valid() {
        let mesh = icosphere(3);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
        for v in &mesh.vertices {
            assert!((0.0..=1.0).contains(&v.uv[0]) && (0.0..=1.0).contains(&v.uv[1]));
        }
    }

    #[test]
    fn test_orbit_circle_is_closed_line_list() {
        let mesh = orbit_circle(64);
        assert_eq!(mesh.topology, Topology::Lines);
        assert_eq!(mesh.vertices.len(), 64);
        assert_eq!(mesh.indices.len(), 128);
        assert_eq!(mesh.indices[127], 0);
        for v in &mesh.vertices {
            assert!(v.position[1].abs() < 1e-6);
            assert!((Vec3::from_array(v.position).length() - 1.0).abs() < 1e-5);
        }
        // Angle zero sits on +Z.
        assert_eq!(mesh.vertices[0].position, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_orbit_circle_clamps_segments() {
        assert_eq!(orbit_circle(0).vertices.len(), 3);
    }

    #[test]
    fn test_annulus_radii() {
        let mesh = annulus(2.0, 3.5, 32);
        for v in &mesh.vertices {
            let r = Vec3::from_array(v.position).length();
            let expected = if v.uv[0] == 0.0 { 2.0 } else { 3.5 };
            assert!((r - expected).abs() < 1e-5);
        }
        assert_eq!(mesh.indices.len(), 32 * 6);
    }

    #[test]
    fn test_quad_faces_positive_z() {
        let mesh = quad();
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_rock_is_deterministic() {
        assert_eq!(rock(7), rock(7));
        assert_ne!(rock(7), rock(8));
    }
}
