//! Procedural mesh builders for the point clouds and orbit paths.
//!
//! Every builder returns a plain `TriangleList` [`Mesh`] with positions,
//! normals and (where the caller needs per-vertex alpha) vertex colours.
//! Points are drawn as tiny octahedra so the whole cloud is a single draw
//! call and needs no special point-sprite pipeline.

use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};

/// One point of a cloud mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPoint {
    pub position: Vec3,
    /// Half-extent of the octahedron.
    pub size: f32,
    /// Per-point colour multiplier (linear, alpha used for brightness).
    pub color: LinearRgba,
}

/// Vertices emitted per cloud point.
pub const POINT_VERTICES: usize = 6;

const OCTAHEDRON_DIRS: [Vec3; POINT_VERTICES] = [
    Vec3::X,
    Vec3::NEG_X,
    Vec3::Y,
    Vec3::NEG_Y,
    Vec3::Z,
    Vec3::NEG_Z,
];

// Eight faces, counter-clockwise seen from outside.
const OCTAHEDRON_FACES: [[u32; 3]; 8] = [
    [0, 2, 4],
    [4, 2, 1],
    [1, 2, 5],
    [5, 2, 0],
    [4, 3, 0],
    [1, 3, 4],
    [5, 3, 1],
    [0, 3, 5],
];

/// Build a point cloud: one octahedron per point.
pub fn point_cloud_mesh(points: &[CloudPoint]) -> Mesh {
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(points.len() * 6);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(points.len() * 6);
    let mut colors: Vec<[f32; 4]> = Vec::with_capacity(points.len() * 6);
    let mut indices: Vec<u32> = Vec::with_capacity(points.len() * 24);

    for point in points {
        let base = positions.len() as u32;
        for dir in OCTAHEDRON_DIRS {
            positions.push((point.position + dir * point.size).to_array());
            normals.push(dir.to_array());
            colors.push(point.color.to_f32_array());
        }
        for face in OCTAHEDRON_FACES {
            indices.extend(face.iter().map(|i| base + i));
        }
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Sweep a thin tube of `radius` along `path`.
///
/// The path is treated as closed when its first and last points coincide, in
/// which case the last ring of vertices reuses the first frame so the seam is
/// invisible.
pub fn tube_mesh(path: &[Vec3], radius: f32, sides: u32) -> Mesh {
    let sides = sides.max(3) as usize;
    let n = path.len();
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n * sides);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n * sides);
    let mut indices: Vec<u32> = Vec::with_capacity(n.saturating_sub(1) * sides * 6);

    for i in 0..n {
        let prev = path[i.saturating_sub(1)];
        let next = path[(i + 1).min(n - 1)];
        let tangent = (next - prev).normalize_or(Vec3::X);
        // Radial direction (away from the planet) gives a stable frame for orbits.
        let outward = path[i].normalize_or(Vec3::Y);
        let normal = (outward - tangent * outward.dot(tangent)).normalize_or(tangent.any_orthonormal_vector());
        let binormal = tangent.cross(normal);

        for s in 0..sides {
            let angle = std::f32::consts::TAU * s as f32 / sides as f32;
            let dir = normal * angle.cos() + binormal * angle.sin();
            positions.push((path[i] + dir * radius).to_array());
            normals.push(dir.to_array());
        }
    }

    for i in 0..n.saturating_sub(1) {
        let a = (i * sides) as u32;
        let b = ((i + 1) * sides) as u32;
        for s in 0..sides as u32 {
            let s1 = (s + 1) % sides as u32;
            indices.extend_from_slice(&[a + s, b + s, a + s1, a + s1, b + s, b + s1]);
        }
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::ring_points;

    fn vertex_count(mesh: &Mesh) -> usize {
        mesh.attribute(Mesh::ATTRIBUTE_POSITION)
            .map(|a| a.len())
            .unwrap_or(0)
    }

    #[test]
    fn cloud_has_six_vertices_per_point() {
        let points = vec![
            CloudPoint {
                position: Vec3::ZERO,
                size: 0.1,
                color: LinearRgba::WHITE,
            };
            10
        ];
        let mesh = point_cloud_mesh(&points);
        assert_eq!(vertex_count(&mesh), 60);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(240));
    }

    #[test]
    fn tube_follows_the_orbit() {
        let path = ring_points(1.5, 0.3, 0.7, 360);
        let mesh = tube_mesh(&path, 0.002, 4);
        assert_eq!(vertex_count(&mesh), 361 * 4);
        let positions = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|a| a.as_float3())
            .expect("positions are float3");
        for p in positions {
            let r = Vec3::from_array(*p).length();
            assert!((r - 1.5).abs() < 0.003, "vertex radius {r}");
        }
    }

    #[test]
    fn empty_inputs_give_empty_meshes() {
        assert_eq!(vertex_count(&point_cloud_mesh(&[])), 0);
        assert_eq!(vertex_count(&tube_mesh(&[], 0.1, 4)), 0);
    }
}
