//! Shadow-volume shapes.
//!
//! Every interior edge of a closed mesh becomes a quad joining the edge as
//! seen from its two faces. Each quad corner carries the normal of the face
//! it came from; the shadow vertex shader pushes corners whose face points
//! away from the light out along the light direction. Where exactly one of
//! the two faces is lit the quad becomes a silhouette wall, otherwise it
//! collapses to zero area.

use std::collections::HashMap;

use glam::Vec3;

use super::mesh::{MeshData, Vertex};

type Key = [u32; 3];

fn key(p: Vec3) -> Key {
    // `+ 0.0` folds -0.0 into 0.0.
    [p.x + 0.0, p.y + 0.0, p.z + 0.0].map(f32::to_bits)
}

fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Builds the edge-quad shape of `mesh`.
///
/// Edges are matched by exact vertex position. Boundary edges and edges
/// between coplanar faces produce nothing.
pub fn edge_quads(mesh: &MeshData) -> MeshData {
    let pos = |i: u32| mesh.vertices.get(i as usize).map(Vertex::pos);

    // Directed edge (p, q), in its face's winding order, to that face's normal.
    let mut owners: HashMap<(Key, Key), Vec3> = HashMap::new();
    let mut edges: Vec<(Vec3, Vec3, Vec3)> = Vec::new();

    for [a, b, c] in mesh.triangles() {
        let (Some(a), Some(b), Some(c)) = (pos(a), pos(b), pos(c)) else {
            continue;
        };
        let n = face_normal(a, b, c);
        if n == Vec3::ZERO {
            continue;
        }
        for (p, q) in [(a, b), (b, c), (c, a)] {
            if owners.insert((key(p), key(q)), n).is_none() {
                edges.push((p, q, n));
            }
        }
    }

    let mut out = MeshData::default();
    for (p, q, na) in edges {
        let (kp, kq) = (key(p), key(q));
        // Visit each undirected edge once, from the side with the smaller key.
        if kp > kq {
            continue;
        }
        let Some(&nb) = owners.get(&(kq, kp)) else {
            continue;
        };
        if na.dot(nb) > 1.0 - 1e-6 {
            continue;
        }

        let base = out.vertices.len() as u32;
        out.vertices.extend([
            Vertex::new(p, na, [0.0; 2]),
            Vertex::new(q, na, [0.0; 2]),
            Vertex::new(p, nb, [0.0; 2]),
            Vertex::new(q, nb, [0.0; 2]),
        ]);
        let (pa, qa, pb, qb) = (base, base + 1, base + 2, base + 3);
        out.indices.extend_from_slice(&[qa, pa, pb, qa, pb, qb]);
    }
    out
}

/// Whether a face with `normal` points away from a light travelling along `light`.
pub fn faces_away(normal: Vec3, light: Vec3) -> bool {
    normal.dot(light) > 0.0
}

/// CPU mirror of the shadow vertex shader with a finite extrusion length.
pub fn extrude(vertex: &Vertex, light: Vec3, distance: f32) -> Vec3 {
    if faces_away(vertex.norm(), light) {
        vertex.pos() + light.normalize_or_zero() * distance
    } else {
        vertex.pos()
    }
}

/// Extruded triangles of an edge-quad shape, degenerate ones dropped.
pub fn extruded_triangles(shape: &MeshData, light: Vec3, distance: f32) -> Vec<[Vec3; 3]> {
    shape
        .triangles()
        .filter_map(|[a, b, c]| {
            let v = |i: u32| shape.vertices.get(i as usize).map(|v| extrude(v, light, distance));
            let tri = [v(a)?, v(b)?, v(c)?];
            let area = (tri[1] - tri[0]).cross(tri[2] - tri[0]).length_squared();
            (area > 1e-12).then_some(tri)
        })
        .collect()
}
