//! Uniform subdivision
//!
//! Every edge receives `cuts` evenly spaced vertices shared by all faces using
//! it. Quads become a `(cuts + 1)²` grid of quads and triangles become
//! `(cuts + 1)²` triangles; larger polygons are fan-split from their first
//! corner and each triangle is subdivided. Loop UVs are interpolated per face.

use alphacrop_core::{edge_key, EdgeKey, Face, FaceLoop, Point3f, PolyMesh, Uv};
use nalgebra::SVector;
use std::collections::HashMap;
use tracing::debug;

/// Cut vertices created along each edge, stored from the lower to the higher
/// vertex index.
struct EdgeCuts {
    cuts: usize,
    edges: HashMap<EdgeKey, Vec<usize>>,
}

impl EdgeCuts {
    fn new(cuts: usize) -> Self {
        Self {
            cuts,
            edges: HashMap::new(),
        }
    }

    /// Cut vertices ordered from `a` toward `b`, created on first use
    fn between(&mut self, vertices: &mut Vec<Point3f>, a: usize, b: usize) -> Vec<usize> {
        let key = edge_key(a, b);
        let cuts = self.cuts;
        let ids = self.edges.entry(key).or_insert_with(|| {
            let (p, q) = (vertices[key.0], vertices[key.1]);
            (1..=cuts)
                .map(|i| {
                    let t = i as f32 / (cuts + 1) as f32;
                    vertices.push(p + (q - p) * t);
                    vertices.len() - 1
                })
                .collect()
        });
        if a == key.0 {
            ids.clone()
        } else {
            ids.iter().rev().copied().collect()
        }
    }
}

fn bilerp<const D: usize>(c: [SVector<f32, D>; 4], s: f32, t: f32) -> SVector<f32, D> {
    c[0] * ((1.0 - s) * (1.0 - t)) + c[1] * (s * (1.0 - t)) + c[2] * (s * t) + c[3] * ((1.0 - s) * t)
}

fn trilerp<const D: usize>(c: [SVector<f32, D>; 3], s: f32, t: f32) -> SVector<f32, D> {
    c[0] + (c[1] - c[0]) * s + (c[2] - c[0]) * t
}

/// Subdivide every face of `mesh` with `cuts` new vertices per edge.
///
/// Original vertices keep their indices; new vertices are appended. Faces are
/// replaced in order, each by its sub-faces. `cuts == 0` leaves the mesh as is.
pub fn subdivide(mesh: &mut PolyMesh, cuts: usize) {
    if cuts == 0 || mesh.faces.is_empty() {
        return;
    }

    let original_faces = mesh.faces.len();
    let original_vertices = mesh.vertices.len();

    let mut edge_cuts = EdgeCuts::new(cuts);
    let faces = std::mem::take(&mut mesh.faces);
    let mut new_faces = Vec::with_capacity(faces.len() * (cuts + 1) * (cuts + 1));

    for face in &faces {
        match face.len() {
            4 => subdivide_quad(&mut mesh.vertices, &mut edge_cuts, face, &mut new_faces),
            3 => subdivide_triangle(
                &mut mesh.vertices,
                &mut edge_cuts,
                [face.loops[0], face.loops[1], face.loops[2]],
                &mut new_faces,
            ),
            n if n > 4 => {
                for k in 1..n - 1 {
                    subdivide_triangle(
                        &mut mesh.vertices,
                        &mut edge_cuts,
                        [face.loops[0], face.loops[k], face.loops[k + 1]],
                        &mut new_faces,
                    );
                }
            }
            _ => new_faces.push(face.clone()),
        }
    }

    mesh.faces = new_faces;

    debug!(
        "Subdivided with {} cuts: {} -> {} faces, {} -> {} vertices",
        cuts,
        original_faces,
        mesh.faces.len(),
        original_vertices,
        mesh.vertices.len()
    );
}

fn subdivide_quad(
    vertices: &mut Vec<Point3f>,
    edge_cuts: &mut EdgeCuts,
    face: &Face,
    out: &mut Vec<Face>,
) {
    let n = edge_cuts.cuts + 1;
    let c: Vec<usize> = face.vertices().collect();
    let corner_pos = [0, 1, 2, 3].map(|k| vertices[c[k]].coords);
    let corner_uv = [0, 1, 2, 3].map(|k| face.loops[k].uv.coords);

    // i runs along c0 -> c1, j along c0 -> c3
    let bottom = edge_cuts.between(vertices, c[0], c[1]);
    let right = edge_cuts.between(vertices, c[1], c[2]);
    let top = edge_cuts.between(vertices, c[3], c[2]);
    let left = edge_cuts.between(vertices, c[0], c[3]);

    let mut grid = vec![0usize; (n + 1) * (n + 1)];
    let at = |i: usize, j: usize| j * (n + 1) + i;
    for j in 0..=n {
        for i in 0..=n {
            grid[at(i, j)] = match (i, j) {
                (0, 0) => c[0],
                (i, 0) if i == n => c[1],
                (i, j) if i == n && j == n => c[2],
                (0, j) if j == n => c[3],
                (i, 0) => bottom[i - 1],
                (i, j) if i == n => right[j - 1],
                (i, j) if j == n => top[i - 1],
                (0, j) => left[j - 1],
                (i, j) => {
                    let p = bilerp(corner_pos, i as f32 / n as f32, j as f32 / n as f32);
                    vertices.push(Point3f::from(p));
                    vertices.len() - 1
                }
            };
        }
    }

    let uv_at = |i: usize, j: usize| Uv::from(bilerp(corner_uv, i as f32 / n as f32, j as f32 / n as f32));
    for j in 0..n {
        for i in 0..n {
            let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
            out.push(Face::new(
                corners
                    .iter()
                    .map(|&(a, b)| FaceLoop::new(grid[at(a, b)], uv_at(a, b)))
                    .collect(),
            ));
        }
    }
}

fn subdivide_triangle(
    vertices: &mut Vec<Point3f>,
    edge_cuts: &mut EdgeCuts,
    corners: [FaceLoop; 3],
    out: &mut Vec<Face>,
) {
    let n = edge_cuts.cuts + 1;
    let c = corners.map(|l| l.vertex);
    let corner_pos = c.map(|v| vertices[v].coords);
    let corner_uv = corners.map(|l| l.uv.coords);

    // i runs along c0 -> c1, j along c0 -> c2, i + j <= n
    let e01 = edge_cuts.between(vertices, c[0], c[1]);
    let e02 = edge_cuts.between(vertices, c[0], c[2]);
    let e12 = edge_cuts.between(vertices, c[1], c[2]);

    let mut grid = vec![usize::MAX; (n + 1) * (n + 1)];
    let at = |i: usize, j: usize| j * (n + 1) + i;
    for j in 0..=n {
        for i in 0..=n - j {
            grid[at(i, j)] = match (i, j) {
                (0, 0) => c[0],
                (i, 0) if i == n => c[1],
                (0, j) if j == n => c[2],
                (i, 0) => e01[i - 1],
                (0, j) => e02[j - 1],
                (i, j) if i + j == n => e12[j - 1],
                (i, j) => {
                    let p = trilerp(corner_pos, i as f32 / n as f32, j as f32 / n as f32);
                    vertices.push(Point3f::from(p));
                    vertices.len() - 1
                }
            };
        }
    }

    let uv_at = |i: usize, j: usize| Uv::from(trilerp(corner_uv, i as f32 / n as f32, j as f32 / n as f32));
    let tri = |pts: [(usize, usize); 3]| {
        Face::new(
            pts.iter()
                .map(|&(a, b)| FaceLoop::new(grid[at(a, b)], uv_at(a, b)))
                .collect(),
        )
    };
    for j in 0..n {
        for i in 0..n - j {
            out.push(tri([(i, j), (i + 1, j), (i, j + 1)]));
            if i + j + 1 < n {
                out.push(tri([(i + 1, j), (i + 1, j + 1), (i, j + 1)]));
            }
        }
    }
}
