//! Polygon mesh with per-loop texture coordinates

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name given to the UV layer of freshly created planes
pub const DEFAULT_UV_LAYER: &str = "UVMap";

/// One corner of a face: the vertex it references and the UV it carries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceLoop {
    pub vertex: usize,
    pub uv: Uv,
}

impl FaceLoop {
    pub fn new(vertex: usize, uv: Uv) -> Self {
        Self { vertex, uv }
    }
}

/// A polygon described by an ordered loop of corners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub loops: Vec<FaceLoop>,
}

impl Face {
    pub fn new(loops: Vec<FaceLoop>) -> Self {
        Self { loops }
    }

    /// Number of corners
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Vertex indices in winding order
    pub fn vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.loops.iter().map(|l| l.vertex)
    }

    /// Edges as `(from, to)` vertex pairs following the winding, closing back
    /// to the first corner.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.loops.len();
        (0..n).map(move |i| (self.loops[i].vertex, self.loops[(i + 1) % n].vertex))
    }

    /// Axis-aligned bounding box `(min, max)` of the loop UVs
    pub fn uv_bounds(&self) -> Option<(Uv, Uv)> {
        let first = self.loops.first()?.uv;
        let mut min = first;
        let mut max = first;
        for l in &self.loops[1..] {
            min.x = min.x.min(l.uv.x);
            min.y = min.y.min(l.uv.y);
            max.x = max.x.max(l.uv.x);
            max.y = max.y.max(l.uv.y);
        }
        Some((min, max))
    }
}

/// Undirected edge identified by its sorted vertex pair
pub type EdgeKey = (usize, usize);

/// Canonical key for the edge between `a` and `b`
pub fn edge_key(a: usize, b: usize) -> EdgeKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// A polygon mesh whose faces carry per-corner UV coordinates.
///
/// Adjacency is index based and derived on demand; there is no persistent
/// half-edge structure to keep in sync while faces are added or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<Face>,
    /// Name of the active UV layer. Loop UVs carry no meaning without one.
    pub uv_layer: Option<String>,
    /// Incremented each time an edit is committed
    #[serde(default)]
    pub revision: u64,
}

impl PolyMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            uv_layer: None,
            revision: 0,
        }
    }

    /// Create a mesh from its parts
    pub fn from_parts(vertices: Vec<Point3f>, faces: Vec<Face>, uv_layer: Option<String>) -> Self {
        Self {
            vertices,
            faces,
            uv_layer,
            revision: 0,
        }
    }

    /// A single quad of `width` x `height` centred at the origin in the XY plane,
    /// UV-mapped over the full [0,1]x[0,1] range.
    pub fn quad(width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let vertices = vec![
            Point3f::new(-hw, -hh, 0.0),
            Point3f::new(hw, -hh, 0.0),
            Point3f::new(hw, hh, 0.0),
            Point3f::new(-hw, hh, 0.0),
        ];
        let face = Face::new(vec![
            FaceLoop::new(0, Uv::new(0.0, 0.0)),
            FaceLoop::new(1, Uv::new(1.0, 0.0)),
            FaceLoop::new(2, Uv::new(1.0, 1.0)),
            FaceLoop::new(3, Uv::new(0.0, 1.0)),
        ]);
        Self::from_parts(vertices, vec![face], Some(DEFAULT_UV_LAYER.to_string()))
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Total number of face corners
    pub fn loop_count(&self) -> usize {
        self.faces.iter().map(Face::len).sum()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    pub fn has_uv_layer(&self) -> bool {
        self.uv_layer.is_some()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face, checking that it has at least three corners referencing
    /// existing vertices.
    pub fn add_face(&mut self, loops: Vec<FaceLoop>) -> Result<usize> {
        let face = Face::new(loops);
        self.check_face(&face)?;
        self.faces.push(face);
        Ok(self.faces.len() - 1)
    }

    fn check_face(&self, face: &Face) -> Result<()> {
        if face.len() < 3 {
            return Err(Error::InvalidData(format!(
                "Face needs at least 3 corners, got {}",
                face.len()
            )));
        }
        if let Some(v) = face.vertices().find(|&v| v >= self.vertices.len()) {
            return Err(Error::InvalidData(format!(
                "Face references vertex {} but mesh has {} vertices",
                v,
                self.vertices.len()
            )));
        }
        Ok(())
    }

    /// Check every face for valid arity and vertex indices
    pub fn validate(&self) -> Result<()> {
        self.faces.iter().try_for_each(|f| self.check_face(f))
    }

    /// Number of faces using each edge, keyed in sorted order
    pub fn edge_face_counts(&self) -> BTreeMap<EdgeKey, usize> {
        let mut counts = BTreeMap::new();
        for face in &self.faces {
            for (a, b) in face.edges() {
                *counts.entry(edge_key(a, b)).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Edges used by exactly one face
    pub fn boundary_edges(&self) -> Vec<EdgeKey> {
        self.edge_face_counts()
            .into_iter()
            .filter(|&(_, count)| count == 1)
            .map(|(edge, _)| edge)
            .collect()
    }

    /// Vertices touching at least one boundary edge, in ascending order
    pub fn boundary_vertices(&self) -> Vec<usize> {
        let mut is_boundary = vec![false; self.vertices.len()];
        for (a, b) in self.boundary_edges() {
            is_boundary[a] = true;
            is_boundary[b] = true;
        }
        is_boundary
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .map(|(v, _)| v)
            .collect()
    }

    /// For every vertex, the `(face, corner)` pairs referencing it, in face
    /// order then winding order.
    pub fn loops_by_vertex(&self) -> Vec<Vec<(usize, usize)>> {
        let mut map = vec![Vec::new(); self.vertices.len()];
        for (fi, face) in self.faces.iter().enumerate() {
            for (li, l) in face.loops.iter().enumerate() {
                map[l.vertex].push((fi, li));
            }
        }
        map
    }

    /// UV of the first loop referencing `vertex`
    pub fn first_loop_uv(&self, vertex: usize) -> Option<Uv> {
        self.faces
            .iter()
            .flat_map(|f| f.loops.iter())
            .find(|l| l.vertex == vertex)
            .map(|l| l.uv)
    }

    /// Write `uv` into every loop referencing `vertex`. Returns the number of
    /// loops written.
    pub fn set_vertex_uv(&mut self, vertex: usize, uv: Uv) -> usize {
        let mut written = 0;
        for l in self.faces.iter_mut().flat_map(|f| f.loops.iter_mut()) {
            if l.vertex == vertex {
                l.uv = uv;
                written += 1;
            }
        }
        written
    }

    /// Remove vertices no face references and compact indices.
    ///
    /// Returns the number of vertices removed.
    pub fn remove_unreferenced_vertices(&mut self) -> usize {
        let mut used = vec![false; self.vertices.len()];
        for face in &self.faces {
            for v in face.vertices() {
                used[v] = true;
            }
        }

        let mut remap = vec![usize::MAX; self.vertices.len()];
        let mut kept = Vec::with_capacity(self.vertices.len());
        for (old, vertex) in self.vertices.iter().enumerate() {
            if used[old] {
                remap[old] = kept.len();
                kept.push(*vertex);
            }
        }

        let removed = self.vertices.len() - kept.len();
        if removed == 0 {
            return 0;
        }

        self.vertices = kept;
        for l in self.faces.iter_mut().flat_map(|f| f.loops.iter_mut()) {
            l.vertex = remap[l.vertex];
        }
        removed
    }

    /// Mark an edit as committed
    pub fn touch(&mut self) {
        self.revision += 1;
    }
}

impl Default for PolyMesh {
    fn default() -> Self {
        Self::new()
    }
}
