//! Core traits for alphacrop

use crate::{error::Result, mesh::PolyMesh, point::*};

/// Trait for objects with spatial extent
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }

    /// Extent of the bounding box along each axis
    fn dimensions(&self) -> Vector3f {
        let (min, max) = self.bounding_box();
        max - min
    }
}

impl Drawable for PolyMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        if self.vertices.is_empty() {
            return (Point3f::origin(), Point3f::origin());
        }

        let mut min = self.vertices[0];
        let mut max = self.vertices[0];

        for vertex in &self.vertices {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            min.z = min.z.min(vertex.z);

            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
            max.z = max.z.max(vertex.z);
        }

        (min, max)
    }
}

/// Topology editing capabilities of a host mesh editor.
///
/// Implementors hold a mesh in edit mode. Geometry is addressed by index into
/// the mesh returned from [`MeshEditor::mesh`]; any operation that changes
/// topology invalidates previously obtained indices.
pub trait MeshEditor {
    /// The mesh being edited
    fn mesh(&self) -> &PolyMesh;

    /// Mutable access for direct vertex and UV writes
    fn mesh_mut(&mut self) -> &mut PolyMesh;

    /// Select all geometry
    fn select_all(&mut self);

    /// Uniformly subdivide the selected geometry, inserting `cuts` vertices per edge
    fn subdivide(&mut self, cuts: usize) -> Result<()>;

    /// Delete the given faces along with edges and vertices left unused.
    /// Returns the number of faces removed.
    fn delete_faces(&mut self, faces: &[usize]) -> Result<usize>;

    /// Merge selected vertices closer than `threshold`. Returns the number of
    /// vertices removed.
    fn merge_by_distance(&mut self, threshold: f32) -> Result<usize>;

    /// Commit pending changes and notify observers
    fn update(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quad_dimensions() {
        let mesh = PolyMesh::quad(1.5, 1.0);
        let dims = mesh.dimensions();
        assert_relative_eq!(dims.x, 1.5);
        assert_relative_eq!(dims.y, 1.0);
        assert_relative_eq!(dims.z, 0.0);
        assert_eq!(mesh.center(), Point3f::origin());
    }

    #[test]
    fn test_empty_bounding_box() {
        let mesh = PolyMesh::new();
        assert_eq!(mesh.bounding_box(), (Point3f::origin(), Point3f::origin()));
    }
}
