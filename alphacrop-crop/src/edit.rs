//! Edit-mode sessions over plane objects

use crate::{delete, merge, subdivide};
use alphacrop_core::{MeshEditor, ObjectMode, PlaneObject, PolyMesh, Result};
use tracing::trace;

/// An object held in edit mode.
///
/// Entering switches the object to [`ObjectMode::Edit`]; dropping the session
/// commits the mesh and switches back to [`ObjectMode::Object`], including on
/// early returns and error paths.
#[derive(Debug)]
pub struct EditSession<'a> {
    object: &'a mut PlaneObject,
    all_selected: bool,
}

impl<'a> EditSession<'a> {
    /// Enter edit mode on `object` with nothing selected
    pub fn enter(object: &'a mut PlaneObject) -> Self {
        object.mode = ObjectMode::Edit;
        trace!("Entered edit mode on '{}'", object.name);
        Self {
            object,
            all_selected: false,
        }
    }

    pub fn object(&self) -> &PlaneObject {
        self.object
    }

    pub fn is_all_selected(&self) -> bool {
        self.all_selected
    }
}

impl MeshEditor for EditSession<'_> {
    fn mesh(&self) -> &PolyMesh {
        &self.object.mesh
    }

    fn mesh_mut(&mut self) -> &mut PolyMesh {
        &mut self.object.mesh
    }

    fn select_all(&mut self) {
        self.all_selected = true;
    }

    fn subdivide(&mut self, cuts: usize) -> Result<()> {
        if self.all_selected {
            subdivide::subdivide(&mut self.object.mesh, cuts);
        }
        Ok(())
    }

    fn delete_faces(&mut self, faces: &[usize]) -> Result<usize> {
        delete::delete_faces(&mut self.object.mesh, faces)
    }

    fn merge_by_distance(&mut self, threshold: f32) -> Result<usize> {
        if !self.all_selected {
            return Ok(0);
        }
        Ok(merge::merge_by_distance(&mut self.object.mesh, threshold))
    }

    fn update(&mut self) {
        self.object.mesh.touch();
        trace!(
            "Updated '{}' to revision {}",
            self.object.name,
            self.object.mesh.revision
        );
    }
}

impl Drop for EditSession<'_> {
    fn drop(&mut self) {
        self.object.mesh.touch();
        self.object.mode = ObjectMode::Object;
        trace!("Left edit mode on '{}'", self.object.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane() -> PlaneObject {
        PlaneObject::new("plane", PolyMesh::quad(1.0, 1.0), None)
    }

    #[test]
    fn test_mode_restored_on_drop() {
        let mut object = plane();
        {
            let session = EditSession::enter(&mut object);
            assert_eq!(session.object().mode, ObjectMode::Edit);
        }
        assert_eq!(object.mode, ObjectMode::Object);
        assert_eq!(object.mesh.revision, 1);
    }

    #[test]
    fn test_mode_restored_on_error() {
        fn failing(object: &mut PlaneObject) -> Result<()> {
            let mut session = EditSession::enter(object);
            session.delete_faces(&[7])?;
            Ok(())
        }

        let mut object = plane();
        assert!(failing(&mut object).is_err());
        assert_eq!(object.mode, ObjectMode::Object);
    }

    #[test]
    fn test_selection_gates_subdivide_and_merge() {
        let mut object = plane();
        let mut session = EditSession::enter(&mut object);
        assert!(!session.is_all_selected());

        session.subdivide(1).unwrap();
        assert_eq!(session.mesh().face_count(), 1);

        session.select_all();
        session.subdivide(1).unwrap();
        assert_eq!(session.mesh().face_count(), 4);
        assert_eq!(session.merge_by_distance(0.0001).unwrap(), 0);
    }

    #[test]
    fn test_update_bumps_revision() {
        let mut object = plane();
        let mut session = EditSession::enter(&mut object);
        session.update();
        session.update();
        assert_eq!(session.mesh().revision, 2);
    }
}
