//! Face deletion

use alphacrop_core::{Error, PolyMesh, Result};
use tracing::debug;

/// Delete `faces` from `mesh`, then drop vertices no remaining face uses.
///
/// Duplicate indices are ignored. Returns the number of faces removed.
pub fn delete_faces(mesh: &mut PolyMesh, faces: &[usize]) -> Result<usize> {
    if faces.is_empty() {
        return Ok(0);
    }

    let face_count = mesh.faces.len();
    if let Some(&bad) = faces.iter().find(|&&f| f >= face_count) {
        return Err(Error::InvalidData(format!(
            "Cannot delete face {} from a mesh with {} faces",
            bad, face_count
        )));
    }

    let mut doomed = vec![false; face_count];
    for &f in faces {
        doomed[f] = true;
    }

    let mut index = 0;
    mesh.faces.retain(|_| {
        let keep = !doomed[index];
        index += 1;
        keep
    });

    let removed = face_count - mesh.faces.len();
    let orphaned = mesh.remove_unreferenced_vertices();

    debug!(
        "Deleted {} faces and {} orphaned vertices ({} faces left)",
        removed,
        orphaned,
        mesh.faces.len()
    );

    Ok(removed)
}
