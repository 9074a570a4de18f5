//! I/O for alphacrop
//!
//! This crate decodes images into bottom-up float buffers, turns them into
//! textured planes, and reads and writes UV-mapped meshes as OBJ with an
//! accompanying MTL material.

pub mod error;
pub mod texture;
pub mod plane;
pub mod obj;

pub use error::*;
pub use texture::*;
pub use plane::*;
pub use self::obj::{load_obj, save_obj, write_mtl, write_obj};

use alphacrop_core::{Error, PolyMesh, Result};
use std::path::Path;

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("obj") => load_obj(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_mesh_rejects_unknown_extension() {
        assert!(matches!(
            read_mesh("plane.ply"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(read_mesh("plane"), Err(Error::UnsupportedFormat(_))));
    }
}
