//! Image-as-plane import

use crate::texture::{FileImageProvider, ImageProvider};
use alphacrop_core::{Drawable, Error, ImageBuffer, Material, PlaneObject, PolyMesh, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Options for creating planes from images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneOptions {
    /// Plane height in scene units; the width follows the image aspect ratio
    pub height: f32,
}

impl Default for PlaneOptions {
    fn default() -> Self {
        Self { height: 1.0 }
    }
}

impl PlaneOptions {
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(Error::InvalidData(format!(
                "plane height must be positive, got {}",
                self.height
            )));
        }
        Ok(())
    }
}

/// Build a textured plane for an already decoded image.
///
/// The plane is centred at the origin in the XY plane with UVs spanning
/// [0,1]x[0,1], and carries a node material sampling `image`.
pub fn plane_from_image(
    name: &str,
    image: Arc<ImageBuffer>,
    filepath: Option<PathBuf>,
    options: &PlaneOptions,
) -> Result<PlaneObject> {
    options.validate()?;
    if image.is_empty() {
        return Err(Error::InvalidData(format!(
            "cannot build a plane for empty image '{}'",
            name
        )));
    }

    let aspect = image.width() as f32 / image.height() as f32;
    let mesh = PolyMesh::quad(options.height * aspect, options.height);
    let material = Material::with_image(name, image, filepath);
    Ok(PlaneObject::new(name, mesh, Some(material)))
}

/// Import the image at `path` as a textured plane named after the file stem
pub fn import_image_as_plane<P: AsRef<Path>>(path: P, options: &PlaneOptions) -> Result<PlaneObject> {
    import_with(&FileImageProvider, path.as_ref(), options)
}

/// Import through a specific [`ImageProvider`]
pub fn import_with<I: ImageProvider + ?Sized>(
    provider: &I,
    path: &Path,
    options: &PlaneOptions,
) -> Result<PlaneObject> {
    let image = provider.load_image(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Image".to_string());

    let object = plane_from_image(&name, Arc::new(image), Some(path.to_path_buf()), options)?;
    let dims = object.mesh.dimensions();
    debug!("Imported '{}' as a {}x{} plane", object.name, dims.x, dims.y);
    Ok(object)
}
