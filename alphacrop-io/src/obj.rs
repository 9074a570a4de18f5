//! OBJ/MTL export and OBJ import of UV-mapped meshes

use crate::IoError;
use alphacrop_core::{
    FaceLoop, Material, PlaneObject, Point3f, PolyMesh, Result, Uv, DEFAULT_UV_LAYER,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write `object` as an OBJ file at `path`.
///
/// When the object has a material, an MTL file with the same stem is written
/// next to it and referenced from the OBJ. Texture paths in the MTL resolve
/// from its own directory. Returns the paths written.
pub fn save_obj<P: AsRef<Path>>(object: &PlaneObject, path: P) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let mut written = Vec::with_capacity(2);

    let mtl_path = object
        .material
        .as_ref()
        .map(|_| path.with_extension("mtl"));

    let mtl_name = match (&object.material, &mtl_path) {
        (Some(material), Some(mtl_path)) => {
            let file = File::create(mtl_path)?;
            let mut writer = BufWriter::new(file);
            let mtl_dir = mtl_path.parent().unwrap_or_else(|| Path::new(""));
            write_mtl(material, Some(mtl_dir), &mut writer)?;
            writer.flush()?;
            written.push(mtl_path.clone());
            mtl_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        }
        _ => None,
    };

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_obj(object, mtl_name.as_deref(), &mut writer)?;
    writer.flush()?;
    written.push(path.to_path_buf());

    debug!(
        "Wrote '{}' to {} ({} vertices, {} faces)",
        object.name,
        path.display(),
        object.mesh.vertex_count(),
        object.mesh.face_count()
    );
    Ok(written)
}

/// Write the OBJ body of `object`. Loop UVs are deduplicated into `vt` lines.
pub fn write_obj<W: Write>(object: &PlaneObject, mtl_name: Option<&str>, writer: &mut W) -> Result<()> {
    let mesh = &object.mesh;

    writeln!(writer, "# alphacrop")?;
    if let Some(mtl_name) = mtl_name {
        writeln!(writer, "mtllib {}", mtl_name)?;
    }
    writeln!(writer, "o {}", object.name)?;

    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }

    let with_uvs = mesh.has_uv_layer();
    let mut uv_index: HashMap<(u32, u32), usize> = HashMap::new();
    let mut face_uvs = Vec::with_capacity(mesh.faces.len());
    if with_uvs {
        for face in &mesh.faces {
            let mut ids = Vec::with_capacity(face.len());
            for l in &face.loops {
                let key = (l.uv.x.to_bits(), l.uv.y.to_bits());
                let next = uv_index.len();
                let id = *uv_index.entry(key).or_insert(next);
                if id == next {
                    writeln!(writer, "vt {} {}", l.uv.x, l.uv.y)?;
                }
                ids.push(id);
            }
            face_uvs.push(ids);
        }
    }

    if let Some(material) = &object.material {
        writeln!(writer, "usemtl {}", material.name)?;
    }

    for (fi, face) in mesh.faces.iter().enumerate() {
        write!(writer, "f")?;
        for (li, l) in face.loops.iter().enumerate() {
            if with_uvs {
                write!(writer, " {}/{}", l.vertex + 1, face_uvs[fi][li] + 1)?;
            } else {
                write!(writer, " {}", l.vertex + 1)?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write an MTL entry for `material`, mapping its image as diffuse colour and,
/// for images with alpha, as opacity.
///
/// With `mtl_dir`, the texture path is written relative to that directory
/// when the texture lies beneath it and absolute otherwise. Without it the
/// stored path is written as is.
pub fn write_mtl<W: Write>(material: &Material, mtl_dir: Option<&Path>, writer: &mut W) -> Result<()> {
    writeln!(writer, "# alphacrop")?;
    writeln!(writer, "newmtl {}", material.name)?;
    writeln!(writer, "Kd 1.0 1.0 1.0")?;
    writeln!(writer, "d 1.0")?;

    if let Some(node) = material.image_node() {
        if let Some(filepath) = &node.filepath {
            let texture = match mtl_dir {
                Some(dir) => texture_reference(filepath, dir)?,
                None => filepath.clone(),
            };
            writeln!(writer, "map_Kd {}", texture.display())?;
            if node.image.as_ref().map_or(true, |i| i.has_alpha()) {
                writeln!(writer, "map_d {}", texture.display())?;
            }
        }
    }
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// How an MTL in `mtl_dir` should refer to `texture`
fn texture_reference(texture: &Path, mtl_dir: &Path) -> Result<PathBuf> {
    let texture = absolute(texture)?;
    let mtl_dir = absolute(mtl_dir)?;
    Ok(match texture.strip_prefix(&mtl_dir) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => texture,
    })
}

/// Read the polygons of an OBJ file into a [`PolyMesh`].
///
/// All objects and groups are merged. Faces of any arity are kept; corners
/// without a texture index get UV (0, 0). The mesh has a UV layer when the
/// file defines texture coordinates.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let parsed = ::obj::Obj::load(path).map_err(|e| IoError::ParseError {
        message: format!("{}: {}", path.display(), e),
    })?;
    let data = &parsed.data;

    let vertices = data
        .position
        .iter()
        .map(|p| Point3f::new(p[0], p[1], p[2]))
        .collect();
    let uv_layer = (!data.texture.is_empty()).then(|| DEFAULT_UV_LAYER.to_string());
    let mut mesh = PolyMesh::from_parts(vertices, Vec::new(), uv_layer);

    for group in data.objects.iter().flat_map(|o| o.groups.iter()) {
        for poly in &group.polys {
            let loops = poly
                .0
                .iter()
                .map(|t| {
                    let uv = t
                        .1
                        .and_then(|i| data.texture.get(i))
                        .map_or_else(Uv::origin, |t| Uv::new(t[0], t[1]));
                    FaceLoop::new(t.0, uv)
                })
                .collect();
            mesh.add_face(loops)?;
        }
    }

    debug!(
        "Read {} ({} vertices, {} faces)",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}
