//! Integration tests for alphacrop-io
//!
//! These tests decode real PNG files, import them as planes, crop them and
//! write the result back out as OBJ/MTL.

use alphacrop_core::*;
use alphacrop_crop::{crop_plane_to_alpha, CropConfig, CropOutcome};
use alphacrop_io::*;
use approx::assert_relative_eq;
use ::image::{Rgba, RgbaImage};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("alphacrop_io_{}", name))
}

/// 80x40 PNG whose right half is opaque and top quarter (in image rows) is
/// transparent
fn write_test_png(name: &str) -> PathBuf {
    let path = temp_path(name);
    let img = RgbaImage::from_fn(80, 40, |x, y| {
        if x >= 40 && y >= 10 {
            Rgba([200, 120, 40, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    img.save(&path).unwrap();
    path
}

#[test]
fn test_decode_is_bottom_up() {
    let path = write_test_png("bottom_up.png");
    let image = load_image(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(image.width(), 80);
    assert_eq!(image.height(), 40);
    assert!(image.has_alpha());
    // Image row 0 is stored last
    assert_relative_eq!(image.alpha(60, 39), 0.0);
    assert_relative_eq!(image.alpha(60, 0), 1.0);
    assert_relative_eq!(image.alpha(10, 0), 0.0);
}

#[test]
fn test_import_crop_export() {
    let png = write_test_png("pipeline.png");
    let obj_path = temp_path("pipeline.obj");

    let mut object = import_image_as_plane(&png, &PlaneOptions::default()).unwrap();
    let dims = object.mesh.dimensions();
    assert_relative_eq!(dims.x, 2.0);
    assert_relative_eq!(dims.y, 1.0);

    let config = CropConfig::default().with_subdivisions(4);
    let outcome = crop_plane_to_alpha(&mut object, &config).unwrap();
    let report = match outcome {
        CropOutcome::Cropped(report) => report,
        other => panic!("unexpected outcome {:?}", other),
    };
    assert!(report.total_faces_deleted() > 0);

    let written = save_obj(&object, &obj_path).unwrap();
    assert_eq!(written.len(), 2);
    let mtl = std::fs::read_to_string(&written[0]).unwrap();
    let reread = read_mesh(&obj_path);

    for path in written.iter().chain(std::iter::once(&png)) {
        std::fs::remove_file(path).ok();
    }

    assert!(mtl.contains("map_Kd"));
    assert!(mtl.contains("map_d"));

    let reread = reread.unwrap();
    assert_eq!(reread.vertex_count(), object.mesh.vertex_count());
    assert_eq!(reread.face_count(), object.mesh.face_count());
    assert!(reread.has_uv_layer());
    for (a, b) in reread.faces.iter().zip(&object.mesh.faces) {
        assert_eq!(a.len(), b.len());
        for (la, lb) in a.loops.iter().zip(&b.loops) {
            assert_eq!(la.vertex, lb.vertex);
            assert_relative_eq!(la.uv.x, lb.uv.x, epsilon = 1e-6);
            assert_relative_eq!(la.uv.y, lb.uv.y, epsilon = 1e-6);
        }
    }

    // Cropped mesh stays on the opaque side, up to the 10 pixel pull-back
    let (min, _) = reread.bounding_box();
    assert!(min.x >= (30.0 / 80.0 - 0.5) * 2.0 - 1e-5);
}

#[test]
fn test_mtl_texture_resolves_from_other_directory() {
    let png = write_test_png("elsewhere.png");
    let out_dir = temp_path("elsewhere_out");
    std::fs::create_dir_all(&out_dir).unwrap();
    let obj_path = out_dir.join("elsewhere.obj");

    let object = import_image_as_plane(&png, &PlaneOptions::default()).unwrap();
    let written = save_obj(&object, &obj_path).unwrap();
    let mtl = std::fs::read_to_string(&written[0]).unwrap();

    let texture = mtl
        .lines()
        .find_map(|l| l.strip_prefix("map_Kd "))
        .map(|t| out_dir.join(t));
    let resolves = texture.as_ref().map_or(false, |t| t.exists());

    std::fs::remove_dir_all(&out_dir).ok();
    std::fs::remove_file(&png).ok();

    assert!(resolves, "map_Kd does not resolve from the MTL directory: {}", mtl);
}
