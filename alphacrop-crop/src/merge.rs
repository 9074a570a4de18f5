//! Merge vertices by distance

use alphacrop_core::{Face, Point3f, PolyMesh};
use std::collections::HashMap;
use tracing::debug;

type Cell = (i64, i64, i64);

fn pos_to_cell(pos: &Point3f, cell_size: f64) -> Cell {
    (
        (pos.x as f64 / cell_size).floor() as i64,
        (pos.y as f64 / cell_size).floor() as i64,
        (pos.z as f64 / cell_size).floor() as i64,
    )
}

/// Merge vertices lying within `threshold` of each other.
///
/// Each cluster collapses onto its lowest-index vertex, which keeps its
/// position. Faces are remapped, repeated consecutive corners are dropped and
/// faces left with fewer than three corners are removed. Vertices are then
/// compacted. Returns the number of vertices removed.
pub fn merge_by_distance(mesh: &mut PolyMesh, threshold: f32) -> usize {
    let original_count = mesh.vertices.len();
    if original_count < 2 || threshold.is_nan() || threshold < 0.0 {
        return 0;
    }

    let threshold = threshold as f64;
    let cell_size = (threshold * 2.0).max(f64::EPSILON);

    let mut spatial_hash: HashMap<Cell, Vec<usize>> = HashMap::new();
    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        spatial_hash
            .entry(pos_to_cell(vertex, cell_size))
            .or_default()
            .push(idx);
    }

    let mut remap: Vec<usize> = (0..original_count).collect();
    let mut merged = 0;

    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        if remap[idx] != idx {
            continue;
        }
        let cell = pos_to_cell(vertex, cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = spatial_hash.get(&(cell.0 + dx, cell.1 + dy, cell.2 + dz))
                    else {
                        continue;
                    };
                    for &other in candidates {
                        if other <= idx || remap[other] != other {
                            continue;
                        }
                        let dist = (vertex - mesh.vertices[other]).cast::<f64>().norm();
                        if dist <= threshold {
                            remap[other] = idx;
                            merged += 1;
                        }
                    }
                }
            }
        }
    }

    if merged == 0 {
        return 0;
    }

    for i in 0..remap.len() {
        let mut target = remap[i];
        while remap[target] != target {
            target = remap[target];
        }
        remap[i] = target;
    }

    let faces_before = mesh.faces.len();
    for face in &mut mesh.faces {
        for l in &mut face.loops {
            l.vertex = remap[l.vertex];
        }
        face.loops.dedup_by_key(|l| l.vertex);
        while face.loops.len() > 1 && face.loops[0].vertex == face.loops[face.loops.len() - 1].vertex {
            face.loops.pop();
        }
    }
    mesh.faces.retain(|f: &Face| f.len() >= 3);
    let collapsed = faces_before - mesh.faces.len();

    let removed = mesh.remove_unreferenced_vertices();
    debug!(
        "Merged {} vertices within {} ({} degenerate faces removed)",
        removed, threshold, collapsed
    );
    removed
}
