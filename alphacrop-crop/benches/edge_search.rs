//! Benchmarks comparing RingSearch vs DistanceFieldSearch

use alphacrop_core::{ImageBuffer, Uv};
use alphacrop_crop::{
    AlphaSampler, DistanceFieldSearch, EdgeFinder, EdgeSearchParams, RingSearch,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Opaque disc centred in a square image, radius a third of the side
fn generate_disc_image(size: usize) -> ImageBuffer {
    let c = size as f32 / 2.0;
    let r = size as f32 / 3.0;
    ImageBuffer::from_alpha_fn(size, size, |x, y| {
        let (dx, dy) = (x as f32 + 0.5 - c, y as f32 + 0.5 - c);
        if dx * dx + dy * dy <= r * r {
            1.0
        } else {
            0.0
        }
    })
}

/// UVs spread around the plane border, all outside the disc
fn border_uvs(count: usize) -> Vec<Uv> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32 * std::f32::consts::TAU;
            Uv::new(0.5 + 0.45 * t.cos(), 0.5 + 0.45 * t.sin())
        })
        .collect()
}

fn bench_edge_search(c: &mut Criterion) {
    let sizes = [128, 512, 1024];
    let uvs = border_uvs(200);

    let mut group = c.benchmark_group("edge_search");

    for &size in &sizes {
        let image = generate_disc_image(size);
        let params = EdgeSearchParams::new(0.01);

        group.bench_with_input(
            BenchmarkId::new("ring", format!("{}px", size)),
            &image,
            |b, image| {
                let finder = RingSearch::new(AlphaSampler::new(image), params);
                b.iter(|| {
                    for uv in &uvs {
                        black_box(finder.find_edge(black_box(*uv)));
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("distance_field", format!("{}px", size)),
            &image,
            |b, image| {
                b.iter(|| {
                    let finder = DistanceFieldSearch::new(AlphaSampler::new(image), params);
                    for uv in &uvs {
                        black_box(finder.find_edge(black_box(*uv)));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_edge_search);
criterion_main!(benches);
