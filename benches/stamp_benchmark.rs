//! Copy-stamp compositing benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use copystamp::stamp::{
    compose_with, image_to_pixmap, render_mask, CoordinateMapper, LayerKind, ScenePoint,
    StrokePath, StrokeStyle,
};
use image::{Rgba, RgbaImage};

fn generate_stroke(count: usize) -> StrokePath {
    let points = (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            ScenePoint::new(
                100.0 + t * 400.0,
                (t * std::f32::consts::PI * 4.0).sin() * 80.0 + 300.0,
            )
        })
        .collect();
    StrokePath::new(points, StrokeStyle::default())
}

fn benchmark_mask_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mask Rendering");

    for count in [10, 100, 1000].iter() {
        let path = generate_stroke(*count);
        let Some(bounds) = path.bounding_rect(20.0) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("points", count), &path, |b, path| {
            b.iter(|| render_mask(path, bounds, 20.0))
        });
    }

    group.finish();
}

fn benchmark_composition(c: &mut Criterion) {
    let mut group = c.benchmark_group("Composition");

    let scene = RgbaImage::from_fn(1600, 1200, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let Some(snapshot) = image_to_pixmap(&scene) else {
        return;
    };
    let path = generate_stroke(200);
    let anchor = ScenePoint::new(80.0, 80.0);
    let start = ScenePoint::new(100.0, 300.0);

    for zoom in [0.5f32, 1.0, 2.0].iter() {
        let mapper = CoordinateMapper::new(*zoom, 0.0, 0.0);
        group.bench_with_input(BenchmarkId::new("zoom", zoom), &mapper, |b, mapper| {
            b.iter(|| {
                compose_with(
                    &snapshot,
                    &path,
                    anchor,
                    start,
                    *mapper,
                    20.0,
                    LayerKind::Committed,
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_mask_rendering, benchmark_composition);
criterion_main!(benches);
