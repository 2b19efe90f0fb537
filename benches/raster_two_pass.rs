use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vraster::math::vec2::Vec2;
use vraster::math::vec4::Vec4;
use vraster::raster::{rasterize_faces, ImageRaster, RasterColorSpace, ReconstructionFilter, RenderableFace, TwoPassConfig};
use vraster::render::program::RenderProgram;

fn solid_square_face(x: f32, y: f32, size: f32) -> RenderableFace {
    let outer = vec![
        Vec2::new(x, y),
        Vec2::new(x + size, y),
        Vec2::new(x + size, y + size),
        Vec2::new(x, y + size),
    ];
    let program = RenderProgram::Color(Vec4::rgba(1.0, 0.0, 0.0, 1.0));
    RenderableFace::new(outer, Vec::new(), program, HashMap::new())
}

fn gradient_face(x: f32, y: f32, size: f32) -> RenderableFace {
    use vraster::render::{ExtendMode, GradientStop};
    let outer = vec![
        Vec2::new(x, y),
        Vec2::new(x + size, y),
        Vec2::new(x + size, y + size),
        Vec2::new(x, y + size),
    ];
    let program = RenderProgram::LinearGradient {
        accuracy: vraster::render::LinearBlendAccuracy::UnsplitCentroid,
        extend: ExtendMode::Pad,
        line: (Vec2::new(x, y), Vec2::new(x + size, y + size)),
        stops: vec![
            GradientStop { ratio: 0.0, color: Vec4::rgba(1.0, 0.0, 0.0, 1.0) },
            GradientStop { ratio: 1.0, color: Vec4::rgba(0.0, 0.0, 1.0, 1.0) },
        ],
    };
    RenderableFace::new(outer, Vec::new(), program, HashMap::new())
}

fn grid_of_faces(n: u32, make: impl Fn(f32, f32, f32) -> RenderableFace) -> Vec<RenderableFace> {
    (0..n)
        .flat_map(|row| (0..n).map(move |col| make(col as f32 * 6.0, row as f32 * 6.0, 5.0)))
        .collect()
}

fn benchmark_box_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("box_filter");

    for n in [4, 8, 16] {
        let faces = grid_of_faces(n, solid_square_face);
        let raster_dim = n * 6 + 8;
        let config = TwoPassConfig::new(raster_dim, raster_dim, ReconstructionFilter::Box);

        group.bench_with_input(BenchmarkId::new("solid_squares", n * n), &faces, |b, faces| {
            b.iter(|| {
                let mut raster = ImageRaster::new(raster_dim, raster_dim, RasterColorSpace::Srgb, RasterColorSpace::Srgb);
                rasterize_faces(black_box(faces), &mut raster, &config, None);
            });
        });
    }

    group.finish();
}

fn benchmark_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_kinds");

    let faces = grid_of_faces(8, gradient_face);
    let raster_dim = 8 * 6 + 8;

    for filter in [ReconstructionFilter::Box, ReconstructionFilter::Bilinear, ReconstructionFilter::MitchellNetravali] {
        let config = TwoPassConfig::new(raster_dim, raster_dim, filter);
        group.bench_with_input(BenchmarkId::new("gradient_faces", format!("{filter:?}")), &faces, |b, faces| {
            b.iter(|| {
                let mut raster = ImageRaster::new(raster_dim, raster_dim, RasterColorSpace::Srgb, RasterColorSpace::Srgb);
                rasterize_faces(black_box(faces), &mut raster, &config, None);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_box_filter, benchmark_filters);
criterion_main!(benches);
