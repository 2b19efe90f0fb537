use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vraster::cag::{Arrangement, ArrangementConfig};
use vraster::paths::RenderPath;

fn square(id: u32, x: f64, y: f64, size: f64) -> RenderPath {
    RenderPath::new(id, vec![(x, y), (x + size, y), (x + size, y + size), (x, y + size)])
}

fn grid_of_squares(n: u32) -> Vec<RenderPath> {
    (0..n)
        .flat_map(|row| {
            (0..n).map(move |col| square(row * n + col, col as f64 * 1.5, row as f64 * 1.5, 1.0))
        })
        .collect()
}

fn overlapping_pair() -> Vec<RenderPath> {
    vec![square(0, 0.0, 0.0, 10.0), square(1, 5.0, 5.0, 10.0)]
}

fn benchmark_single_shape(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_shape");

    for (name, paths) in [
        ("one_square", vec![square(0, 0.0, 0.0, 10.0)]),
        ("overlapping_pair", overlapping_pair()),
    ] {
        group.bench_with_input(BenchmarkId::new("build", name), &paths, |b, paths| {
            b.iter(|| Arrangement::build(black_box(paths), ArrangementConfig::default()).unwrap());
        });
    }

    group.finish();
}

fn benchmark_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_of_squares");

    for n in [4, 8, 12] {
        let paths = grid_of_squares(n);
        group.bench_with_input(BenchmarkId::new("build", n * n), &paths, |b, paths| {
            b.iter(|| Arrangement::build(black_box(paths), ArrangementConfig::default()).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_single_shape, benchmark_grid);
criterion_main!(benches);
