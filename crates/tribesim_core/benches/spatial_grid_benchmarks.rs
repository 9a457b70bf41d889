use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tribesim_core::math::Vec3;
use tribesim_core::spatial_grid::SpatialGrid;

fn layout() -> Vec<Vec3> {
    (0..1000)
        .map(|i| {
            let x = (i % 100) as f32 * 10.0;
            let z = (i / 100) as f32 * 10.0;
            Vec3::new(x, (i % 7) as f32, z)
        })
        .collect()
}

fn filled_grid(positions: &[Vec3]) -> SpatialGrid {
    let mut grid = SpatialGrid::new(10.0, Vec3::new(1000.0, 20.0, 1000.0), 32);
    for (slot, p) in positions.iter().enumerate() {
        grid.insert(slot, *p);
    }
    grid
}

fn bench_grid_build(c: &mut Criterion) {
    let positions = layout();
    let mut grid = SpatialGrid::new(10.0, Vec3::new(1000.0, 20.0, 1000.0), 32);

    c.bench_function("spatial_grid_build_1000", |b| {
        b.iter(|| {
            grid.clear();
            for (slot, p) in positions.iter().enumerate() {
                grid.insert(slot, *p);
            }
            black_box(grid.dropped())
        })
    });
}

fn bench_grid_query(c: &mut Criterion) {
    let grid = filled_grid(&layout());

    c.bench_function("spatial_grid_query_50_radius", |b| {
        let mut results = Vec::new();
        b.iter(|| {
            results.clear();
            grid.query_radius(Vec3::new(500.0, 3.0, 50.0), 50.0, &mut results);
            black_box(results.len())
        })
    });
}

fn bench_grid_query_small(c: &mut Criterion) {
    let grid = filled_grid(&layout());

    c.bench_function("spatial_grid_query_10_radius", |b| {
        let mut results = Vec::new();
        b.iter(|| {
            results.clear();
            grid.query_radius(Vec3::new(500.0, 3.0, 50.0), 10.0, &mut results);
            black_box(results.len())
        })
    });
}

fn bench_grid_count(c: &mut Criterion) {
    let grid = filled_grid(&layout());

    c.bench_function("spatial_grid_count_20_radius", |b| {
        b.iter(|| black_box(grid.count_in_radius(Vec3::new(250.0, 3.0, 50.0), 20.0)))
    });
}

criterion_group!(
    benches,
    bench_grid_build,
    bench_grid_query,
    bench_grid_query_small,
    bench_grid_count
);
criterion_main!(benches);
