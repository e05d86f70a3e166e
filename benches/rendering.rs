//! Benchmarks for sketch rendering and export.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sketchtable::editor::mutation::merge_range;
use sketchtable::export::{export_png, export_svg};
use sketchtable::{render_scene, CellRange, ExportOptions, Grid, RenderParams, SizeOverrides, StyleConfig};

/// A `size x size` grid of short labels with a merged header band.
fn bench_grid(size: u32) -> Grid {
    let values: Vec<Vec<String>> = (0..size)
        .map(|r| (0..size).map(|c| format!("cell {r}-{c}")).collect())
        .collect();
    let grid = Grid::from_values(&values);
    merge_range(&grid, CellRange::new(0, 0, 0, size.saturating_sub(1) / 2))
        .expect("Failed to merge header")
}

/// Scene construction (layout, line suppression, perturbation, text)
fn bench_render_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_scene");
    let style = StyleConfig::default();
    let overrides = SizeOverrides::new();

    for size in [4u32, 16, 64] {
        let grid = bench_grid(size);
        group.throughput(Throughput::Elements(u64::from(size * size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &grid, |b, grid| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| {
                let params = RenderParams {
                    grid: black_box(grid),
                    style: &style,
                    col_widths: &overrides,
                    row_heights: &overrides,
                };
                render_scene(&params, &mut rng)
            });
        });
    }
    group.finish();
}

/// SVG serialization of a pre-rendered scene
fn bench_export_svg(c: &mut Criterion) {
    let grid = bench_grid(16);
    let style = StyleConfig::default();
    let overrides = SizeOverrides::new();
    let params = RenderParams {
        grid: &grid,
        style: &style,
        col_widths: &overrides,
        row_heights: &overrides,
    };
    let scene = render_scene(&params, &mut StdRng::seed_from_u64(2));
    let options = ExportOptions::default();

    c.bench_function("export_svg_16x16", |b| {
        b.iter(|| export_svg(black_box(&scene), &options))
    });
}

/// Native rasterization and PNG encoding
fn bench_export_png(c: &mut Criterion) {
    let grid = bench_grid(4);
    let style = StyleConfig::default();
    let overrides = SizeOverrides::new();
    let params = RenderParams {
        grid: &grid,
        style: &style,
        col_widths: &overrides,
        row_heights: &overrides,
    };
    let scene = render_scene(&params, &mut StdRng::seed_from_u64(3));
    let options = ExportOptions::default();

    c.bench_function("export_png_4x4", |b| {
        b.iter(|| export_png(black_box(&scene), &options).expect("Failed to export PNG"))
    });
}

criterion_group!(benches, bench_render_scene, bench_export_svg, bench_export_png);
criterion_main!(benches);
