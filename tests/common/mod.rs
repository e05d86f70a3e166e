//! Common test utilities and builders.
//!
//! Grids are built from string literals; randomness comes from a seeded
//! `StdRng` so rendered output is reproducible within a test.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use sketchtable::editor::mutation::merge_range;
use sketchtable::{CellRange, Grid, StyleConfig};

/// Build a grid from rows of literals.
#[must_use]
pub fn grid(rows: &[&[&str]]) -> Grid {
    let values: Vec<Vec<&str>> = rows.iter().map(|r| r.to_vec()).collect();
    Grid::from_values(&values)
}

/// A `rows x cols` grid of `"r,c"` labels.
#[must_use]
pub fn labelled(rows: u32, cols: u32) -> Grid {
    let values: Vec<Vec<String>> = (0..rows)
        .map(|r| (0..cols).map(|c| format!("{r},{c}")).collect())
        .collect();
    Grid::from_values(&values)
}

/// Merge the rectangle `(r0, c0)..=(r1, c1)`, panicking on failure.
#[must_use]
pub fn merged(grid: &Grid, r0: u32, c0: u32, r1: u32, c1: u32) -> Grid {
    merge_range(grid, CellRange::new(r0, c0, r1, c1)).expect("merge failed")
}

#[must_use]
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Style with every random perturbation switched off.
#[must_use]
pub fn smooth_style() -> StyleConfig {
    StyleConfig {
        roughness: 0.0,
        bowing: 0.0,
        ..StyleConfig::default()
    }
}

pub fn assert_approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
