//! Tests for merged cells and merge-aware grid lines
//!
//! A merged region is drawn as a single cell: its outer border is complete
//! and no edge crosses its interior.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{grid, labelled, merged, rng, smooth_style};
use sketchtable::editor::mutation::{insert_row, remove_column, remove_row, unmerge};
use sketchtable::render::lines::{is_horizontal_boundary, is_vertical_boundary};
use sketchtable::render::{boundary_segments, Axis, GridSegment};
use sketchtable::{render_scene, CellRange, Grid, RenderParams, SizeOverrides, StyleConfig};

fn seg(axis: Axis, line: u32, start: u32, end: u32) -> GridSegment {
    GridSegment {
        axis,
        line,
        start,
        end,
    }
}

/// No drawn unit edge may lie strictly inside a merged region.
fn assert_no_interior_edges(grid: &Grid) {
    for range in grid.merged_regions() {
        for row in range.start_row + 1..=range.end_row {
            for col in range.start_col..=range.end_col {
                assert!(
                    !is_horizontal_boundary(grid, row, col),
                    "horizontal edge inside merge at row {row}, col {col}"
                );
            }
        }
        for col in range.start_col + 1..=range.end_col {
            for row in range.start_row..=range.end_row {
                assert!(
                    !is_vertical_boundary(grid, row, col),
                    "vertical edge inside merge at row {row}, col {col}"
                );
            }
        }
    }
}

// ============================================================================
// SEGMENT GEOMETRY
// ============================================================================

#[test]
fn test_unmerged_grid_is_full_lattice() {
    let segments = boundary_segments(&labelled(2, 3));
    // 3 horizontal lines and 4 vertical lines, each drawn end to end
    assert_eq!(segments.len(), 7);
    assert!(segments.contains(&seg(Axis::Horizontal, 1, 0, 3)));
    assert!(segments.contains(&seg(Axis::Vertical, 2, 0, 2)));
}

#[test]
fn test_horizontal_merge_splits_vertical_line() {
    let g = merged(&labelled(2, 3), 0, 0, 0, 1);
    let segments = boundary_segments(&g);

    let vertical_one: Vec<_> = segments
        .iter()
        .filter(|s| s.axis == Axis::Vertical && s.line == 1)
        .collect();
    assert_eq!(vertical_one, vec![&seg(Axis::Vertical, 1, 1, 2)]);
    assert_eq!(segments.len(), 7);
}

#[test]
fn test_block_merge_suppresses_both_axes() {
    let g = merged(&labelled(3, 3), 0, 0, 1, 1);
    let segments = boundary_segments(&g);

    assert!(segments.contains(&seg(Axis::Horizontal, 1, 2, 3)));
    assert!(segments.contains(&seg(Axis::Vertical, 1, 2, 3)));
    assert!(!segments.contains(&seg(Axis::Horizontal, 1, 0, 3)));
    assert_no_interior_edges(&g);
}

#[test]
fn test_outer_border_survives_full_merge() {
    let g = merged(&labelled(2, 2), 0, 0, 1, 1);
    let segments = boundary_segments(&g);
    assert_eq!(
        segments,
        vec![
            seg(Axis::Horizontal, 0, 0, 2),
            seg(Axis::Horizontal, 2, 0, 2),
            seg(Axis::Vertical, 0, 0, 2),
            seg(Axis::Vertical, 2, 0, 2),
        ]
    );
}

#[test]
fn test_empty_grid_has_no_segments() {
    assert!(boundary_segments(&Grid::empty()).is_empty());
}

#[test]
fn test_unmerge_restores_lattice() {
    let g = merged(&labelled(3, 3), 0, 1, 2, 2);
    let restored = unmerge(&g, 1, 2).unwrap();
    assert_eq!(boundary_segments(&restored).len(), 8);
    assert!(restored.merged_regions().is_empty());
}

// ============================================================================
// MERGES UNDER STRUCTURAL EDITS
// ============================================================================

#[test]
fn test_no_interior_edges_after_edits() {
    let mut g = merged(&labelled(4, 4), 1, 1, 2, 3);
    g = merged(&g, 0, 0, 3, 0);
    assert_no_interior_edges(&g);

    g = insert_row(&g, 2).unwrap();
    g.validate().unwrap();
    assert_no_interior_edges(&g);
    assert_eq!(g.cell(1, 1).unwrap().row_span, 3);
    assert_eq!(g.cell(0, 0).unwrap().row_span, 5);

    g = remove_row(&g, 1).unwrap();
    g.validate().unwrap();
    assert_no_interior_edges(&g);

    g = remove_column(&g, 2).unwrap();
    g.validate().unwrap();
    assert_no_interior_edges(&g);
}

#[test]
fn test_merge_expands_to_touched_merges() {
    let g = merged(&labelled(3, 3), 0, 0, 1, 1);
    // Selection only clips the existing merge's corner
    let g = merged(&g, 1, 1, 1, 2);
    assert_eq!(
        g.covering_range(0, 0).unwrap(),
        CellRange::new(0, 0, 1, 2)
    );
    assert_no_interior_edges(&g);
}

#[test]
fn test_merge_joins_text_row_major() {
    let g = merged(&grid(&[&["a", ""], &["c", "d"]]), 1, 1, 0, 0);
    assert_eq!(g.cell(0, 0).unwrap().value, "a\nc\nd");
    assert!(g.cell(1, 1).unwrap().hidden);
}

// ============================================================================
// RENDERED STROKES
// ============================================================================

#[test]
fn test_stroke_count_follows_segments() {
    let g = merged(&labelled(3, 3), 0, 0, 0, 2);
    let widths = SizeOverrides::new();
    let heights = SizeOverrides::new();
    let segments = boundary_segments(&g).len();

    let smooth = smooth_style();
    let scene = render_scene(
        &RenderParams {
            grid: &g,
            style: &smooth,
            col_widths: &widths,
            row_heights: &heights,
        },
        &mut rng(1),
    );
    assert_eq!(scene.strokes.len(), segments);

    let rough = StyleConfig::default();
    let scene = render_scene(
        &RenderParams {
            grid: &g,
            style: &rough,
            col_widths: &widths,
            row_heights: &heights,
        },
        &mut rng(1),
    );
    assert_eq!(scene.strokes.len(), segments * 2);
}

#[test]
fn test_merged_text_is_centered_in_region() {
    let g = merged(&grid(&[&["Title", ""], &["x", "y"]]), 0, 0, 0, 1);
    let widths = SizeOverrides::new();
    let heights = SizeOverrides::new();
    let style = smooth_style();
    let scene = render_scene(
        &RenderParams {
            grid: &g,
            style: &style,
            col_widths: &widths,
            row_heights: &heights,
        },
        &mut rng(2),
    );

    let title = scene.texts.iter().find(|t| t.text == "Title").unwrap();
    common::assert_approx(title.x, scene.width / 2.0);
    assert!(title.bold);
    assert_eq!(scene.texts.len(), 3);
}
