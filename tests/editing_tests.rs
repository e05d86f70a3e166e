//! Tests for the editing session
//!
//! Structural edits must keep merges consistent and move size overrides
//! along with the rows and columns they belong to.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{grid, labelled, rng};
use sketchtable::editor::mutation::{MIN_COLUMN_WIDTH, MIN_ROW_HEIGHT};
use sketchtable::{CellRange, Grid, SketchError, TableEditor};

// ============================================================================
// SIZE OVERRIDES FOLLOW STRUCTURE
// ============================================================================

#[test]
fn test_remove_column_shifts_width_overrides() {
    let mut editor = TableEditor::with_grid(labelled(2, 3));
    editor.resize_column(0, 100.0).unwrap();
    editor.resize_column(2, 150.0).unwrap();

    editor.remove_column(1).unwrap();

    let widths: Vec<(u32, f64)> = editor.col_widths().iter().collect();
    assert_eq!(widths, vec![(0, 100.0), (1, 150.0)]);
}

#[test]
fn test_remove_column_drops_its_override() {
    let mut editor = TableEditor::with_grid(labelled(2, 3));
    editor.resize_column(1, 90.0).unwrap();
    editor.remove_column(1).unwrap();
    assert!(editor.col_widths().is_empty());
}

#[test]
fn test_insert_row_shifts_height_overrides() {
    let mut editor = TableEditor::with_grid(labelled(3, 2));
    editor.resize_row(0, 80.0).unwrap();
    editor.resize_row(2, 60.0).unwrap();

    editor.insert_row(1).unwrap();

    assert_eq!(editor.row_heights().get(0), Some(80.0));
    assert_eq!(editor.row_heights().get(1), None);
    assert_eq!(editor.row_heights().get(3), Some(60.0));
    assert_eq!(editor.layout().row_height(3), 60.0);
}

#[test]
fn test_resize_clamps_to_minimum() {
    let mut editor = TableEditor::with_grid(labelled(2, 2));
    assert_eq!(editor.resize_column(0, 5.0).unwrap(), MIN_COLUMN_WIDTH);
    assert_eq!(editor.resize_row(0, -20.0).unwrap(), MIN_ROW_HEIGHT);
    assert_eq!(editor.resize_column(1, 300.0).unwrap(), 300.0);
}

#[test]
fn test_resize_out_of_bounds() {
    let mut editor = TableEditor::with_grid(labelled(2, 2));
    assert!(matches!(
        editor.resize_column(2, 100.0),
        Err(SketchError::OutOfBounds { col: 2, .. })
    ));
    assert!(editor.col_widths().is_empty());
}

// ============================================================================
// STRUCTURAL EDITS
// ============================================================================

#[test]
fn test_insert_into_empty_grid() {
    let mut editor = TableEditor::with_grid(Grid::empty());
    editor.insert_column(0).unwrap();
    assert_eq!(editor.grid().row_count(), 1);
    assert_eq!(editor.grid().col_count(), 1);
}

#[test]
fn test_removing_everything_leaves_empty_grid() {
    let mut editor = TableEditor::with_grid(labelled(1, 2));
    editor.remove_column(0).unwrap();
    editor.remove_column(0).unwrap();
    assert!(editor.grid().is_empty());
    assert!(editor.render(&mut rng(3)).is_empty());
}

#[test]
fn test_insert_column_keeps_values_in_place() {
    let mut editor = TableEditor::with_grid(grid(&[&["a", "b"], &["c", "d"]]));
    editor.insert_column(1).unwrap();
    assert_eq!(
        editor.grid().values(),
        vec![vec!["a", "", "b"], vec!["c", "", "d"]]
    );
}

#[test]
fn test_insert_column_grows_crossing_merge() {
    let mut editor = TableEditor::with_grid(labelled(2, 3));
    editor.merge(CellRange::new(0, 0, 0, 2)).unwrap();
    editor.insert_column(1).unwrap();

    let owner = editor.grid().cell(0, 0).unwrap();
    assert_eq!(owner.col_span, 4);
    assert!(editor.grid().cell(0, 1).unwrap().hidden);
    editor.grid().validate().unwrap();
}

#[test]
fn test_removing_merge_owner_row_hands_over() {
    let mut editor = TableEditor::with_grid(grid(&[&["top", "x"], &["", "y"], &["z", "w"]]));
    editor.merge(CellRange::new(0, 0, 2, 0)).unwrap();
    let id = editor.grid().cell(0, 0).unwrap().id;

    editor.remove_row(0).unwrap();

    let heir = editor.grid().cell(0, 0).unwrap();
    assert_eq!(heir.id, id);
    assert_eq!(heir.value, "top\nz");
    assert_eq!(heir.row_span, 2);
    editor.grid().validate().unwrap();
}

#[test]
fn test_edit_hidden_position_edits_owner() {
    let mut editor = TableEditor::with_grid(labelled(2, 2));
    editor.merge(CellRange::new(0, 0, 1, 1)).unwrap();
    editor.set_cell_value(1, 1, "whole").unwrap();
    assert_eq!(editor.grid().cell(0, 0).unwrap().value, "whole");
    assert!(editor.set_cell_value(5, 0, "nope").is_err());
}

#[test]
fn test_unmerge_keeps_text_in_owner() {
    let mut editor = TableEditor::with_grid(grid(&[&["a", "b"]]));
    editor.merge(CellRange::new(0, 0, 0, 1)).unwrap();
    editor.unmerge(0, 1).unwrap();
    assert_eq!(editor.grid().values(), vec![vec!["a\nb", ""]]);
    assert!(editor.grid().merged_regions().is_empty());
}

#[test]
fn test_replace_grid_rejects_invalid() {
    let mut editor = TableEditor::new();
    let before = editor.grid().clone();
    let bad: Grid = serde_json::from_str(&format!(
        r#"[[{{"id":"{}","value":"","hidden":true}}]]"#,
        sketchtable::CellId::new()
    ))
    .unwrap();
    assert!(editor.replace_grid(bad).is_err());
    assert_eq!(editor.grid(), &before);
}

// ============================================================================
// HIT TESTING
// ============================================================================

#[test]
fn test_cell_at_point_follows_overrides() {
    let mut editor = TableEditor::with_grid(labelled(1, 2));
    editor.resize_column(0, 50.0).unwrap();
    assert_eq!(editor.cell_at_point(49.0, 10.0).unwrap().col, 0);
    assert_eq!(editor.cell_at_point(51.0, 10.0).unwrap().col, 1);
}
