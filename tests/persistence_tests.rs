//! Tests for snapshot persistence
//!
//! Sessions are saved as independent JSON blobs and restored with per-key
//! fallbacks, so one damaged snapshot never loses the others.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::path::PathBuf;

use common::labelled;
use sketchtable::persistence::{COL_WIDTHS_KEY, GRID_KEY, ROW_HEIGHTS_KEY, STYLE_KEY};
use sketchtable::{
    CellRange, FileStore, Grid, HeaderFill, MemoryStore, SnapshotStore, StyleConfig, TableEditor,
};

/// Fresh scratch directory, removed on drop.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "sketchtable-{name}-{}-{}",
            std::process::id(),
            uuid::Uuid::new_v4()
        ));
        Self(path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn edited_session() -> TableEditor {
    let mut editor = TableEditor::with_grid(labelled(3, 3));
    editor.merge(CellRange::new(0, 0, 0, 2)).unwrap();
    editor.resize_column(1, 180.0).unwrap();
    editor.resize_row(2, 75.0).unwrap();
    editor.set_style(StyleConfig {
        header_fill: HeaderFill::Highlight,
        roughness: 0.5,
        ..StyleConfig::default()
    });
    editor
}

#[test]
fn test_file_store_roundtrip() {
    let dir = ScratchDir::new("roundtrip");
    let editor = edited_session();

    let mut store = FileStore::new(&dir.0).unwrap();
    editor.persist(&mut store).unwrap();
    assert!(dir.0.join("grid.json").exists());
    assert!(dir.0.join("row_heights.json").exists());

    let reopened = FileStore::new(&dir.0).unwrap();
    assert_eq!(TableEditor::restore(&reopened), editor);
}

#[test]
fn test_empty_store_restores_sample() {
    let dir = ScratchDir::new("empty");
    let store = FileStore::new(&dir.0).unwrap();
    let editor = TableEditor::restore(&store);
    assert_eq!(editor.grid().values(), Grid::sample().values());
    assert_eq!(editor.style(), &StyleConfig::default());
}

#[test]
fn test_damaged_snapshot_only_loses_itself() {
    let mut store = MemoryStore::new();
    edited_session().persist(&mut store).unwrap();
    store.save(STYLE_KEY, "{ not json").unwrap();

    let restored = TableEditor::restore(&store);
    assert_eq!(restored.style(), &StyleConfig::default());
    assert_eq!(restored.grid().merged_regions().len(), 1);
    assert_eq!(restored.col_widths().get(1), Some(180.0));
}

#[test]
fn test_restored_sizes_are_clamped_to_minimums() {
    let mut store = MemoryStore::new();
    store.save(ROW_HEIGHTS_KEY, r#"{"0": -100.0, "1": 90.0}"#).unwrap();
    store.save(COL_WIDTHS_KEY, r#"{"1": 0.0, "2": 10.0}"#).unwrap();

    let restored = TableEditor::restore(&store);
    assert_eq!(restored.row_heights().get(0), Some(30.0));
    assert_eq!(restored.row_heights().get(1), Some(90.0));
    assert_eq!(restored.col_widths().get(1), Some(40.0));
    assert_eq!(restored.col_widths().get(2), Some(40.0));

    let layout = restored.layout();
    assert_eq!(layout.row_heights[0], 30.0);
    assert_eq!(layout.col_widths[1], 40.0);
    assert!(layout.row_heights.iter().chain(&layout.col_widths).all(|&v| v > 0.0));
}

#[test]
fn test_partial_style_fills_defaults() {
    let mut store = MemoryStore::new();
    store.save(STYLE_KEY, r#"{"roughness": 3.0}"#).unwrap();
    let restored = TableEditor::restore(&store);
    assert_eq!(restored.style().roughness, 3.0);
    assert_eq!(restored.style().padding, StyleConfig::default().padding);
}

#[test]
fn test_snapshot_blobs_are_json() {
    let mut store = MemoryStore::new();
    edited_session().persist(&mut store).unwrap();

    let grid: serde_json::Value =
        serde_json::from_str(&store.load(GRID_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(grid.as_array().unwrap().len(), 3);
    assert_eq!(grid[0][0]["colSpan"], 3);
    assert_eq!(grid[0][1]["hidden"], true);

    let widths: serde_json::Value =
        serde_json::from_str(&store.load(COL_WIDTHS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(widths["1"], 180.0);
}

#[test]
fn test_file_store_overwrites() {
    let dir = ScratchDir::new("overwrite");
    let mut store = FileStore::new(&dir.0).unwrap();
    store.save(STYLE_KEY, "{}").unwrap();
    store.save(STYLE_KEY, r#"{"padding":4}"#).unwrap();
    assert_eq!(
        store.load(STYLE_KEY).unwrap().as_deref(),
        Some(r#"{"padding":4}"#)
    );
    assert!(!dir.0.join("style.json.tmp").exists());
}
