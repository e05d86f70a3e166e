//! Tests for table generation through the editing session
//!
//! Generators are plain closures here; the real service lives outside the
//! crate.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::labelled;
use sketchtable::generation::{MAX_GENERATED_COLS, MAX_GENERATED_ROWS};
use sketchtable::{GenerationStatus, Result, SketchError, TableEditor, TableGenerator};

fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
    values
        .iter()
        .map(|r| r.iter().map(|s| (*s).to_string()).collect())
        .collect()
}

struct Canned(Vec<Vec<String>>);

impl TableGenerator for Canned {
    fn generate(&self, _prompt: &str) -> Result<Vec<Vec<String>>> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_successful_generation_replaces_grid() {
    let mut editor = TableEditor::with_grid(labelled(2, 2));
    editor.resize_column(0, 200.0).unwrap();

    let generator = Canned(rows(&[&["Fruit", "Color"], &["Apple", "Red"]]));
    editor.generate(&generator, "fruit colors").unwrap();

    assert_eq!(editor.status(), &GenerationStatus::Success);
    assert_eq!(editor.grid().values()[1], vec!["Apple", "Red"]);
    assert!(editor.col_widths().is_empty());
}

#[test]
fn test_failed_generation_keeps_grid() {
    let mut editor = TableEditor::with_grid(labelled(2, 2));
    let before = editor.grid().clone();

    let failing = |_: &str| -> Result<Vec<Vec<String>>> {
        Err(SketchError::Generation("service unavailable".into()))
    };
    assert!(editor.generate(&failing, "anything").is_err());

    assert_eq!(editor.grid(), &before);
    match editor.status() {
        GenerationStatus::Error(message) => assert!(message.contains("service unavailable")),
        other => panic!("unexpected status {other:?}"),
    }
}

#[test]
fn test_empty_response_is_an_error_status() {
    let mut editor = TableEditor::with_grid(labelled(1, 1));
    editor.begin_generation().unwrap();
    assert!(editor.complete_generation(Vec::new()).is_err());
    assert!(matches!(editor.status(), GenerationStatus::Error(_)));
    assert_eq!(editor.grid().row_count(), 1);
}

#[test]
fn test_one_request_at_a_time() {
    let mut editor = TableEditor::new();
    editor.begin_generation().unwrap();
    assert!(editor.status().is_loading());
    assert!(matches!(
        editor.begin_generation(),
        Err(SketchError::GenerationInProgress)
    ));

    editor.fail_generation("timed out");
    // A failed request frees the slot
    editor.begin_generation().unwrap();
}

#[test]
fn test_oversized_response_is_clamped() {
    let big: Vec<Vec<String>> = (0..12)
        .map(|r| (0..10).map(|c| format!("{r}{c}")).collect())
        .collect();
    let mut editor = TableEditor::new();
    editor.generate(&Canned(big), "big").unwrap();

    assert_eq!(editor.grid().row_count() as usize, MAX_GENERATED_ROWS);
    assert_eq!(editor.grid().col_count() as usize, MAX_GENERATED_COLS);
}

#[test]
fn test_generated_grid_has_no_merges() {
    let mut editor = TableEditor::new();
    editor
        .generate(&Canned(rows(&[&["a", "b"], &["c"]])), "ragged")
        .unwrap();
    assert!(editor.grid().merged_regions().is_empty());
    assert_eq!(editor.grid().values()[1], vec!["c", ""]);
}
