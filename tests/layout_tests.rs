//! Tests for text wrapping and grid sizing
//!
//! Widths come from an average-character estimate (`0.55 x font size`),
//! so every expectation here can be worked out by hand:
//! - body text is 16px, 8.8px per character
//! - header text is 20px, 11px per character
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{assert_approx, grid, labelled, merged};
use sketchtable::layout::{
    estimate_text_width, wrap_text, GridLayout, BASE_COL_WIDTH, MAX_AUTO_COL_WIDTH,
    MIN_AUTO_ROW_HEIGHT,
};
use sketchtable::{CellPos, SizeOverrides, StyleConfig};
use test_case::test_case;

fn resolve(g: &sketchtable::Grid, style: &StyleConfig) -> GridLayout {
    GridLayout::resolve(g, style, &SizeOverrides::new(), &SizeOverrides::new())
}

// ============================================================================
// WRAPPING
// ============================================================================

#[test_case("The quick brown fox", 100.0, &["The quick", "brown fox"] ; "two words per line")]
#[test_case("", 100.0, &[] ; "empty text has no lines")]
#[test_case("one\n\ntwo", 500.0, &["one", "", "two"] ; "blank line is kept")]
#[test_case("Extraordinarily", 40.0, &["Extraordinarily"] ; "long word is never split")]
#[test_case("  spaced   out  ", 500.0, &["spaced out"] ; "whitespace collapses")]
fn test_wrap_text(text: &str, max_width: f64, expected: &[&str]) {
    assert_eq!(wrap_text(text, max_width, 16.0), expected);
}

#[test]
fn test_estimate_counts_one_extra_char() {
    assert_approx(estimate_text_width("abcd", 16.0), 5.0 * 8.8);
    assert_approx(estimate_text_width("", 20.0), 11.0);
}

#[test]
fn test_every_wrapped_line_fits_or_is_one_word() {
    let text = "sketchy tables keep their lines short enough to read at a glance";
    for line in wrap_text(text, 120.0, 16.0) {
        assert!(
            estimate_text_width(&line, 16.0) < 120.0 || !line.contains(' '),
            "line {line:?} is too wide"
        );
    }
}

#[test]
fn test_wrapping_keeps_every_word_in_order() {
    let texts = [
        "sketchy tables keep their lines short enough to read at a glance",
        "Priority\n24/7",
        "  leading and   doubled   spaces  ",
        "first\n\nthird paragraph after a blank line",
        "supercalifragilisticexpialidocious fits nowhere",
        "one",
    ];
    let widths = [-50.0, 0.0, 1.0, 40.0, 96.0, 120.0, 226.0, 1000.0];

    for text in texts {
        let words: Vec<&str> = text.split_whitespace().collect();
        for width in widths {
            for font_size in [16.0, 20.0] {
                let joined = wrap_text(text, width, font_size).join(" ");
                let wrapped: Vec<&str> = joined.split_whitespace().collect();
                assert_eq!(wrapped, words, "text {text:?} at width {width}");
            }
        }
    }
}

#[test]
fn test_non_positive_width_puts_each_word_alone() {
    for width in [0.0, -1.0] {
        assert_eq!(wrap_text("a bb ccc", width, 16.0), vec!["a", "bb", "ccc"]);
    }
}

// ============================================================================
// COLUMN WIDTHS
// ============================================================================

#[test_case("a", BASE_COL_WIDTH ; "short text uses base width")]
#[test_case("twenty characters!!!", 180.0 ; "width grows with longest line")]
#[test_case("this line is far too long to fit in a single column", MAX_AUTO_COL_WIDTH ; "width is capped")]
#[test_case("short\ntwenty characters!!!", 180.0 ; "longest explicit line wins")]
fn test_auto_column_width(text: &str, expected: f64) {
    let layout = resolve(&grid(&[&[text]]), &StyleConfig::default());
    assert_approx(layout.col_width(0), expected);
}

#[test]
fn test_merged_text_does_not_widen_column() {
    let g = merged(
        &grid(&[&["a very long merged title that spans", ""], &["x", "y"]]),
        0,
        0,
        0,
        1,
    );
    let layout = resolve(&g, &StyleConfig::default());
    assert_approx(layout.col_width(0), BASE_COL_WIDTH);
    assert_approx(layout.col_width(1), BASE_COL_WIDTH);
}

#[test]
fn test_width_scale_applies_after_override() {
    let g = labelled(1, 2);
    let style = StyleConfig {
        width_scale: 0.5,
        ..StyleConfig::default()
    };
    let mut widths = SizeOverrides::new();
    widths.set(0, 200.0);
    let layout = GridLayout::resolve(&g, &style, &widths, &SizeOverrides::new());
    assert_approx(layout.col_width(0), 100.0);
    assert_approx(layout.col_width(1), BASE_COL_WIDTH * 0.5);
    assert_approx(layout.total_width(), 160.0);
}

// ============================================================================
// ROW HEIGHTS
// ============================================================================

#[test]
fn test_single_line_rows() {
    let layout = resolve(&labelled(2, 1), &StyleConfig::default());
    // Header: 20 * 1.4 + 24 = 52
    assert_approx(layout.row_height(0), 52.0);
    // Body: 16 * 1.4 + 24 = 46.4, below the floor
    assert_approx(layout.row_height(1), MIN_AUTO_ROW_HEIGHT);
}

#[test]
fn test_wrapped_body_row_grows() {
    let text = "one two three four five six";
    let mut widths = SizeOverrides::new();
    widths.set(0, BASE_COL_WIDTH);
    let layout = GridLayout::resolve(
        &grid(&[&["h"], &[text]]),
        &StyleConfig::default(),
        &widths,
        &SizeOverrides::new(),
    );
    // 120px column minus 2 x 12px padding
    let lines = wrap_text(text, 96.0, 16.0).len();
    assert_eq!(lines, 4);
    #[allow(clippy::cast_precision_loss)]
    let expected = lines as f64 * 16.0 * 1.4 + 24.0;
    assert_approx(layout.row_height(1), expected);
}

#[test]
fn test_height_override_is_verbatim() {
    let mut heights = SizeOverrides::new();
    heights.set(1, 33.0);
    let layout = GridLayout::resolve(
        &labelled(2, 2),
        &StyleConfig::default(),
        &SizeOverrides::new(),
        &heights,
    );
    assert_approx(layout.row_height(1), 33.0);
}

#[test]
fn test_out_of_range_overrides_are_ignored() {
    let mut widths = SizeOverrides::new();
    widths.set(9, 300.0);
    let layout = GridLayout::resolve(
        &labelled(1, 1),
        &StyleConfig::default(),
        &widths,
        &SizeOverrides::new(),
    );
    assert_approx(layout.total_width(), BASE_COL_WIDTH);
}

// ============================================================================
// GEOMETRY
// ============================================================================

#[test]
fn test_merged_rect_spans_region() {
    let g = merged(&labelled(3, 3), 1, 0, 2, 1);
    let layout = resolve(&g, &StyleConfig::default());

    let rect = layout.cell_rect(1, 0);
    assert!(!rect.skip);
    assert_approx(rect.width, layout.col_width(0) + layout.col_width(1));
    assert_approx(rect.height, layout.row_height(1) + layout.row_height(2));
    assert!(layout.cell_rect(2, 1).skip);
}

#[test]
fn test_point_in_merge_resolves_to_origin() {
    let g = merged(&labelled(3, 3), 1, 0, 2, 1);
    let layout = resolve(&g, &StyleConfig::default());
    let x = layout.col_width(0) + 5.0;
    let y = layout.total_height() - 1.0;
    assert_eq!(layout.cell_at_point(x, y), Some(CellPos::new(1, 0)));
    assert_eq!(layout.cell_at_point(layout.total_width() + 1.0, y), None);
}

#[test]
fn test_empty_grid_layout() {
    let layout = resolve(&sketchtable::Grid::empty(), &StyleConfig::default());
    assert!(layout.is_empty());
    assert_approx(layout.total_width(), 0.0);
}
