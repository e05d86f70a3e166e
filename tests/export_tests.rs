//! Tests for SVG and PNG export
//!
//! Exports wrap the grid in a 20px white margin. PNGs are rendered at twice
//! the document size.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{grid, labelled, merged, rng, smooth_style};
use sketchtable::export::{export_png, export_svg, png_data_url, EXPORT_MARGIN};
use sketchtable::{
    render_svg, ExportOptions, HeaderFill, SketchError, StyleConfig, TableEditor,
};

fn editor_with(g: sketchtable::Grid, style: StyleConfig) -> TableEditor {
    let mut editor = TableEditor::with_grid(g);
    editor.set_style(style);
    editor
}

// ============================================================================
// SVG
// ============================================================================

#[test]
fn test_svg_document_shape() {
    let editor = TableEditor::new();
    let scene = editor.render(&mut rng(7));
    let svg = export_svg(&scene, &ExportOptions::default());

    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert_eq!(svg.matches("<path ").count(), scene.strokes.len());
    assert_eq!(svg.matches("<text ").count(), scene.texts.len());
    assert!(svg.contains(&format!(
        "translate({EXPORT_MARGIN:.2} {EXPORT_MARGIN:.2})"
    )));
}

#[test]
fn test_svg_size_includes_margin() {
    let editor = editor_with(grid(&[&["a"]]), smooth_style());
    let svg = editor.export_svg(&mut rng(1));
    // 120 x 52 grid plus 20px on every side
    assert!(svg.contains(r#"width="160" height="92""#));
}

#[test]
fn test_smooth_style_draws_straight_edges() {
    let editor = editor_with(grid(&[&["a"]]), smooth_style());
    let svg = editor.export_svg(&mut rng(1));
    assert!(svg.contains(r#"d="M 0.00 0.00 Q 60.00 0.00 120.00 0.00""#));
    assert!(!svg.contains("stroke-opacity"));
}

#[test]
fn test_double_stroke_is_fainter() {
    let editor = editor_with(grid(&[&["a"]]), StyleConfig::default());
    let svg = editor.export_svg(&mut rng(1));
    assert_eq!(svg.matches(r#"stroke-opacity="0.60""#).count(), 4);
    assert_eq!(svg.matches(r#"stroke-width="1.00""#).count(), 4);
}

#[test]
fn test_same_seed_same_sketch() {
    let editor = TableEditor::new();
    assert_eq!(editor.export_svg(&mut rng(42)), editor.export_svg(&mut rng(42)));
    assert_ne!(editor.export_svg(&mut rng(42)), editor.export_svg(&mut rng(43)));
}

#[test]
fn test_text_is_escaped() {
    let editor = editor_with(grid(&[&["h"], &["<b> & co"]]), smooth_style());
    let svg = editor.export_svg(&mut rng(1));
    assert!(svg.contains(">&lt;b&gt; &amp; co</text>"));
    assert!(!svg.contains("<b>"));
}

#[test]
fn test_header_highlight_one_fill_per_visible_header() {
    let style = StyleConfig {
        header_fill: HeaderFill::Highlight,
        ..smooth_style()
    };
    let g = merged(&labelled(2, 3), 0, 0, 0, 1);
    let svg = editor_with(g, style).export_svg(&mut rng(1));
    assert_eq!(svg.matches(r#"fill-opacity="0.8""#).count(), 2);
}

#[test]
fn test_headers_are_bold() {
    let editor = editor_with(labelled(2, 1), smooth_style());
    let svg = editor.export_svg(&mut rng(1));
    assert_eq!(svg.matches(r#"font-weight="bold""#).count(), 1);
    assert!(svg.contains(r#"font-size="20""#));
    assert!(svg.contains(r#"font-size="16""#));
}

#[test]
fn test_empty_grid_exports_blank_document() {
    let editor = editor_with(sketchtable::Grid::empty(), StyleConfig::default());
    let svg = editor.export_svg(&mut rng(1));
    assert!(!svg.contains("<path"));
    assert!(svg.contains(r#"width="40" height="40""#));
}

#[test]
fn test_render_svg_from_json() {
    let grid_json = grid(&[&["a", "b"]]).to_json().unwrap();
    let svg = render_svg(&grid_json, Some(r#"{"roughness": 0}"#)).unwrap();
    assert!(svg.contains(">a</text>"));
    assert!(render_svg(&grid_json, None).unwrap().contains(">b</text>"));
}

#[test]
fn test_render_svg_reports_bad_input_as_errors() {
    let grid_json = grid(&[&["a"]]).to_json().unwrap();
    assert!(matches!(
        render_svg("[[{", None),
        Err(SketchError::Snapshot(_))
    ));
    assert!(matches!(
        render_svg(&grid_json, Some("{ nope")),
        Err(SketchError::Other(_))
    ));
}

// ============================================================================
// PNG
// ============================================================================

#[test]
fn test_png_dimensions() {
    let editor = editor_with(grid(&[&["a"]]), smooth_style());
    let png = editor.export_png(&mut rng(1)).unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (320, 184));
}

#[test]
fn test_png_has_white_margin_and_ink() {
    let editor = editor_with(grid(&[&["a"]]), smooth_style());
    let png = editor.export_png(&mut rng(1)).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();

    assert_eq!(decoded.get_pixel(2, 2).0, [255, 255, 255, 255]);
    // Top edge of the grid, at scene (60, 0)
    let ink = decoded.get_pixel(160, 40).0;
    assert!(ink[0] < 128, "expected a dark stroke pixel, got {ink:?}");
}

#[test]
fn test_png_margin_option() {
    let scene = editor_with(grid(&[&["a"]]), smooth_style()).render(&mut rng(1));
    let options = ExportOptions {
        margin: 0.0,
        raster_scale: 1,
    };
    let png = export_png(&scene, &options).unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (120, 52));
}

#[test]
fn test_png_draws_cell_text() {
    let scene = editor_with(grid(&[&["Name", "Price"], &["Pro", "$12"]]), smooth_style())
        .render(&mut rng(3));
    assert_eq!(scene.texts.len(), 4);
    let mut bare = scene.clone();
    bare.texts.clear();

    let options = ExportOptions::default();
    let dark = |png: &[u8]| {
        image::load_from_memory(png)
            .unwrap()
            .to_rgba8()
            .pixels()
            .filter(|p| p.0[0] < 128)
            .count()
    };
    let with_text = export_png(&scene, &options).unwrap();
    let without_text = export_png(&bare, &options).unwrap();
    assert_ne!(with_text, without_text);
    assert!(dark(&with_text) > dark(&without_text) + 50);
}

#[test]
fn test_png_data_url() {
    let url = png_data_url(&[0x89, b'P', b'N', b'G']);
    assert_eq!(url, "data:image/png;base64,iVBORw==");
}
