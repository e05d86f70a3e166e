//! Sketch rendering.
//!
//! This module provides:
//! - The line perturbation primitive (`rough`)
//! - Merge-aware grid line strokes (`lines`)
//! - Cell text placement (`text`)
//! - Color parsing utilities (`colors`)
//!
//! [`render_scene`] ties them together into a [`Scene`], a flat list of
//! primitives that the exporters serialize. A scene is rebuilt from scratch
//! on every pass; nothing is cached.

pub mod colors;
pub mod lines;
pub mod rough;
pub mod text;

pub use colors::{palette, parse_color, CssColor, Ink};
pub use lines::{boundary_segments, sketch_grid_lines, Axis, GridSegment, Stroke};
pub use rough::{sketch_line, Point, SketchCurve};
pub use text::{layout_cell_text, TextPrimitive};

use rand::Rng;

use crate::layout::GridLayout;
use crate::types::{Grid, HeaderFill, SizeOverrides, StyleConfig};

/// Everything a render pass reads.
#[derive(Debug, Clone, Copy)]
pub struct RenderParams<'a> {
    pub grid: &'a Grid,
    pub style: &'a StyleConfig,
    pub col_widths: &'a SizeOverrides,
    pub row_heights: &'a SizeOverrides,
}

/// A filled rectangle (header highlight).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Primitives of one render pass, in grid coordinates.
///
/// Draw order is fills, then strokes, then text.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub fills: Vec<FillRect>,
    pub strokes: Vec<Stroke>,
    pub texts: Vec<TextPrimitive>,
    pub fill_color: CssColor,
    pub stroke_color: CssColor,
    pub text_color: CssColor,
    pub font_family: String,
}

impl Scene {
    /// True when the grid had nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty() && self.strokes.is_empty() && self.texts.is_empty()
    }
}

/// Run one full render pass.
///
/// The style is sanitized first, so out-of-range numbers and bad colors never
/// reach the primitives.
pub fn render_scene<R: Rng + ?Sized>(params: &RenderParams<'_>, rng: &mut R) -> Scene {
    let style = params.style.sanitized();
    let layout = GridLayout::resolve(params.grid, &style, params.col_widths, params.row_heights);

    let fills = if style.header_fill == HeaderFill::Highlight {
        header_fills(params.grid, &layout)
    } else {
        Vec::new()
    };
    let strokes = sketch_grid_lines(params.grid, &layout, &style, rng);
    let texts = layout_cell_text(params.grid, &layout, &style, rng);

    tracing::debug!(
        rows = params.grid.row_count(),
        cols = params.grid.col_count(),
        fills = fills.len(),
        strokes = strokes.len(),
        texts = texts.len(),
        "rendered scene"
    );

    Scene {
        width: layout.total_width(),
        height: layout.total_height(),
        fills,
        strokes,
        texts,
        fill_color: style.fill_color,
        stroke_color: style.stroke_color,
        text_color: style.text_color,
        font_family: style.font_family,
    }
}

/// One rectangle per visible header cell, spanning its merge.
fn header_fills(grid: &Grid, layout: &GridLayout) -> Vec<FillRect> {
    grid.visible_cells()
        .filter(|(pos, _)| pos.row == 0)
        .map(|(pos, _)| layout.cell_rect(pos.row, pos.col))
        .filter(|rect| !rect.skip)
        .map(|rect| FillRect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        })
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn render(grid: &Grid, style: &StyleConfig) -> Scene {
        let overrides = SizeOverrides::new();
        let params = RenderParams {
            grid,
            style,
            col_widths: &overrides,
            row_heights: &overrides,
        };
        render_scene(&params, &mut StdRng::seed_from_u64(0))
    }

    #[test]
    fn test_empty_grid_gives_empty_scene() {
        let scene = render(&Grid::empty(), &StyleConfig::default());
        assert!(scene.is_empty());
        assert_eq!(scene.width, 0.0);
        assert_eq!(scene.height, 0.0);
    }

    #[test]
    fn test_header_highlight_adds_fills() {
        let grid = Grid::sample();
        let plain = render(&grid, &StyleConfig::default());
        assert!(plain.fills.is_empty());

        let style = StyleConfig {
            header_fill: HeaderFill::Highlight,
            ..StyleConfig::default()
        };
        let highlighted = render(&grid, &style);
        assert_eq!(highlighted.fills.len(), 4);
        assert_eq!(highlighted.fill_color, palette::HIGHLIGHTER);
    }

    #[test]
    fn test_bad_style_is_sanitized() {
        let style = StyleConfig {
            stroke_color: "not a color".to_string(),
            roughness: -1.0,
            ..StyleConfig::default()
        };
        let scene = render(&Grid::sample(), &style);
        assert_eq!(scene.stroke_color, palette::INK);
        // No roughness means a single stroke per edge
        assert!(scene.strokes.iter().all(|s| s.opacity == 1.0));
    }
}
