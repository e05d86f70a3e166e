//! Cell text placement.
//!
//! Text is wrapped to the cell's inner width, centred as a block inside the
//! cell's (possibly merged) rectangle and then nudged by a little randomness
//! so the lines look handwritten.

use rand::Rng;

use super::rough::jitter;
use crate::layout::{font_size_for_row, wrap_text, GridLayout, LINE_HEIGHT_FACTOR};
use crate::types::{Grid, StyleConfig};

/// One line of text. `(x, y)` is the centre of the line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub bold: bool,
    /// Owning cell of the line
    pub row: u32,
    pub col: u32,
}

/// Place the text of every visible cell.
///
/// Blank lines keep their vertical slot but emit nothing.
pub fn layout_cell_text<R: Rng + ?Sized>(
    grid: &Grid,
    layout: &GridLayout,
    style: &StyleConfig,
    rng: &mut R,
) -> Vec<TextPrimitive> {
    let mut out = Vec::new();
    let block_amplitude = style.roughness * 2.0 * 0.5;
    let line_amplitude = style.roughness * 2.0;

    for (pos, cell) in grid.visible_cells() {
        if cell.value.is_empty() {
            continue;
        }
        let rect = layout.cell_rect(pos.row, pos.col);
        if rect.skip {
            continue;
        }

        let font_size = font_size_for_row(pos.row);
        let lines = wrap_text(&cell.value, rect.width - 2.0 * style.padding, font_size);
        if lines.is_empty() {
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let line_count = lines.len() as f64;
        let line_height = font_size * LINE_HEIGHT_FACTOR;
        let block_height = line_count * line_height;

        let dx = jitter(rng, block_amplitude);
        let dy = jitter(rng, block_amplitude);
        let center_x = rect.x + rect.width / 2.0 + dx;
        let first_y = rect.y + (rect.height - block_height) / 2.0 + line_height / 2.0 + dy;

        let mut y = first_y;
        for line in lines {
            if !line.is_empty() {
                out.push(TextPrimitive {
                    text: line,
                    x: center_x + jitter(rng, line_amplitude),
                    y,
                    font_size,
                    bold: pos.row == 0,
                    row: pos.row,
                    col: pos.col,
                });
            }
            y += line_height;
        }
    }
    out
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
    use crate::editor::mutation::merge_range;
    use crate::layout::{BODY_FONT_SIZE, HEADER_FONT_SIZE};
    use crate::types::{CellRange, SizeOverrides};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn still() -> StyleConfig {
        StyleConfig {
            roughness: 0.0,
            ..StyleConfig::default()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn place(grid: &Grid, style: &StyleConfig) -> (GridLayout, Vec<TextPrimitive>) {
        let overrides = SizeOverrides::new();
        let layout = GridLayout::resolve(grid, style, &overrides, &overrides);
        let mut rng = StdRng::seed_from_u64(11);
        let texts = layout_cell_text(grid, &layout, style, &mut rng);
        (layout, texts)
    }

    #[test]
    fn test_single_line_is_centred() {
        let grid = Grid::from_values(&[vec!["Name"], vec!["x"]]);
        let (layout, texts) = place(&grid, &still());
        assert_eq!(texts.len(), 2);

        let header = &texts[0];
        assert!(header.bold);
        assert_eq!(header.font_size, HEADER_FONT_SIZE);
        assert!(approx(header.x, layout.col_width(0) / 2.0));
        assert!(approx(header.y, layout.row_height(0) / 2.0));

        let body = &texts[1];
        assert!(!body.bold);
        assert_eq!(body.font_size, BODY_FONT_SIZE);
        assert!(approx(
            body.y,
            layout.row_positions[1] + layout.row_height(1) / 2.0
        ));
    }

    #[test]
    fn test_blank_line_keeps_spacing() {
        let grid = Grid::from_values(&[vec!["h"], vec!["top\n\nbottom"]]);
        let (_, texts) = place(&grid, &still());
        let body: Vec<_> = texts.iter().filter(|t| t.row == 1).collect();
        assert_eq!(body.len(), 2);
        let gap = body[1].y - body[0].y;
        assert!(approx(gap, 2.0 * BODY_FONT_SIZE * LINE_HEIGHT_FACTOR));
    }

    #[test]
    fn test_merged_cell_centres_in_span() {
        let grid = Grid::from_values(&[vec!["Merged", "x"], vec!["y", "z"]]);
        let grid = merge_range(&grid, CellRange::new(0, 0, 1, 1)).unwrap();
        let (layout, texts) = place(&grid, &still());
        // "Merged\nx\ny\nz" is one four-line block owned by (0, 0)
        assert_eq!(texts.len(), 4);
        assert!(texts.iter().all(|t| t.row == 0 && t.col == 0));
        assert!(texts.iter().all(|t| approx(t.x, layout.total_width() / 2.0)));
        let mid = (texts[0].y + texts[3].y) / 2.0;
        assert!(approx(mid, layout.total_height() / 2.0));
    }

    #[test]
    fn test_jitter_bounds() {
        let grid = Grid::from_values(&[vec!["a"]]);
        let style = StyleConfig {
            roughness: 2.0,
            ..StyleConfig::default()
        };
        let overrides = SizeOverrides::new();
        let layout = GridLayout::resolve(&grid, &style, &overrides, &overrides);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let texts = layout_cell_text(&grid, &layout, &style, &mut rng);
            let t = &texts[0];
            // block jitter 2.0 plus line jitter 4.0
            assert!((t.x - layout.col_width(0) / 2.0).abs() <= 6.0);
            assert!((t.y - layout.row_height(0) / 2.0).abs() <= 2.0);
        }
    }

    #[test]
    fn test_empty_cells_emit_nothing() {
        let grid = Grid::from_values(&[vec!["", " "]]);
        let (_, texts) = place(&grid, &still());
        assert!(texts.is_empty());
    }
}
