//! Resolved geometry for a table grid.
//!
//! Column widths and row heights are computed once per render pass from the
//! cell text, the style and the user's size overrides. Grid line offsets are
//! prefix sums of those sizes, enabling O(log n) hit testing.

use std::collections::HashMap;

use super::wrap::wrap_text;
use crate::types::{CellPos, Grid, SizeOverrides, StyleConfig};

/// Auto-width floor for every column.
pub const BASE_COL_WIDTH: f64 = 120.0;

/// Auto-width cap for a single cell's contribution.
pub const MAX_AUTO_COL_WIDTH: f64 = 250.0;

/// Pixels per character when estimating a column width.
pub const COL_CHAR_WIDTH: f64 = 9.0;

/// Font size of the header row (row 0).
pub const HEADER_FONT_SIZE: f64 = 20.0;

/// Font size of every other row.
pub const BODY_FONT_SIZE: f64 = 16.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.4;

/// Floor for auto-computed row heights.
pub const MIN_AUTO_ROW_HEIGHT: f64 = 50.0;

/// Font size used for text in `row`.
pub fn font_size_for_row(row: u32) -> f64 {
    if row == 0 {
        HEADER_FONT_SIZE
    } else {
        BODY_FONT_SIZE
    }
}

/// Pre-computed geometry for a grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    /// Cumulative column positions (`col_positions[i]` = x of column i's left edge)
    pub col_positions: Vec<f64>,
    /// Cumulative row positions (`row_positions[i]` = y of row i's top edge)
    pub row_positions: Vec<f64>,
    /// Column widths, scaled
    pub col_widths: Vec<f64>,
    /// Row heights
    pub row_heights: Vec<f64>,
    /// Merge info lookup by (row, col), only for positions inside a merge
    pub merges: HashMap<(u32, u32), MergeInfo>,
}

/// Information about a merged cell region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeInfo {
    /// True if this cell is the top-left origin of the merge
    pub is_origin: bool,
    /// Row of the merge origin
    pub origin_row: u32,
    /// Column of the merge origin
    pub origin_col: u32,
    /// Number of rows in the merge
    pub row_span: u32,
    /// Number of columns in the merge
    pub col_span: u32,
}

/// Rectangle representing a cell's bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    /// X position (left edge)
    pub x: f64,
    /// Y position (top edge)
    pub y: f64,
    /// Width of the cell
    pub width: f64,
    /// Height of the cell
    pub height: f64,
    /// True if this cell should be skipped (part of merge but not origin)
    pub skip: bool,
}

impl GridLayout {
    /// Resolve widths, heights and offsets for `grid`.
    ///
    /// Width overrides replace the auto width before `width_scale` is
    /// applied; height overrides are used verbatim. Overrides past the grid
    /// bounds are ignored.
    pub fn resolve(
        grid: &Grid,
        style: &StyleConfig,
        col_overrides: &SizeOverrides,
        row_overrides: &SizeOverrides,
    ) -> Self {
        let col_count = grid.col_count();
        let row_count = grid.row_count();

        for (idx, _) in col_overrides.out_of_range(col_count) {
            tracing::debug!("ignoring width override for missing column {idx}");
        }
        for (idx, _) in row_overrides.out_of_range(row_count) {
            tracing::debug!("ignoring height override for missing row {idx}");
        }

        let col_widths: Vec<f64> = (0..col_count)
            .map(|col| {
                let base = col_overrides
                    .get(col)
                    .unwrap_or_else(|| auto_column_width(grid, col));
                base * style.width_scale
            })
            .collect();

        let row_heights: Vec<f64> = (0..row_count)
            .map(|row| {
                row_overrides
                    .get(row)
                    .unwrap_or_else(|| auto_row_height(grid, row, &col_widths, style.padding))
            })
            .collect();

        let mut merges = HashMap::new();
        for (origin, cell) in grid.visible_cells().filter(|(_, c)| c.is_merged()) {
            for r in origin.row..origin.row + cell.row_span {
                for c in origin.col..origin.col + cell.col_span {
                    merges.insert(
                        (r, c),
                        MergeInfo {
                            is_origin: r == origin.row && c == origin.col,
                            origin_row: origin.row,
                            origin_col: origin.col,
                            row_span: cell.row_span,
                            col_span: cell.col_span,
                        },
                    );
                }
            }
        }

        GridLayout {
            col_positions: prefix_sums(&col_widths),
            row_positions: prefix_sums(&row_heights),
            col_widths,
            row_heights,
            merges,
        }
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.col_widths.is_empty() || self.row_heights.is_empty()
    }

    /// Get cell bounds in grid coordinates
    pub fn cell_rect(&self, row: u32, col: u32) -> CellRect {
        let x = self.col_positions.get(col as usize).copied().unwrap_or(0.0);
        let y = self.row_positions.get(row as usize).copied().unwrap_or(0.0);
        let mut w = self.col_widths.get(col as usize).copied().unwrap_or(0.0);
        let mut h = self.row_heights.get(row as usize).copied().unwrap_or(0.0);

        // Check for merge
        if let Some(merge) = self.merges.get(&(row, col)) {
            if !merge.is_origin {
                return CellRect {
                    x,
                    y,
                    width: w,
                    height: h,
                    skip: true,
                };
            }
            // Calculate merged size
            let end_col = col + merge.col_span;
            let end_row = row + merge.row_span;
            w = self
                .col_positions
                .get(end_col as usize)
                .copied()
                .unwrap_or(x)
                - x;
            h = self
                .row_positions
                .get(end_row as usize)
                .copied()
                .unwrap_or(y)
                - y;
        }

        CellRect {
            x,
            y,
            width: w,
            height: h,
            skip: false,
        }
    }

    /// Find row at y position (binary search)
    pub fn row_at_y(&self, y: f64) -> Option<u32> {
        index_at(&self.row_positions, y)
    }

    /// Find column at x position (binary search)
    pub fn col_at_x(&self, x: f64) -> Option<u32> {
        index_at(&self.col_positions, x)
    }

    /// The owning cell under a point, resolving merged positions to their origin.
    pub fn cell_at_point(&self, x: f64, y: f64) -> Option<CellPos> {
        if x < 0.0 || y < 0.0 || x >= self.total_width() || y >= self.total_height() {
            return None;
        }
        let row = self.row_at_y(y)?;
        let col = self.col_at_x(x)?;
        Some(match self.merges.get(&(row, col)) {
            Some(merge) => CellPos::new(merge.origin_row, merge.origin_col),
            None => CellPos::new(row, col),
        })
    }

    /// Get total width of the grid
    pub fn total_width(&self) -> f64 {
        self.col_positions.last().copied().unwrap_or(0.0)
    }

    /// Get total height of the grid
    pub fn total_height(&self) -> f64 {
        self.row_positions.last().copied().unwrap_or(0.0)
    }

    /// Get column width at index
    pub fn col_width(&self, col: u32) -> f64 {
        self.col_widths.get(col as usize).copied().unwrap_or(0.0)
    }

    /// Get row height at index
    pub fn row_height(&self, row: u32) -> f64 {
        self.row_heights.get(row as usize).copied().unwrap_or(0.0)
    }

    /// Summed width of `span` columns starting at `col`.
    pub fn span_width(&self, col: u32, span: u32) -> f64 {
        let start = col as usize;
        let end = start + span as usize;
        self.col_widths
            .get(start..end.min(self.col_widths.len()))
            .map(|w| w.iter().sum())
            .unwrap_or(0.0)
    }
}

/// Offsets of every boundary: `[0, s0, s0 + s1, ...]`.
fn prefix_sums(sizes: &[f64]) -> Vec<f64> {
    let mut positions = Vec::with_capacity(sizes.len() + 1);
    let mut acc = 0.0;
    positions.push(acc);
    for size in sizes {
        acc += size;
        positions.push(acc);
    }
    positions
}

fn index_at(positions: &[f64], v: f64) -> Option<u32> {
    if positions.len() < 2 {
        return None;
    }
    let idx = match positions
        .binary_search_by(|pos| pos.partial_cmp(&v).unwrap_or(std::cmp::Ordering::Equal))
    {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    };
    // The final edge belongs to the last cell
    let last_cell = positions.len() - 2;
    u32::try_from(idx.min(last_cell)).ok()
}

/// Unscaled auto width of `col`: the widest single-column cell's longest
/// explicit line, clamped to `[BASE_COL_WIDTH, MAX_AUTO_COL_WIDTH]`.
fn auto_column_width(grid: &Grid, col: u32) -> f64 {
    grid.rows()
        .iter()
        .filter_map(|row| row.get(col as usize))
        .filter(|cell| !cell.hidden && cell.col_span == 1)
        .map(|cell| {
            let longest = cell
                .value
                .split('\n')
                .map(|segment| segment.chars().count())
                .max()
                .unwrap_or(0);
            (longest as f64 * COL_CHAR_WIDTH)
                .max(BASE_COL_WIDTH)
                .min(MAX_AUTO_COL_WIDTH)
        })
        .fold(BASE_COL_WIDTH, f64::max)
}

/// Auto height of `row` from the wrapped line count of its single-row cells.
///
/// Cells spanning several rows are left out; their extra height is not
/// distributed over the rows they cover.
fn auto_row_height(grid: &Grid, row: u32, col_widths: &[f64], padding: f64) -> f64 {
    let font_size = font_size_for_row(row);
    let Some(cells) = grid.rows().get(row as usize) else {
        return MIN_AUTO_ROW_HEIGHT;
    };

    let mut max_lines = 1usize;
    for (col, cell) in cells.iter().enumerate() {
        if cell.hidden || cell.row_span != 1 {
            continue;
        }
        let end = (col + cell.col_span as usize).min(col_widths.len());
        let width: f64 = col_widths
            .get(col..end)
            .map(|w| w.iter().sum())
            .unwrap_or(0.0);
        let lines = wrap_text(&cell.value, width - 2.0 * padding, font_size).len();
        max_lines = max_lines.max(lines);
    }

    (max_lines as f64 * font_size * LINE_HEIGHT_FACTOR + 2.0 * padding).max(MIN_AUTO_ROW_HEIGHT)
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
    use crate::types::{Cell, CellPos};

    fn resolve(grid: &Grid) -> GridLayout {
        GridLayout::resolve(
            grid,
            &StyleConfig::default(),
            &SizeOverrides::new(),
            &SizeOverrides::new(),
        )
    }

    #[test]
    fn test_basic_layout() {
        let grid = Grid::from_values(&[vec!["a", "b", "c"], vec!["d", "e", "f"]]);
        let layout = resolve(&grid);

        assert_eq!(layout.col_widths, vec![BASE_COL_WIDTH; 3]);
        assert_eq!(layout.total_width(), BASE_COL_WIDTH * 3.0);
        assert_eq!(layout.col_positions, vec![0.0, 120.0, 240.0, 360.0]);
        // One line: 20 * 1.4 + 24 = 52 for the header, 16 * 1.4 + 24 = 46.4 -> floor 50
        assert!((layout.row_heights[0] - 52.0).abs() < 1e-9);
        assert_eq!(layout.row_heights[1], MIN_AUTO_ROW_HEIGHT);
        assert_eq!(layout.row_positions.len(), 3);
    }

    #[test]
    fn test_long_text_widens_column_up_to_cap() {
        let grid = Grid::from_values(&[
            vec!["x".repeat(20), "y".repeat(100)],
            vec!["short\nlonger line here".to_string(), String::new()],
        ]);
        let layout = resolve(&grid);
        assert_eq!(layout.col_widths[0], 180.0);
        assert_eq!(layout.col_widths[1], MAX_AUTO_COL_WIDTH);
    }

    #[test]
    fn test_width_override_replaces_auto_then_scales() {
        let grid = Grid::from_values(&[vec!["y".repeat(100), "b".to_string()]]);
        let style = StyleConfig {
            width_scale: 2.0,
            ..StyleConfig::default()
        };
        let overrides: SizeOverrides = [(0, 60.0)].into_iter().collect();
        let layout = GridLayout::resolve(&grid, &style, &overrides, &SizeOverrides::new());
        assert_eq!(layout.col_widths, vec![120.0, 240.0]);
    }

    #[test]
    fn test_height_override_is_not_scaled() {
        let grid = Grid::from_values(&[vec!["a"], vec!["b"]]);
        let style = StyleConfig {
            width_scale: 3.0,
            ..StyleConfig::default()
        };
        let overrides: SizeOverrides = [(1, 33.0), (9, 400.0)].into_iter().collect();
        let layout = GridLayout::resolve(&grid, &style, &SizeOverrides::new(), &overrides);
        assert_eq!(layout.row_heights[1], 33.0);
        assert_eq!(layout.row_heights.len(), 2);
    }

    #[test]
    fn test_wrapped_text_grows_row() {
        let text = "one two three four five six seven eight";
        let grid = Grid::from_values(&[vec!["h"], vec![text]]);
        let layout = resolve(&grid);

        // Long text widens its column up to the auto cap before wrapping
        assert_eq!(layout.col_widths[0], MAX_AUTO_COL_WIDTH);
        let padding = StyleConfig::default().padding;
        let lines = wrap_text(text, layout.col_widths[0] - 2.0 * padding, BODY_FONT_SIZE).len();
        assert!(lines > 1);
        let expected = lines as f64 * BODY_FONT_SIZE * LINE_HEIGHT_FACTOR + 2.0 * padding;
        assert!((layout.row_heights[1] - expected.max(MIN_AUTO_ROW_HEIGHT)).abs() < 1e-9);
    }

    #[test]
    fn test_wrapped_text_in_narrow_override_column() {
        let text = "one two three four five six seven eight";
        let grid = Grid::from_values(&[vec!["h"], vec![text]]);
        let widths: SizeOverrides = [(0, 120.0)].into_iter().collect();
        let layout = GridLayout::resolve(
            &grid,
            &StyleConfig::default(),
            &widths,
            &SizeOverrides::new(),
        );

        let padding = StyleConfig::default().padding;
        let lines = wrap_text(text, 120.0 - 2.0 * padding, BODY_FONT_SIZE).len();
        let wide = wrap_text(text, MAX_AUTO_COL_WIDTH - 2.0 * padding, BODY_FONT_SIZE).len();
        assert!(lines > wide);
        let expected = lines as f64 * BODY_FONT_SIZE * LINE_HEIGHT_FACTOR + 2.0 * padding;
        assert!((layout.row_heights[1] - expected.max(MIN_AUTO_ROW_HEIGHT)).abs() < 1e-9);
    }

    #[test]
    fn test_row_spanning_cell_is_ignored_for_height() {
        let mut tall = Cell::new("a b c d e f g h i j k l m n o p q r s t u v w x y z");
        tall.row_span = 2;
        let grid = Grid::new(vec![
            vec![Cell::new("h"), Cell::new("h2")],
            vec![tall, Cell::new("x")],
            vec![Cell::hidden_by(CellPos::new(1, 0)), Cell::new("y")],
        ])
        .unwrap();
        let layout = resolve(&grid);
        assert_eq!(layout.row_heights[1], MIN_AUTO_ROW_HEIGHT);
        assert_eq!(layout.row_heights[2], MIN_AUTO_ROW_HEIGHT);
    }

    #[test]
    fn test_column_spanning_cell_wraps_at_combined_width() {
        let text = "aaaa bbbb cccc dddd eeee";
        let mut wide = Cell::new(text);
        wide.col_span = 2;
        let grid = Grid::new(vec![
            vec![Cell::new("h1"), Cell::new("h2")],
            vec![wide, Cell::hidden_by(CellPos::new(1, 0))],
        ])
        .unwrap();
        let layout = resolve(&grid);
        // Content width is 240 - 2 * 12 = 216px
        let lines = wrap_text(text, 216.0, BODY_FONT_SIZE).len();
        let expected = (lines as f64 * BODY_FONT_SIZE * LINE_HEIGHT_FACTOR + 24.0).max(50.0);
        assert!((layout.row_heights[1] - expected).abs() < 1e-9);
        // Multi-column cells do not widen their column
        assert_eq!(layout.col_widths[0], BASE_COL_WIDTH);
    }

    #[test]
    fn test_merged_cell_rect() {
        let mut owner = Cell::new("m");
        owner.row_span = 2;
        owner.col_span = 2;
        let origin = CellPos::new(0, 0);
        let grid = Grid::new(vec![
            vec![owner, Cell::hidden_by(origin)],
            vec![Cell::hidden_by(origin), Cell::hidden_by(origin)],
        ])
        .unwrap();
        let layout = resolve(&grid);

        let rect = layout.cell_rect(0, 0);
        assert!(!rect.skip);
        assert_eq!(rect.width, layout.total_width());
        assert_eq!(rect.height, layout.total_height());
        assert!(layout.cell_rect(1, 1).skip);
        assert_eq!(layout.cell_at_point(200.0, 70.0), Some(origin));
    }

    #[test]
    fn test_hit_testing() {
        let grid = Grid::from_values(&[vec!["a", "b"], vec!["c", "d"]]);
        let layout = resolve(&grid);

        assert_eq!(layout.col_at_x(0.0), Some(0));
        assert_eq!(layout.col_at_x(119.0), Some(0));
        assert_eq!(layout.col_at_x(120.0), Some(1));
        assert_eq!(layout.col_at_x(240.0), Some(1));
        assert_eq!(layout.row_at_y(60.0), Some(1));
        assert_eq!(layout.cell_at_point(130.0, 10.0), Some(CellPos::new(0, 1)));
        assert_eq!(layout.cell_at_point(-1.0, 10.0), None);
        assert_eq!(layout.cell_at_point(10.0, 1000.0), None);
    }

    #[test]
    fn test_empty_grid_layout() {
        let layout = resolve(&Grid::empty());
        assert!(layout.is_empty());
        assert_eq!(layout.total_width(), 0.0);
        assert_eq!(layout.total_height(), 0.0);
        assert_eq!(layout.col_at_x(0.0), None);
        assert_eq!(layout.cell_at_point(0.0, 0.0), None);
    }

    #[test]
    fn test_empty_cell_counts_as_one_line() {
        let grid = Grid::from_values(&[vec![""], vec![""]]);
        let layout = resolve(&grid);
        assert!((layout.row_heights[0] - 52.0).abs() < 1e-9);
        assert_eq!(layout.row_heights[1], MIN_AUTO_ROW_HEIGHT);
    }
}
