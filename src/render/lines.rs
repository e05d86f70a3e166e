//! Merge-aware grid lines.
//!
//! Every grid line is examined one unit segment at a time. A segment that
//! would cut through a merged cell is dropped; the survivors on the same line
//! are joined into long edges, which are then perturbed into sketch strokes.

use rand::Rng;

use super::rough::{sketch_line, Point, SketchCurve};
use crate::layout::GridLayout;
use crate::types::{Grid, StyleConfig};

/// Width factor of the secondary stroke.
pub const SECONDARY_WIDTH_FACTOR: f64 = 0.5;

/// Opacity of the secondary stroke.
pub const SECONDARY_OPACITY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A drawn edge along one grid line, in grid units.
///
/// For a horizontal segment `line` is the row boundary and `start..end` are
/// column boundaries; for a vertical one the roles swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSegment {
    pub axis: Axis,
    pub line: u32,
    pub start: u32,
    pub end: u32,
}

impl GridSegment {
    /// Pixel endpoints of the segment.
    pub fn endpoints(&self, layout: &GridLayout) -> (Point, Point) {
        let at = |positions: &[f64], idx: u32| positions.get(idx as usize).copied().unwrap_or(0.0);
        match self.axis {
            Axis::Horizontal => {
                let y = at(&layout.row_positions, self.line);
                (
                    Point::new(at(&layout.col_positions, self.start), y),
                    Point::new(at(&layout.col_positions, self.end), y),
                )
            }
            Axis::Vertical => {
                let x = at(&layout.col_positions, self.line);
                (
                    Point::new(x, at(&layout.row_positions, self.start)),
                    Point::new(x, at(&layout.row_positions, self.end)),
                )
            }
        }
    }
}

/// Whether the unit segment on row boundary `row` above column `col` is drawn.
///
/// Outer edges always are. Inner edges are suppressed when the cell above
/// belongs to a merge that continues below the line.
pub fn is_horizontal_boundary(grid: &Grid, row: u32, col: u32) -> bool {
    if row == 0 || row >= grid.row_count() {
        return true;
    }
    match grid.owning_cell(row - 1, col) {
        Some((owner, cell)) => owner.row + cell.row_span <= row,
        None => true,
    }
}

/// Whether the unit segment on column boundary `col` beside row `row` is drawn.
pub fn is_vertical_boundary(grid: &Grid, row: u32, col: u32) -> bool {
    if col == 0 || col >= grid.col_count() {
        return true;
    }
    match grid.owning_cell(row, col - 1) {
        Some((owner, cell)) => owner.col + cell.col_span <= col,
        None => true,
    }
}

/// All drawn edges of `grid`, with adjacent unit segments coalesced.
///
/// Horizontal lines come first (top to bottom), then vertical lines (left to
/// right). An empty grid has no edges.
pub fn boundary_segments(grid: &Grid) -> Vec<GridSegment> {
    let rows = grid.row_count();
    let cols = grid.col_count();
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    for line in 0..=rows {
        coalesce(&mut segments, Axis::Horizontal, line, cols, |c| {
            is_horizontal_boundary(grid, line, c)
        });
    }
    for line in 0..=cols {
        coalesce(&mut segments, Axis::Vertical, line, rows, |r| {
            is_vertical_boundary(grid, r, line)
        });
    }
    segments
}

/// Push one segment per maximal run of drawn units along a line.
fn coalesce(
    out: &mut Vec<GridSegment>,
    axis: Axis,
    line: u32,
    units: u32,
    drawn: impl Fn(u32) -> bool,
) {
    let mut run_start = None;
    for unit in 0..units {
        match (drawn(unit), run_start) {
            (true, None) => run_start = Some(unit),
            (false, Some(start)) => {
                out.push(GridSegment {
                    axis,
                    line,
                    start,
                    end: unit,
                });
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        out.push(GridSegment {
            axis,
            line,
            start,
            end: units,
        });
    }
}

/// One perturbed stroke ready for export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub curve: SketchCurve,
    pub width: f64,
    pub opacity: f64,
}

/// Perturb every drawn edge into strokes.
///
/// Each edge gets a primary stroke; above the double-stroke roughness
/// threshold it gets a second, thinner and fainter one drawn independently.
pub fn sketch_grid_lines<R: Rng + ?Sized>(
    grid: &Grid,
    layout: &GridLayout,
    style: &StyleConfig,
    rng: &mut R,
) -> Vec<Stroke> {
    let segments = boundary_segments(grid);
    let double = style.double_stroke();
    let mut strokes = Vec::with_capacity(segments.len() * if double { 2 } else { 1 });

    for segment in &segments {
        let (a, b) = segment.endpoints(layout);
        strokes.push(Stroke {
            curve: sketch_line(rng, a, b, style.roughness, style.bowing),
            width: style.stroke_width,
            opacity: 1.0,
        });
        if double {
            strokes.push(Stroke {
                curve: sketch_line(rng, a, b, style.roughness, style.bowing),
                width: style.stroke_width * SECONDARY_WIDTH_FACTOR,
                opacity: SECONDARY_OPACITY,
            });
        }
    }
    strokes
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
    use crate::types::{CellRange, SizeOverrides};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid_3x3() -> Grid {
        Grid::from_values(&[
            vec!["a", "b", "c"],
            vec!["d", "e", "f"],
            vec!["g", "h", "i"],
        ])
    }

    #[test]
    fn test_plain_grid_has_full_lines() {
        let segments = boundary_segments(&grid_3x3());
        // 4 horizontal + 4 vertical lines, each a single coalesced edge
        assert_eq!(segments.len(), 8);
        assert!(segments.iter().all(|s| s.start == 0 && s.end == 3));
    }

    #[test]
    fn test_merge_suppresses_interior_lines() {
        let grid = merge_range(&grid_3x3(), CellRange::new(0, 0, 1, 1)).unwrap();
        assert!(!is_horizontal_boundary(&grid, 1, 0));
        assert!(!is_horizontal_boundary(&grid, 1, 1));
        assert!(is_horizontal_boundary(&grid, 1, 2));
        assert!(is_horizontal_boundary(&grid, 2, 0));
        assert!(!is_vertical_boundary(&grid, 0, 1));
        assert!(!is_vertical_boundary(&grid, 1, 1));
        assert!(is_vertical_boundary(&grid, 2, 1));

        let segments = boundary_segments(&grid);
        assert!(segments.contains(&GridSegment {
            axis: Axis::Horizontal,
            line: 1,
            start: 2,
            end: 3,
        }));
        assert!(segments.contains(&GridSegment {
            axis: Axis::Vertical,
            line: 1,
            start: 2,
            end: 3,
        }));
    }

    #[test]
    fn test_outer_edges_always_drawn() {
        let grid = merge_range(&grid_3x3(), CellRange::new(0, 0, 2, 2)).unwrap();
        let segments = boundary_segments(&grid);
        assert_eq!(segments.len(), 4);
    }

    #[test]
    fn test_empty_grid_has_no_segments() {
        assert!(boundary_segments(&Grid::empty()).is_empty());
    }

    #[test]
    fn test_secondary_strokes_follow_roughness() {
        let grid = grid_3x3();
        let overrides = SizeOverrides::new();
        let mut style = StyleConfig::default();
        let layout = GridLayout::resolve(&grid, &style, &overrides, &overrides);
        let mut rng = StdRng::seed_from_u64(1);

        let strokes = sketch_grid_lines(&grid, &layout, &style, &mut rng);
        assert_eq!(strokes.len(), 16);
        assert_eq!(strokes[1].width, style.stroke_width * 0.5);
        assert_eq!(strokes[1].opacity, 0.6);

        style.roughness = 0.0;
        let strokes = sketch_grid_lines(&grid, &layout, &style, &mut rng);
        assert_eq!(strokes.len(), 8);
        assert!(strokes.iter().all(|s| s.opacity == 1.0));
    }

    #[test]
    fn test_endpoints_use_layout_offsets() {
        let grid = grid_3x3();
        let overrides = SizeOverrides::new();
        let layout = GridLayout::resolve(&grid, &StyleConfig::default(), &overrides, &overrides);
        let segment = GridSegment {
            axis: Axis::Vertical,
            line: 3,
            start: 0,
            end: 3,
        };
        let (a, b) = segment.endpoints(&layout);
        assert_eq!(a, Point::new(layout.total_width(), 0.0));
        assert_eq!(b, Point::new(layout.total_width(), layout.total_height()));
    }
}
