//! Structural table mutations.
//!
//! Every operation takes the current grid by reference and returns a new one;
//! the input is never modified. All of them keep the merge invariants: every
//! position stays covered by exactly one visible cell, and every hidden
//! placeholder points at the cell covering it.

use crate::error::{Result, SketchError};
use crate::types::{Cell, CellPos, CellRange, Grid};

/// Smallest width a column can be resized to.
pub const MIN_COLUMN_WIDTH: f64 = 40.0;

/// Smallest height a row can be resized to.
pub const MIN_ROW_HEIGHT: f64 = 30.0;

fn cell_at_mut(rows: &mut [Vec<Cell>], pos: CellPos) -> Option<&mut Cell> {
    rows.get_mut(pos.row as usize)?.get_mut(pos.col as usize)
}

/// Replace the text of the cell covering `(row, col)`.
///
/// Editing a hidden position edits its owner.
pub fn set_cell_value(grid: &Grid, row: u32, col: u32, value: &str) -> Result<Grid> {
    let owner = grid
        .owner_of(row, col)
        .ok_or(SketchError::OutOfBounds { row, col })?;
    let mut next = grid.clone();
    if let Some(cell) = next.cell_mut(owner.row, owner.col) {
        cell.value = value.to_string();
    }
    Ok(next)
}

/// Insert an empty row so that it ends up at index `at` (`0..=row_count`).
///
/// A merge that continues across the insertion point grows by one row.
/// Inserting into the empty grid yields a single empty cell.
pub fn insert_row(grid: &Grid, at: u32) -> Result<Grid> {
    if at > grid.row_count() {
        return Err(SketchError::OutOfBounds { row: at, col: 0 });
    }
    if grid.is_empty() {
        return Ok(Grid::from_values(&[vec![""]]));
    }

    let mut grown: Vec<CellPos> = Vec::new();
    let inserted: Vec<Cell> = (0..grid.col_count())
        .map(|col| {
            let spanning = at
                .checked_sub(1)
                .and_then(|above| grid.owning_cell(above, col))
                .filter(|&(owner, cell)| owner.row + cell.row_span > at);
            match spanning {
                Some((owner, _)) => {
                    if !grown.contains(&owner) {
                        grown.push(owner);
                    }
                    Cell::hidden_by(owner)
                }
                None => Cell::empty(),
            }
        })
        .collect();

    let mut rows = grid.clone().into_rows();
    for cell in rows.iter_mut().flatten() {
        if let Some(owner) = cell.owner.as_mut() {
            if owner.row >= at {
                owner.row += 1;
            }
        }
    }
    // Grown owners sit above the insertion point, so they did not move
    for owner in grown {
        if let Some(cell) = cell_at_mut(&mut rows, owner) {
            cell.row_span += 1;
        }
    }
    rows.insert(at as usize, inserted);

    Ok(Grid::from_rows_unchecked(rows))
}

/// Insert an empty column so that it ends up at index `at` (`0..=col_count`).
pub fn insert_column(grid: &Grid, at: u32) -> Result<Grid> {
    if at > grid.col_count() {
        return Err(SketchError::OutOfBounds { row: 0, col: at });
    }
    Ok(insert_row(&grid.transposed(), at)?.transposed())
}

/// Remove row `at`.
///
/// Merges passing through the row shrink by one. When the removed row holds
/// a merge's owner, the position below it inherits the owner's id and text.
/// Removing the last row leaves the empty grid.
pub fn remove_row(grid: &Grid, at: u32) -> Result<Grid> {
    if at >= grid.row_count() {
        return Err(SketchError::OutOfBounds { row: at, col: 0 });
    }

    let mut rows = grid.clone().into_rows();
    for (owner, cell) in grid.visible_cells().filter(|(_, c)| c.row_span > 1) {
        let last = owner.row + cell.row_span - 1;
        if at < owner.row || at > last {
            continue;
        }
        if owner.row < at {
            if let Some(shrunk) = cell_at_mut(&mut rows, owner) {
                shrunk.row_span -= 1;
            }
        } else if let Some(heir) = cell_at_mut(&mut rows, CellPos::new(at + 1, owner.col)) {
            heir.reveal();
            heir.id = cell.id;
            heir.value.clone_from(&cell.value);
            heir.row_span = cell.row_span - 1;
            heir.col_span = cell.col_span;
        }
    }

    // Owners in row `at` were handed to row `at + 1`, which now takes index `at`
    for cell in rows.iter_mut().flatten() {
        if let Some(owner) = cell.owner.as_mut() {
            if owner.row > at {
                owner.row -= 1;
            }
        }
    }
    rows.remove(at as usize);

    Ok(Grid::from_rows_unchecked(rows))
}

/// Remove column `at`. Removing the last column leaves the empty grid.
pub fn remove_column(grid: &Grid, at: u32) -> Result<Grid> {
    if at >= grid.col_count() {
        return Err(SketchError::OutOfBounds { row: 0, col: at });
    }
    Ok(remove_row(&grid.transposed(), at)?.transposed())
}

/// Grow `range` until it fully contains every merge it touches.
pub fn expand_to_merges(grid: &Grid, mut range: CellRange) -> CellRange {
    loop {
        let grown = range
            .positions()
            .filter_map(|p| grid.covering_range(p.row, p.col))
            .fold(range, |acc, covered| acc.union(&covered));
        if grown == range {
            return range;
        }
        range = grown;
    }
}

/// Merge the selected rectangle into one cell.
///
/// The selection corners may come in any order; the selection is grown to
/// contain any merge it partially covers. Non-empty texts are joined with
/// `\n` in row-major order into the top-left cell. A 1x1 selection changes
/// nothing.
pub fn merge_range(grid: &Grid, selection: CellRange) -> Result<Grid> {
    let range = CellRange::new(
        selection.start_row,
        selection.start_col,
        selection.end_row,
        selection.end_col,
    );
    if range.end_row >= grid.row_count() || range.end_col >= grid.col_count() {
        return Err(SketchError::OutOfBounds {
            row: range.end_row,
            col: range.end_col,
        });
    }
    if range.is_single_cell() {
        return Ok(grid.clone());
    }

    let range = expand_to_merges(grid, range);
    let origin = range.origin();
    let mut text = range
        .positions()
        .filter_map(|p| grid.cell(p.row, p.col))
        .filter(|c| !c.hidden && !c.value.is_empty())
        .map(|c| c.value.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut next = grid.clone();
    for pos in range.positions() {
        let Some(cell) = next.cell_mut(pos.row, pos.col) else {
            continue;
        };
        if pos == origin {
            cell.reveal();
            cell.value = std::mem::take(&mut text);
            cell.row_span = range.row_count();
            cell.col_span = range.col_count();
        } else {
            cell.hide(origin);
        }
    }

    tracing::debug!(
        "merged {}x{} cells at ({}, {})",
        range.row_count(),
        range.col_count(),
        origin.row,
        origin.col
    );
    Ok(next)
}

/// Split the merge covering `(row, col)` back into 1x1 cells.
///
/// The owner keeps the combined text; the freed positions come back empty.
/// Unmerging a cell that is not merged changes nothing.
pub fn unmerge(grid: &Grid, row: u32, col: u32) -> Result<Grid> {
    let range = grid
        .covering_range(row, col)
        .ok_or(SketchError::OutOfBounds { row, col })?;
    if range.is_single_cell() {
        return Ok(grid.clone());
    }

    let mut next = grid.clone();
    for pos in range.positions() {
        if let Some(cell) = next.cell_mut(pos.row, pos.col) {
            cell.reveal();
        }
    }
    Ok(next)
}

/// Clamp a requested column width to [`MIN_COLUMN_WIDTH`].
pub fn clamp_column_width(width: f64) -> f64 {
    if width.is_finite() {
        width.max(MIN_COLUMN_WIDTH)
    } else {
        MIN_COLUMN_WIDTH
    }
}

/// Clamp a requested row height to [`MIN_ROW_HEIGHT`].
pub fn clamp_row_height(height: f64) -> f64 {
    if height.is_finite() {
        height.max(MIN_ROW_HEIGHT)
    } else {
        MIN_ROW_HEIGHT
    }
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

    fn abcd() -> Grid {
        Grid::from_values(&[vec!["A", "B"], vec!["C", "D"]])
    }

    fn grid_3x3() -> Grid {
        Grid::from_values(&[
            vec!["a", "b", "c"],
            vec!["d", "e", "f"],
            vec!["g", "h", "i"],
        ])
    }

    #[test]
    fn test_merge_2x2_joins_text() {
        let merged = merge_range(&abcd(), CellRange::new(0, 0, 1, 1)).unwrap();
        merged.validate().unwrap();
        let owner = merged.cell(0, 0).unwrap();
        assert_eq!(owner.value, "A\nB\nC\nD");
        assert_eq!((owner.row_span, owner.col_span), (2, 2));
        for (r, c) in [(0, 1), (1, 0), (1, 1)] {
            let cell = merged.cell(r, c).unwrap();
            assert!(cell.hidden);
            assert_eq!(cell.owner, Some(CellPos::new(0, 0)));
        }
    }

    #[test]
    fn test_merge_corners_in_any_order() {
        let a = merge_range(&abcd(), CellRange::new(0, 0, 1, 1)).unwrap();
        let b = merge_range(&abcd(), CellRange::new(1, 1, 0, 0)).unwrap();
        assert_eq!(a.cell(0, 0).unwrap().value, b.cell(0, 0).unwrap().value);
    }

    #[test]
    fn test_merge_skips_empty_text() {
        let grid = Grid::from_values(&[vec!["A", ""], vec!["", "D"]]);
        let merged = merge_range(&grid, CellRange::new(0, 0, 1, 1)).unwrap();
        assert_eq!(merged.cell(0, 0).unwrap().value, "A\nD");
    }

    #[test]
    fn test_single_cell_merge_is_noop() {
        let grid = abcd();
        assert_eq!(merge_range(&grid, CellRange::single(1, 1)).unwrap(), grid);
    }

    #[test]
    fn test_merge_grows_over_touched_merge() {
        let grid = merge_range(&grid_3x3(), CellRange::new(1, 1, 2, 2)).unwrap();
        // Touches the bottom-right merge only at (1, 1)
        let merged = merge_range(&grid, CellRange::new(0, 0, 1, 1)).unwrap();
        merged.validate().unwrap();
        let owner = merged.cell(0, 0).unwrap();
        assert_eq!((owner.row_span, owner.col_span), (3, 3));
    }

    #[test]
    fn test_merge_out_of_bounds() {
        let err = merge_range(&abcd(), CellRange::new(0, 0, 2, 1)).unwrap_err();
        assert!(matches!(err, SketchError::OutOfBounds { row: 2, col: 1 }));
    }

    #[test]
    fn test_unmerge_restores_unit_cells() {
        let merged = merge_range(&abcd(), CellRange::new(0, 0, 1, 1)).unwrap();
        let split = unmerge(&merged, 1, 1).unwrap();
        split.validate().unwrap();
        for pos in CellRange::new(0, 0, 1, 1).positions() {
            let cell = split.cell(pos.row, pos.col).unwrap();
            assert!(!cell.hidden);
            assert_eq!((cell.row_span, cell.col_span), (1, 1));
            assert_eq!(cell.owner, None);
        }
        assert_eq!(split.cell(0, 0).unwrap().value, "A\nB\nC\nD");
        assert_eq!(split.cell(1, 1).unwrap().value, "");
    }

    #[test]
    fn test_edit_hidden_edits_owner() {
        let merged = merge_range(&abcd(), CellRange::new(0, 0, 0, 1)).unwrap();
        let edited = set_cell_value(&merged, 0, 1, "AB").unwrap();
        assert_eq!(edited.cell(0, 0).unwrap().value, "AB");
        assert_eq!(edited.cell(0, 1).unwrap().value, "");
        assert!(matches!(
            set_cell_value(&merged, 5, 0, "x"),
            Err(SketchError::OutOfBounds { row: 5, col: 0 })
        ));
    }

    #[test]
    fn test_insert_row_grows_crossing_merge() {
        let grid = merge_range(&grid_3x3(), CellRange::new(0, 0, 1, 0)).unwrap();
        let inserted = insert_row(&grid, 1).unwrap();
        inserted.validate().unwrap();
        assert_eq!(inserted.row_count(), 4);
        assert_eq!(inserted.cell(0, 0).unwrap().row_span, 3);
        assert!(inserted.cell(1, 0).unwrap().hidden);
        assert!(!inserted.cell(1, 1).unwrap().hidden);
        assert_eq!(inserted.cell(2, 0).unwrap().owner, Some(CellPos::new(0, 0)));
    }

    #[test]
    fn test_insert_row_above_merge_shifts_it() {
        let grid = merge_range(&grid_3x3(), CellRange::new(1, 0, 2, 0)).unwrap();
        let inserted = insert_row(&grid, 0).unwrap();
        inserted.validate().unwrap();
        assert_eq!(inserted.cell(2, 0).unwrap().row_span, 2);
        assert_eq!(inserted.cell(3, 0).unwrap().owner, Some(CellPos::new(2, 0)));
    }

    #[test]
    fn test_insert_into_empty_grid() {
        let grid = insert_column(&Grid::empty(), 0).unwrap();
        assert_eq!((grid.row_count(), grid.col_count()), (1, 1));
        assert!(insert_row(&Grid::empty(), 1).is_err());
    }

    #[test]
    fn test_remove_row_through_merge_shrinks_it() {
        let grid = merge_range(&grid_3x3(), CellRange::new(0, 0, 2, 1)).unwrap();
        let removed = remove_row(&grid, 1).unwrap();
        removed.validate().unwrap();
        assert_eq!(removed.row_count(), 2);
        assert_eq!(removed.cell(0, 0).unwrap().row_span, 2);
    }

    #[test]
    fn test_remove_owner_row_hands_over() {
        let grid = merge_range(&grid_3x3(), CellRange::new(0, 1, 1, 2)).unwrap();
        let owner_id = grid.cell(0, 1).unwrap().id;
        let removed = remove_row(&grid, 0).unwrap();
        removed.validate().unwrap();
        let heir = removed.cell(0, 1).unwrap();
        assert_eq!(heir.id, owner_id);
        assert_eq!(heir.value, "b\nc\ne\nf");
        assert_eq!((heir.row_span, heir.col_span), (1, 2));
        assert_eq!(removed.cell(0, 2).unwrap().owner, Some(CellPos::new(0, 1)));
    }

    #[test]
    fn test_remove_column_hands_over() {
        let grid = merge_range(&grid_3x3(), CellRange::new(1, 0, 2, 1)).unwrap();
        let removed = remove_column(&grid, 0).unwrap();
        removed.validate().unwrap();
        assert_eq!(removed.col_count(), 2);
        let heir = removed.cell(1, 0).unwrap();
        assert_eq!((heir.row_span, heir.col_span), (2, 1));
        assert_eq!(heir.value, "d\ne\ng\nh");
        assert_eq!(removed.cell(2, 0).unwrap().owner, Some(CellPos::new(1, 0)));
    }

    #[test]
    fn test_remove_last_row_and_column() {
        let one = Grid::from_values(&[vec!["x"]]);
        assert!(remove_row(&one, 0).unwrap().is_empty());
        assert!(remove_column(&one, 0).unwrap().is_empty());
        assert!(matches!(
            remove_column(&one, 1),
            Err(SketchError::OutOfBounds { row: 0, col: 1 })
        ));
    }

    #[test]
    fn test_input_grid_is_untouched() {
        let grid = abcd();
        let before = grid.clone();
        let _ = merge_range(&grid, CellRange::new(0, 0, 1, 1)).unwrap();
        let _ = remove_row(&grid, 0).unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn test_resize_clamps() {
        let cases = [
            (10.0, MIN_COLUMN_WIDTH, MIN_ROW_HEIGHT),
            (35.0, MIN_COLUMN_WIDTH, 35.0),
            (80.0, 80.0, 80.0),
            (f64::NAN, MIN_COLUMN_WIDTH, MIN_ROW_HEIGHT),
        ];
        for (requested, width, height) in cases {
            assert_eq!(clamp_column_width(requested), width);
            assert_eq!(clamp_row_height(requested), height);
        }
    }
}
