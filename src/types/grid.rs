use serde::{Deserialize, Serialize};

use super::{Cell, CellId, CellPos, CellRange};
use crate::error::{Result, SketchError};

/// A rectangular table of cells.
///
/// Grids are values: every structural edit produces a new `Grid` (see
/// [`crate::editor::mutation`]), so two snapshots can be compared with `==`.
/// A grid with no rows is the valid *empty* state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

/// Saturating `usize -> u32` for row/column counts.
pub(crate) fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl Grid {
    /// Build a grid from rows of cells, checking every invariant.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidGrid`] if the rows are ragged or the
    /// merge/hidden relationships are inconsistent.
    pub fn new(rows: Vec<Vec<Cell>>) -> Result<Self> {
        let grid = Self::from_rows_unchecked(rows);
        grid.validate()?;
        Ok(grid)
    }

    /// Build a grid whose invariants the caller already upholds.
    pub(crate) fn from_rows_unchecked(mut rows: Vec<Vec<Cell>>) -> Self {
        if rows.iter().all(Vec::is_empty) {
            rows.clear();
        }
        Self { rows }
    }

    /// The empty grid (no rows, no columns).
    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    /// Build a grid of fresh 1x1 cells from plain strings.
    ///
    /// Ragged input is padded with empty cells to the widest row.
    pub fn from_values<S: AsRef<str>>(values: &[Vec<S>]) -> Self {
        let width = values.iter().map(Vec::len).max().unwrap_or(0);
        let rows = values
            .iter()
            .map(|row| {
                let mut cells: Vec<Cell> = row.iter().map(|v| Cell::new(v.as_ref())).collect();
                cells.resize_with(width, Cell::empty);
                cells
            })
            .collect();
        Self::from_rows_unchecked(rows)
    }

    /// The table shown before the user has built anything.
    pub fn sample() -> Self {
        Self::from_values(&[
            vec!["Plan", "Price", "Storage", "Support"],
            vec!["Starter", "$0", "5 GB", "Community"],
            vec!["Pro", "$12 / month", "100 GB", "Email"],
            vec!["Team", "$30 / month", "1 TB", "Priority\n24/7"],
        ])
    }

    /// Parse a JSON snapshot and validate it.
    ///
    /// # Errors
    /// Returns [`SketchError::Snapshot`] for malformed JSON and
    /// [`SketchError::InvalidGrid`] for inconsistent content.
    pub fn from_json(json: &str) -> Result<Self> {
        let grid: Grid = serde_json::from_str(json)?;
        let grid = Self::from_rows_unchecked(grid.rows);
        grid.validate()?;
        Ok(grid)
    }

    /// Serialize to a JSON snapshot.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> u32 {
        count_u32(self.rows.len())
    }

    pub fn col_count(&self) -> u32 {
        self.rows.first().map(|r| count_u32(r.len())).unwrap_or(0)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub(crate) fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.rows.get(row as usize)?.get(col as usize)
    }

    pub(crate) fn cell_mut(&mut self, row: u32, col: u32) -> Option<&mut Cell> {
        self.rows.get_mut(row as usize)?.get_mut(col as usize)
    }

    /// Position of the cell that owns `(row, col)`: itself when visible,
    /// its back-reference when hidden.
    pub fn owner_of(&self, row: u32, col: u32) -> Option<CellPos> {
        let cell = self.cell(row, col)?;
        if cell.hidden {
            cell.owner
        } else {
            Some(CellPos::new(row, col))
        }
    }

    /// The visible cell covering `(row, col)` together with its position.
    pub fn owning_cell(&self, row: u32, col: u32) -> Option<(CellPos, &Cell)> {
        let pos = self.owner_of(row, col)?;
        let cell = self.cell(pos.row, pos.col)?;
        (!cell.hidden).then_some((pos, cell))
    }

    /// Span rectangle of the cell covering `(row, col)`.
    pub fn covering_range(&self, row: u32, col: u32) -> Option<CellRange> {
        let (pos, cell) = self.owning_cell(row, col)?;
        Some(CellRange::spanning(pos, cell.row_span, cell.col_span))
    }

    /// Visible cells in row-major order.
    pub fn visible_cells(&self) -> impl Iterator<Item = (CellPos, &Cell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| !cell.hidden)
                .map(move |(c, cell)| (CellPos::new(count_u32(r), count_u32(c)), cell))
        })
    }

    /// Span rectangles of every merged (multi-position) cell.
    pub fn merged_regions(&self) -> Vec<CellRange> {
        self.visible_cells()
            .filter(|(_, cell)| cell.is_merged())
            .map(|(pos, cell)| CellRange::spanning(pos, cell.row_span, cell.col_span))
            .collect()
    }

    /// Locate a cell by identity.
    pub fn find(&self, id: CellId) -> Option<CellPos> {
        self.rows.iter().enumerate().find_map(|(r, row)| {
            row.iter()
                .position(|cell| cell.id == id)
                .map(|c| CellPos::new(count_u32(r), count_u32(c)))
        })
    }

    /// Plain display values (hidden positions are empty strings).
    pub fn values(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.value.clone()).collect())
            .collect()
    }

    /// Check the rectangular shape and the merge/hidden invariants.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidGrid`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let rows = self.rows.len();
        let cols = self.rows.first().map(Vec::len).unwrap_or(0);

        if let Some(bad) = self.rows.iter().position(|r| r.len() != cols) {
            return Err(SketchError::InvalidGrid(format!(
                "row {bad} has a different cell count than row 0 ({cols})"
            )));
        }

        // Which owner covers each position
        let mut cover: Vec<Option<CellPos>> = vec![None; rows * cols];
        for (pos, cell) in self.visible_cells() {
            if cell.row_span == 0 || cell.col_span == 0 {
                return Err(SketchError::InvalidGrid(format!(
                    "cell ({}, {}) has a zero span",
                    pos.row, pos.col
                )));
            }
            let range = CellRange::spanning(pos, cell.row_span, cell.col_span);
            if range.end_row as usize >= rows || range.end_col as usize >= cols {
                return Err(SketchError::InvalidGrid(format!(
                    "cell ({}, {}) spans past the grid edge",
                    pos.row, pos.col
                )));
            }
            for covered in range.positions() {
                let idx = covered.row as usize * cols + covered.col as usize;
                let Some(slot) = cover.get_mut(idx) else {
                    continue;
                };
                if slot.is_some() {
                    return Err(SketchError::InvalidGrid(format!(
                        "position ({}, {}) is covered by more than one cell",
                        covered.row, covered.col
                    )));
                }
                *slot = Some(pos);
            }
        }

        let mut seen_ids = std::collections::HashSet::new();
        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let here = CellPos::new(count_u32(r), count_u32(c));
                if !seen_ids.insert(cell.id) {
                    return Err(SketchError::InvalidGrid(format!(
                        "duplicate cell id {} at ({r}, {c})",
                        cell.id
                    )));
                }
                let covered_by = cover.get(r * cols + c).copied().flatten();
                if cell.hidden {
                    if cell.row_span != 1 || cell.col_span != 1 || !cell.value.is_empty() {
                        return Err(SketchError::InvalidGrid(format!(
                            "hidden cell ({r}, {c}) must be an empty 1x1 placeholder"
                        )));
                    }
                    if cell.owner.is_none() || cell.owner != covered_by {
                        return Err(SketchError::InvalidGrid(format!(
                            "hidden cell ({r}, {c}) does not point at the cell covering it"
                        )));
                    }
                } else if covered_by != Some(here) {
                    return Err(SketchError::InvalidGrid(format!(
                        "visible cell ({r}, {c}) lies inside another cell's span"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Swap rows and columns, including spans and owner references.
    ///
    /// Column operations are implemented as row operations on the transpose.
    pub(crate) fn transposed(&self) -> Self {
        let cols = self.col_count() as usize;
        let mut out: Vec<Vec<Cell>> = (0..cols).map(|_| Vec::with_capacity(self.rows.len())).collect();
        for row in &self.rows {
            for (c, cell) in row.iter().enumerate() {
                let mut flipped = cell.clone();
                std::mem::swap(&mut flipped.row_span, &mut flipped.col_span);
                flipped.owner = cell.owner.map(|o| CellPos::new(o.col, o.row));
                if let Some(column) = out.get_mut(c) {
                    column.push(flipped);
                }
            }
        }
        Self::from_rows_unchecked(out)
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

    fn merged_2x2() -> Grid {
        let mut owner = Cell::new("AB");
        owner.row_span = 2;
        owner.col_span = 2;
        let origin = CellPos::new(0, 0);
        Grid::new(vec![
            vec![owner, Cell::hidden_by(origin), Cell::new("x")],
            vec![Cell::hidden_by(origin), Cell::hidden_by(origin), Cell::new("y")],
        ])
        .unwrap()
    }

    #[test]
    fn test_sample_is_valid() {
        let grid = Grid::sample();
        assert!(grid.validate().is_ok());
        assert_eq!(grid.row_count(), 4);
        assert_eq!(grid.col_count(), 4);
        assert!(!grid.is_empty());
    }

    #[test]
    fn test_from_values_pads_ragged_rows() {
        let grid = Grid::from_values(&[vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(grid.col_count(), 3);
        assert_eq!(grid.cell(1, 2).unwrap().value, "");
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_empty_grid() {
        let grid = Grid::from_values::<&str>(&[vec![], vec![]]);
        assert!(grid.is_empty());
        assert_eq!(grid.row_count(), 0);
        assert_eq!(grid.col_count(), 0);
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_owner_resolution() {
        let grid = merged_2x2();
        assert_eq!(grid.owner_of(1, 1), Some(CellPos::new(0, 0)));
        assert_eq!(grid.owner_of(1, 2), Some(CellPos::new(1, 2)));
        let (pos, cell) = grid.owning_cell(1, 0).unwrap();
        assert_eq!(pos, CellPos::new(0, 0));
        assert_eq!(cell.value, "AB");
        assert_eq!(grid.covering_range(0, 1), Some(CellRange::new(0, 0, 1, 1)));
        assert_eq!(grid.merged_regions(), vec![CellRange::new(0, 0, 1, 1)]);
        assert_eq!(grid.visible_cells().count(), 3);
    }

    #[test]
    fn test_validate_rejects_ragged() {
        let err = Grid::new(vec![vec![Cell::new("a"), Cell::new("b")], vec![Cell::new("c")]]);
        assert!(matches!(err, Err(SketchError::InvalidGrid(_))));
    }

    #[test]
    fn test_validate_rejects_span_past_edge() {
        let mut wide = Cell::new("wide");
        wide.col_span = 3;
        let err = Grid::new(vec![vec![wide, Cell::hidden_by(CellPos::new(0, 0))]]);
        assert!(matches!(err, Err(SketchError::InvalidGrid(_))));
    }

    #[test]
    fn test_validate_rejects_orphan_hidden_cell() {
        let err = Grid::new(vec![vec![Cell::new("a"), Cell::hidden_by(CellPos::new(0, 0))]]);
        assert!(matches!(err, Err(SketchError::InvalidGrid(_))));
    }

    #[test]
    fn test_validate_rejects_uncovered_visible_inside_span() {
        let mut owner = Cell::new("a");
        owner.col_span = 2;
        let err = Grid::new(vec![vec![owner, Cell::new("b")]]);
        assert!(matches!(err, Err(SketchError::InvalidGrid(_))));
    }

    #[test]
    fn test_json_roundtrip_preserves_merge() {
        let grid = merged_2x2();
        let json = grid.to_json().unwrap();
        let restored = Grid::from_json(&json).unwrap();
        assert_eq!(restored, grid);
    }

    #[test]
    fn test_from_json_rejects_inconsistent_snapshot() {
        let mut grid = merged_2x2();
        grid.cell_mut(1, 1).unwrap().owner = Some(CellPos::new(0, 2));
        let json = serde_json::to_string(&grid).unwrap();
        assert!(matches!(
            Grid::from_json(&json),
            Err(SketchError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_transposed_swaps_spans_and_owners() {
        let mut owner = Cell::new("tall");
        owner.col_span = 2;
        let grid = Grid::new(vec![
            vec![owner, Cell::hidden_by(CellPos::new(0, 0))],
            vec![Cell::new("a"), Cell::new("b")],
        ])
        .unwrap();

        let t = grid.transposed();
        assert!(t.validate().is_ok());
        assert_eq!(t.cell(0, 0).unwrap().row_span, 2);
        assert_eq!(t.cell(1, 0).unwrap().owner, Some(CellPos::new(0, 0)));
        assert_eq!(t.cell(0, 1).unwrap().value, "a");
        assert_eq!(t.transposed(), grid);
    }

    #[test]
    fn test_find_by_id() {
        let grid = Grid::sample();
        let id = grid.cell(2, 3).unwrap().id;
        assert_eq!(grid.find(id), Some(CellPos::new(2, 3)));
    }
}
