use serde::{Deserialize, Serialize};

use super::CellPos;

/// Rectangular cell range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl CellRange {
    /// Create a range from two corners given in any order.
    pub fn new(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self {
            start_row: start_row.min(end_row),
            start_col: start_col.min(end_col),
            end_row: start_row.max(end_row),
            end_col: start_col.max(end_col),
        }
    }

    /// Range covering a single cell.
    pub fn single(row: u32, col: u32) -> Self {
        Self::new(row, col, row, col)
    }

    /// Range covering an owner's span rectangle.
    pub fn spanning(origin: CellPos, row_span: u32, col_span: u32) -> Self {
        Self::new(
            origin.row,
            origin.col,
            origin.row.saturating_add(row_span.max(1) - 1),
            origin.col.saturating_add(col_span.max(1) - 1),
        )
    }

    pub fn row_count(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    pub fn col_count(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    pub fn intersects(&self, other: &CellRange) -> bool {
        self.start_row <= other.end_row
            && other.start_row <= self.end_row
            && self.start_col <= other.end_col
            && other.start_col <= self.end_col
    }

    /// True if `other` lies entirely inside this range.
    pub fn encloses(&self, other: &CellRange) -> bool {
        self.contains(other.start_row, other.start_col) && self.contains(other.end_row, other.end_col)
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &CellRange) -> Self {
        Self {
            start_row: self.start_row.min(other.start_row),
            start_col: self.start_col.min(other.start_col),
            end_row: self.end_row.max(other.end_row),
            end_col: self.end_col.max(other.end_col),
        }
    }

    pub fn origin(&self) -> CellPos {
        CellPos::new(self.start_row, self.start_col)
    }

    /// Positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = CellPos> + '_ {
        (self.start_row..=self.end_row)
            .flat_map(move |r| (self.start_col..=self.end_col).map(move |c| CellPos::new(r, c)))
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

    #[test]
    fn test_new_normalizes_corners() {
        let range = CellRange::new(3, 4, 1, 0);
        assert_eq!(range, CellRange::new(1, 0, 3, 4));
        assert_eq!(range.row_count(), 3);
        assert_eq!(range.col_count(), 5);
    }

    #[test]
    fn test_positions_are_row_major() {
        let range = CellRange::new(0, 0, 1, 1);
        let positions: Vec<_> = range.positions().collect();
        assert_eq!(
            positions,
            vec![
                CellPos::new(0, 0),
                CellPos::new(0, 1),
                CellPos::new(1, 0),
                CellPos::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_intersects_and_encloses() {
        let outer = CellRange::new(0, 0, 3, 3);
        let inner = CellRange::new(1, 1, 2, 2);
        let straddling = CellRange::new(2, 2, 5, 5);
        let apart = CellRange::new(4, 4, 5, 5);

        assert!(outer.encloses(&inner));
        assert!(outer.intersects(&straddling));
        assert!(!outer.encloses(&straddling));
        assert!(!outer.intersects(&apart));
        assert_eq!(outer.union(&straddling), CellRange::new(0, 0, 5, 5));
    }

    #[test]
    fn test_spanning() {
        let range = CellRange::spanning(CellPos::new(2, 1), 2, 3);
        assert_eq!(range, CellRange::new(2, 1, 3, 3));
        assert!(CellRange::spanning(CellPos::new(0, 0), 1, 1).is_single_cell());
    }
}
