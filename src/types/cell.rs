use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of a cell, unique within a grid's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(Uuid);

impl CellId {
    /// Generate a fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CellId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A (row, col) grid coordinate, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: u32,
    pub col: u32,
}

impl CellPos {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// A single table cell.
///
/// A visible cell owns the rectangle `row_span x col_span` starting at its own
/// position. Every other position in that rectangle holds a hidden placeholder
/// whose `owner` points back at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub id: CellId,
    /// Display text; `\n` marks an explicit line break
    #[serde(default)]
    pub value: String,
    #[serde(default = "one")]
    pub row_span: u32,
    #[serde(default = "one")]
    pub col_span: u32,
    #[serde(default)]
    pub hidden: bool,
    /// Owning cell of a hidden placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<CellPos>,
}

fn one() -> u32 {
    1
}

impl Cell {
    /// Create a visible 1x1 cell with the given text.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: CellId::new(),
            value: value.into(),
            row_span: 1,
            col_span: 1,
            hidden: false,
            owner: None,
        }
    }

    /// Create a visible, empty 1x1 cell.
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// Create a hidden placeholder covered by the cell at `owner`.
    pub fn hidden_by(owner: CellPos) -> Self {
        let mut cell = Self::empty();
        cell.hide(owner);
        cell
    }

    /// True if this visible cell spans more than one grid position.
    pub fn is_merged(&self) -> bool {
        !self.hidden && (self.row_span > 1 || self.col_span > 1)
    }

    /// Turn this cell into a placeholder owned by `owner`, keeping its id.
    pub(crate) fn hide(&mut self, owner: CellPos) {
        self.value.clear();
        self.row_span = 1;
        self.col_span = 1;
        self.hidden = true;
        self.owner = Some(owner);
    }

    /// Make this cell a visible 1x1 cell again, keeping its id and text.
    pub(crate) fn reveal(&mut self) {
        self.row_span = 1;
        self.col_span = 1;
        self.hidden = false;
        self.owner = None;
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
    fn test_new_cells_get_distinct_ids() {
        let a = Cell::new("a");
        let b = Cell::new("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_hidden_by_clears_content() {
        let cell = Cell::hidden_by(CellPos::new(0, 1));
        assert!(cell.hidden);
        assert!(cell.value.is_empty());
        assert_eq!(cell.owner, Some(CellPos::new(0, 1)));
        assert_eq!((cell.row_span, cell.col_span), (1, 1));
        assert!(!cell.is_merged());
    }

    #[test]
    fn test_serde_uses_camel_case_spans() {
        let mut cell = Cell::new("x");
        cell.col_span = 2;
        let json = serde_json::to_string(&cell).unwrap();
        assert!(json.contains("\"colSpan\":2"));
        assert!(json.contains("\"rowSpan\":1"));
        assert!(!json.contains("owner"));
    }

    #[test]
    fn test_deserialize_defaults_spans() {
        let id = CellId::new();
        let json = format!(r#"{{"id":"{id}","value":"hi"}}"#);
        let cell: Cell = serde_json::from_str(&json).unwrap();
        assert_eq!(cell.id, id);
        assert_eq!((cell.row_span, cell.col_span), (1, 1));
        assert!(!cell.hidden);
    }
}
