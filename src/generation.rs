//! Table generation boundary.
//!
//! A generator turns a natural-language prompt into rows of strings. The
//! service behind it is external; this module only defines the seam, the
//! request status and how a response becomes a [`Grid`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, SketchError};
use crate::types::Grid;

/// Widest table a generator may produce.
pub const MAX_GENERATED_COLS: usize = 6;

/// Tallest table a generator may produce.
pub const MAX_GENERATED_ROWS: usize = 8;

/// Produces table content from a prompt.
pub trait TableGenerator {
    /// Rows of cell texts, header first.
    fn generate(&self, prompt: &str) -> Result<Vec<Vec<String>>>;
}

impl<F> TableGenerator for F
where
    F: Fn(&str) -> Result<Vec<Vec<String>>>,
{
    fn generate(&self, prompt: &str) -> Result<Vec<Vec<String>>> {
        self(prompt)
    }
}

/// State of the most recent generation request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum GenerationStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl GenerationStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Convert a generator response into a fresh grid.
///
/// Responses larger than the limits are truncated with a warning and ragged
/// rows are padded with empty cells. A response with no rows or no columns
/// is an error.
pub fn grid_from_generated(mut rows: Vec<Vec<String>>) -> Result<Grid> {
    if rows.len() > MAX_GENERATED_ROWS {
        tracing::warn!(
            "generated table has {} rows, keeping the first {MAX_GENERATED_ROWS}",
            rows.len()
        );
        rows.truncate(MAX_GENERATED_ROWS);
    }

    let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
    if widest > MAX_GENERATED_COLS {
        tracing::warn!(
            "generated table has {widest} columns, keeping the first {MAX_GENERATED_COLS}"
        );
        for row in &mut rows {
            row.truncate(MAX_GENERATED_COLS);
        }
    }

    if rows.is_empty() || widest == 0 {
        return Err(SketchError::Generation(
            "the generator returned an empty table".into(),
        ));
    }

    Ok(Grid::from_values(&rows))
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

    fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| (*s).to_string()).collect())
            .collect()
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let grid = grid_from_generated(strings(&[&["a", "b", "c"], &["d"]])).unwrap();
        assert_eq!(grid.col_count(), 3);
        assert_eq!(grid.values()[1], vec!["d", "", ""]);
        grid.validate().unwrap();
    }

    #[test]
    fn test_oversized_response_is_truncated() {
        let rows: Vec<Vec<String>> = (0..10)
            .map(|r| (0..9).map(|c| format!("{r}:{c}")).collect())
            .collect();
        let grid = grid_from_generated(rows).unwrap();
        assert_eq!(grid.row_count(), 8);
        assert_eq!(grid.col_count(), 6);
        assert_eq!(grid.cell(7, 5).unwrap().value, "7:5");
    }

    #[test]
    fn test_empty_response_is_an_error() {
        assert!(matches!(
            grid_from_generated(Vec::new()),
            Err(SketchError::Generation(_))
        ));
        assert!(matches!(
            grid_from_generated(vec![Vec::new(), Vec::new()]),
            Err(SketchError::Generation(_))
        ));
    }

    #[test]
    fn test_status_serializes_with_tag() {
        let json = serde_json::to_string(&GenerationStatus::Error("boom".into())).unwrap();
        assert_eq!(json, r#"{"status":"error","message":"boom"}"#);
        let idle = serde_json::to_string(&GenerationStatus::Idle).unwrap();
        assert_eq!(idle, r#"{"status":"idle"}"#);
    }

    #[test]
    fn test_closures_are_generators() {
        let generator =
            |prompt: &str| -> Result<Vec<Vec<String>>> { Ok(vec![vec![prompt.to_uppercase()]]) };
        assert_eq!(generator.generate("hi").unwrap(), vec![vec!["HI".to_string()]]);
    }
}
