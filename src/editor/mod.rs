//! Table editing session.
//!
//! `TableEditor` holds the current snapshot (grid, style, size overrides and
//! generation status) and adds:
//! - Structural edits that keep size overrides attached to their row/column
//! - Resizing with minimum sizes
//! - Rendering and export of the current snapshot
//! - Table generation through a [`TableGenerator`]
//! - Persistence through a [`SnapshotStore`]

pub mod mutation;

use rand::Rng;

use crate::error::{Result, SketchError};
use crate::export::{self, ExportOptions};
use crate::generation::{grid_from_generated, GenerationStatus, TableGenerator};
use crate::layout::GridLayout;
use crate::persistence::{
    self, SnapshotStore, COL_WIDTHS_KEY, GRID_KEY, ROW_HEIGHTS_KEY, STYLE_KEY,
};
use crate::render::{render_scene, RenderParams, Scene};
use crate::types::{CellPos, CellRange, Grid, SizeOverrides, StyleConfig};

/// The editable state behind one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEditor {
    grid: Grid,
    style: StyleConfig,
    col_widths: SizeOverrides,
    row_heights: SizeOverrides,
    status: GenerationStatus,
}

impl Default for TableEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl TableEditor {
    /// Start from the sample table with the default style.
    pub fn new() -> Self {
        Self::with_grid(Grid::sample())
    }

    pub fn with_grid(grid: Grid) -> Self {
        Self {
            grid,
            style: StyleConfig::default(),
            col_widths: SizeOverrides::new(),
            row_heights: SizeOverrides::new(),
            status: GenerationStatus::Idle,
        }
    }

    /// Restore the last persisted session.
    ///
    /// Missing or broken snapshots fall back to their defaults independently.
    /// Restored sizes are raised to the same minimums as interactive resizing.
    pub fn restore<S: SnapshotStore + ?Sized>(store: &S) -> Self {
        let col_widths: SizeOverrides = persistence::load_or_default(store, COL_WIDTHS_KEY);
        let row_heights: SizeOverrides = persistence::load_or_default(store, ROW_HEIGHTS_KEY);
        Self {
            grid: persistence::load_grid(store),
            style: persistence::load_or_default(store, STYLE_KEY),
            col_widths: col_widths.clamped("column width", mutation::clamp_column_width),
            row_heights: row_heights.clamped("row height", mutation::clamp_row_height),
            status: GenerationStatus::Idle,
        }
    }

    /// Write grid, style and overrides as separate snapshots.
    pub fn persist<S: SnapshotStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        store.save(GRID_KEY, &self.grid.to_json()?)?;
        store.save(STYLE_KEY, &serde_json::to_string(&self.style)?)?;
        store.save(COL_WIDTHS_KEY, &serde_json::to_string(&self.col_widths)?)?;
        store.save(ROW_HEIGHTS_KEY, &serde_json::to_string(&self.row_heights)?)?;
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn col_widths(&self) -> &SizeOverrides {
        &self.col_widths
    }

    pub fn row_heights(&self) -> &SizeOverrides {
        &self.row_heights
    }

    pub fn status(&self) -> &GenerationStatus {
        &self.status
    }

    /// Replace the whole grid (size overrides are kept).
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidGrid`] if `grid` breaks the merge
    /// invariants; the current grid is kept.
    pub fn replace_grid(&mut self, grid: Grid) -> Result<()> {
        grid.validate()?;
        self.grid = grid;
        Ok(())
    }

    /// Replace the style wholesale.
    pub fn set_style(&mut self, style: StyleConfig) {
        self.style = style;
    }

    // ---- Structural edits ----

    pub fn set_cell_value(&mut self, row: u32, col: u32, value: &str) -> Result<()> {
        self.grid = mutation::set_cell_value(&self.grid, row, col, value)?;
        Ok(())
    }

    pub fn insert_row(&mut self, at: u32) -> Result<()> {
        self.grid = mutation::insert_row(&self.grid, at)?;
        self.row_heights = self.row_heights.with_inserted_index(at);
        Ok(())
    }

    pub fn insert_column(&mut self, at: u32) -> Result<()> {
        self.grid = mutation::insert_column(&self.grid, at)?;
        self.col_widths = self.col_widths.with_inserted_index(at);
        Ok(())
    }

    pub fn remove_row(&mut self, at: u32) -> Result<()> {
        self.grid = mutation::remove_row(&self.grid, at)?;
        self.row_heights = self.row_heights.without_index(at);
        Ok(())
    }

    pub fn remove_column(&mut self, at: u32) -> Result<()> {
        self.grid = mutation::remove_column(&self.grid, at)?;
        self.col_widths = self.col_widths.without_index(at);
        Ok(())
    }

    pub fn merge(&mut self, selection: CellRange) -> Result<()> {
        self.grid = mutation::merge_range(&self.grid, selection)?;
        Ok(())
    }

    pub fn unmerge(&mut self, row: u32, col: u32) -> Result<()> {
        self.grid = mutation::unmerge(&self.grid, row, col)?;
        Ok(())
    }

    /// Override a column's width (before `width_scale`), clamped to the
    /// minimum. Returns the stored width.
    pub fn resize_column(&mut self, col: u32, width: f64) -> Result<f64> {
        if col >= self.grid.col_count() {
            return Err(SketchError::OutOfBounds { row: 0, col });
        }
        let width = mutation::clamp_column_width(width);
        self.col_widths.set(col, width);
        Ok(width)
    }

    /// Override a row's height, clamped to the minimum. Returns the stored
    /// height.
    pub fn resize_row(&mut self, row: u32, height: f64) -> Result<f64> {
        if row >= self.grid.row_count() {
            return Err(SketchError::OutOfBounds { row, col: 0 });
        }
        let height = mutation::clamp_row_height(height);
        self.row_heights.set(row, height);
        Ok(height)
    }

    /// Drop every size override.
    pub fn reset_sizes(&mut self) {
        self.col_widths = SizeOverrides::new();
        self.row_heights = SizeOverrides::new();
    }

    // ---- Rendering ----

    /// Geometry of the current snapshot.
    pub fn layout(&self) -> GridLayout {
        GridLayout::resolve(
            &self.grid,
            &self.style.sanitized(),
            &self.col_widths,
            &self.row_heights,
        )
    }

    /// Owning cell under a point in grid coordinates.
    pub fn cell_at_point(&self, x: f64, y: f64) -> Option<CellPos> {
        self.layout().cell_at_point(x, y)
    }

    fn params(&self) -> RenderParams<'_> {
        RenderParams {
            grid: &self.grid,
            style: &self.style,
            col_widths: &self.col_widths,
            row_heights: &self.row_heights,
        }
    }

    /// Run a fresh render pass.
    pub fn render<R: Rng + ?Sized>(&self, rng: &mut R) -> Scene {
        render_scene(&self.params(), rng)
    }

    pub fn export_svg<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        export::export_svg(&self.render(rng), &ExportOptions::default())
    }

    pub fn export_png<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<u8>> {
        export::export_png(&self.render(rng), &ExportOptions::default())
    }

    // ---- Generation ----

    /// Mark a generation request as in flight.
    ///
    /// # Errors
    /// Returns [`SketchError::GenerationInProgress`] if one already is.
    pub fn begin_generation(&mut self) -> Result<()> {
        if self.status.is_loading() {
            return Err(SketchError::GenerationInProgress);
        }
        self.status = GenerationStatus::Loading;
        Ok(())
    }

    /// Accept a generator response.
    ///
    /// On success the grid is replaced and size overrides are cleared. On a
    /// bad response the grid is unchanged and the status records the error.
    pub fn complete_generation(&mut self, rows: Vec<Vec<String>>) -> Result<()> {
        match grid_from_generated(rows) {
            Ok(grid) => {
                tracing::debug!(
                    rows = grid.row_count(),
                    cols = grid.col_count(),
                    "generated table accepted"
                );
                self.grid = grid;
                self.reset_sizes();
                self.status = GenerationStatus::Success;
                Ok(())
            }
            Err(e) => {
                self.status = GenerationStatus::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Record a failed request. The grid is unchanged.
    pub fn fail_generation(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("table generation failed: {message}");
        self.status = GenerationStatus::Error(message);
    }

    /// Run a synchronous generator end to end.
    pub fn generate<G: TableGenerator + ?Sized>(&mut self, generator: &G, prompt: &str) -> Result<()> {
        self.begin_generation()?;
        match generator.generate(prompt) {
            Ok(rows) => self.complete_generation(rows),
            Err(e) => {
                self.fail_generation(e.to_string());
                Err(e)
            }
        }
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
    use crate::persistence::MemoryStore;

    #[test]
    fn test_remove_column_shifts_widths() {
        let mut editor = TableEditor::new();
        editor.resize_column(0, 100.0).unwrap();
        editor.resize_column(2, 150.0).unwrap();
        editor.remove_column(1).unwrap();
        let widths: Vec<_> = editor.col_widths().iter().collect();
        assert_eq!(widths, vec![(0, 100.0), (1, 150.0)]);
    }

    #[test]
    fn test_insert_row_shifts_heights() {
        let mut editor = TableEditor::new();
        editor.resize_row(1, 80.0).unwrap();
        editor.insert_row(0).unwrap();
        assert_eq!(editor.row_heights().get(1), None);
        assert_eq!(editor.row_heights().get(2), Some(80.0));
    }

    #[test]
    fn test_resize_clamps_and_checks_bounds() {
        let mut editor = TableEditor::new();
        assert_eq!(editor.resize_column(0, 5.0).unwrap(), 40.0);
        assert_eq!(editor.resize_row(0, 5.0).unwrap(), 30.0);
        assert!(matches!(
            editor.resize_column(99, 100.0),
            Err(SketchError::OutOfBounds { row: 0, col: 99 })
        ));
    }

    #[test]
    fn test_generation_in_progress_is_rejected() {
        let mut editor = TableEditor::new();
        editor.begin_generation().unwrap();
        assert!(matches!(
            editor.begin_generation(),
            Err(SketchError::GenerationInProgress)
        ));
        editor.fail_generation("timeout");
        assert_eq!(editor.status(), &GenerationStatus::Error("timeout".into()));
        editor.begin_generation().unwrap();
    }

    #[test]
    fn test_failed_generation_keeps_grid() {
        let mut editor = TableEditor::new();
        let before = editor.grid().clone();
        let failing = |_: &str| -> Result<Vec<Vec<String>>> {
            Err(SketchError::Generation("service down".into()))
        };
        assert!(editor.generate(&failing, "pets").is_err());
        assert_eq!(editor.grid(), &before);
        assert!(matches!(editor.status(), GenerationStatus::Error(_)));
    }

    #[test]
    fn test_successful_generation_replaces_grid() {
        let mut editor = TableEditor::new();
        editor.resize_column(0, 200.0).unwrap();
        let generator = |_: &str| -> Result<Vec<Vec<String>>> {
            Ok(vec![
                vec!["Pet".into(), "Sound".into()],
                vec!["Cat".into(), "Meow".into()],
            ])
        };
        editor.generate(&generator, "pets").unwrap();
        assert_eq!(editor.grid().values()[1], vec!["Cat", "Meow"]);
        assert!(editor.col_widths().is_empty());
        assert_eq!(editor.status(), &GenerationStatus::Success);
    }

    #[test]
    fn test_persist_and_restore() {
        let mut editor = TableEditor::new();
        editor.merge(CellRange::new(0, 0, 0, 1)).unwrap();
        editor.resize_row(2, 90.0).unwrap();
        editor.set_style(StyleConfig {
            roughness: 0.5,
            ..StyleConfig::default()
        });

        let mut store = MemoryStore::new();
        editor.persist(&mut store).unwrap();
        let restored = TableEditor::restore(&store);
        assert_eq!(restored, editor);
    }

    #[test]
    fn test_cell_at_point_resolves_merge() {
        let mut editor = TableEditor::new();
        editor.merge(CellRange::new(0, 0, 1, 1)).unwrap();
        let layout = editor.layout();
        let x = layout.col_positions[1] + 5.0;
        let y = layout.row_positions[1] + 5.0;
        assert_eq!(editor.cell_at_point(x, y), Some(CellPos::new(0, 0)));
        assert_eq!(editor.cell_at_point(-1.0, 0.0), None);
    }
}
