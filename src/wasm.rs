//! JavaScript surface.
//!
//! `SketchTable` wraps a [`TableEditor`] for use from the browser. Grids,
//! styles and generation responses cross the boundary as JSON strings or
//! plain JS values; errors become JS strings.

use wasm_bindgen::prelude::*;

use crate::editor::TableEditor;
use crate::export::png_data_url;
use crate::persistence::MemoryStore;
use crate::types::{CellRange, Grid, StyleConfig};

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// JS entry point for [`crate::render_svg`].
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = renderSvg)]
pub fn render_svg_js(grid_json: &str, style_json: Option<String>) -> Result<String, JsValue> {
    crate::render_svg(grid_json, style_json.as_deref()).map_err(to_js)
}

/// A table editing session exported to JavaScript.
#[wasm_bindgen]
pub struct SketchTable {
    editor: TableEditor,
}

impl Default for SketchTable {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl SketchTable {
    /// Start a session on the sample table.
    #[wasm_bindgen(constructor)]
    pub fn new() -> SketchTable {
        #[cfg(target_arch = "wasm32")]
        console_error_panic_hook::set_once();
        SketchTable {
            editor: TableEditor::new(),
        }
    }

    /// Start a session on a grid given as JSON.
    #[wasm_bindgen(js_name = fromGridJson)]
    pub fn from_grid_json(json: &str) -> Result<SketchTable, JsValue> {
        let grid = Grid::from_json(json).map_err(to_js)?;
        Ok(SketchTable {
            editor: TableEditor::with_grid(grid),
        })
    }

    /// Restore a session saved with [`SketchTable::snapshot`].
    #[wasm_bindgen(js_name = fromSnapshot)]
    pub fn from_snapshot(json: &str) -> Result<SketchTable, JsValue> {
        let store: MemoryStore = serde_json::from_str(json).map_err(to_js)?;
        Ok(SketchTable {
            editor: TableEditor::restore(&store),
        })
    }

    /// The whole session (grid, style, size overrides) as one JSON document.
    pub fn snapshot(&self) -> Result<String, JsValue> {
        let mut store = MemoryStore::new();
        self.editor.persist(&mut store).map_err(to_js)?;
        serde_json::to_string(&store).map_err(to_js)
    }

    #[wasm_bindgen(js_name = gridJson)]
    pub fn grid_json(&self) -> Result<String, JsValue> {
        self.editor.grid().to_json().map_err(to_js)
    }

    #[wasm_bindgen(js_name = setGridJson)]
    pub fn set_grid_json(&mut self, json: &str) -> Result<(), JsValue> {
        let grid = Grid::from_json(json).map_err(to_js)?;
        self.editor.replace_grid(grid).map_err(to_js)
    }

    /// Plain cell texts, row by row.
    pub fn values(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.editor.grid().values()).map_err(to_js)
    }

    pub fn style(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.editor.style()).map_err(to_js)
    }

    /// Replace the style. Missing fields take their defaults.
    #[wasm_bindgen(js_name = setStyle)]
    pub fn set_style(&mut self, style: JsValue) -> Result<(), JsValue> {
        let style: StyleConfig = serde_wasm_bindgen::from_value(style).map_err(to_js)?;
        self.editor.set_style(style);
        Ok(())
    }

    #[wasm_bindgen(js_name = setStyleJson)]
    pub fn set_style_json(&mut self, json: &str) -> Result<(), JsValue> {
        let style: StyleConfig = serde_json::from_str(json).map_err(to_js)?;
        self.editor.set_style(style);
        Ok(())
    }

    #[wasm_bindgen(js_name = rowCount)]
    pub fn row_count(&self) -> u32 {
        self.editor.grid().row_count()
    }

    #[wasm_bindgen(js_name = colCount)]
    pub fn col_count(&self) -> u32 {
        self.editor.grid().col_count()
    }

    // ---- Editing ----

    #[wasm_bindgen(js_name = setCell)]
    pub fn set_cell(&mut self, row: u32, col: u32, value: &str) -> Result<(), JsValue> {
        self.editor.set_cell_value(row, col, value).map_err(to_js)
    }

    #[wasm_bindgen(js_name = insertRow)]
    pub fn insert_row(&mut self, at: u32) -> Result<(), JsValue> {
        self.editor.insert_row(at).map_err(to_js)
    }

    #[wasm_bindgen(js_name = insertColumn)]
    pub fn insert_column(&mut self, at: u32) -> Result<(), JsValue> {
        self.editor.insert_column(at).map_err(to_js)
    }

    #[wasm_bindgen(js_name = removeRow)]
    pub fn remove_row(&mut self, at: u32) -> Result<(), JsValue> {
        self.editor.remove_row(at).map_err(to_js)
    }

    #[wasm_bindgen(js_name = removeColumn)]
    pub fn remove_column(&mut self, at: u32) -> Result<(), JsValue> {
        self.editor.remove_column(at).map_err(to_js)
    }

    /// Merge the rectangle between two corners (any order).
    pub fn merge(
        &mut self,
        start_row: u32,
        start_col: u32,
        end_row: u32,
        end_col: u32,
    ) -> Result<(), JsValue> {
        self.editor
            .merge(CellRange::new(start_row, start_col, end_row, end_col))
            .map_err(to_js)
    }

    pub fn unmerge(&mut self, row: u32, col: u32) -> Result<(), JsValue> {
        self.editor.unmerge(row, col).map_err(to_js)
    }

    /// Returns the clamped width actually stored.
    #[wasm_bindgen(js_name = resizeColumn)]
    pub fn resize_column(&mut self, col: u32, width: f64) -> Result<f64, JsValue> {
        self.editor.resize_column(col, width).map_err(to_js)
    }

    /// Returns the clamped height actually stored.
    #[wasm_bindgen(js_name = resizeRow)]
    pub fn resize_row(&mut self, row: u32, height: f64) -> Result<f64, JsValue> {
        self.editor.resize_row(row, height).map_err(to_js)
    }

    /// `[row, col]` of the cell under a point, or `undefined`.
    #[wasm_bindgen(js_name = cellAt)]
    pub fn cell_at(&self, x: f64, y: f64) -> Option<Vec<u32>> {
        self.editor
            .cell_at_point(x, y)
            .map(|pos| vec![pos.row, pos.col])
    }

    // ---- Rendering ----

    /// Render a fresh sketch as an SVG document.
    #[wasm_bindgen(js_name = renderSvg)]
    pub fn render_svg(&self) -> String {
        self.editor.export_svg(&mut rand::thread_rng())
    }

    /// Rasterize the SVG document natively (resvg) as PNG bytes.
    #[wasm_bindgen(js_name = exportPng)]
    pub fn export_png(&self) -> Result<Vec<u8>, JsValue> {
        self.editor
            .export_png(&mut rand::thread_rng())
            .map_err(to_js)
    }

    /// Native PNG as a `data:` URL.
    #[wasm_bindgen(js_name = exportPngDataUrl)]
    pub fn export_png_data_url(&self) -> Result<String, JsValue> {
        Ok(png_data_url(&self.export_png()?))
    }

    /// Rasterize through a browser canvas, text included. Resolves to a PNG
    /// data URL.
    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen(js_name = exportCanvasPng)]
    pub fn export_canvas_png(&self) -> js_sys::Promise {
        let scene = self.editor.render(&mut rand::thread_rng());
        wasm_bindgen_futures::future_to_promise(async move {
            crate::export::canvas::png_data_url(&scene, &crate::export::ExportOptions::default())
                .await
                .map(|url| JsValue::from_str(&url))
                .map_err(JsValue::from)
        })
    }

    // ---- Generation ----

    #[wasm_bindgen(js_name = beginGeneration)]
    pub fn begin_generation(&mut self) -> Result<(), JsValue> {
        self.editor.begin_generation().map_err(to_js)
    }

    /// Accept a generator response (`string[][]`).
    #[wasm_bindgen(js_name = completeGeneration)]
    pub fn complete_generation(&mut self, rows: JsValue) -> Result<(), JsValue> {
        let rows: Vec<Vec<String>> = match serde_wasm_bindgen::from_value(rows) {
            Ok(rows) => rows,
            Err(e) => {
                self.editor.fail_generation(e.to_string());
                return Err(to_js(e));
            }
        };
        self.editor.complete_generation(rows).map_err(to_js)
    }

    #[wasm_bindgen(js_name = failGeneration)]
    pub fn fail_generation(&mut self, message: &str) {
        self.editor.fail_generation(message);
    }

    /// `{ status: "idle" | "loading" | "success" | "error", message? }`
    #[wasm_bindgen(js_name = generationStatus)]
    pub fn generation_status(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.editor.status()).map_err(to_js)
    }
}

// Native-only accessors (for tests and the CLI)
#[cfg(not(target_arch = "wasm32"))]
impl SketchTable {
    pub fn editor(&self) -> &TableEditor {
        &self.editor
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
    fn test_snapshot_roundtrip() {
        let mut table = SketchTable::new();
        table.merge(0, 0, 1, 0).unwrap();
        table.resize_column(1, 160.0).unwrap();
        let json = table.snapshot().unwrap();
        let restored = SketchTable::from_snapshot(&json).unwrap();
        assert_eq!(restored.editor(), table.editor());
    }

    #[test]
    fn test_render_svg_from_grid_json() {
        let grid = Grid::from_values(&[vec!["a", "b"]]);
        let table = SketchTable::from_grid_json(&grid.to_json().unwrap()).unwrap();
        let svg = table.render_svg();
        assert!(svg.contains("<path"));
        assert_eq!((table.row_count(), table.col_count()), (1, 2));
    }

    #[test]
    fn test_cell_at() {
        let table = SketchTable::new();
        assert_eq!(table.cell_at(1.0, 1.0), Some(vec![0, 0]));
        assert_eq!(table.cell_at(-1.0, 1.0), None);
    }
}
