//! sketchtable - hand-drawn tables for the web
//!
//! Edits and renders small tables in a sketchy, hand-drawn style:
//! - Merged cells spanning rows and columns
//! - Word-wrapped text with auto-sized rows and columns
//! - Grid lines that skip the interior of merged regions
//! - Rough, bowed strokes with optional double-stroke
//! - SVG and PNG export
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { SketchTable } from 'sketchtable';
//! await init();
//! const table = new SketchTable();
//! table.merge(0, 0, 0, 1);
//! element.innerHTML = table.renderSvg();
//! ```

pub mod editor;
pub mod error;
pub mod export;
pub mod generation;
pub mod layout;
pub mod persistence;
pub mod render;
pub mod types;
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use editor::TableEditor;
pub use error::{Result, SketchError};
pub use export::ExportOptions;
pub use generation::{GenerationStatus, TableGenerator};
pub use persistence::{FileStore, MemoryStore, SnapshotStore};
pub use render::{render_scene, RenderParams, Scene};
pub use wasm::SketchTable;

pub use types::*;

/// Render a grid (JSON) with an optional style (JSON) to an SVG document
///
/// Column widths and row heights are auto-sized. Exported to JS as
/// `renderSvg`.
///
/// # Errors
/// Returns an error if either document fails to parse or the grid is invalid.
pub fn render_svg(grid_json: &str, style_json: Option<&str>) -> Result<String> {
    let grid = Grid::from_json(grid_json)?;
    let style = match style_json {
        Some(json) => serde_json::from_str::<StyleConfig>(json)
            .map_err(|e| SketchError::Other(format!("Style parse error: {e}")))?,
        None => StyleConfig::default(),
    };

    let mut editor = TableEditor::with_grid(grid);
    editor.set_style(style);
    Ok(editor.export_svg(&mut rand::thread_rng()))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
