//! Structured error types for sketchtable.
//!
//! Every fallible operation in the crate returns [`Result`].

/// All errors that can occur while editing, rendering or exporting a table.
#[derive(Debug, thiserror::Error)]
pub enum SketchError {
    /// The generation collaborator failed or returned an unusable table.
    #[error("Table generation failed: {0}")]
    Generation(String),

    /// A generation request is already in flight.
    #[error("A table generation request is already in progress")]
    GenerationInProgress,

    /// A grid violates the rectangular or merge invariants.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// A cell coordinate is outside the grid.
    #[error("Cell ({row}, {col}) is out of bounds")]
    OutOfBounds { row: u32, col: u32 },

    /// A row/column range does not describe a usable selection.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Snapshot (de)serialization error.
    #[error("Snapshot serialization: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Raster encoding error.
    #[error("Image encoding: {0}")]
    Image(#[from] image::ImageError),

    /// Rendering error.
    #[error("Render error: {0}")]
    Render(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SketchError>;

impl From<String> for SketchError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for SketchError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<SketchError> for wasm_bindgen::JsValue {
    fn from(e: SketchError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
