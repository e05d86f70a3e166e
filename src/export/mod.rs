//! Scene export.
//!
//! A [`Scene`] is serialized as an SVG document. The PNG export draws that
//! same document onto a pixel canvas at twice the scene size, natively with
//! `resvg` and in the browser through a `<canvas>` (see `canvas`). Both
//! outputs add a white margin around the grid.

pub(crate) mod raster;
pub(crate) mod svg;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::Result;
use crate::render::Scene;

/// Blank space around the grid, in scene pixels.
pub const EXPORT_MARGIN: f64 = 20.0;

/// Device pixels per scene pixel in raster exports.
pub const RASTER_SCALE: u32 = 2;

/// Export parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub margin: f64,
    pub raster_scale: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            margin: EXPORT_MARGIN,
            raster_scale: RASTER_SCALE,
        }
    }
}

impl ExportOptions {
    /// Document size in scene pixels: the grid extent plus the margin on
    /// every side.
    pub fn document_size(&self, scene: &Scene) -> (f64, f64) {
        let margin = self.margin.max(0.0);
        (scene.width + 2.0 * margin, scene.height + 2.0 * margin)
    }
}

/// Serialize `scene` as a standalone SVG document.
pub fn export_svg(scene: &Scene, options: &ExportOptions) -> String {
    svg::write_svg(scene, options)
}

/// Rasterize the SVG document for `scene` and encode it as PNG.
///
/// # Errors
/// Returns [`crate::SketchError::Render`] if the image would be too large or
/// the document fails to parse, and [`crate::SketchError::Image`] if encoding
/// fails.
pub fn export_png(scene: &Scene, options: &ExportOptions) -> Result<Vec<u8>> {
    let image = raster::rasterize(scene, options)?;
    raster::encode_png(image)
}

/// Wrap PNG bytes in a `data:` URL.
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(png))
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
    fn test_data_url_prefix() {
        let url = png_data_url(&[0x89, b'P', b'N', b'G']);
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_negative_margin_is_ignored() {
        let scene = Scene {
            width: 100.0,
            height: 50.0,
            fills: Vec::new(),
            strokes: Vec::new(),
            texts: Vec::new(),
            fill_color: String::new(),
            stroke_color: String::new(),
            text_color: String::new(),
            font_family: String::new(),
        };
        let options = ExportOptions {
            margin: -5.0,
            ..ExportOptions::default()
        };
        assert_eq!(options.document_size(&scene), (100.0, 50.0));
        assert_eq!(
            ExportOptions::default().document_size(&scene),
            (140.0, 90.0)
        );
    }
}
