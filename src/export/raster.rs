//! Native PNG rasterizer.
//!
//! The SVG document is parsed with `usvg` and drawn by `resvg` onto a white
//! `tiny_skia` pixmap, so strokes, fills and text all come out the same as
//! in the vector export. Fonts come from the system; the generic families
//! are pointed at the first face found so `cursive` and friends resolve.

use std::io::Cursor;
use std::sync::{Arc, OnceLock};

use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg::{self, fontdb};

use super::{svg, ExportOptions};
use crate::error::{Result, SketchError};
use crate::render::Scene;

/// Largest width or height of a raster export, in device pixels.
pub const MAX_RASTER_DIMENSION: u32 = 16_384;

static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();

fn font_database() -> Arc<fontdb::Database> {
    Arc::clone(FONTS.get_or_init(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let family = |want: &str| {
            db.faces()
                .flat_map(|face| face.families.iter())
                .map(|(name, _)| name.clone())
                .find(|name| name.contains(want))
        };
        let fallback = family("Sans").or_else(|| family(""));
        match fallback {
            Some(name) => {
                tracing::debug!(faces = db.len(), family = %name, "loaded raster fonts");
                db.set_sans_serif_family(name.clone());
                db.set_cursive_family(name.clone());
                db.set_fantasy_family(name.clone());
                db.set_serif_family(name);
            }
            None => tracing::warn!("no system fonts found, PNG text will be missing"),
        }
        Arc::new(db)
    }))
}

/// Render `scene` into an image at `options.raster_scale`.
pub(crate) fn rasterize(scene: &Scene, options: &ExportOptions) -> Result<RgbaImage> {
    let scale = options.raster_scale.max(1);
    let (doc_w, doc_h) = options.document_size(scene);
    let width = pixel_extent(doc_w * f64::from(scale))?;
    let height = pixel_extent(doc_h * f64::from(scale))?;

    let document = svg::write_svg(scene, options);
    let parse_options = usvg::Options {
        fontdb: font_database(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(&document, &parse_options)
        .map_err(|e| SketchError::Render(format!("SVG parse error: {e}")))?;

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| SketchError::Render(format!("cannot allocate {width}x{height} pixmap")))?;
    pixmap.fill(Color::WHITE);
    #[allow(clippy::cast_precision_loss)]
    let factor = scale as f32;
    resvg::render(&tree, Transform::from_scale(factor, factor), &mut pixmap.as_mut());

    tracing::debug!(
        width,
        height,
        strokes = scene.strokes.len(),
        texts = scene.texts.len(),
        "rasterized scene"
    );
    // Opaque background, so premultiplied and straight alpha agree
    RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or_else(|| SketchError::Render("pixmap size mismatch".to_string()))
}

/// Encode an image as PNG bytes.
pub(crate) fn encode_png(image: RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixel_extent(v: f64) -> Result<u32> {
    let v = v.ceil();
    if !v.is_finite() || v > f64::from(MAX_RASTER_DIMENSION) {
        return Err(SketchError::Render(format!(
            "raster size {v} exceeds {MAX_RASTER_DIMENSION}px"
        )));
    }
    Ok((v as u32).max(1))
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
    use crate::render::{FillRect, Point, SketchCurve, Stroke, TextPrimitive};
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn scene(width: f64, height: f64) -> Scene {
        Scene {
            width,
            height,
            fills: Vec::new(),
            strokes: Vec::new(),
            texts: Vec::new(),
            fill_color: "#FFEC99".to_string(),
            stroke_color: "#000000".to_string(),
            text_color: "#000000".to_string(),
            font_family: "cursive".to_string(),
        }
    }

    fn dark_pixels(image: &RgbaImage) -> usize {
        image.pixels().filter(|p| p.0[0] < 128).count()
    }

    #[test]
    fn test_size_is_doubled_with_margin() {
        let image = rasterize(&scene(100.0, 50.0), &ExportOptions::default()).unwrap();
        assert_eq!(image.dimensions(), (280, 180));
        assert_eq!(*image.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_stroke_darkens_pixels() {
        let mut s = scene(100.0, 100.0);
        s.strokes.push(Stroke {
            curve: SketchCurve::straight(Point::new(0.0, 50.0), Point::new(100.0, 50.0)),
            width: 2.0,
            opacity: 1.0,
        });
        let image = rasterize(&s, &ExportOptions::default()).unwrap();
        // Line at y = (50 + 20) * 2 = 140, four device pixels thick
        assert!(image.get_pixel(140, 140).0[0] < 32);
        assert_eq!(*image.get_pixel(140, 100), WHITE);
    }

    #[test]
    fn test_fill_uses_fill_color() {
        let mut s = scene(100.0, 100.0);
        s.fills.push(FillRect {
            x: 0.0,
            y: 0.0,
            width: 50.0,
            height: 20.0,
        });
        let image = rasterize(&s, &ExportOptions::default()).unwrap();
        let [r, g, b, _] = image.get_pixel(50, 50).0;
        // #FFEC99 at 0.8 over white
        assert_eq!(r, 255);
        assert!((236..=244).contains(&g), "green {g}");
        assert!((168..=178).contains(&b), "blue {b}");
        assert_eq!(*image.get_pixel(200, 200), WHITE);
    }

    #[test]
    fn test_text_is_drawn() {
        let mut with_text = scene(200.0, 60.0);
        with_text.texts.push(TextPrimitive {
            text: "WWWW".to_string(),
            x: 100.0,
            y: 30.0,
            font_size: 32.0,
            bold: true,
            row: 0,
            col: 0,
        });
        let without_text = scene(200.0, 60.0);

        let options = ExportOptions::default();
        let inked = rasterize(&with_text, &options).unwrap();
        let blank = rasterize(&without_text, &options).unwrap();
        assert_eq!(dark_pixels(&blank), 0);
        assert!(dark_pixels(&inked) > 50, "no glyph pixels drawn");
    }

    #[test]
    fn test_oversized_scene_is_rejected() {
        let result = rasterize(&scene(1.0e6, 10.0), &ExportOptions::default());
        assert!(matches!(result, Err(SketchError::Render(_))));
    }

    #[test]
    fn test_png_signature() {
        let image = rasterize(&scene(10.0, 10.0), &ExportOptions::default()).unwrap();
        let bytes = encode_png(image).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
