//! Browser PNG export.
//!
//! The SVG document is loaded into an `<img>`, drawn onto an offscreen canvas
//! over white at the raster scale, and read back as a PNG data URL. Unlike
//! the native rasterizer this path also draws the text.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use js_sys::{Function, Promise};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

use super::{svg, ExportOptions};
use crate::error::{Result, SketchError};
use crate::render::palette;
use crate::render::Scene;

fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| SketchError::Render("no document available".into()))
}

fn js_error(context: &str, err: &JsValue) -> SketchError {
    SketchError::Render(format!("{context}: {err:?}"))
}

/// Load `src` into a new image element and wait until it has decoded.
async fn load_image(document: &Document, src: &str) -> Result<HtmlImageElement> {
    let image = document
        .create_element("img")
        .map_err(|e| js_error("create img", &e))?
        .dyn_into::<HtmlImageElement>()
        .map_err(|_| SketchError::Render("img element has the wrong type".into()))?;

    let ready = Promise::new(&mut |resolve: Function, reject: Function| {
        let onload = Closure::once_into_js(move || {
            let _ = resolve.call0(&JsValue::NULL);
        });
        let onerror = Closure::once_into_js(move || {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("SVG image failed to load"));
        });
        image.set_onload(Some(onload.unchecked_ref()));
        image.set_onerror(Some(onerror.unchecked_ref()));
    });
    image.set_src(src);

    JsFuture::from(ready)
        .await
        .map_err(|e| js_error("load svg", &e))?;
    Ok(image)
}

/// Rasterize `scene` through the browser and return a PNG data URL.
pub async fn png_data_url(scene: &Scene, options: &ExportOptions) -> Result<String> {
    let document = document()?;
    let svg = svg::write_svg(scene, options);
    let src = format!("data:image/svg+xml;base64,{}", BASE64.encode(svg.as_bytes()));
    let image = load_image(&document, &src).await?;

    let scale = f64::from(options.raster_scale.max(1));
    let (width, height) = options.document_size(scene);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (px_width, px_height) = (
        (width * scale).ceil().max(1.0) as u32,
        (height * scale).ceil().max(1.0) as u32,
    );

    let canvas = document
        .create_element("canvas")
        .map_err(|e| js_error("create canvas", &e))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| SketchError::Render("canvas element has the wrong type".into()))?;
    canvas.set_width(px_width);
    canvas.set_height(px_height);

    let ctx = canvas
        .get_context("2d")
        .map_err(|e| js_error("get 2d context", &e))?
        .ok_or_else(|| SketchError::Render("2d context unavailable".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| SketchError::Render("context has the wrong type".into()))?;

    ctx.set_fill_style_str(palette::WHITE);
    ctx.fill_rect(0.0, 0.0, f64::from(px_width), f64::from(px_height));
    ctx.draw_image_with_html_image_element_and_dw_and_dh(
        &image,
        0.0,
        0.0,
        f64::from(px_width),
        f64::from(px_height),
    )
    .map_err(|e| js_error("draw svg", &e))?;

    canvas
        .to_data_url_with_type("image/png")
        .map_err(|e| js_error("encode png", &e))
}
