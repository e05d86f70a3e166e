//! SVG document writer.

use std::fmt::Write;

use super::ExportOptions;
use crate::render::Scene;

/// Write a complete SVG document for `scene`.
///
/// Layout: white background, then header fills, stroke paths and text, all
/// inside a group offset by the margin.
pub(crate) fn write_svg(scene: &Scene, options: &ExportOptions) -> String {
    let (width, height) = options.document_size(scene);
    let margin = options.margin.max(0.0);
    let mut out = String::with_capacity(
        512 + scene.strokes.len() * 160 + scene.texts.len() * 128 + scene.fills.len() * 96,
    );

    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.2} {height:.2}">"#
    );
    let _ = writeln!(
        out,
        r#"<rect x="0" y="0" width="{width:.2}" height="{height:.2}" fill="white"/>"#
    );
    let _ = writeln!(out, r#"<g transform="translate({margin:.2} {margin:.2})">"#);

    for fill in &scene.fills {
        let _ = writeln!(
            out,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" fill-opacity="0.8" stroke="none"/>"#,
            fill.x,
            fill.y,
            fill.width,
            fill.height,
            xml_escape(&scene.fill_color)
        );
    }

    let stroke_color = xml_escape(&scene.stroke_color);
    for stroke in &scene.strokes {
        let _ = write!(
            out,
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{:.2}" stroke-linecap="round""#,
            stroke.curve.to_path_data(),
            stroke_color,
            stroke.width
        );
        if stroke.opacity < 1.0 {
            let _ = write!(out, r#" stroke-opacity="{:.2}""#, stroke.opacity);
        }
        out.push_str("/>\n");
    }

    let text_color = xml_escape(&scene.text_color);
    let font_family = xml_escape(&scene.font_family);
    for text in &scene.texts {
        let _ = write!(
            out,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="middle" font-family="{}" font-size="{:.0}" fill="{}""#,
            text.x, text.y, font_family, text.font_size, text_color
        );
        if text.bold {
            out.push_str(r#" font-weight="bold""#);
        }
        let _ = writeln!(out, ">{}</text>", xml_escape(&text.text));
    }

    out.push_str("</g>\n</svg>\n");
    out
}

/// Minimal XML escaping for attribute/text content.
fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
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
    use crate::render::{render_scene, RenderParams};
    use crate::types::{Grid, HeaderFill, SizeOverrides, StyleConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn svg_for(grid: &Grid, style: &StyleConfig) -> String {
        let overrides = SizeOverrides::new();
        let params = RenderParams {
            grid,
            style,
            col_widths: &overrides,
            row_heights: &overrides,
        };
        let scene = render_scene(&params, &mut StdRng::seed_from_u64(4));
        write_svg(&scene, &ExportOptions::default())
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_empty_grid_is_margin_only() {
        let svg = svg_for(&Grid::empty(), &StyleConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="40" height="40""#));
        assert!(!svg.contains("<path"));
        assert!(!svg.contains("<text"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_paths_and_text_are_emitted() {
        let grid = Grid::from_values(&[vec!["A & B", "<b>"]]);
        let style = StyleConfig {
            roughness: 0.0,
            header_fill: HeaderFill::Highlight,
            ..StyleConfig::default()
        };
        let svg = svg_for(&grid, &style);
        // 2 horizontal + 3 vertical edges, single stroke each
        assert_eq!(svg.matches("<path").count(), 5);
        assert_eq!(svg.matches("<text").count(), 2);
        assert!(svg.contains(" Q "));
        assert!(svg.contains("A &amp; B"));
        assert!(svg.contains("&lt;b&gt;"));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains(r##"fill="#FFEC99""##));
    }

    #[test]
    fn test_secondary_strokes_have_opacity() {
        let svg = svg_for(&Grid::sample(), &StyleConfig::default());
        assert!(svg.contains(r#"stroke-opacity="0.60""#));
    }
}
