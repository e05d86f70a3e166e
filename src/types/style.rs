use serde::{Deserialize, Serialize};

use crate::render::colors::{palette, parse_color};

/// Header row fill mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFill {
    /// No background behind the header row
    #[default]
    None,
    /// Header cells are filled with [`StyleConfig::fill_color`]
    Highlight,
}

/// Rendering parameters for the sketch.
///
/// A pure value: edits replace the whole config. Missing fields in JSON fall
/// back to the defaults, so partial style documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleConfig {
    /// Endpoint jitter amplitude (line waviness)
    pub roughness: f64,
    /// Midpoint bow amplitude, relative to segment length
    pub bowing: f64,
    pub stroke_color: String,
    pub stroke_width: f64,
    /// Inner cell padding in pixels
    pub padding: f64,
    pub text_color: String,
    pub header_fill: HeaderFill,
    pub fill_color: String,
    /// Multiplier applied to every column width
    pub width_scale: f64,
    pub font_family: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            roughness: 1.5,
            bowing: 1.0,
            stroke_color: palette::INK.to_string(),
            stroke_width: 2.0,
            padding: 12.0,
            text_color: palette::INK.to_string(),
            header_fill: HeaderFill::None,
            fill_color: palette::HIGHLIGHTER.to_string(),
            width_scale: 1.0,
            font_family: "Segoe Print, Bradley Hand, Chalkboard SE, cursive".to_string(),
        }
    }
}

/// Minimum width scale; keeps columns from collapsing to zero.
pub const MIN_WIDTH_SCALE: f64 = 0.1;

impl StyleConfig {
    /// True when the sketch double-strokes every edge.
    pub fn double_stroke(&self) -> bool {
        self.roughness > DOUBLE_STROKE_THRESHOLD
    }

    /// Copy with every field forced into its valid domain.
    ///
    /// Negative or non-finite numbers fall back to their floor, unparsable
    /// colors fall back to the defaults.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let non_negative = |v: f64, name: &str| {
            if v.is_finite() && v >= 0.0 {
                v
            } else {
                tracing::warn!("style {name} = {v} is invalid, using 0");
                0.0
            }
        };
        let color = |v: &str, fallback: &str, name: &str| match parse_color(v) {
            Some(c) => c,
            None => {
                tracing::warn!("style {name} = {v:?} is not a color, using {fallback}");
                fallback.to_string()
            }
        };
        let width_scale = if self.width_scale.is_finite() {
            self.width_scale.max(MIN_WIDTH_SCALE)
        } else {
            defaults.width_scale
        };
        let font_family = if self.font_family.trim().is_empty() {
            defaults.font_family.clone()
        } else {
            self.font_family.clone()
        };

        Self {
            roughness: non_negative(self.roughness, "roughness"),
            bowing: non_negative(self.bowing, "bowing"),
            stroke_color: color(&self.stroke_color, &defaults.stroke_color, "strokeColor"),
            stroke_width: non_negative(self.stroke_width, "strokeWidth"),
            padding: non_negative(self.padding, "padding"),
            text_color: color(&self.text_color, &defaults.text_color, "textColor"),
            header_fill: self.header_fill,
            fill_color: color(&self.fill_color, &defaults.fill_color, "fillColor"),
            width_scale,
            font_family,
        }
    }
}

/// Roughness above which edges get a second, fainter stroke.
pub const DOUBLE_STROKE_THRESHOLD: f64 = 0.1;

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
    fn test_partial_json_uses_defaults() {
        let style: StyleConfig =
            serde_json::from_str(r#"{"roughness": 0.0, "headerFill": "highlight"}"#).unwrap();
        assert_eq!(style.roughness, 0.0);
        assert_eq!(style.header_fill, HeaderFill::Highlight);
        assert_eq!(style.padding, StyleConfig::default().padding);
        assert!(!style.double_stroke());
    }

    #[test]
    fn test_sanitized_clamps_numbers() {
        let style = StyleConfig {
            roughness: -3.0,
            bowing: f64::NAN,
            stroke_width: -1.0,
            width_scale: 0.0,
            ..StyleConfig::default()
        }
        .sanitized();
        assert_eq!(style.roughness, 0.0);
        assert_eq!(style.bowing, 0.0);
        assert_eq!(style.stroke_width, 0.0);
        assert_eq!(style.width_scale, MIN_WIDTH_SCALE);
    }

    #[test]
    fn test_sanitized_replaces_bad_colors() {
        let style = StyleConfig {
            stroke_color: "not-a-color".into(),
            fill_color: "#00FF00".into(),
            ..StyleConfig::default()
        }
        .sanitized();
        assert_eq!(style.stroke_color, StyleConfig::default().stroke_color);
        assert_eq!(style.fill_color, "#00FF00");
    }

    #[test]
    fn test_default_is_sanitized() {
        let style = StyleConfig::default();
        assert_eq!(style.sanitized(), style);
        assert!(style.double_stroke());
    }
}
