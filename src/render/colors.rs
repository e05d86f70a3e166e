//! Sketch colors.
//!
//! Colors travel through the scene as CSS strings, which SVG and Canvas 2D
//! accept directly. [`Ink`] is the parsed form used to validate style input.

/// A CSS color string (e.g., "#FF0000", "rgba(255, 0, 0, 0.5)")
pub type CssColor = String;

/// Parsed color: 8-bit channels plus an opacity in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ink {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl Ink {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    /// Parse `#RGB`, `#RRGGBB`, `#RRGGBBAA` (the `#` is optional),
    /// `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(args) = functional_args(text, "rgba") {
            let [r, g, b, a] = args.as_slice() else {
                return None;
            };
            let alpha: f64 = a.parse().ok()?;
            if !(0.0..=1.0).contains(&alpha) {
                return None;
            }
            Some(Self { r: r.parse().ok()?, g: g.parse().ok()?, b: b.parse().ok()?, alpha })
        } else if let Some(args) = functional_args(text, "rgb") {
            let [r, g, b] = args.as_slice() else {
                return None;
            };
            Some(Self::opaque(r.parse().ok()?, g.parse().ok()?, b.parse().ok()?))
        } else {
            Self::from_hex(text.strip_prefix('#').unwrap_or(text))
        }
    }

    fn from_hex(digits: &str) -> Option<Self> {
        if !digits.is_ascii() {
            return None;
        }
        let byte = |at: usize| u8::from_str_radix(digits.get(at..at + 2)?, 16).ok();
        match digits.len() {
            3 => {
                // #abc is #aabbcc
                let mut nibbles = digits.chars().map(|c| c.to_digit(16));
                let mut next = || -> Option<u8> { u8::try_from(nibbles.next()?? * 17).ok() };
                Some(Self::opaque(next()?, next()?, next()?))
            }
            6 => Some(Self::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self {
                alpha: f64::from(byte(6)?) / 255.0,
                ..Self::opaque(byte(0)?, byte(2)?, byte(4)?)
            }),
            _ => None,
        }
    }

    /// Canonical CSS spelling: uppercase `#RRGGBB` when opaque, else `rgba()`.
    pub fn to_css(self) -> CssColor {
        let Self { r, g, b, alpha } = self;
        if alpha >= 1.0 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            let alpha = (alpha * 1000.0).round() / 1000.0;
            format!("rgba({r}, {g}, {b}, {alpha})")
        }
    }
}

/// `name(a, b, c)` into its trimmed arguments.
fn functional_args<'a>(text: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let inner = text.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.split(',').map(str::trim).collect())
}

/// Validate a user-supplied color and return its canonical CSS spelling.
pub fn parse_color(s: &str) -> Option<CssColor> {
    Ink::parse(s).map(Ink::to_css)
}

pub mod palette {
    pub const WHITE: &str = "#FFFFFF";

    /// Soft pencil black for strokes and text
    pub const INK: &str = "#1E1E1E";

    /// Marker yellow header fill
    pub const HIGHLIGHTER: &str = "#FFEC99";
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
    fn test_hex_forms_normalize_to_uppercase() {
        assert_eq!(parse_color("#1e1e1e").unwrap(), "#1E1E1E");
        assert_eq!(parse_color("ffec99").unwrap(), "#FFEC99");
        assert_eq!(parse_color("#fa0").unwrap(), "#FFAA00");
        assert_eq!(parse_color("#FF0000FF").unwrap(), "#FF0000");
    }

    #[test]
    fn test_translucent_hex_becomes_rgba() {
        assert_eq!(parse_color("#FF000080").unwrap(), "rgba(255, 0, 0, 0.502)");
    }

    #[test]
    fn test_functional_notation() {
        assert_eq!(parse_color("rgb(255, 128, 64)").unwrap(), "#FF8040");
        assert_eq!(parse_color(" rgba(255,128,64,0.5) ").unwrap(), "rgba(255, 128, 64, 0.5)");
        assert_eq!(
            Ink::parse("rgba(10, 20, 30, 0.25)").unwrap(),
            Ink { r: 10, g: 20, b: 30, alpha: 0.25 }
        );
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "not-a-color",
            "rgb(300, 0, 0)",
            "rgb(1, 2)",
            "rgba(0, 0, 0, 2)",
            "rgba(0, 0, 0)",
            "#12345",
            "#gg0000",
            "",
        ] {
            assert!(Ink::parse(bad).is_none(), "{bad:?} should not parse");
        }
    }
}
