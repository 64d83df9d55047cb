//! Chart colors: parsing user-supplied color strings and the fallback policy.
//!
//! Colors are stored as strings in labels and chart items (they are user
//! editable) and turned into [`Rgba`] only when drawing. Three separate
//! fallbacks apply:
//!
//! - a label without a color gets [`DEFAULT_LABEL_COLOR`] when chart items are built,
//! - an empty color string is drawn as [`Rgba::STEEL_BLUE`],
//! - a color string that does not parse is drawn as [`Rgba::GRAY`].

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fmt;
use std::str::FromStr;

/// Color given to chart items whose label has no color of its own.
pub const DEFAULT_LABEL_COLOR: &str = "#808080";

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    /// Drawn for color strings that cannot be parsed.
    pub const GRAY: Rgba = Rgba::rgb(128, 128, 128);
    /// Drawn for items with no color at all.
    pub const STEEL_BLUE: Rgba = Rgba::rgb(70, 130, 180);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Alpha as a 0.0..=1.0 opacity.
    pub fn opacity(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// `#rrggbb`, or `#aarrggbb` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgba {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        parse_color(s)
    }
}

/// Parse a color string.
///
/// Accepts CSS color syntax (named colors, `#rgb`, `#rrggbb`, `rgb()`,
/// `rgba()`, `hsl()`), case-insensitive and ignoring surrounding whitespace.
/// Four- and eight-digit hex colors carry alpha first: `#argb`, `#aarrggbb`.
/// Spaces and underscores inside names are ignored, so `steel blue` works.
pub fn parse_color(s: &str) -> Result<Rgba> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(eyre!("Empty color string"));
    }

    let css = match trimmed.strip_prefix('#') {
        Some(hex) => alpha_last(hex),
        None if !trimmed.contains('(') => trimmed.replace([' ', '_'], ""),
        None => trimmed.to_string(),
    };
    let color = csscolorparser::parse(&css)
        .map_err(|e| eyre!("Invalid color '{}': {}", trimmed, e))?;
    let [r, g, b, a] = color.to_rgba8();
    Ok(Rgba::rgba(r, g, b, a))
}

/// Color used to fill a bar or slice.
///
/// Never fails: empty strings draw steel blue, unparsable strings draw gray.
pub fn fill_color(s: &str) -> Rgba {
    if s.trim().is_empty() {
        return Rgba::STEEL_BLUE;
    }
    match parse_color(s) {
        Ok(color) => color,
        Err(e) => {
            tracing::debug!(color = s, error = %e, "falling back to gray");
            Rgba::GRAY
        }
    }
}

/// Move a leading alpha channel to the end, where CSS expects it.
fn alpha_last(hex: &str) -> String {
    if !hex.is_ascii() {
        return format!("#{hex}");
    }
    match hex.len() {
        4 => format!("#{}{}", &hex[1..], &hex[..1]),
        8 => format!("#{}{}", &hex[2..], &hex[..2]),
        _ => format!("#{hex}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_color("#ff0000").unwrap(), Rgba::rgb(255, 0, 0));
        assert_eq!(parse_color("#FF0000").unwrap(), Rgba::rgb(255, 0, 0));
        assert_eq!(parse_color("#f00").unwrap(), Rgba::rgb(255, 0, 0));
        assert_eq!(
            parse_color("#80ff0000").unwrap(),
            Rgba::rgba(255, 0, 0, 128)
        );
        assert_eq!(parse_color("#8f00").unwrap(), Rgba::rgba(255, 0, 0, 136));
        assert_eq!(parse_color("  #4682b4 ").unwrap(), Rgba::STEEL_BLUE);
    }

    #[test]
    fn test_parse_functional() {
        assert_eq!(
            parse_color("rgb(10, 20, 30)").unwrap(),
            Rgba::rgb(10, 20, 30)
        );
        assert_eq!(
            parse_color("RGBA(10,20,30,0)").unwrap(),
            Rgba::rgba(10, 20, 30, 0)
        );
        assert_eq!(parse_color("hsl(0, 100%, 50%)").unwrap(), Rgba::rgb(255, 0, 0));
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(parse_color("SteelBlue").unwrap(), Rgba::STEEL_BLUE);
        assert_eq!(parse_color("steel blue").unwrap(), Rgba::STEEL_BLUE);
        assert_eq!(parse_color("GREY").unwrap(), Rgba::GRAY);
        assert_eq!(parse_color("coral").unwrap(), Rgba::rgb(255, 127, 80));
        assert_eq!(parse_color("CornflowerBlue").unwrap(), Rgba::rgb(100, 149, 237));
        assert_eq!(parse_color("transparent").unwrap().a, 0);
    }

    #[test]
    fn test_full_named_set_is_not_gray() {
        for name in ["coral", "CornflowerBlue", "salmon", "tomato", "indigo"] {
            assert_ne!(fill_color(name), Rgba::GRAY, "{name}");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_color("").is_err());
        assert!(parse_color("#12").is_err());
        assert!(parse_color("#gggggg").is_err());
        assert!(parse_color("not-a-color").is_err());
        assert!(parse_color("#ééé").is_err());
    }

    #[test]
    fn test_fill_color_fallback_tiers() {
        assert_eq!(fill_color(""), Rgba::STEEL_BLUE);
        assert_eq!(fill_color("   "), Rgba::STEEL_BLUE);
        assert_eq!(fill_color("bogus"), Rgba::GRAY);
        assert_eq!(fill_color("#102030"), Rgba::rgb(16, 32, 48));
        assert_eq!(parse_color(DEFAULT_LABEL_COLOR).unwrap(), Rgba::GRAY);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Rgba::rgb(16, 32, 48).to_hex(), "#102030");
        assert_eq!(Rgba::rgba(16, 32, 48, 128).to_hex(), "#80102030");
    }
}
