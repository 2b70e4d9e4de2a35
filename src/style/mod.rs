//! # Style Primitives
//!
//! The small vocabulary shared by content and layout nodes: colors, fonts,
//! alignments and fractional points. Layout never interprets colors; they are
//! carried through to the paint stage untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An RGBA color with channels in 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "String")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// Accepted JSON spellings of a color: `"#1a2b3c"` or `{ "r": .., "g": .., "b": .. }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Channels {
        r: f64,
        g: f64,
        b: f64,
        #[serde(default = "opaque")]
        a: f64,
    },
}

fn opaque() -> f64 {
    1.0
}

impl TryFrom<ColorRepr> for Color {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(s) => s.parse(),
            ColorRepr::Channels { r, g, b, a } => Ok(Color { r, g, b, a }),
        }
    }
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Lenient hex parsing: malformed input yields black.
    pub fn hex(hex: &str) -> Self {
        hex.parse().unwrap_or(Color::BLACK)
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>, doubled: bool| -> Result<f64, String> {
            let digits = &hex[range];
            let digits = if doubled {
                digits.repeat(2)
            } else {
                digits.to_string()
            };
            u8::from_str_radix(&digits, 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|_| format!("invalid color {:?}", s))
        };
        if !hex.is_ascii() {
            return Err(format!("invalid color {:?}", s));
        }
        match hex.len() {
            3 => Ok(Color::rgb(
                channel(0..1, true)?,
                channel(1..2, true)?,
                channel(2..3, true)?,
            )),
            6 => Ok(Color::rgb(
                channel(0..2, false)?,
                channel(2..4, false)?,
                channel(4..6, false)?,
            )),
            8 => Ok(Color {
                r: channel(0..2, false)?,
                g: channel(2..4, false)?,
                b: channel(4..6, false)?,
                a: channel(6..8, false)?,
            }),
            _ => Err(format!("invalid color {:?}", s)),
        }
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(f, "#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))?;
        if self.a < 1.0 {
            write!(f, "{:02x}", byte(self.a))?;
        }
        Ok(())
    }
}

/// The font a text run is measured and painted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    /// Family name, e.g. "Inter" or "Helvetica".
    #[serde(default = "default_face")]
    pub face: String,
    /// Size in canvas pixels.
    pub size: f64,
    /// Weight (100-900). Providers may snap to the nearest available face.
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_face() -> String {
    "Helvetica".to_string()
}

fn default_weight() -> u32 {
    400
}

impl FontSpec {
    pub fn new(face: &str, size: f64, weight: u32) -> Self {
        Self {
            face: face.to_string(),
            size,
            weight,
        }
    }

    /// Hashable identity of this font. Sizes are compared bitwise.
    pub(crate) fn key(&self) -> (String, u64, u32) {
        (self.face.clone(), self.size.to_bits(), self.weight)
    }
}

/// Nine-way alignment of a stack's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    TopLeading,
    Top,
    TopTrailing,
    #[default]
    Leading,
    Center,
    Trailing,
    BottomLeading,
    Bottom,
    BottomTrailing,
}

impl Alignment {
    /// True when the alignment centers content horizontally.
    pub fn centers_x(self) -> bool {
        matches!(self, Alignment::Top | Alignment::Center | Alignment::Bottom)
    }

    /// True when the alignment centers content vertically.
    pub fn centers_y(self) -> bool {
        matches!(
            self,
            Alignment::Leading | Alignment::Center | Alignment::Trailing
        )
    }
}

/// Horizontal placement of each wrapped line within a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    #[default]
    Leading,
    Center,
    Trailing,
}

/// A point. In content it holds 0–1 fractions; in layout, canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        let short: Color = "#f00".parse().unwrap();
        assert!((short.r - 1.0).abs() < 1e-9 && short.g == 0.0);
        let long: Color = "00ff00".parse().unwrap();
        assert!((long.g - 1.0).abs() < 1e-9);
        let alpha: Color = "#0000ff80".parse().unwrap();
        assert!((alpha.a - 128.0 / 255.0).abs() < 1e-9);
        assert!("#12345".parse::<Color>().is_err());
        assert!("#zzz".parse::<Color>().is_err());
    }

    #[test]
    fn lenient_hex_falls_back_to_black() {
        assert_eq!(Color::hex("nope"), Color::BLACK);
    }

    #[test]
    fn color_deserializes_from_string_or_channels() {
        let c: Color = serde_json::from_str("\"#ffffff\"").unwrap();
        assert_eq!(c, Color::WHITE);
        let c: Color = serde_json::from_str(r#"{"r":0.5,"g":0.25,"b":0}"#).unwrap();
        assert_eq!(c.a, 1.0);
        assert!(serde_json::from_str::<Color>("\"#12\"").is_err());
    }

    #[test]
    fn color_display_round_trips_hex() {
        assert_eq!(Color::hex("#1a2b3c").to_string(), "#1a2b3c");
        let json = serde_json::to_string(&Color::hex("#0000ff80")).unwrap();
        assert_eq!(json, "\"#0000ff80\"");
    }

    #[test]
    fn alignment_axes() {
        assert!(Alignment::Leading.centers_y());
        assert!(!Alignment::Leading.centers_x());
        assert!(Alignment::Center.centers_x() && Alignment::Center.centers_y());
        assert!(Alignment::Top.centers_x());
        assert!(!Alignment::TopLeading.centers_x() && !Alignment::TopLeading.centers_y());
    }
}
