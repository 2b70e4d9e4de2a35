//! # Font Management
//!
//! Text measurers backed by real font data.
//!
//! [`FontContext`] resolves a [`FontSpec`] against registered font files and
//! falls back to the built-in Helvetica metrics, so a document always
//! measures even when none of its faces are installed. [`FixedAdvance`] is a
//! synthetic measurer where every character has the same advance; layouts
//! computed with it are easy to check by hand.

pub mod metrics;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

pub use metrics::StandardFontMetrics;

use crate::error::{PlacardError, Result};
use crate::style::FontSpec;
use crate::text::shaping;
use crate::text::{TextMeasurer, TextMetrics};

/// A font registry that maps family + weight to font data.
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    /// Lowercased family name.
    pub family: String,
    pub weight: u32,
}

impl FontKey {
    fn new(family: &str, weight: u32) -> Self {
        Self {
            family: family.trim().to_lowercase(),
            weight,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the built-in faces. Measured from static tables.
    Standard(StandardFont),
    /// A TrueType/OpenType file, measured by shaping.
    Custom {
        data: Arc<Vec<u8>>,
        units_per_em: u16,
        ascender: i16,
        descender: i16,
    },
}

/// The built-in faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn for_weight(weight: u32) -> Self {
        if weight >= 600 {
            Self::HelveticaBold
        } else {
            Self::Helvetica
        }
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();
        fonts.insert(
            FontKey::new("Helvetica", 400),
            FontData::Standard(StandardFont::Helvetica),
        );
        fonts.insert(
            FontKey::new("Helvetica", 700),
            FontData::Standard(StandardFont::HelveticaBold),
        );
        Self { fonts }
    }

    /// Look up a font, falling back to Helvetica if not found.
    pub fn resolve(&self, family: &str, weight: u32) -> &FontData {
        if let Some(font) = self.fonts.get(&FontKey::new(family, weight)) {
            return font;
        }

        // Snap to 400 or 700
        let snapped = if weight >= 600 { 700 } else { 400 };
        if let Some(font) = self.fonts.get(&FontKey::new(family, snapped)) {
            return font;
        }

        // Closest registered weight of the same family
        let wanted = FontKey::new(family, weight).family;
        let closest = self
            .fonts
            .iter()
            .filter(|(key, _)| key.family == wanted)
            .min_by_key(|(key, _)| (key.weight.abs_diff(weight), key.weight));
        if let Some((_, font)) = closest {
            return font;
        }

        match self.fonts.get(&FontKey::new("Helvetica", snapped)) {
            Some(font) => font,
            None => &FALLBACK[usize::from(snapped == 700)],
        }
    }

    /// Register a TrueType/OpenType font under `family` and `weight`.
    ///
    /// The bytes are validated up front so measurement never meets an
    /// unparseable face.
    pub fn register(&mut self, family: &str, weight: u32, data: Vec<u8>) -> Result<()> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| PlacardError::Font(format!("{family} ({weight}): {e}")))?;
        let font = FontData::Custom {
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
            data: Arc::new(data),
        };
        debug!(family, weight, "registered font");
        self.fonts.insert(FontKey::new(family, weight), font);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FontKey, &FontData)> {
        self.fonts.iter()
    }
}

static FALLBACK: [FontData; 2] = [
    FontData::Standard(StandardFont::Helvetica),
    FontData::Standard(StandardFont::HelveticaBold),
];

/// Text measurement over a [`FontRegistry`].
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Register a font file. See [`FontRegistry::register`].
    pub fn register(&mut self, family: &str, weight: u32, data: Vec<u8>) -> Result<()> {
        self.registry.register(family, weight, data)
    }

    /// Measure the width of a string in pixels.
    pub fn measure_string(&self, text: &str, family: &str, weight: u32, font_size: f64) -> f64 {
        match self.registry.resolve(family, weight) {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font_size),
            FontData::Custom {
                data, units_per_em, ..
            } => match shaping::shape_text(text, data) {
                Some(glyphs) => shaping::shaped_width(&glyphs, *units_per_em, font_size),
                None => {
                    warn!(family, "shaping failed, measuring with Helvetica");
                    StandardFont::for_weight(weight)
                        .metrics()
                        .measure_string(text, font_size)
                }
            },
        }
    }

    pub fn resolve(&self, family: &str, weight: u32) -> &FontData {
        self.registry.resolve(family, weight)
    }

    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FontRegistry {
        &mut self.registry
    }
}

impl TextMeasurer for FontContext {
    fn measure(&self, font: &FontSpec, text: &str) -> Result<TextMetrics> {
        if !font.size.is_finite() || font.size < 0.0 {
            return Err(PlacardError::Measure(format!(
                "font size {} for {:?} is not a usable size",
                font.size, font.face
            )));
        }
        let width = self.measure_string(text, &font.face, font.weight, font.size);
        let (ascent, descent) = match self.registry.resolve(&font.face, font.weight) {
            FontData::Standard(std_font) => {
                let m = std_font.metrics();
                (m.ascent(font.size), m.descent(font.size))
            }
            FontData::Custom {
                units_per_em,
                ascender,
                descender,
                ..
            } => {
                let scale = font.size / (*units_per_em).max(1) as f64;
                (*ascender as f64 * scale, -(*descender as f64) * scale)
            }
        };
        Ok(TextMetrics {
            width,
            ascent,
            descent,
        })
    }
}

/// A measurer where every character advances by the same fraction of the
/// font size. Ascent and descent are fractions of the size as well.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvance {
    pub advance: f64,
    pub ascent: f64,
    pub descent: f64,
}

impl Default for FixedAdvance {
    fn default() -> Self {
        Self {
            advance: 0.5,
            ascent: 0.75,
            descent: 0.25,
        }
    }
}

impl TextMeasurer for FixedAdvance {
    fn measure(&self, font: &FontSpec, text: &str) -> Result<TextMetrics> {
        Ok(TextMetrics {
            width: text.chars().count() as f64 * self.advance * font.size,
            ascent: self.ascent * font.size,
            descent: self.descent * font.size,
        })
    }
}
