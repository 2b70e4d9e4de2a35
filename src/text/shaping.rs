//! # OpenType Shaping
//!
//! Wraps rustybuzz so font-file measurement sees real advances: kerning
//! pairs and ligature substitutions change a run's width, and the greedy
//! breaker must agree with whatever eventually paints the run.
//!
//! The built-in Helvetica tables have no GSUB/GPOS data and bypass shaping.

/// A glyph's horizontal contribution after shaping.
#[derive(Debug, Clone, Copy)]
pub struct ShapedGlyph {
    pub glyph_id: u16,
    /// Byte offset of the first input character this glyph covers.
    pub cluster: u32,
    /// Horizontal advance in font units.
    pub x_advance: i32,
}

/// Shape a left-to-right run with the face in `font_data`.
///
/// Returns `None` if the font data can't be parsed.
pub fn shape_text(text: &str, font_data: &[u8]) -> Option<Vec<ShapedGlyph>> {
    let face = rustybuzz::Face::from_slice(font_data, 0)?;
    let mut buffer = rustybuzz::UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.set_direction(rustybuzz::Direction::LeftToRight);

    let output = rustybuzz::shape(&face, &[], buffer);
    let glyphs = output
        .glyph_infos()
        .iter()
        .zip(output.glyph_positions())
        .map(|(info, pos)| ShapedGlyph {
            glyph_id: info.glyph_id as u16,
            cluster: info.cluster,
            x_advance: pos.x_advance,
        })
        .collect();
    Some(glyphs)
}

/// Total advance of shaped glyphs in pixels at `font_size`.
pub fn shaped_width(glyphs: &[ShapedGlyph], units_per_em: u16, font_size: f64) -> f64 {
    if units_per_em == 0 {
        return 0.0;
    }
    let scale = font_size / units_per_em as f64;
    glyphs.iter().map(|g| g.x_advance as f64 * scale).sum()
}
