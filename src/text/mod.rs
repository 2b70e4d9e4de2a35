//! # Text Layout
//!
//! Greedy line breaking over an external measurement provider.
//!
//! The same routine serves two callers: the size negotiator probes a paragraph
//! at extreme widths to learn its flexibility, and the resolver lays it out at
//! the width it was finally allotted. Because the breaker is greedy and only
//! ever shortens a candidate until it fits, re-wrapping at the width a probe
//! reported yields exactly the lines the probe saw.

pub mod shaping;

use tracing::trace;

use crate::error::Result;
use crate::style::{FontSpec, TextAlign};

/// Horizontal and vertical extents of a measured substring.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f64,
    /// Distance from the top of the line box to the baseline.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f64,
}

impl TextMetrics {
    pub fn line_height(&self) -> f64 {
        self.ascent + self.descent
    }
}

/// The text-measurement collaborator.
///
/// Implementations must be deterministic: the same font and substring always
/// measure the same, otherwise probes and final layout disagree.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, font: &FontSpec, text: &str) -> Result<TextMetrics>;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, font: &FontSpec, text: &str) -> Result<TextMetrics> {
        (**self).measure(font, text)
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for std::sync::Arc<T> {
    fn measure(&self, font: &FontSpec, text: &str) -> Result<TextMetrics> {
        (**self).measure(font, text)
    }
}

/// One wrapped line.
///
/// Coordinates are relative to the paragraph origin when produced by
/// [`TextLayout::layout_paragraph`], and absolute once the resolver has placed
/// the paragraph on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// X of the line's left edge.
    pub left: f64,
    pub top: f64,
    pub baseline: f64,
    pub bottom: f64,
    /// Measured width of `text`.
    pub width: f64,
}

/// A wrapped paragraph. `width` is the longest line, `height` the sum of
/// line heights; the paragraph box is `[0, width] × [0, height]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub lines: Vec<TextLine>,
    pub width: f64,
    pub height: f64,
}

impl Paragraph {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Wrap `text` into lines no wider than `max_width`.
    ///
    /// The text is trimmed first. Text that is empty after trimming produces
    /// an empty paragraph.
    ///
    /// A `max_width` below one pixel (or NaN) also produces an empty
    /// paragraph, even for non-empty text: no lines are emitted and nothing is
    /// placed. A text node squeezed to under a pixel by an oversubscribed
    /// stack is therefore skipped rather than broken into one character per
    /// line.
    pub fn layout_paragraph(
        &self,
        measurer: &dyn TextMeasurer,
        text: &str,
        font: &FontSpec,
        align: TextAlign,
        max_width: f64,
    ) -> Result<Paragraph> {
        let text = text.trim();
        if text.is_empty() || !(max_width >= 1.0) {
            return Ok(Paragraph::default());
        }

        let mut lines: Vec<TextLine> = Vec::new();
        let mut top = 0.0;
        let mut longest: f64 = 0.0;
        let mut start = 0;

        while start < text.len() {
            let rest = &text[start..];
            let skipped = rest.len() - rest.trim_start().len();
            start += skipped;
            if start >= text.len() {
                break;
            }
            let rest = &text[start..];

            let whole = measurer.measure(font, rest)?;
            let (consumed, metrics) = if whole.width <= max_width {
                (rest.len(), whole)
            } else {
                self.fit_prefix(measurer, rest, font, max_width)?
            };

            let slice = &rest[..consumed];
            let slack = (max_width - metrics.width).max(0.0);
            let left = match align {
                TextAlign::Leading => 0.0,
                TextAlign::Center => slack / 2.0,
                TextAlign::Trailing => slack,
            };
            let height = metrics.line_height();
            trace!(line = lines.len(), text = slice, width = metrics.width, "wrapped line");
            lines.push(TextLine {
                text: slice.to_string(),
                left,
                top,
                baseline: top + metrics.ascent,
                bottom: top + height,
                width: metrics.width,
            });
            top += height;
            longest = longest.max(metrics.width);
            start += consumed;
        }

        Ok(Paragraph {
            lines,
            width: longest,
            height: top,
        })
    }

    /// Find the longest prefix of `rest` that fits, given that all of it does not.
    ///
    /// Prefixes ending at whitespace are tried from the last one backwards.
    /// If no word boundary fits, the first word loses one trailing character
    /// at a time; a lone character that still overflows is taken anyway so
    /// every line consumes at least one character.
    fn fit_prefix(
        &self,
        measurer: &dyn TextMeasurer,
        rest: &str,
        font: &FontSpec,
        max_width: f64,
    ) -> Result<(usize, TextMetrics)> {
        let mut boundaries: Vec<usize> = Vec::new();
        for (i, ch) in rest.char_indices() {
            if i > 0 && ch.is_whitespace() {
                let end = rest[..i].trim_end().len();
                if end > 0 && boundaries.last() != Some(&end) {
                    boundaries.push(end);
                }
            }
        }

        for &end in boundaries.iter().rev() {
            let metrics = measurer.measure(font, &rest[..end])?;
            if metrics.width <= max_width {
                return Ok((end, metrics));
            }
        }

        let word_end = boundaries.first().copied().unwrap_or(rest.len());
        let word = &rest[..word_end];
        let mut ends: Vec<usize> = word.char_indices().map(|(i, _)| i).skip(1).collect();
        // The full word may only be tried here when the remainder has no break.
        if word_end < rest.len() {
            ends.push(word_end);
        }
        for &end in ends.iter().rev() {
            let metrics = measurer.measure(font, &word[..end])?;
            if metrics.width <= max_width {
                return Ok((end, metrics));
            }
        }

        let first = word.chars().next().map(char::len_utf8).unwrap_or(word.len());
        let metrics = measurer.measure(font, &word[..first])?;
        Ok((first, metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlacardError;
    use crate::font::FixedAdvance;

    fn font() -> FontSpec {
        // 10px per character, 20px line height.
        FontSpec::new("Mono", 20.0, 400)
    }

    fn wrap(text: &str, width: f64, align: TextAlign) -> Paragraph {
        TextLayout::new()
            .layout_paragraph(&FixedAdvance::default(), text, &font(), align, width)
            .unwrap()
    }

    fn texts(p: &Paragraph) -> Vec<&str> {
        p.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn single_line_when_it_fits() {
        let p = wrap("Hello world", 500.0, TextAlign::Leading);
        assert_eq!(texts(&p), vec!["Hello world"]);
        assert_eq!(p.width, 110.0);
        assert_eq!(p.height, 20.0);
    }

    #[test]
    fn wraps_at_last_fitting_word_boundary() {
        // "The quick" is 90px wide; "The quick brown" is 150px.
        let p = wrap("The quick brown fox", 100.0, TextAlign::Leading);
        assert_eq!(texts(&p), vec!["The quick", "brown fox"]);
        assert_eq!(p.lines[1].top, p.lines[0].bottom - p.lines[0].top);
        assert_eq!(p.lines[1].top, 20.0);
        assert_eq!(p.lines[0].baseline, 15.0);
        assert_eq!(p.lines[1].baseline, 35.0);
        assert_eq!(p.height, 40.0);
    }

    #[test]
    fn leading_whitespace_is_not_part_of_a_line() {
        let p = wrap("  aa    bb  ", 30.0, TextAlign::Leading);
        assert_eq!(texts(&p), vec!["aa", "bb"]);
    }

    #[test]
    fn long_word_is_split_by_characters() {
        let p = wrap("abcdefgh", 30.0, TextAlign::Leading);
        assert_eq!(texts(&p), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn long_first_word_splits_before_later_words() {
        let p = wrap("abcdef gh", 40.0, TextAlign::Leading);
        assert_eq!(texts(&p), vec!["abcd", "ef", "gh"]);
    }

    #[test]
    fn overflowing_character_still_makes_progress() {
        let p = wrap("ab", 5.0, TextAlign::Leading);
        assert_eq!(texts(&p), vec!["a", "b"]);
        assert_eq!(p.width, 10.0);
    }

    #[test]
    fn narrow_widths_and_blank_text_produce_nothing() {
        assert!(wrap("abc", 0.5, TextAlign::Leading).is_empty());
        assert!(wrap("abc", f64::NAN, TextAlign::Leading).is_empty());
        let p = wrap("   \n\t ", 100.0, TextAlign::Leading);
        assert!(p.is_empty());
        assert_eq!((p.width, p.height), (0.0, 0.0));
    }

    #[test]
    fn alignment_offsets_lines() {
        let p = wrap("ab cdef", 50.0, TextAlign::Trailing);
        assert_eq!(texts(&p), vec!["ab", "cdef"]);
        assert_eq!(p.lines[0].left, 30.0);
        assert_eq!(p.lines[1].left, 10.0);

        let p = wrap("ab cdef", 50.0, TextAlign::Center);
        assert_eq!(p.lines[0].left, 15.0);
        assert_eq!(p.lines[1].left, 5.0);
    }

    #[test]
    fn rewrapping_each_line_at_its_width_is_stable() {
        let p = wrap(
            "Sphinx of black quartz, judge my vow and then some more words",
            130.0,
            TextAlign::Leading,
        );
        assert!(p.lines.len() > 2);
        for line in &p.lines {
            let again = wrap(&line.text, line.width, TextAlign::Leading);
            assert_eq!(texts(&again), vec![line.text.as_str()]);
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let p = wrap("ééééé", 20.0, TextAlign::Leading);
        assert_eq!(texts(&p), vec!["éé", "éé", "é"]);
    }

    struct Failing;

    impl TextMeasurer for Failing {
        fn measure(&self, _font: &FontSpec, _text: &str) -> Result<TextMetrics> {
            Err(PlacardError::Measure("no font".to_string()))
        }
    }

    #[test]
    fn measurement_failures_propagate() {
        let result =
            TextLayout::new().layout_paragraph(&Failing, "abc", &font(), TextAlign::Leading, 100.0);
        assert!(matches!(result, Err(PlacardError::Measure(_))));
    }
}
