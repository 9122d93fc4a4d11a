//! Positioned text produced by the PDF text layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A font size quantized to 0.1pt.
///
/// Sizes coming out of a content stream are floats that pass through matrix
/// arithmetic, so two glyphs set in "the same" size can differ in the last bits.
/// Quantizing gives a size that is `Eq + Ord + Hash` and can key a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FontSize(u32);

impl FontSize {
    /// Quantize a size in points. Negative and non-finite sizes become 0.
    pub fn from_points(points: f32) -> Self {
        if !points.is_finite() || points <= 0.0 {
            return Self(0);
        }
        Self((points * 10.0).round() as u32)
    }

    /// The size in points.
    pub fn points(self) -> f32 {
        self.0 as f32 / 10.0
    }
}

impl From<f32> for FontSize {
    fn from(points: f32) -> Self {
        Self::from_points(points)
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}pt", self.points())
    }
}

/// One visual line of text on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Line text as extracted (not trimmed)
    pub text: String,

    /// Page number (1-indexed)
    pub page: u32,

    /// Size of every glyph on the line, in reading order
    pub char_sizes: Vec<FontSize>,
}

impl TextLine {
    /// Create a line whose glyphs all share one size.
    ///
    /// Whitespace is not counted as a glyph.
    pub fn uniform(text: impl Into<String>, page: u32, size: f32) -> Self {
        let text = text.into();
        let size = FontSize::from_points(size);
        let char_sizes = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|_| size)
            .collect();
        Self {
            text,
            page,
            char_sizes,
        }
    }

    /// Size of the first glyph, used as the size of the whole line.
    pub fn leading_font_size(&self) -> Option<FontSize> {
        self.char_sizes.first().copied()
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether the line carries any glyphs at all.
    pub fn has_chars(&self) -> bool {
        !self.char_sizes.is_empty()
    }
}

/// Lines of one page, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// Page number (1-indexed)
    pub number: u32,

    /// Lines from top to bottom
    pub lines: Vec<TextLine>,
}

impl PageText {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            lines: Vec::new(),
        }
    }

    /// Append a line.
    pub fn push_line(&mut self, line: TextLine) {
        self.lines.push(line);
    }

    /// Sizes of every glyph on the page.
    pub fn char_sizes(&self) -> impl Iterator<Item = FontSize> + '_ {
        self.lines.iter().flat_map(|l| l.char_sizes.iter().copied())
    }

    /// Whether the page has no glyphs.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| !l.has_chars())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_size_quantization() {
        assert_eq!(FontSize::from_points(12.0), FontSize::from_points(12.000_01));
        assert_ne!(FontSize::from_points(12.0), FontSize::from_points(12.5));
        assert!(FontSize::from_points(18.0) > FontSize::from_points(12.0));
        assert_eq!(FontSize::from_points(f32::NAN), FontSize::from_points(0.0));
        assert!((FontSize::from_points(10.5).points() - 10.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_font_size_display() {
        assert_eq!(FontSize::from_points(11.0).to_string(), "11.0pt");
    }

    #[test]
    fn test_uniform_line() {
        let line = TextLine::uniform("Section One", 2, 18.0);
        assert_eq!(line.page, 2);
        assert_eq!(line.char_sizes.len(), 10);
        assert_eq!(line.leading_font_size(), Some(FontSize::from_points(18.0)));
        assert_eq!(line.word_count(), 2);
    }

    #[test]
    fn test_line_without_chars() {
        let line = TextLine::uniform("   ", 1, 12.0);
        assert!(!line.has_chars());
        assert_eq!(line.leading_font_size(), None);
        assert_eq!(line.word_count(), 0);
    }

    #[test]
    fn test_page_char_sizes() {
        let mut page = PageText::new(1);
        assert!(page.is_blank());
        page.push_line(TextLine::uniform("Ab", 1, 24.0));
        page.push_line(TextLine::uniform("c", 1, 12.0));
        let sizes: Vec<_> = page.char_sizes().collect();
        assert_eq!(sizes.len(), 3);
        assert!(!page.is_blank());
    }
}
