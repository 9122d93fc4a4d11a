//! Positioned text extraction from PDF content streams.
//!
//! Walks the text operators of a decoded content stream, producing spans that
//! carry position and effective font size, and groups spans into visual lines.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::error::{Error, Result};
use crate::model::{FontSize, TextLine};

use super::backend::decode_text_simple;

/// Advance of an average glyph, as a fraction of the font size.
const AVG_GLYPH_ADVANCE: f32 = 0.5;

/// TJ adjustments beyond this (thousandths of an em) are read as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A run of text shown by one operator.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Effective font size in points
    pub font_size: f32,
}

impl TextSpan {
    pub fn new(text: String, x: f32, y: f32, font_size: f32) -> Self {
        Self {
            text,
            x,
            y,
            font_size,
        }
    }

    /// Number of non-whitespace glyphs.
    pub fn glyph_count(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }

    /// Approximate width; glyph metrics are not consulted.
    pub fn estimated_width(&self) -> f32 {
        self.text.chars().count() as f32 * self.font_size * AVG_GLYPH_ADVANCE
    }

    fn right(&self) -> f32 {
        self.x + self.estimated_width()
    }
}

/// Extract spans from a decoded page content stream.
///
/// `fonts` maps the page's font resource names to their dictionaries; it is used
/// to resolve each font's encoding.
pub fn extract_spans(
    doc: &LopdfDocument,
    content: &[u8],
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
) -> Result<Vec<TextSpan>> {
    let content =
        lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

    let mut spans = Vec::new();
    let mut font_name: Vec<u8> = Vec::new();
    let mut font_size: f32 = 12.0;
    let mut matrix = TextMatrix::default();
    let mut in_text_block = false;

    let decode = |font_name: &[u8], bytes: &[u8]| -> String {
        fonts
            .get(font_name)
            .and_then(|f| f.get_font_encoding(doc).ok())
            .and_then(|enc| LopdfDocument::decode_text(&enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    };

    for op in content.operations {
        match op.operator.as_str() {
            "BT" => {
                in_text_block = true;
                matrix = TextMatrix::default();
            }
            "ET" => {
                in_text_block = false;
            }
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Object::Name(name) = &op.operands[0] {
                        font_name = name.clone();
                    }
                    font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(get_number) {
                    matrix.leading = leading;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        matrix.leading = -ty;
                    }
                    matrix.move_line(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    matrix.set(
                        get_number(&op.operands[0]).unwrap_or(1.0),
                        get_number(&op.operands[1]).unwrap_or(0.0),
                        get_number(&op.operands[2]).unwrap_or(0.0),
                        get_number(&op.operands[3]).unwrap_or(1.0),
                        get_number(&op.operands[4]).unwrap_or(0.0),
                        get_number(&op.operands[5]).unwrap_or(0.0),
                    );
                }
            }
            "T*" => matrix.next_line(),
            "Tj" | "TJ" | "'" | "\"" => {
                if matches!(op.operator.as_str(), "'" | "\"") {
                    matrix.next_line();
                }
                if !in_text_block {
                    continue;
                }

                let text = match op.operator.as_str() {
                    "TJ" => match op.operands.first() {
                        Some(Object::Array(items)) => {
                            let mut combined = String::new();
                            for item in items {
                                match item {
                                    Object::String(bytes, _) => {
                                        combined.push_str(&decode(font_name.as_slice(), bytes));
                                    }
                                    other => {
                                        if let Some(n) = get_number(other) {
                                            if -n > TJ_SPACE_THRESHOLD {
                                                push_word_space(&mut combined);
                                            }
                                        }
                                    }
                                }
                            }
                            combined
                        }
                        _ => String::new(),
                    },
                    operator => {
                        let idx = if operator == "\"" { 2 } else { 0 };
                        match op.operands.get(idx) {
                            Some(Object::String(bytes, _)) => decode(font_name.as_slice(), bytes),
                            _ => String::new(),
                        }
                    }
                };

                if text.trim().is_empty() {
                    continue;
                }
                let (x, y) = matrix.position();
                let span = TextSpan::new(text, x, y, font_size * matrix.scale());
                matrix.advance(span.estimated_width());
                spans.push(span);
            }
            _ => {}
        }
    }

    Ok(spans)
}

fn push_word_space(text: &mut String) {
    match text.chars().last() {
        Some(c) if c != ' ' && c != '\u{00A0}' && !is_spaceless_script_char(c) => text.push(' '),
        _ => {}
    }
}

/// Group spans into lines, top of the page first.
///
/// Spans whose baselines lie within 30% of the font size of the line's first span
/// share a line.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>, page: u32) -> Vec<TextLine> {
    spans.sort_by(|a, b| match b.y.partial_cmp(&a.y).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal),
        other => other,
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(build_line(std::mem::take(&mut current), page));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(build_line(current, page));
    }

    lines
}

/// Join the spans of one line, inserting spaces at visible gaps.
fn build_line(mut spans: Vec<TextSpan>, page: u32) -> TextLine {
    spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

    let mut text = String::new();
    let mut char_sizes = Vec::new();

    for (i, span) in spans.iter().enumerate() {
        if i > 0 {
            let prev = &spans[i - 1];
            let gap = span.x - prev.right();
            let already_spaced = text.ends_with(' ')
                || text.ends_with('\u{00A0}')
                || span.text.starts_with(' ')
                || span.text.starts_with('\u{00A0}');
            let both_spaceless = matches!(
                (text.chars().last(), span.text.chars().next()),
                (Some(a), Some(b)) if is_spaceless_script_char(a) && is_spaceless_script_char(b)
            );
            if gap > prev.font_size * 0.1 && !already_spaced && !both_spaceless {
                text.push(' ');
            }
        }
        text.push_str(&span.text);
        let size = FontSize::from_points(span.font_size);
        char_sizes.extend(std::iter::repeat(size).take(span.glyph_count()));
    }

    TextLine {
        text,
        page,
        char_sizes,
    }
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    line_e: f32,
    line_f: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
        self.line_e = e;
        self.line_f = f;
    }

    /// Move to the start of the next line, offset from the start of the current one.
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Move along the baseline after showing text (in text space units).
    fn advance(&mut self, width: f32) {
        self.e += width;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.b * self.b + self.d * self.d).sqrt()
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if a character belongs to a script written without word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32, size: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, size)
    }

    #[test]
    fn test_group_spans_top_to_bottom() {
        let spans = vec![
            span("Body", 72.0, 600.0, 12.0),
            span("Title", 72.0, 750.0, 24.0),
            span("Heading", 72.0, 700.0, 18.0),
        ];
        let lines = group_spans_into_lines(spans, 3);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Title", "Heading", "Body"]);
        assert!(lines.iter().all(|l| l.page == 3));
    }

    #[test]
    fn test_spans_on_same_baseline_share_a_line() {
        // "Hello" at 12pt is estimated 30pt wide, leaving a clear gap before "World".
        let spans = vec![
            span("World", 110.0, 700.5, 12.0),
            span("Hello", 72.0, 700.0, 12.0),
        ];
        let lines = group_spans_into_lines(spans, 1);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Hello World");
        assert_eq!(lines[0].char_sizes.len(), 10);
    }

    #[test]
    fn test_adjacent_fragments_are_not_spaced() {
        let spans = vec![span("Intro", 72.0, 700.0, 10.0), span("duction", 97.0, 700.0, 10.0)];
        let lines = group_spans_into_lines(spans, 1);
        assert_eq!(lines[0].text, "Introduction");
    }

    #[test]
    fn test_leading_size_is_leftmost_span() {
        let spans = vec![span("big", 200.0, 700.0, 12.0), span("1.", 72.0, 700.0, 18.0)];
        let lines = group_spans_into_lines(spans, 1);
        assert_eq!(
            lines[0].leading_font_size(),
            Some(FontSize::from_points(18.0))
        );
    }

    #[test]
    fn test_cjk_not_spaced() {
        let spans = vec![span("漢字", 72.0, 700.0, 12.0), span("仮名", 120.0, 700.0, 12.0)];
        let lines = group_spans_into_lines(spans, 1);
        assert_eq!(lines[0].text, "漢字仮名");
    }

    #[test]
    fn test_text_matrix_lines() {
        let mut m = TextMatrix::default();
        m.move_line(72.0, 700.0);
        m.advance(40.0);
        assert_eq!(m.position(), (112.0, 700.0));
        m.next_line();
        assert_eq!(m.position(), (72.0, 688.0));
    }

    #[test]
    fn test_text_matrix_vertical_scale() {
        let mut m = TextMatrix::default();
        assert_eq!(m.scale(), 1.0);
        m.set(2.0, 0.0, 0.0, 3.0, 10.0, 20.0);
        assert_eq!(m.scale(), 3.0);
        assert_eq!(m.position(), (10.0, 20.0));
    }

    #[test]
    fn test_push_word_space() {
        let mut text = "word".to_string();
        push_word_space(&mut text);
        push_word_space(&mut text);
        assert_eq!(text, "word ");

        let mut empty = String::new();
        push_word_space(&mut empty);
        assert!(empty.is_empty());
    }
}
