//! Outline extraction: title, heading levels and per-section body text.

mod builder;
mod classify;

pub use builder::{merge_continued_headings, OutlineBuilder};
pub use classify::{
    detect_title, FontHistogram, HeadingRules, LevelMap, LineClass, LineClassifier,
    SizeRanking, TitleLine, MAX_HEADING_LEVELS, MAX_HEADING_WORDS,
};

use crate::model::{Outline, PageText};

/// Build the outline of one document from its pages.
///
/// The font-size histogram and level map live only for the duration of this call.
/// A document without glyphs, or without any heading size, has an empty outline.
pub fn build_outline(pages: &[PageText], rules: &HeadingRules) -> Outline {
    let histogram = FontHistogram::from_pages(pages);
    if histogram.is_empty() {
        return Outline::new();
    }

    let title = pages.first().map(detect_title).unwrap_or_default();
    let level_map = LevelMap::build(&histogram, title.size, rules);
    log::debug!(
        "title {:?} ({}), levels: {}",
        title.text,
        title.size.map(|s| s.to_string()).unwrap_or_default(),
        level_map
            .iter()
            .map(|(size, level)| format!("{}={}", level, size))
            .collect::<Vec<_>>()
            .join(", ")
    );

    if level_map.is_empty() {
        return Outline {
            title: title.text,
            sections: Vec::new(),
        };
    }

    let classifier = LineClassifier::new(&level_map, rules);
    let mut builder = OutlineBuilder::new();
    for (i, page) in pages.iter().enumerate() {
        let title_line = if i == 0 { title.line_index } else { None };
        let classes = classifier.classify_page(page, title_line);
        for (line, class) in page.lines.iter().zip(classes) {
            builder.push(line, class);
        }
        builder.end_page();
    }

    Outline {
        title: title.text,
        sections: builder.finish(),
    }
}
