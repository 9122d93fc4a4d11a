//! Line classification from font-size statistics.
//!
//! Headings are found purely typographically: the document's largest (or most
//! frequent) font sizes other than the title's become outline levels, and a line
//! set in one of those sizes is a heading if it is also short and not
//! sentence-terminated.

use std::collections::BTreeMap;

use crate::model::{FontSize, HeadingLevel, PageText, TextLine};

/// Longest line, in words, that can still be a heading.
pub const MAX_HEADING_WORDS: usize = 15;

/// Number of outline levels (H1..H3).
pub const MAX_HEADING_LEVELS: usize = 3;

/// How candidate heading sizes are picked from the histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeRanking {
    /// The largest distinct sizes
    #[default]
    Largest,
    /// The most frequent distinct sizes, then ordered by size
    MostFrequent,
}

/// Heuristic thresholds for heading detection.
#[derive(Debug, Clone)]
pub struct HeadingRules {
    /// Lines with more words than this are never headings
    pub max_heading_words: usize,

    /// Reject lines whose trimmed text ends with '.'
    pub reject_terminal_period: bool,

    /// Number of font sizes mapped to levels (1-3)
    pub max_levels: usize,

    /// How heading sizes are selected
    pub size_ranking: SizeRanking,
}

impl HeadingRules {
    /// Create rules with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the word limit for headings.
    pub fn with_max_heading_words(mut self, words: usize) -> Self {
        self.max_heading_words = words;
        self
    }

    /// Enable or disable the trailing-period filter.
    pub fn with_terminal_period_filter(mut self, reject: bool) -> Self {
        self.reject_terminal_period = reject;
        self
    }

    /// Set the number of heading levels (clamped to 1-3).
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels.clamp(1, MAX_HEADING_LEVELS);
        self
    }

    /// Set how heading sizes are selected.
    pub fn with_size_ranking(mut self, ranking: SizeRanking) -> Self {
        self.size_ranking = ranking;
        self
    }

    /// Whether a line has the shape of a heading: short and not sentence-terminated.
    pub fn is_heading_shaped(&self, line: &TextLine) -> bool {
        line.word_count() <= self.max_heading_words
            && !(self.reject_terminal_period && line.text.trim().ends_with('.'))
    }
}

impl Default for HeadingRules {
    fn default() -> Self {
        Self {
            max_heading_words: MAX_HEADING_WORDS,
            reject_terminal_period: true,
            max_levels: MAX_HEADING_LEVELS,
            size_ranking: SizeRanking::Largest,
        }
    }
}

/// Glyph counts per font size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontHistogram {
    counts: BTreeMap<FontSize, usize>,
}

impl FontHistogram {
    /// Count a stream of glyph sizes.
    pub fn from_sizes(sizes: impl IntoIterator<Item = FontSize>) -> Self {
        let mut counts = BTreeMap::new();
        for size in sizes {
            *counts.entry(size).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Histogram over every glyph of every page.
    pub fn from_pages(pages: &[PageText]) -> Self {
        Self::from_sizes(pages.iter().flat_map(|p| p.char_sizes()))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Occurrences of a size.
    pub fn count(&self, size: FontSize) -> usize {
        self.counts.get(&size).copied().unwrap_or(0)
    }

    /// Largest size seen.
    pub fn max_size(&self) -> Option<FontSize> {
        self.counts.keys().next_back().copied()
    }

    /// Distinct sizes, largest first.
    pub fn sizes_descending(&self) -> Vec<FontSize> {
        self.counts.keys().rev().copied().collect()
    }

    /// Distinct sizes, most frequent first; ties go to the larger size.
    pub fn sizes_by_frequency(&self) -> Vec<FontSize> {
        let mut sizes: Vec<(FontSize, usize)> =
            self.counts.iter().map(|(&s, &c)| (s, c)).collect();
        sizes.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
        sizes.into_iter().map(|(s, _)| s).collect()
    }
}

/// Font size to outline level, for one document.
///
/// Holds at most [`MAX_HEADING_LEVELS`] entries; larger sizes get higher levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelMap {
    levels: BTreeMap<FontSize, HeadingLevel>,
}

impl LevelMap {
    /// Build the map from a document histogram, never mapping `title_size`.
    pub fn build(
        histogram: &FontHistogram,
        title_size: Option<FontSize>,
        rules: &HeadingRules,
    ) -> Self {
        let limit = rules.max_levels.clamp(1, MAX_HEADING_LEVELS);
        let candidates = match rules.size_ranking {
            SizeRanking::Largest => histogram.sizes_descending(),
            SizeRanking::MostFrequent => histogram.sizes_by_frequency(),
        };

        let mut chosen: Vec<FontSize> = candidates
            .into_iter()
            .filter(|&s| Some(s) != title_size)
            .take(limit)
            .collect();
        chosen.sort_by(|a, b| b.cmp(a));

        let levels = chosen
            .into_iter()
            .enumerate()
            .filter_map(|(rank, size)| HeadingLevel::from_rank(rank).map(|level| (size, level)))
            .collect();
        Self { levels }
    }

    /// Level assigned to a size, if any.
    pub fn level_for(&self, size: FontSize) -> Option<HeadingLevel> {
        self.levels.get(&size).copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Entries, H1 first.
    pub fn iter(&self) -> impl Iterator<Item = (FontSize, HeadingLevel)> + '_ {
        self.levels.iter().rev().map(|(&s, &l)| (s, l))
    }
}

/// The title found on the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleLine {
    /// Largest glyph size on the first page
    pub size: Option<FontSize>,

    /// Index of the title line on the first page
    pub line_index: Option<usize>,

    /// Trimmed title text (empty when no line starts with the title size)
    pub text: String,
}

/// Find the title: the first line of the page that starts in the page's largest size.
pub fn detect_title(first_page: &PageText) -> TitleLine {
    let size = match FontHistogram::from_sizes(first_page.char_sizes()).max_size() {
        Some(size) => size,
        None => return TitleLine::default(),
    };

    let found = first_page
        .lines
        .iter()
        .enumerate()
        .find(|(_, line)| line.leading_font_size() == Some(size));

    match found {
        Some((index, line)) => TitleLine {
            size: Some(size),
            line_index: Some(index),
            text: line.text.trim().to_string(),
        },
        None => TitleLine {
            size: Some(size),
            line_index: None,
            text: String::new(),
        },
    }
}

/// What a line is, as far as the outline is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Empty or glyph-less; dropped
    Noise,
    /// The document title line
    Title,
    /// A heading at the given level
    Heading(HeadingLevel),
    /// Body text for the open section
    Body,
}

/// Classifies the lines of one document.
#[derive(Debug, Clone)]
pub struct LineClassifier<'a> {
    level_map: &'a LevelMap,
    rules: &'a HeadingRules,
}

impl<'a> LineClassifier<'a> {
    pub fn new(level_map: &'a LevelMap, rules: &'a HeadingRules) -> Self {
        Self { level_map, rules }
    }

    /// Classify one line (the title line is tagged by [`Self::classify_page`]).
    pub fn classify(&self, line: &TextLine) -> LineClass {
        let text = line.text.trim();
        let size = match line.leading_font_size() {
            Some(size) if !text.is_empty() => size,
            _ => return LineClass::Noise,
        };

        match self.level_map.level_for(size) {
            Some(level) if self.rules.is_heading_shaped(line) => LineClass::Heading(level),
            _ => LineClass::Body,
        }
    }

    /// Classify every line of a page; `title_line` is the index of the title line
    /// when this is the first page.
    pub fn classify_page(&self, page: &PageText, title_line: Option<usize>) -> Vec<LineClass> {
        page.lines
            .iter()
            .enumerate()
            .map(|(i, line)| match self.classify(line) {
                LineClass::Noise => LineClass::Noise,
                _ if Some(i) == title_line => LineClass::Title,
                class => class,
            })
            .collect()
    }
}
