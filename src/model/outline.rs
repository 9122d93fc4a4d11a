//! Outline types: heading levels, sections and per-document outlines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outline level of a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// All levels, largest first.
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3];

    /// Level for a zero-based rank (0 -> H1). Ranks past H3 have no level.
    pub fn from_rank(rank: usize) -> Option<Self> {
        Self::ALL.get(rank).copied()
    }

    /// The label used in reports (`"H1"`, `"H2"`, `"H3"`).
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A heading plus the body text that follows it on the same page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Outline level
    pub level: HeadingLevel,

    /// Heading text, possibly several merged heading lines
    pub text: String,

    /// Page of the first heading line (1-indexed)
    pub page: u32,

    /// Body lines after the heading, joined with single spaces
    pub content: String,
}

impl Section {
    /// Create a section without body text.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
            content: String::new(),
        }
    }

    /// Set the body text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Whether `other` continues this heading: same level, same page, and no
    /// body line between the two.
    pub fn continues_with(&self, other: &Section) -> bool {
        self.level == other.level && self.page == other.page && self.content.is_empty()
    }

    /// Absorb a following section: heading texts and contents are joined with a space.
    pub fn absorb(&mut self, other: Section) {
        self.text = join_nonempty(&self.text, &other.text);
        self.content = join_nonempty(&self.content, &other.content);
    }
}

fn join_nonempty(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{} {}", a, b),
    }
}

/// Title and sections of one document, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Document title (empty when none was found)
    pub title: String,

    /// Sections in page order
    pub sections: Vec<Section>,
}

impl Outline {
    /// Create an empty outline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no section was detected.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }
}

/// An outline tagged with the document it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOutline {
    /// Document identifier (file name)
    pub document: String,

    /// The document's outline
    pub outline: Outline,
}

impl DocumentOutline {
    pub fn new(document: impl Into<String>, outline: Outline) -> Self {
        Self {
            document: document.into(),
            outline,
        }
    }
}
