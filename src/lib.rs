//! # docrank
//!
//! Persona-driven PDF outline extraction and section relevance ranking.
//!
//! The library rebuilds the heading structure of PDF documents from font sizes
//! (a title plus H1-H3 sections with their body text), then ranks sections and
//! their sentences by similarity to a persona and a task.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docrank::{extract_outline, render, Analyzer};
//!
//! fn main() -> docrank::Result<()> {
//!     // Outline of one PDF
//!     let outline = extract_outline("report.pdf")?;
//!     for section in &outline.sections {
//!         println!("{} {} (p. {})", section.level, section.text, section.page);
//!     }
//!
//!     // Rank every PDF of a directory against its persona.json
//!     let report = Analyzer::new().analyze_dir("./input")?;
//!     println!("{}", render::to_json(&report, render::JsonFormat::Pretty)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typographic outlines**: title and up to three heading levels from font-size statistics
//! - **Cross-document ranking**: section headings scored against one persona query
//! - **Sentence mining**: best sentences from the top-ranked sections
//! - **Pluggable backends**: text layer, embedder and sentence segmenter are traits
//! - **Parallel processing**: documents are parsed and embedded on the rayon pool
//! - **Offline by default**: deterministic hashing embedder, `fastembed` feature for ONNX models

pub mod analyze;
pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod outline;
pub mod parser;
pub mod rank;
pub mod render;

// Re-export commonly used types
pub use analyze::{collect_pdfs, document_name, Analyzer};
pub use config::PERSONA_FILE;
pub use detect::{has_pdf_extension, pdf_version_from_bytes, pdf_version_from_path};
pub use error::{Error, Result};
pub use model::{
    AnalysisRequest, DocumentOutline, FontSize, HeadingLevel, JobToBeDone, Outline, PageText,
    Persona, Query, ScoredSection, Section, SubSectionHit, TextLine,
};
pub use outline::{build_outline, HeadingRules, SizeRanking};
pub use parser::{ErrorMode, LopdfTextLayer, ParseOptions, TextLayer};
#[cfg(feature = "fastembed")]
pub use rank::FastEmbedder;
pub use rank::{
    Embedder, HashingEmbedder, RankOptions, SentenceSegmenter, UnicodeSentenceSegmenter,
};
pub use render::{JsonFormat, OutlineReport, Report};

use std::path::Path;

/// Extract the outline of a PDF file.
///
/// # Example
///
/// ```no_run
/// use docrank::extract_outline;
///
/// let outline = extract_outline("document.pdf").unwrap();
/// println!("Title: {}", outline.title);
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<Outline> {
    DocRank::new().outline(path).map(|result| result.outline)
}

/// Extract the outline of a PDF held in memory.
pub fn extract_outline_from_bytes(data: &[u8]) -> Result<Outline> {
    DocRank::new().outline_bytes(data).map(|result| result.outline)
}

/// Extract the outline of a PDF file as `{"title", "outline"}` JSON.
///
/// # Example
///
/// ```no_run
/// use docrank::{outline_to_json, JsonFormat};
///
/// let json = outline_to_json("document.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("document.json", json).unwrap();
/// ```
pub fn outline_to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    DocRank::new().outline(path)?.to_json(format)
}

/// Rank every PDF in a directory against the directory's `persona.json`
/// (or the built-in request when there is none).
pub fn analyze_dir<P: AsRef<Path>>(dir: P) -> Result<Report> {
    DocRank::new().analyze_dir(dir)
}

/// Builder for outline extraction and analysis runs.
///
/// # Example
///
/// ```no_run
/// use docrank::DocRank;
///
/// let json = DocRank::new()
///     .with_max_heading_words(12)
///     .sequential()
///     .outline("document.pdf")?
///     .to_json(docrank::JsonFormat::Compact)?;
/// # Ok::<(), docrank::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocRank {
    parse_options: ParseOptions,
    heading_rules: HeadingRules,
    rank_options: RankOptions,
}

impl DocRank {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first unreadable page instead of skipping it.
    pub fn strict(mut self) -> Self {
        self.parse_options = self.parse_options.with_error_mode(ErrorMode::Strict);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parse_options = self.parse_options.sequential();
        self.rank_options = self.rank_options.with_parallel(false);
        self
    }

    /// Replace the heading heuristics.
    pub fn with_heading_rules(mut self, rules: HeadingRules) -> Self {
        self.heading_rules = rules;
        self
    }

    /// Set the longest line, in words, that can be a heading.
    pub fn with_max_heading_words(mut self, words: usize) -> Self {
        self.heading_rules = self.heading_rules.with_max_heading_words(words);
        self
    }

    /// Set how heading font sizes are chosen.
    pub fn with_size_ranking(mut self, ranking: SizeRanking) -> Self {
        self.heading_rules = self.heading_rules.with_size_ranking(ranking);
        self
    }

    /// Set how many top sections are mined for sentences.
    pub fn with_top_sections(mut self, sections: usize) -> Self {
        self.rank_options = self.rank_options.with_sections_for_analysis(sections);
        self
    }

    /// Set the maximum number of reported sentences.
    pub fn with_max_hits(mut self, hits: usize) -> Self {
        self.rank_options = self.rank_options.with_max_sub_sections(hits);
        self
    }

    /// Build an [`Analyzer`] with these settings and the default backends.
    pub fn analyzer(self) -> Analyzer {
        Analyzer::new()
            .with_parse_options(self.parse_options)
            .with_heading_rules(self.heading_rules)
            .with_rank_options(self.rank_options)
    }

    /// Extract the outline of a PDF file.
    pub fn outline<P: AsRef<Path>>(self, path: P) -> Result<OutlineResult> {
        let outline = self.analyzer().outline(path)?;
        Ok(OutlineResult { outline })
    }

    /// Extract the outline of a PDF held in memory.
    pub fn outline_bytes(self, data: &[u8]) -> Result<OutlineResult> {
        let pages = LopdfTextLayer::with_options(self.parse_options).pages_from_bytes(data)?;
        Ok(OutlineResult {
            outline: build_outline(&pages, &self.heading_rules),
        })
    }

    /// Analyze every PDF in a directory.
    pub fn analyze_dir<P: AsRef<Path>>(self, dir: P) -> Result<Report> {
        self.analyzer().analyze_dir(dir)
    }
}

/// Outline of one document.
#[derive(Debug, Clone)]
pub struct OutlineResult {
    /// The extracted outline
    pub outline: Outline,
}

impl OutlineResult {
    /// The `{"title", "outline"}` record (section content left out).
    pub fn to_report(&self) -> OutlineReport {
        OutlineReport::from(&self.outline)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.to_report(), format)
    }

    /// Get the outline.
    pub fn outline(&self) -> &Outline {
        &self.outline
    }
}
