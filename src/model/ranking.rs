//! Ranking results.

use super::Section;

/// A section with its relevance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSection {
    /// Document the section came from
    pub document: String,

    /// The section, content included
    pub section: Section,

    /// Cosine similarity between the query and the section heading
    pub relevance_score: f32,

    /// 1-based position in the ranked list
    pub importance_rank: usize,
}

/// A sentence taken from a top-ranked section.
#[derive(Debug, Clone, PartialEq)]
pub struct SubSectionHit {
    /// Document the sentence came from
    pub document: String,

    /// Heading text of the section the sentence belongs to
    pub original_section_title: String,

    /// The sentence, trimmed
    pub refined_text: String,

    /// Page of the owning section
    pub page: u32,

    /// Cosine similarity between the query and the sentence
    pub relevance_score: f32,
}
