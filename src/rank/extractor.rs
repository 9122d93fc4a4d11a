//! Sentence-level hits from the best sections.

use crate::error::Result;
use crate::model::{ScoredSection, SubSectionHit};

use super::embed::{embed_all, Embedder, EncodedQuery};
use super::options::RankOptions;
use super::scorer::descending_score;
use super::segment::SentenceSegmenter;

/// Mines the top-ranked sections for the sentences closest to the query.
pub struct SubSectionExtractor<'a> {
    embedder: &'a dyn Embedder,
    segmenter: &'a dyn SentenceSegmenter,
    options: RankOptions,
}

impl<'a> SubSectionExtractor<'a> {
    pub fn new(embedder: &'a dyn Embedder, segmenter: &'a dyn SentenceSegmenter) -> Self {
        Self {
            embedder,
            segmenter,
            options: RankOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RankOptions) -> Self {
        self.options = options;
        self
    }

    /// Best sentences of the first `sections_for_analysis` ranked sections,
    /// highest score first, at most `max_sub_sections` of them.
    pub fn extract(
        &self,
        ranked: &[ScoredSection],
        query: &EncodedQuery,
    ) -> Result<Vec<SubSectionHit>> {
        let mut top: Vec<&ScoredSection> = ranked.iter().collect();
        top.sort_by_key(|s| s.importance_rank);
        top.truncate(self.options.sections_for_analysis);

        let mut hits = Vec::new();
        for scored in top {
            let sentences: Vec<String> = self
                .segmenter
                .segment(&scored.section.content)
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if sentences.is_empty() {
                continue;
            }

            let texts: Vec<&str> = sentences.iter().map(String::as_str).collect();
            let vectors = embed_all(self.embedder, &texts)?;
            for (sentence, vector) in sentences.into_iter().zip(vectors) {
                hits.push(SubSectionHit {
                    document: scored.document.clone(),
                    original_section_title: scored.section.text.clone(),
                    refined_text: sentence,
                    page: scored.section.page,
                    relevance_score: query.similarity(&vector),
                });
            }
        }

        hits.sort_by(|a, b| descending_score(a.relevance_score, b.relevance_score));
        hits.truncate(self.options.max_sub_sections);
        log::debug!("{} sub-section hits", hits.len());
        Ok(hits)
    }
}
