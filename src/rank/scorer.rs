//! Cross-document section ranking.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::error::Result;
use crate::model::{DocumentOutline, ScoredSection};

use super::embed::{embed_all, Embedder, EncodedQuery};

/// Scores section headings against the query and ranks them across documents.
pub struct RelevanceScorer<'a> {
    embedder: &'a dyn Embedder,
    parallel: bool,
}

impl<'a> RelevanceScorer<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self {
            embedder,
            parallel: false,
        }
    }

    /// Embed documents concurrently. The ranking does not depend on this.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Score every section heading of every document and rank them all together.
    pub fn score(
        &self,
        documents: &[DocumentOutline],
        query: &EncodedQuery,
    ) -> Result<Vec<ScoredSection>> {
        let per_document: Vec<Vec<ScoredSection>> = if self.parallel {
            documents
                .par_iter()
                .map(|doc| self.score_document(doc, query))
                .collect::<Result<_>>()?
        } else {
            documents
                .iter()
                .map(|doc| self.score_document(doc, query))
                .collect::<Result<_>>()?
        };

        let ranked = rank_sections(per_document.into_iter().flatten().collect());
        log::debug!(
            "ranked {} sections from {} documents",
            ranked.len(),
            documents.len()
        );
        Ok(ranked)
    }

    fn score_document(
        &self,
        doc: &DocumentOutline,
        query: &EncodedQuery,
    ) -> Result<Vec<ScoredSection>> {
        let sections = &doc.outline.sections;
        if sections.is_empty() {
            return Ok(Vec::new());
        }

        let titles: Vec<&str> = sections.iter().map(|s| s.text.as_str()).collect();
        let vectors = embed_all(self.embedder, &titles)?;

        Ok(sections
            .iter()
            .zip(vectors)
            .map(|(section, vector)| ScoredSection {
                document: doc.document.clone(),
                section: section.clone(),
                relevance_score: query.similarity(&vector),
                importance_rank: 0,
            })
            .collect())
    }
}

/// Stable descending sort by score, then assign 1-based ranks.
///
/// Equal scores keep their collection order (document, then page, then line).
pub fn rank_sections(mut sections: Vec<ScoredSection>) -> Vec<ScoredSection> {
    sections.sort_by(|a, b| descending_score(a.relevance_score, b.relevance_score));
    for (i, section) in sections.iter_mut().enumerate() {
        section.importance_rank = i + 1;
    }
    sections
}

/// Total descending order on scores: -0.0 equals 0.0 and NaN sorts last.
pub(crate) fn descending_score(a: f32, b: f32) -> Ordering {
    let key = |s: f32| if s.is_nan() { f32::NEG_INFINITY } else { s + 0.0 };
    key(b).total_cmp(&key(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, Outline, Query, Section};
    use crate::rank::embed::Embedding;

    /// One dimension per keyword, counting keyword occurrences.
    struct KeywordEmbedder(Vec<&'static str>);

    impl Embedder for KeywordEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let lower = t.to_lowercase();
                    self.0
                        .iter()
                        .map(|k| lower.matches(k).count() as f32)
                        .collect()
                })
                .collect())
        }

        fn dimensions(&self) -> usize {
            self.0.len()
        }
    }

    fn outline(doc: &str, titles: &[(&str, u32)]) -> DocumentOutline {
        DocumentOutline::new(
            doc,
            Outline {
                title: String::new(),
                sections: titles
                    .iter()
                    .map(|&(t, p)| Section::new(HeadingLevel::H1, t, p))
                    .collect(),
            },
        )
    }

    fn query(embedder: &dyn Embedder, text: &str) -> EncodedQuery {
        EncodedQuery::encode(Query::new(text), embedder).unwrap()
    }

    #[test]
    fn test_ranks_across_documents() {
        let embedder = KeywordEmbedder(vec!["revenue", "market", "staff"]);
        let docs = vec![
            outline("a.pdf", &[("Staff Changes", 1), ("Market Share", 2)]),
            outline("b.pdf", &[("Revenue and Market", 1)]),
        ];
        let q = query(&embedder, "revenue market");
        let ranked = RelevanceScorer::new(&embedder).score(&docs, &q).unwrap();

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].document, "b.pdf");
        assert_eq!(ranked[0].section.text, "Revenue and Market");
        assert_eq!(ranked[1].section.text, "Market Share");
        assert_eq!(ranked[2].section.text, "Staff Changes");
        assert_eq!(ranked[2].relevance_score, 0.0);
    }

    #[test]
    fn test_rank_monotonicity() {
        let embedder = KeywordEmbedder(vec!["a", "b", "c"]);
        let docs = vec![outline(
            "x.pdf",
            &[("c", 1), ("ab", 1), ("b", 2), ("a", 3), ("abc", 4)],
        )];
        let q = query(&embedder, "a b");
        let ranked = RelevanceScorer::new(&embedder).score(&docs, &q).unwrap();

        for (i, pair) in ranked.windows(2).enumerate() {
            assert!(pair[0].relevance_score >= pair[1].relevance_score);
            assert_eq!(pair[0].importance_rank, i + 1);
        }
        assert_eq!(ranked.last().unwrap().importance_rank, ranked.len());
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let embedder = KeywordEmbedder(vec!["budget"]);
        let docs = vec![
            outline("first.pdf", &[("Budget", 3)]),
            outline("second.pdf", &[("Budget", 1)]),
        ];
        let q = query(&embedder, "budget");
        let ranked = RelevanceScorer::new(&embedder).score(&docs, &q).unwrap();

        assert_eq!(ranked[0].document, "first.pdf");
        assert_eq!(ranked[0].importance_rank, 1);
        assert_eq!(ranked[1].document, "second.pdf");
        assert_eq!(ranked[1].importance_rank, 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let embedder = KeywordEmbedder(vec!["risk", "growth"]);
        let docs: Vec<_> = (0..8)
            .map(|i| {
                outline(
                    &format!("doc{}.pdf", i),
                    &[("Growth", 1), ("Risk Factors", 2), ("Other", 3)],
                )
            })
            .collect();
        let q = query(&embedder, "growth risk");
        let sequential = RelevanceScorer::new(&embedder).score(&docs, &q).unwrap();
        let parallel = RelevanceScorer::new(&embedder)
            .with_parallel(true)
            .score(&docs, &q)
            .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_descending_score_order() {
        assert_eq!(descending_score(0.9, 0.1), Ordering::Less);
        assert_eq!(descending_score(-0.0, 0.0), Ordering::Equal);
        assert_eq!(descending_score(f32::NAN, -1.0), Ordering::Greater);
    }

    struct DroppingEmbedder;

    impl Embedder for DroppingEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
            Ok(texts.iter().skip(1).map(|_| vec![1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_missing_vectors_are_an_error() {
        let docs = vec![outline("x.pdf", &[("A", 1), ("B", 2)])];
        let q = EncodedQuery::from_parts(Query::new("a"), vec![1.0]);
        let result = RelevanceScorer::new(&DroppingEmbedder).score(&docs, &q);
        assert!(matches!(result, Err(crate::error::Error::Embedding(_))));
    }

    #[test]
    fn test_no_sections() {
        let embedder = KeywordEmbedder(vec!["x"]);
        let docs = vec![outline("empty.pdf", &[])];
        let q = query(&embedder, "x");
        assert!(RelevanceScorer::new(&embedder)
            .score(&docs, &q)
            .unwrap()
            .is_empty());
    }
}
