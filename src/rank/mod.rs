//! Relevance ranking of sections and sentences against a persona query.
//!
//! Both stages compare texts to the same [`EncodedQuery`], which is embedded once
//! per run. Section headings are ranked across all documents; the body text of
//! the best sections is then split into sentences and those are ranked too.

mod embed;
mod extractor;
mod options;
mod scorer;
mod segment;

pub use embed::{
    cosine_similarity, Embedder, Embedding, EncodedQuery, HashingEmbedder, DEFAULT_DIMENSIONS,
};
#[cfg(feature = "fastembed")]
pub use embed::FastEmbedder;
pub use extractor::SubSectionExtractor;
pub use options::{RankOptions, MAX_SUB_SECTIONS, SECTIONS_FOR_ANALYSIS};
pub use scorer::{rank_sections, RelevanceScorer};
pub use segment::{SentenceSegmenter, UnicodeSentenceSegmenter};
