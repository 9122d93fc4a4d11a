//! Sentence segmentation of section bodies.

use unicode_segmentation::UnicodeSegmentation;

/// Splits a section body into sentences.
pub trait SentenceSegmenter: Send + Sync {
    /// Sentences of `text` in order, trimmed; empty sentences are omitted.
    fn segment(&self, text: &str) -> Vec<String>;
}

/// UAX #29 sentence boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceSegmenter;

impl SentenceSegmenter for UnicodeSentenceSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
