//! Text embeddings and cosine similarity.

use md5::{Digest, Md5};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::model::Query;

/// A dense text vector.
pub type Embedding = Vec<f32>;

/// Default vector size of [`HashingEmbedder`].
pub const DEFAULT_DIMENSIONS: usize = 512;

const TOKEN_PATTERN: &str = r"[\p{L}\p{N}]+";

/// Maps text to fixed-length vectors.
///
/// Implementations must be deterministic for identical input.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per text, in input order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Embed a single text.
    fn embed_one(&self, text: &str) -> Result<Embedding> {
        self.embed(&[text])?
            .pop()
            .ok_or_else(|| Error::Embedding("empty embedding result".to_string()))
    }

    /// Length of the produced vectors.
    fn dimensions(&self) -> usize;
}

/// Cosine similarity in [-1, 1].
///
/// A zero vector is dissimilar to everything (0.0), and so is a vector holding NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_nan() {
        return 0.0;
    }
    similarity.clamp(-1.0, 1.0)
}

/// Embed a batch and check that every text got a vector.
pub(crate) fn embed_all(embedder: &dyn Embedder, texts: &[&str]) -> Result<Vec<Embedding>> {
    let vectors = embedder.embed(texts)?;
    if vectors.len() != texts.len() {
        return Err(Error::Embedding(format!(
            "expected {} vectors, got {}",
            texts.len(),
            vectors.len()
        )));
    }
    Ok(vectors)
}

/// The query and its vector, computed once per run.
#[derive(Debug, Clone)]
pub struct EncodedQuery {
    query: Query,
    vector: Embedding,
}

impl EncodedQuery {
    /// Embed the query.
    pub fn encode(query: Query, embedder: &dyn Embedder) -> Result<Self> {
        let vector = embedder.embed_one(query.as_str())?;
        log::debug!("query encoded ({} dims): {}", vector.len(), query.as_str());
        Ok(Self { query, vector })
    }

    /// Use a precomputed vector.
    pub fn from_parts(query: Query, vector: Embedding) -> Self {
        Self { query, vector }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    /// Similarity between the query and an embedded text.
    pub fn similarity(&self, other: &[f32]) -> f32 {
        cosine_similarity(&self.vector, other)
    }
}

/// Deterministic bag-of-words embedder that needs no model files.
///
/// Text is NFKC-normalized and lowercased, split into letter/digit runs, and every
/// token adds +1 or -1 to one MD5-selected bucket. Vectors are L2-normalized, so two
/// texts score by their (signed) token overlap.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vector size (at least 1).
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions.max(1);
        self
    }

    fn embed_text(&self, tokenizer: &Regex, text: &str) -> Embedding {
        let normalized: String = text.nfkc().collect::<String>().to_lowercase();
        let mut vector = vec![0.0f32; self.dimensions];

        for token in tokenizer.find_iter(&normalized) {
            let digest = Md5::digest(token.as_str().as_bytes());
            let mut index_bytes = [0u8; 8];
            index_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(index_bytes) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let tokenizer = Regex::new(TOKEN_PATTERN).map_err(|e| Error::Embedding(e.to_string()))?;
        Ok(texts
            .iter()
            .map(|text| self.embed_text(&tokenizer, text))
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(feature = "fastembed")]
pub use self::neural::FastEmbedder;

#[cfg(feature = "fastembed")]
mod neural {
    use super::{Embedder, Embedding};
    use crate::error::{Error, Result};

    /// Sentence-transformer embeddings through fastembed (ONNX runtime).
    ///
    /// The model is downloaded on first use.
    pub struct FastEmbedder {
        model: fastembed::TextEmbedding,
        dimensions: usize,
    }

    impl FastEmbedder {
        /// Load all-MiniLM-L6-v2.
        pub fn new() -> Result<Self> {
            Self::with_model(fastembed::EmbeddingModel::AllMiniLML6V2, 384)
        }

        /// Load another fastembed model with its output size.
        pub fn with_model(model: fastembed::EmbeddingModel, dimensions: usize) -> Result<Self> {
            let options = fastembed::InitOptions::new(model).with_show_download_progress(false);
            let model = fastembed::TextEmbedding::try_new(options)
                .map_err(|e| Error::Embedding(format!("model initialization failed: {e}")))?;
            Ok(Self { model, dimensions })
        }
    }

    impl std::fmt::Debug for FastEmbedder {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("FastEmbedder")
                .field("dimensions", &self.dimensions)
                .finish_non_exhaustive()
        }
    }

    impl Embedder for FastEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            self.model
                .embed(texts.to_vec(), None)
                .map_err(|e| Error::Embedding(format!("embedding failed: {e}")))
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }
    }
}
