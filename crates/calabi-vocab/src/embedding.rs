//! Text embeddings for fuzzy term lookup
//!
//! [`NgramEmbedding`] hashes character trigrams into a fixed number of
//! buckets. It needs no model files, is deterministic, and puts terms that
//! share spelling fragments close together, which is what typo-tolerant
//! vocabulary lookup needs.
//!
//! # Examples
//!
//! ```rust
//! use calabi_vocab::embedding::{cosine_similarity, EmbeddingModel, NgramEmbedding};
//!
//! let model = NgramEmbedding::new(128);
//! let a = model.embed("seoul").unwrap();
//! let b = model.embed("seoul city").unwrap();
//! let c = model.embed("tokyo").unwrap();
//! assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Default embedding dimension
pub const DEFAULT_DIMENSION: usize = 128;

const NGRAM: usize = 3;
const PAD: char = '#';

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model inference error
    #[error("Model inference failed: {0}")]
    InferenceFailed(String),
}

/// Trait for embedding models
pub trait EmbeddingModel: Send + Sync {
    /// Generate an embedding vector for the given text
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Get the dimension of embeddings produced by this model
    fn dimension(&self) -> usize;
}

/// Hashed character trigram embedding
///
/// Text is lowercased and padded, each trigram is hashed into one of
/// `dimension` buckets, and the bucket counts are normalized to unit length.
#[derive(Debug, Clone)]
pub struct NgramEmbedding {
    dimension: usize,
}

impl NgramEmbedding {
    /// Create a model producing `dimension`-sized vectors
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, gram: &[char]) -> usize {
        let mut hasher = DefaultHasher::new();
        gram.hash(&mut hasher);
        (hasher.finish() % self.dimension as u64) as usize
    }
}

impl Default for NgramEmbedding {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl EmbeddingModel for NgramEmbedding {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let mut chars = vec![PAD];
        chars.extend(trimmed.to_lowercase().chars());
        chars.push(PAD);

        let mut embedding = vec![0.0f32; self.dimension];
        for gram in chars.windows(NGRAM.min(chars.len())) {
            embedding[self.bucket(gram)] += 1.0;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity of two vectors in [-1, 1]
///
/// Vectors of different length, or with zero magnitude, score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}
