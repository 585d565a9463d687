//! Calabi Vocabulary
//!
//! The reference vocabulary and everything needed to pull candidate terms
//! out of it for a seed phrase.
//!
//! # Architecture
//!
//! ```text
//! seed → fold → lexical scan ─┐
//!      → embed → HNSW search ─┼→ related-term expansion → sort → truncate
//!                             │
//!                     (optional cache keyed by folded seed)
//! ```
//!
//! - Lexical scan over terms and aliases is exact and always runs
//! - The HNSW index is optional and adds fuzzy, n-gram level recall
//! - Results are deterministic for a fixed vocabulary snapshot
//!
//! # Examples
//!
//! ```
//! use calabi_vocab::{CandidateGenerator, GeneratorConfig, Vocabulary, VocabularyEntry};
//! use std::sync::Arc;
//!
//! let vocab = Vocabulary::from_entries(vec![
//!     VocabularyEntry::new("Seoul"),
//!     VocabularyEntry::new("Seoul City"),
//!     VocabularyEntry::new("Busan"),
//! ]);
//! let generator = CandidateGenerator::new(Arc::new(vocab), GeneratorConfig::default());
//!
//! let candidates = generator.generate_candidates("seoul", 5).unwrap();
//! assert_eq!(candidates[0].term, "Seoul");
//! assert_eq!(candidates[1].term, "Seoul City");
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod embedding;
pub mod generator;
pub mod similarity;
pub mod vector_index;
pub mod vocabulary;

use thiserror::Error;

pub use cache::CandidateCache;
pub use embedding::{EmbeddingModel, NgramEmbedding};
pub use generator::{CandidateGenerator, GeneratorConfig};
pub use vector_index::VectorIndex;
pub use vocabulary::{Vocabulary, VocabularyEntry};

/// Errors that can occur in vocabulary operations
#[derive(Error, Debug)]
pub enum VocabError {
    /// Caller supplied an unusable seed or limit
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Vocabulary file could not be loaded
    #[error("Failed to load vocabulary: {0}")]
    Load(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(#[from] embedding::EmbeddingError),

    /// Vector index failure
    #[error("Vector index error: {0}")]
    Index(#[from] vector_index::VectorIndexError),
}
