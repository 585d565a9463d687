//! Calabi NLP Pipeline
//!
//! Extracts named entities from free text and suggests related vocabulary
//! terms for it.
//!
//! # Architecture
//!
//! ```text
//! raw text → Normalizer → tokens → EntityExtractor → entity spans
//!                                        │
//!                     (suggestion mode)  ▼
//!              seed → CandidateGenerator → SuggestionRanker → suggestions
//! ```
//!
//! # Key Features
//!
//! - **Offset-preserving tokenization**: spans map back onto the raw input
//! - **Permissive BIO decoding**: malformed label runs are repaired, not rejected
//! - **Bounded inference**: blocking model calls run behind a semaphore and a timeout
//! - **Deterministic ranking**: composite relevance with lexical tie-breaks
//!
//! # Example Usage
//!
//! ```no_run
//! use calabi_model::LexiconModel;
//! use calabi_nlp::{Pipeline, PipelineConfig, SuggestOptions};
//! use calabi_vocab::Vocabulary;
//! use calabi_domain::EntityType;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(
//!     PipelineConfig::default(),
//!     Arc::new(LexiconModel::builtin()),
//!     Arc::new(Vocabulary::builtin()),
//! )?;
//!
//! let entities = pipeline
//!     .extract_entities("Book a flight from Seoul to Tokyo tomorrow")
//!     .await?;
//! for e in &entities {
//!     println!("{} {} [{}, {})", e.text, e.entity_type, e.start_offset, e.end_offset);
//! }
//!
//! let suggestions = pipeline
//!     .suggest_terms("Seoul", SuggestOptions::for_type(EntityType::Location))
//!     .await?;
//! println!("{} suggestions", suggestions.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod decoder;
mod error;
mod extractor;
mod normalizer;
mod pipeline;
mod ranker;


pub use config::{PipelineConfig, RankingWeights, SpanAggregation};
pub use decoder::decode_spans;
pub use error::PipelineError;
pub use extractor::EntityExtractor;
pub use normalizer::{normalized_text, Normalizer};
pub use pipeline::{HealthReport, Pipeline, SuggestOptions};
pub use ranker::SuggestionRanker;
