//! Calabi Domain Layer
//!
//! Core value types and trait interfaces for the Calabi NLP pipeline.
//! Every other crate in the workspace depends on this one; it carries no
//! behaviour beyond small, pure helpers on its own types.
//!
//! ## Key Concepts
//!
//! - **Token**: a normalized piece of the input with offsets into the raw text
//! - **Label**: a closed BIO tag (`Begin`/`Inside`/`Outside` x [`EntityType`])
//! - **EntitySpan**: a decoded entity with type and confidence
//! - **Candidate**: a vocabulary term retrieved for a seed phrase, before ranking
//! - **Suggestion**: a ranked, deduplicated candidate
//!
//! ## Architecture
//!
//! - Inference backends implement [`traits::InferenceModel`] (`calabi-model`)
//! - The pipeline (`calabi-nlp`) only sees the trait, so tests inject fakes

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity;
pub mod label;
pub mod suggestion;
pub mod term;
pub mod token;
pub mod traits;

// Re-exports for convenience
pub use entity::{EntitySpan, EntityType};
pub use label::{Label, LabelDistribution};
pub use suggestion::{Candidate, Suggestion, SuggestionSource};
pub use term::{clamp01, fold_term};
pub use token::Token;
