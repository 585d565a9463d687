//! Suggestion module - candidates and ranked suggestions

use serde::{Deserialize, Serialize};

/// Where a candidate term came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// Lexical or embedding match against the reference vocabulary
    Vocabulary,
    /// Related term of a matched vocabulary entry
    Related,
    /// Completion drawn from the caller's history
    History,
    /// Popular tag supplied by the caller
    Tag,
}

/// A term retrieved for a seed phrase, prior to ranking
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Candidate term as it should be shown
    pub term: String,
    /// Similarity to the seed in [0, 1]
    pub source_score: f32,
    /// Secondary popularity signal in [0, 1]
    pub popularity: f32,
    /// Origin of the candidate
    pub source: SuggestionSource,
}

impl Candidate {
    /// Create a vocabulary candidate without popularity information
    pub fn new(term: impl Into<String>, source_score: f32) -> Self {
        Self {
            term: term.into(),
            source_score,
            popularity: 0.0,
            source: SuggestionSource::Vocabulary,
        }
    }

    /// Set the popularity signal
    pub fn with_popularity(mut self, popularity: f32) -> Self {
        self.popularity = popularity;
        self
    }

    /// Set the candidate origin
    pub fn with_source(mut self, source: SuggestionSource) -> Self {
        self.source = source;
        self
    }
}

/// A ranked suggestion
///
/// Within one result ranks are contiguous from 0 and relevance is
/// non-increasing in rank order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggested term
    pub term: String,
    /// Composite relevance in [0, 1]
    pub relevance: f32,
    /// Position in the result, starting at 0
    pub rank: usize,
    /// Origin of the underlying candidate
    pub source: SuggestionSource,
}
