//! Token module - the unit produced by the normalizer

use serde::{Deserialize, Serialize};

/// A normalized token with character offsets into the raw input
///
/// Offsets count Unicode scalar values, not bytes, so clients in any
/// language can map them back onto the text they sent. `end_offset` is
/// exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Normalized token text
    pub text: String,
    /// Start offset in the raw input (characters)
    pub start_offset: usize,
    /// End offset in the raw input (characters, exclusive)
    pub end_offset: usize,
}

impl Token {
    /// Create a new token
    pub fn new(text: impl Into<String>, start_offset: usize, end_offset: usize) -> Self {
        Self {
            text: text.into(),
            start_offset,
            end_offset,
        }
    }

    /// Width of the token in the raw input
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    /// True if the token covers no raw characters
    pub fn is_empty(&self) -> bool {
        self.start_offset >= self.end_offset
    }
}

/// Check that a token sequence is ordered and non-overlapping
///
/// Every sequence produced by a single normalizer call satisfies this.
pub fn is_monotonic(tokens: &[Token]) -> bool {
    tokens.iter().all(|t| t.start_offset < t.end_offset)
        && tokens
            .windows(2)
            .all(|pair| pair[0].end_offset <= pair[1].start_offset)
}
