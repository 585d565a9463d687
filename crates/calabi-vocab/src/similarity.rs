//! Lexical similarity between folded terms

/// Score for a term containing, or contained in, the seed
pub const SUBSTRING_SCORE: f32 = 0.92;

/// Shortest string for which containment counts as a match
const MIN_SUBSTRING_CHARS: usize = 2;

/// Similarity of two folded terms in [0, 1]
///
/// Equal terms score 1.0, containment scores [`SUBSTRING_SCORE`], anything
/// else falls back to Sørensen-Dice over character bigrams.
///
/// # Examples
///
/// ```
/// use calabi_vocab::similarity::{lexical_similarity, SUBSTRING_SCORE};
///
/// assert_eq!(lexical_similarity("seoul", "seoul"), 1.0);
/// assert_eq!(lexical_similarity("seoul", "seoul city"), SUBSTRING_SCORE);
/// assert!(lexical_similarity("seoul", "busan") < 0.3);
/// ```
pub fn lexical_similarity(a: &str, b: &str) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    if short.chars().count() >= MIN_SUBSTRING_CHARS && long.contains(short) {
        return SUBSTRING_SCORE;
    }

    strsim::sorensen_dice(a, b) as f32
}
