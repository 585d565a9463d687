//! Term folding shared by candidate lookup and suggestion deduplication

/// Fold a term for comparison: lowercase, trimmed, single-spaced
///
/// # Examples
///
/// ```
/// use calabi_domain::fold_term;
///
/// assert_eq!(fold_term("  Seoul   City "), "seoul city");
/// assert_eq!(fold_term("\t\n"), "");
/// ```
pub fn fold_term(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clamp a score into [0, 1], mapping NaN to 0
pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}
