//! Token similarity

use strsim::levenshtein;

/// `1 - levenshtein(a, b) / max(len(a), len(b))`, counted in characters.
///
/// Identical tokens score 1 and an empty token scores 0 against anything.
///
/// ```rust
/// use shadowing::scoring::token_similarity;
///
/// assert_eq!(token_similarity("prompts", "prompts"), 1.0);
/// assert_eq!(token_similarity("of", "uv"), 0.0);
/// assert_eq!(token_similarity("", "a"), 0.0);
/// ```
pub fn token_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let longest = a.chars().count().max(b.chars().count());
    1.0 - levenshtein(a, b) as f64 / longest as f64
}
