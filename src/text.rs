//! Text helpers shared by the caption parser, the resolver and the scorer.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::captions::Segment;

/// Non-greedy bracket annotation such as `[Music]` or `[Applause]`
static ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));

/// Remove every `[...]` annotation and trim the remainder.
pub fn strip_annotations(text: &str) -> String {
    ANNOTATION.replace_all(text, "").trim().to_string()
}

/// Split on whitespace, dropping empty pieces.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Keep word characters and apostrophes, lowercased.
///
/// A token made only of punctuation normalizes to the empty string.
///
/// ```rust
/// use shadowing::text::normalize_token;
///
/// assert_eq!(normalize_token("I'm,"), "i'm");
/// assert_eq!(normalize_token("--"), "");
/// ```
pub fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '\'')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Segment texts joined with a single space, the way a group is rendered.
pub fn join_group_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
