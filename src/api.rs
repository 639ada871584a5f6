//! # Public API
//!
//! One-call entry points for hosts that only need a single stage of the
//! engine. Long-lived hosts use [`PracticeSession`](crate::session::PracticeSession).
//!
//! ## Functions
//!
//! - [`segments_from_json()`] - Timed-text JSON to word segments
//! - [`groups_from_json()`] - Timed-text JSON to practice groups
//! - [`score_attempt()`] - Verdicts, score and rating for a spoken attempt
//!
//! Each has a `_with_config` variant taking an [`EngineConfig`].
//!
//! ## Typical Usage
//!
//! ```rust
//! use shadowing::{groups_from_json, score_attempt, Rating};
//!
//! let payload = r#"{"events": [
//!     {"tStartMs": 0, "segs": [{"utf8": "so"}, {"utf8": " here", "tOffsetMs": 300},
//!         {"utf8": " we", "tOffsetMs": 600}, {"utf8": " go", "tOffsetMs": 900},
//!         {"utf8": " again.", "tOffsetMs": 1200}]}
//! ]}"#;
//!
//! let groups = groups_from_json(payload)?;
//! assert_eq!(groups.len(), 1);
//!
//! let evaluation = score_attempt(&groups[0].text(), "so here we go again");
//! assert_eq!(evaluation.rating, Some(Rating::Excellent));
//! # Ok::<(), shadowing::ShadowingError>(())
//! ```

use crate::captions::{events_from_json, parse_with_fallback, Segment};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::scoring::{Evaluation, Scorer};
use crate::segmenter::{group_with_min, Group};

/// Parse a timed-text payload (`{"events": [...]}` or a bare event array)
/// into segments.
pub fn segments_from_json(payload: &str) -> Result<Vec<Segment>> {
    segments_from_json_with_config(payload, &EngineConfig::default())
}

pub fn segments_from_json_with_config(payload: &str, config: &EngineConfig) -> Result<Vec<Segment>> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    let events = events_from_json(&value);
    Ok(parse_with_fallback(&events, config.captions.last_word_fallback_ms))
}

/// Parse a timed-text payload and group the segments into practice chunks.
pub fn groups_from_json(payload: &str) -> Result<Vec<Group>> {
    groups_from_json_with_config(payload, &EngineConfig::default())
}

pub fn groups_from_json_with_config(payload: &str, config: &EngineConfig) -> Result<Vec<Group>> {
    let segments = segments_from_json_with_config(payload, config)?;
    Ok(group_with_min(
        &segments,
        config.segmenter.fallback_max_duration_seconds,
        config.segmenter.min_sentence_segments,
    ))
}

/// Score `spoken` against `target` with the default thresholds.
pub fn score_attempt(target: &str, spoken: &str) -> Evaluation {
    score_attempt_with_config(target, spoken, &EngineConfig::default())
}

pub fn score_attempt_with_config(target: &str, spoken: &str, config: &EngineConfig) -> Evaluation {
    Scorer::new(config.scoring.clone()).score(target, spoken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShadowingError;

    #[test]
    fn test_segments_from_bare_array() {
        let segments = segments_from_json(r#"[{"tStartMs": 1000, "segs": [{"utf8": "hi"}]}]"#).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_seconds, 1.0);
        assert_eq!(segments[0].end_seconds, 3.0);
    }

    #[test]
    fn test_invalid_json_is_payload_error() {
        assert!(matches!(
            segments_from_json("{"),
            Err(ShadowingError::CaptionPayload(_))
        ));
    }

    #[test]
    fn test_groups_with_custom_config() {
        let mut config = EngineConfig::default();
        config.segmenter.fallback_max_duration_seconds = Some(1.0);
        config.captions.last_word_fallback_ms = 1500;

        let payload = r#"{"events": [
            {"tStartMs": 0, "segs": [{"utf8": "um"}]},
            {"tStartMs": 1000, "segs": [{"utf8": "so"}]},
            {"tStartMs": 2000, "segs": [{"utf8": "yeah"}]}
        ]}"#;
        let groups = groups_from_json_with_config(payload, &config).unwrap();

        // 0.999 + 0.999 reaches the bound, then the trailing 1.5 s word alone
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].end_seconds(), 3.5);
    }
}
