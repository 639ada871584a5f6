//! # Engine Configuration
//!
//! Tunable constants for every stage of the engine, grouped by stage.
//!
//! All fields have defaults, so a YAML file only needs to mention the values
//! it overrides:
//!
//! ```rust
//! use shadowing::EngineConfig;
//!
//! let config = EngineConfig::from_yaml_str(r#"
//! scoring:
//!   correct_threshold: 0.85
//!   partial_threshold: 0.6
//! "#).unwrap();
//!
//! assert_eq!(config.scoring.correct_threshold, 0.85);
//! assert_eq!(config.scoring.window, 3);
//! assert_eq!(config.playback.guard_seconds, 0.08);
//! ```
//!
//! The scorer thresholds are deliberately configuration rather than constants:
//! earlier scorer revisions used 0.85/0.6, the current default is 0.8/0.5.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, ShadowingError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CaptionConfig {
    /// End offset given to the last piece of the last event, and to a piece
    /// whose event has no usable successor.
    pub last_word_fallback_ms: u64,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            last_word_fallback_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SegmenterConfig {
    /// A terminator only closes a group once the group holds this many segments.
    pub min_sentence_segments: usize,
    /// Duration bound used when the captions carry no sentence terminators.
    pub fallback_max_duration_seconds: Option<f64>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_sentence_segments: 5,
            fallback_max_duration_seconds: Some(10.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PlaybackConfig {
    /// Margin subtracted from a range's end when playback must stop there.
    pub guard_seconds: f64,
    /// Distance from the range end the cursor is parked at after stopping.
    pub snap_seconds: f64,
    /// Interval of the supplementary boundary poll.
    pub poll_interval_ms: u64,
    /// Boundary checks a seek may stay unconfirmed before it is issued again.
    /// A second expiry stops the range.
    pub seek_wait_checks: u32,
}

impl PlaybackConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            guard_seconds: 0.08,
            snap_seconds: 0.02,
            poll_interval_ms: 100,
            seek_wait_checks: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ScoringConfig {
    pub correct_threshold: f64,
    pub partial_threshold: f64,
    /// How many upcoming spoken tokens a target token may match against.
    pub window: usize,
    /// Score contribution of a partially matched token.
    pub partial_credit: f64,
    pub excellent_score: f64,
    pub good_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            correct_threshold: 0.8,
            partial_threshold: 0.5,
            window: 3,
            partial_credit: 0.7,
            excellent_score: 0.9,
            good_score: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SessionConfig {
    /// Caption language picked first when a video offers several tracks.
    pub preferred_language: String,
    /// Upper bound on waiting for a caption access token.
    pub token_wait_ms: u64,
}

impl SessionConfig {
    pub fn token_wait(&self) -> Duration {
        Duration::from_millis(self.token_wait_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            preferred_language: "en".to_string(),
            token_wait_ms: 10_000,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
    pub captions: CaptionConfig,
    pub segmenter: SegmenterConfig,
    pub playback: PlaybackConfig,
    pub scoring: ScoringConfig,
    pub session: SessionConfig,
}

impl EngineConfig {
    /// Parse a YAML document and validate the result.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// Check that every value is usable by the engine.
    pub fn validate(&self) -> Result<()> {
        let s = &self.scoring;
        for (name, value) in [
            ("scoring.correct_threshold", s.correct_threshold),
            ("scoring.partial_threshold", s.partial_threshold),
            ("scoring.partial_credit", s.partial_credit),
            ("scoring.excellent_score", s.excellent_score),
            ("scoring.good_score", s.good_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ShadowingError::InvalidConfig(format!(
                    "{} must be within 0..=1 (got {})",
                    name, value
                )));
            }
        }
        if s.partial_threshold > s.correct_threshold {
            return Err(ShadowingError::InvalidConfig(format!(
                "scoring.partial_threshold ({}) exceeds scoring.correct_threshold ({})",
                s.partial_threshold, s.correct_threshold
            )));
        }
        if s.window == 0 {
            return Err(ShadowingError::InvalidConfig(
                "scoring.window must be at least 1".to_string(),
            ));
        }

        let p = &self.playback;
        if !(p.guard_seconds >= 0.0) {
            return Err(ShadowingError::InvalidConfig(format!(
                "playback.guard_seconds must not be negative (got {})",
                p.guard_seconds
            )));
        }
        // The parked position must stay strictly inside the range
        if !(p.snap_seconds > 0.0) {
            return Err(ShadowingError::InvalidConfig(format!(
                "playback.snap_seconds must be positive (got {})",
                p.snap_seconds
            )));
        }
        if p.seek_wait_checks == 0 {
            return Err(ShadowingError::InvalidConfig(
                "playback.seek_wait_checks must be at least 1".to_string(),
            ));
        }
        if p.poll_interval_ms == 0 {
            return Err(ShadowingError::InvalidConfig(
                "playback.poll_interval_ms must be positive".to_string(),
            ));
        }

        if let Some(max) = self.segmenter.fallback_max_duration_seconds {
            if !(max > 0.0) {
                return Err(ShadowingError::InvalidConfig(format!(
                    "segmenter.fallback_max_duration_seconds must be positive (got {})",
                    max
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.captions.last_word_fallback_ms, 2000);
        assert_eq!(config.segmenter.min_sentence_segments, 5);
        assert_eq!(config.playback.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.session.token_wait(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = EngineConfig::from_yaml_str("playback:\n  guard_seconds: 0.1\n").unwrap();
        assert_eq!(config.playback.guard_seconds, 0.1);
        assert_eq!(config.playback.snap_seconds, 0.02);
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let result = EngineConfig::from_yaml_str(
            "scoring:\n  correct_threshold: 0.5\n  partial_threshold: 0.8\n",
        );
        assert!(matches!(result, Err(ShadowingError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let result = EngineConfig::from_yaml_str("scoring:\n  correct_threshold: 1.5\n");
        assert!(matches!(result, Err(ShadowingError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let result = EngineConfig::from_yaml_str("playback:\n  poll_interval_ms: 0\n");
        assert!(matches!(result, Err(ShadowingError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_snap() {
        let result = EngineConfig::from_yaml_str("playback:\n  snap_seconds: 0\n");
        assert!(matches!(result, Err(ShadowingError::InvalidConfig(_))));
        let result = EngineConfig::from_yaml_str("playback:\n  snap_seconds: -0.01\n");
        assert!(matches!(result, Err(ShadowingError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_seek_wait() {
        let result = EngineConfig::from_yaml_str("playback:\n  seek_wait_checks: 0\n");
        assert!(matches!(result, Err(ShadowingError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let result = EngineConfig::from_yaml_str("scoring: [1, 2");
        assert!(matches!(result, Err(ShadowingError::Config(_))));
    }
}
