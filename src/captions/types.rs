//! Caption type definitions
//!
//! Raw events are decoded leniently: a field with the wrong JSON type is
//! treated as absent instead of failing the whole payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A single time-bounded unit of caption text, usually one word.
///
/// Invariant: `0 <= start_seconds < end_seconds` and
/// `duration_seconds == end_seconds - start_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub duration_seconds: f64,
    pub text: String,
}

impl Segment {
    /// Build a segment from millisecond offsets.
    pub fn from_millis(start_ms: i64, end_ms: i64, text: impl Into<String>) -> Self {
        Self {
            start_seconds: start_ms as f64 / 1000.0,
            end_seconds: end_ms as f64 / 1000.0,
            duration_seconds: (end_ms - start_ms) as f64 / 1000.0,
            text: text.into(),
        }
    }

    /// Whether `time` falls inside `[start, end)`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_seconds && time < self.end_seconds
    }
}

/// One text chunk inside a raw event
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPiece {
    #[serde(alias = "utf8", default, deserialize_with = "lenient_text")]
    pub text: String,
    /// `None` when the player omitted the offset. An absent offset still
    /// starts the piece at the event start, but is never used as the end of
    /// the previous piece.
    #[serde(
        rename = "withinEventOffsetMs",
        alias = "tOffsetMs",
        default,
        deserialize_with = "lenient_millis"
    )]
    pub within_event_offset_ms: Option<u64>,
}

/// A timed-text event: a start offset and its ordered text pieces
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawEvent {
    #[serde(
        rename = "startOffsetMs",
        alias = "tStartMs",
        default,
        deserialize_with = "lenient_millis"
    )]
    pub start_offset_ms: Option<u64>,
    #[serde(alias = "segs", default, deserialize_with = "lenient_pieces")]
    pub pieces: Vec<RawPiece>,
}

impl RawEvent {
    pub fn new(start_offset_ms: u64, pieces: Vec<RawPiece>) -> Self {
        Self {
            start_offset_ms: Some(start_offset_ms),
            pieces,
        }
    }
}

impl RawPiece {
    pub fn new(text: impl Into<String>, within_event_offset_ms: u64) -> Self {
        Self {
            text: text.into(),
            within_event_offset_ms: Some(within_event_offset_ms),
        }
    }
}

/// A batch of caption events for one video and language
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionBatch {
    pub video_id: Option<String>,
    pub language: String,
    pub events: Vec<RawEvent>,
}

impl CaptionBatch {
    pub fn new(video_id: Option<String>, language: impl Into<String>, events: Vec<RawEvent>) -> Self {
        Self {
            video_id,
            language: language.into(),
            events,
        }
    }

    /// Decode a timed-text JSON payload (`{"events": [...]}`).
    ///
    /// Only invalid JSON is an error. A payload without an `events` array is a
    /// video without captions and yields an empty batch.
    pub fn from_json(video_id: Option<String>, language: impl Into<String>, payload: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)?;
        Ok(Self::new(video_id, language, events_from_json(&value)))
    }
}

/// Extract raw events from a decoded timed-text payload.
///
/// Accepts either the full payload object or the bare events array. Anything
/// else yields no events.
pub fn events_from_json(value: &Value) -> Vec<RawEvent> {
    let events = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("events") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    events
        .iter()
        .map(|e| RawEvent::deserialize(e).unwrap_or_default())
        .collect()
}

/// Largest offset accepted from a payload, in milliseconds. Anything above is
/// treated as absent.
pub const MAX_OFFSET_MS: u64 = 1 << 52;

fn millis_from_value(value: &Value) -> Option<u64> {
    value
        .as_f64()
        .filter(|ms| ms.is_finite() && *ms >= 0.0 && *ms <= MAX_OFFSET_MS as f64)
        .map(|ms| ms as u64)
}

fn lenient_millis<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(millis_from_value(&value))
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

fn lenient_pieces<'de, D>(deserializer: D) -> std::result::Result<Vec<RawPiece>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .iter()
            .map(|p| RawPiece::deserialize(p).unwrap_or_default())
            .collect()),
        _ => Ok(Vec::new()),
    }
}
