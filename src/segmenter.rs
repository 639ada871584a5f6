//! # Segmenter Module
//!
//! Groups the flat segment list into practice chunks.
//!
//! ## Grouping Policy
//! One policy is chosen per call, based on the whole input:
//!
//! ### Sentence Terminators
//! Used when any segment contains `.`, `!`, `?` or `;`. Segments accumulate in
//! a buffer that is closed after a segment containing a terminator, but only
//! once the buffer holds at least five segments. Short exclamations and
//! abbreviations therefore stay attached to their neighbours.
//!
//! ### Duration Bound
//! Used when no terminator exists (raw speech-recognition tracks) and a bound
//! is given. A group closes once its summed duration reaches the bound.
//!
//! ### Single Group
//! Without terminators and without a bound, everything is one group.
//!
//! In every policy a non-empty remainder becomes the final group, so the
//! groups always partition the input in order.
//!
//! ## Example
//! ```rust
//! use shadowing::captions::Segment;
//! use shadowing::segmenter::group;
//!
//! let words = ["we", "need", "all", "of", "them."];
//! let segments: Vec<Segment> = words
//!     .iter()
//!     .enumerate()
//!     .map(|(i, w)| Segment::from_millis(i as i64 * 500, (i as i64 + 1) * 500, *w))
//!     .collect();
//!
//! let groups = group(&segments, None);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].text(), "we need all of them.");
//! ```

use log::debug;
use serde::Serialize;

use crate::captions::Segment;
use crate::text::{join_group_text, tokenize};

/// Characters that end a sentence
pub const TERMINATORS: [char; 4] = ['.', '!', '?', ';'];

/// Default minimum group size before a terminator may close it
pub const MIN_SENTENCE_SEGMENTS: usize = 5;

/// A contiguous, non-empty run of segments practiced as one chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    segments: Vec<Segment>,
}

impl Group {
    /// `None` for an empty run; groups are never empty.
    pub fn new(segments: Vec<Segment>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start_seconds(&self) -> f64 {
        self.segments.first().map_or(0.0, |s| s.start_seconds)
    }

    pub fn end_seconds(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.end_seconds)
    }

    /// Segment texts joined by single spaces.
    pub fn text(&self) -> String {
        join_group_text(&self.segments)
    }

    /// Whitespace tokens of the group text, in order.
    pub fn tokens(&self) -> Vec<String> {
        self.segments
            .iter()
            .flat_map(|s| tokenize(&s.text))
            .map(str::to_string)
            .collect()
    }

    /// Whether any segment of the group is active at `time`.
    pub fn contains(&self, time: f64) -> bool {
        self.segments.iter().any(|s| s.contains(time))
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}

fn has_terminator(text: &str) -> bool {
    text.contains(&TERMINATORS[..])
}

/// Group segments into practice chunks with the default sentence minimum.
pub fn group(segments: &[Segment], fallback_max_duration_seconds: Option<f64>) -> Vec<Group> {
    group_with_min(segments, fallback_max_duration_seconds, MIN_SENTENCE_SEGMENTS)
}

/// Group segments into practice chunks.
///
/// `min_sentence_segments` is the buffer size a terminator needs before it may
/// close a group.
pub fn group_with_min(
    segments: &[Segment],
    fallback_max_duration_seconds: Option<f64>,
    min_sentence_segments: usize,
) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut buffer: Vec<Segment> = Vec::new();

    if segments.iter().any(|s| has_terminator(&s.text)) {
        for segment in segments {
            buffer.push(segment.clone());
            if has_terminator(&segment.text) && buffer.len() >= min_sentence_segments {
                groups.extend(Group::new(std::mem::take(&mut buffer)));
            }
        }
    } else if let Some(max_duration) = fallback_max_duration_seconds {
        let mut duration = 0.0;
        for segment in segments {
            buffer.push(segment.clone());
            duration += segment.duration_seconds;
            if duration >= max_duration {
                groups.extend(Group::new(std::mem::take(&mut buffer)));
                duration = 0.0;
            }
        }
    } else {
        buffer.extend(segments.iter().cloned());
    }

    groups.extend(Group::new(buffer));

    debug!("grouped {} segments into {} groups", segments.len(), groups.len());
    groups
}

/// Index of the segment active at `time`.
pub fn active_segment_index(segments: &[Segment], time: f64) -> Option<usize> {
    segments.iter().position(|s| s.contains(time))
}

/// Index of the first group with a segment active at `time`.
pub fn active_group_index(groups: &[Group], time: f64) -> Option<usize> {
    groups.iter().position(|g| g.contains(time))
}
