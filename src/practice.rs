//! # Practice Range Resolver
//!
//! Turns a user selection inside the transcript into the tokens to practice
//! and the time range to play.
//!
//! A selection arrives either as a precise character span of one group's
//! text, or as a loose list of words. The resolver degrades from the precise
//! path to word matching and finally to the whole group, so a selection that
//! names a valid group always resolves.
//!
//! ## Example
//! ```rust
//! use shadowing::captions::Segment;
//! use shadowing::practice::{resolve, Selection};
//! use shadowing::segmenter::group;
//!
//! let segments = vec![
//!     Segment::from_millis(0, 400, "all"),
//!     Segment::from_millis(400, 700, "of"),
//!     Segment::from_millis(700, 1000, "the"),
//!     Segment::from_millis(1000, 1600, "prompts"),
//! ];
//! let groups = group(&segments, None);
//!
//! let selection = Selection::Words {
//!     group_index: Some(0),
//!     words: vec!["The".to_string(), "prompts!".to_string()],
//! };
//! let practice = resolve(&selection, &groups).unwrap();
//! assert_eq!(practice.tokens, vec!["the", "prompts"]);
//! assert_eq!(practice.time_range.start, 0.7);
//! assert_eq!(practice.time_range.end, 1.6);
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::segmenter::Group;
use crate::text::normalize_token;

/// A user selection in the rendered transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Selection {
    /// Half-open character span `[char_start, char_end)` of the group text
    CharSpan {
        group_index: usize,
        char_start: usize,
        char_end: usize,
    },
    /// Loosely selected words; without a group index the caller's current
    /// group applies
    Words {
        #[serde(default)]
        group_index: Option<usize>,
        words: Vec<String>,
    },
}

impl Selection {
    pub fn group_index(&self) -> Option<usize> {
        match self {
            Selection::CharSpan { group_index, .. } => Some(*group_index),
            Selection::Words { group_index, .. } => *group_index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharRange {
    pub start: usize,
    pub end: usize,
}

/// What to practice: the literal tokens and where they play
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSelection {
    pub group_index: usize,
    pub tokens: Vec<String>,
    pub char_range: Option<CharRange>,
    pub time_range: TimeRange,
    /// Time span of the segment each token came from, parallel to `tokens`
    pub token_times: Vec<TimeRange>,
}

impl PracticeSelection {
    /// The text a spoken attempt is scored against.
    pub fn target_text(&self) -> String {
        self.tokens.join(" ")
    }

    /// Index of the first token whose segment is active at `time`.
    pub fn active_token_index(&self, time: f64) -> Option<usize> {
        self.token_times.iter().position(|r| r.contains(time))
    }
}

/// A whitespace token of a group, located in the group text
struct LocatedToken<'a> {
    text: &'a str,
    char_start: usize,
    char_end: usize,
    segment: usize,
}

/// Split on whitespace like `str::split_whitespace`, reporting character
/// offsets.
fn char_spans(text: &str) -> Vec<(usize, usize, &str)> {
    let mut spans = Vec::new();
    let mut open: Option<(usize, usize)> = None;
    let mut chars = 0;

    for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
        if ch.is_whitespace() {
            if let Some((char_start, byte_start)) = open.take() {
                spans.push((char_start, char_idx, &text[byte_start..byte_idx]));
            }
        } else if open.is_none() {
            open = Some((char_idx, byte_idx));
        }
        chars = char_idx + 1;
    }
    if let Some((char_start, byte_start)) = open {
        spans.push((char_start, chars, &text[byte_start..]));
    }
    spans
}

/// Tokens of the group text, which joins segment texts with single spaces.
fn locate_tokens(group: &Group) -> Vec<LocatedToken<'_>> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    for (segment, seg) in group.segments().iter().enumerate() {
        for (start, end, text) in char_spans(&seg.text) {
            tokens.push(LocatedToken {
                text,
                char_start: offset + start,
                char_end: offset + end,
                segment,
            });
        }
        offset += seg.text.chars().count() + 1;
    }
    tokens
}

fn build(group_index: usize, group: &Group, picked: &[&LocatedToken], char_range: Option<CharRange>) -> PracticeSelection {
    let segments = group.segments();
    let token_times: Vec<TimeRange> = picked
        .iter()
        .map(|t| TimeRange {
            start: segments[t.segment].start_seconds,
            end: segments[t.segment].end_seconds,
        })
        .collect();

    let time_range = TimeRange {
        start: token_times.iter().map(|r| r.start).fold(f64::INFINITY, f64::min),
        end: token_times.iter().map(|r| r.end).fold(f64::NEG_INFINITY, f64::max),
    };

    PracticeSelection {
        group_index,
        tokens: picked.iter().map(|t| t.text.to_string()).collect(),
        char_range,
        time_range,
        token_times,
    }
}

/// Resolve `selection` against `groups`.
///
/// Returns `None` only when the selection names no group, or a group that
/// does not exist.
pub fn resolve(selection: &Selection, groups: &[Group]) -> Option<PracticeSelection> {
    let group_index = selection.group_index()?;
    let group = groups.get(group_index)?;
    let located = locate_tokens(group);

    let picked: Vec<&LocatedToken> = match selection {
        Selection::CharSpan {
            char_start,
            char_end,
            ..
        } => located
            .iter()
            .filter(|t| t.char_start < *char_end && *char_start < t.char_end)
            .collect(),
        Selection::Words { words, .. } => {
            let wanted: HashSet<String> = words
                .iter()
                .map(|w| normalize_token(w))
                .filter(|w| !w.is_empty())
                .collect();
            located
                .iter()
                .filter(|t| wanted.contains(&normalize_token(t.text)))
                .collect()
        }
    };

    if !picked.is_empty() {
        let char_range = match selection {
            Selection::CharSpan {
                char_start,
                char_end,
                ..
            } => Some(CharRange {
                start: *char_start,
                end: *char_end,
            }),
            Selection::Words { .. } => None,
        };
        let practice = build(group_index, group, &picked, char_range);
        debug!(
            "selection in group {} resolved to {} tokens",
            group_index,
            practice.tokens.len()
        );
        return Some(practice);
    }

    debug!("selection in group {} matched nothing, using the whole group", group_index);
    let all: Vec<&LocatedToken> = located.iter().collect();
    let mut practice = build(group_index, group, &all, None);
    practice.time_range = TimeRange {
        start: group.start_seconds(),
        end: group.end_seconds(),
    };
    Some(practice)
}

/// The whole group as a practice selection.
pub fn whole_group(group_index: usize, groups: &[Group]) -> Option<PracticeSelection> {
    resolve(
        &Selection::Words {
            group_index: Some(group_index),
            words: Vec::new(),
        },
        groups,
    )
}
