//! Event-to-segment conversion
//!
//! Works in integer milliseconds and converts to seconds only when a segment
//! is emitted, so boundaries such as `next_start - 1` stay exact.

use log::debug;

use super::types::{RawEvent, Segment};
use crate::text::strip_annotations;

/// Fallback end offset for trailing pieces, in milliseconds
pub const LAST_WORD_FALLBACK_MS: u64 = 2000;

fn to_millis(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

/// Convert raw caption events into time-ordered word segments.
///
/// Uses the default 2000 ms fallback for pieces whose end cannot be inferred
/// from a following piece. See [`parse_with_fallback`].
pub fn parse(events: &[RawEvent]) -> Vec<Segment> {
    parse_with_fallback(events, LAST_WORD_FALLBACK_MS)
}

/// Convert raw caption events into time-ordered word segments.
///
/// # Boundary Rules
/// For every event that still has text after annotation stripping:
/// - A piece starts at `event start + piece offset`
/// - It ends where the next piece of the same event starts
/// - The last piece of the last event ends `fallback_ms` after its start
/// - Any other last piece ends 1 ms before the next event starts, or
///   `fallback_ms` after its own event start when the next event has no
///   positive start
///
/// Pieces whose end is not after their start are dropped. Events without
/// surviving pieces are skipped entirely.
///
/// # Example
/// ```rust
/// use shadowing::captions::{parse_with_fallback, RawEvent, RawPiece};
///
/// let events = vec![
///     RawEvent::new(1000, vec![RawPiece::new("hello", 0), RawPiece::new("world", 300)]),
/// ];
/// let segments = parse_with_fallback(&events, 1500);
///
/// assert_eq!(segments[0].end_seconds, 1.3);
/// assert_eq!(segments[1].end_seconds, 2.8); // last piece: start + 1500 ms
/// ```
pub fn parse_with_fallback(events: &[RawEvent], fallback_ms: u64) -> Vec<Segment> {
    let fallback = to_millis(fallback_ms);
    let mut segments = Vec::new();
    let mut skipped_events = 0usize;
    let mut dropped_pieces = 0usize;

    for (i, event) in events.iter().enumerate() {
        let pieces: Vec<(String, Option<u64>)> = event
            .pieces
            .iter()
            .filter_map(|piece| {
                let text = strip_annotations(&piece.text);
                if text.is_empty() {
                    None
                } else {
                    Some((text, piece.within_event_offset_ms))
                }
            })
            .collect();

        if pieces.is_empty() {
            skipped_events += 1;
            continue;
        }

        let base = to_millis(event.start_offset_ms.unwrap_or(0));
        let next_start = events
            .get(i + 1)
            .and_then(|next| next.start_offset_ms)
            .map_or(0, to_millis);
        let boundary = if next_start > 0 {
            next_start - 1
        } else {
            base.saturating_add(fallback)
        };
        let is_last_event = i + 1 == events.len();

        for (j, (text, offset)) in pieces.iter().enumerate() {
            let start = base.saturating_add(to_millis(offset.unwrap_or(0)));
            let end = match pieces.get(j + 1).and_then(|(_, next_offset)| *next_offset) {
                Some(next_offset) => base.saturating_add(to_millis(next_offset)),
                None if is_last_event => start.saturating_add(fallback),
                None => boundary,
            };

            if end <= start {
                dropped_pieces += 1;
                continue;
            }

            segments.push(Segment::from_millis(start, end, text.clone()));
        }
    }

    // Well-formed tracks are already ordered; a stable sort keeps the
    // ordering guarantee for tracks whose events arrive out of order.
    segments.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));

    debug!(
        "parsed {} caption events into {} segments ({} empty events, {} degenerate pieces)",
        events.len(),
        segments.len(),
        skipped_events,
        dropped_pieces
    );

    segments
}
