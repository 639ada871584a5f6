//! # Captions Module
//!
//! Turn the player's timed-text events into a flat, time-ordered list of word
//! segments.
//!
//! ## Purpose
//! Caption tracks only carry a start offset per text chunk. The parser infers
//! each chunk's end from the start of the chunk after it, falling back to a
//! fixed duration for the trailing chunk, and emits one [`Segment`] per chunk.
//!
//! ## Sub-modules
//! - `types` - RawEvent, RawPiece, CaptionBatch, Segment
//! - `parser` - Event-to-segment conversion
//! - `track` - Choosing a caption track and building its request URL
//!
//! ## Entry Point
//! [`parse()`] - Convert raw events to segments
//!
//! ## Example
//! ```rust
//! use shadowing::captions::{parse, RawEvent};
//!
//! let events: Vec<RawEvent> = serde_json::from_str(r#"[
//!     {"tStartMs": 0, "segs": [{"utf8": "[Music] so,"}]},
//!     {"tStartMs": 2000, "segs": [{"utf8": "I'm"}, {"utf8": " going", "tOffsetMs": 400}]}
//! ]"#).unwrap();
//!
//! let segments = parse(&events);
//! assert_eq!(segments.len(), 3);
//! assert_eq!(segments[0].text, "so,");
//! assert_eq!(segments[1].start_seconds, 2.0);
//! assert_eq!(segments[1].end_seconds, 2.4);
//! ```
//!
//! ## Related Modules
//! - `segmenter` - Groups segments into practice chunks
//! - `text` - Annotation stripping shared with the scorer

mod parser;
mod track;
mod types;


pub use parser::{parse, parse_with_fallback};
pub use track::{caption_request_url, select_track, video_id_from_url, CaptionTrack};
pub use types::{events_from_json, CaptionBatch, RawEvent, RawPiece, Segment};
