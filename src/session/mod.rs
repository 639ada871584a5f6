//! # Session Module
//!
//! One practice session: the active video, its captions, the learner's
//! selection, playback of that selection and scoring of spoken attempts.
//!
//! ## Lifecycle
//! 1. [`PracticeSession::navigate`] adopts a video and discards everything
//!    that belonged to the previous one
//! 2. [`PracticeSession::ingest`] replaces the captions wholesale; batches for
//!    another video are ignored
//! 3. [`PracticeSession::select_group`] / [`PracticeSession::select`] pick
//!    what to practice
//! 4. `play_*` drive the loop controller over the selection's time range
//! 5. [`PracticeSession::push_transcript`] feeds recognition results and
//!    rescoring happens on every final result
//!
//! Position updates from the media element go through
//! [`PracticeSession::on_position_update`], which enforces the range
//! boundary and reports what to highlight.
//!
//! ## Example
//! ```rust
//! use shadowing::captions::CaptionBatch;
//! use shadowing::loop_control::{ManualClock, MediaClock};
//! use shadowing::session::PracticeSession;
//! use shadowing::EngineConfig;
//!
//! let mut session = PracticeSession::new(EngineConfig::default());
//! session.attach_clock(ManualClock::new());
//! session.navigate("abc");
//!
//! let batch = CaptionBatch::from_json(
//!     Some("abc".to_string()),
//!     "en",
//!     r#"{"events": [{"tStartMs": 0, "segs": [{"utf8": "hello"}, {"utf8": " world", "tOffsetMs": 500}]}]}"#,
//! ).unwrap();
//! assert!(session.ingest(batch));
//!
//! session.select_group(0);
//! session.play_selection(None);
//! session.push_transcript("hello world", true);
//!
//! let evaluation = session.evaluation().unwrap();
//! assert!(evaluation.all_correct());
//! ```

use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::captions::{caption_request_url, parse_with_fallback, select_track, CaptionBatch, CaptionTrack, Segment};
use crate::config::EngineConfig;
use crate::loop_control::{
    BoundaryOutcome, BoundaryTick, BoundaryTimer, LoopController, MediaClock, NoopTimer,
};
use crate::practice::{resolve, whole_group, PracticeSelection, Selection, TimeRange};
use crate::scoring::{Evaluation, Scorer};
use crate::segmenter::{active_group_index, active_segment_index, group_with_min, Group};
use crate::text::normalize_token;
use crate::token_store::CaptionTokenStore;
use crate::transcript::TranscriptBuffer;

#[cfg(test)]
mod tests;

/// What the transcript view should highlight after a position update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub position: Option<f64>,
    pub outcome: BoundaryOutcome,
    pub active_segment: Option<usize>,
    pub active_group: Option<usize>,
    /// Index into the practice selection's tokens
    pub active_token: Option<usize>,
    pub practice_range: Option<TimeRange>,
}

pub struct PracticeSession<C: MediaClock, T: BoundaryTimer = NoopTimer> {
    config: EngineConfig,
    controller: LoopController<C, T>,
    scorer: Scorer,
    tokens: Arc<CaptionTokenStore>,
    video_id: Option<String>,
    language: Option<String>,
    segments: Vec<Segment>,
    groups: Vec<Group>,
    selected_group: Option<usize>,
    practice: Option<PracticeSelection>,
    transcript: TranscriptBuffer,
    evaluation: Option<Evaluation>,
}

impl<C: MediaClock> PracticeSession<C, NoopTimer> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_timer(config, NoopTimer)
    }
}

impl<C: MediaClock, T: BoundaryTimer> PracticeSession<C, T> {
    pub fn with_timer(config: EngineConfig, timer: T) -> Self {
        Self {
            controller: LoopController::with_timer(config.playback.clone(), timer),
            scorer: Scorer::new(config.scoring.clone()),
            config,
            tokens: Arc::new(CaptionTokenStore::new()),
            video_id: None,
            language: None,
            segments: Vec::new(),
            groups: Vec::new(),
            selected_group: None,
            practice: None,
            transcript: TranscriptBuffer::new(),
            evaluation: None,
        }
    }

    pub fn attach_clock(&mut self, clock: C) -> Option<C> {
        self.controller.attach(clock)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn controller(&self) -> &LoopController<C, T> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut LoopController<C, T> {
        &mut self.controller
    }

    /// Shared with whatever observes the player's network requests.
    pub fn token_store(&self) -> &Arc<CaptionTokenStore> {
        &self.tokens
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn selected_group(&self) -> Option<usize> {
        self.selected_group
    }

    pub fn practice(&self) -> Option<&PracticeSelection> {
        self.practice.as_ref()
    }

    pub fn transcript(&self) -> &TranscriptBuffer {
        &self.transcript
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// Switch to `video_id`. Navigating to the active video changes nothing.
    pub fn navigate(&mut self, video_id: &str) {
        if self.video_id.as_deref() == Some(video_id) {
            return;
        }
        info!("navigated to video {}", video_id);
        self.controller.invalidate();
        self.video_id = Some(video_id.to_string());
        self.language = None;
        self.segments.clear();
        self.groups.clear();
        self.clear_selection();
        self.tokens.retain_only(video_id);
    }

    /// Replace the captions with `batch`.
    ///
    /// Returns `false` when the batch belongs to a different video than the
    /// active one. A batch arriving before any navigation adopts its video.
    pub fn ingest(&mut self, batch: CaptionBatch) -> bool {
        match (self.video_id.as_deref(), batch.video_id.as_deref()) {
            (Some(active), Some(incoming)) if active != incoming => {
                warn!("ignoring captions for {} while {} is active", incoming, active);
                return false;
            }
            (None, Some(incoming)) => {
                self.video_id = Some(incoming.to_string());
                self.tokens.retain_only(incoming);
            }
            _ => {}
        }

        self.controller.stop();
        self.segments = parse_with_fallback(&batch.events, self.config.captions.last_word_fallback_ms);
        self.groups = group_with_min(
            &self.segments,
            self.config.segmenter.fallback_max_duration_seconds,
            self.config.segmenter.min_sentence_segments,
        );
        self.language = Some(batch.language);
        self.clear_selection();

        if self.segments.is_empty() {
            info!("no captions available for {}", self.video_id.as_deref().unwrap_or("unknown video"));
        } else {
            info!(
                "captions applied: {} segments in {} groups ({})",
                self.segments.len(),
                self.groups.len(),
                self.language.as_deref().unwrap_or_default()
            );
        }
        true
    }

    /// Request URL for the preferred caption track of the active video,
    /// carrying its access token when one was captured.
    pub fn caption_request(&self, tracks: &[CaptionTrack]) -> Option<String> {
        let track = select_track(tracks, &self.config.session.preferred_language)?;
        let token = self.video_id.as_deref().and_then(|v| self.tokens.get(v));
        Some(caption_request_url(track, token.as_deref()))
    }

    /// Wait, within the configured bound, for the active video's access
    /// token.
    #[cfg(feature = "async")]
    pub async fn wait_for_caption_token(&self) -> Option<String> {
        let video_id = self.video_id.clone()?;
        self.tokens.wait_for(&video_id, self.config.session.token_wait()).await
    }

    fn clear_selection(&mut self) {
        self.selected_group = None;
        self.practice = None;
        self.reset_attempt();
    }

    /// Forget the current spoken attempt and its evaluation.
    pub fn reset_attempt(&mut self) {
        self.transcript.reset();
        self.evaluation = None;
    }

    /// Practice the whole of group `index`.
    pub fn select_group(&mut self, index: usize) -> Option<&PracticeSelection> {
        let Some(practice) = whole_group(index, &self.groups) else {
            debug!("group {} does not exist, practice cleared", index);
            self.practice = None;
            self.reset_attempt();
            return None;
        };
        debug!("group {} selected", index);
        self.selected_group = Some(index);
        self.practice = Some(practice);
        self.reset_attempt();
        self.practice.as_ref()
    }

    /// Practice part of a group.
    ///
    /// A word selection without a group applies to the selected group. A word
    /// selection without any word drops back to the whole selected group.
    /// A selection that resolves to nothing clears the previous one.
    pub fn select(&mut self, selection: Selection) -> Option<&PracticeSelection> {
        let selection = match selection {
            Selection::Words { group_index, words } => {
                let group_index = group_index.or(self.selected_group);
                if words.iter().all(|w| normalize_token(w).is_empty()) {
                    self.practice = group_index.and_then(|i| whole_group(i, &self.groups));
                    self.selected_group = self.practice.as_ref().map(|p| p.group_index);
                    self.reset_attempt();
                    return self.practice.as_ref();
                }
                Selection::Words { group_index, words }
            }
            other => other,
        };

        let Some(practice) = resolve(&selection, &self.groups) else {
            debug!("selection names no existing group, practice cleared");
            self.practice = None;
            self.reset_attempt();
            return None;
        };
        info!(
            "practicing {} tokens of group {} ({:.2}s..{:.2}s)",
            practice.tokens.len(),
            practice.group_index,
            practice.time_range.start,
            practice.time_range.end
        );
        self.selected_group = Some(practice.group_index);
        self.practice = Some(practice);
        self.reset_attempt();
        self.practice.as_ref()
    }

    /// Play the practice selection, repeated `repeat` times when above 1.
    pub fn play_selection(&mut self, repeat: Option<u32>) -> Option<u64> {
        let range = self.practice.as_ref()?.time_range;
        self.controller.play_range(range.start, range.end, repeat)
    }

    /// Play group `index` once, or with `follow` keep playing past its end.
    /// Returns whether the group exists.
    pub fn play_group(&mut self, index: usize, follow: bool) -> bool {
        let Some(group) = self.groups.get(index) else {
            return false;
        };
        let (start, end) = (group.start_seconds(), group.end_seconds());
        if follow {
            self.controller.play_from(start);
        } else {
            self.controller.play_range(start, end, None);
        }
        true
    }

    pub fn play_segment(&mut self, index: usize) -> Option<u64> {
        let segment = self.segments.get(index)?;
        let (start, end) = (segment.start_seconds, segment.end_seconds);
        self.controller.play_range(start, end, None)
    }

    /// Change speed and replay the practice selection at the new rate.
    pub fn set_speed(&mut self, rate: f64) -> Option<u64> {
        self.controller.set_speed(rate);
        self.play_selection(None)
    }

    pub fn pause(&mut self) {
        self.controller.pause();
    }

    pub fn on_position_update(&mut self) -> Highlight {
        let outcome = self.controller.on_time_update();
        self.highlight(outcome)
    }

    pub fn on_tick(&mut self, tick: BoundaryTick) -> Highlight {
        let outcome = self.controller.poll(tick);
        self.highlight(outcome)
    }

    fn highlight(&self, outcome: BoundaryOutcome) -> Highlight {
        let position = self.controller.position();
        let (active_segment, active_group, active_token) = match position {
            Some(t) => (
                active_segment_index(&self.segments, t),
                active_group_index(&self.groups, t),
                self.practice.as_ref().and_then(|p| p.active_token_index(t)),
            ),
            None => (None, None, None),
        };
        Highlight {
            position,
            outcome,
            active_segment,
            active_group,
            active_token,
            practice_range: self.practice.as_ref().map(|p| p.time_range),
        }
    }

    /// Feed a recognition result. Final results trigger rescoring.
    pub fn push_transcript(&mut self, text: &str, is_final: bool) -> Option<&Evaluation> {
        self.transcript.push(text, is_final);
        if is_final {
            self.score()
        } else {
            self.evaluation.as_ref()
        }
    }

    /// Score the final transcript against the practice selection.
    pub fn score(&mut self) -> Option<&Evaluation> {
        let target = self.practice.as_ref().map(|p| p.target_text()).unwrap_or_default();
        let spoken = self.transcript.final_text();
        if target.is_empty() || spoken.is_empty() {
            self.evaluation = None;
            return None;
        }

        let evaluation = self.scorer.score(&target, spoken);
        if let Some(rating) = evaluation.rating {
            info!("attempt scored {:.2}: {}", evaluation.score, rating);
        }
        self.evaluation = Some(evaluation);
        self.evaluation.as_ref()
    }
}
