use super::*;
use crate::loop_control::{ControllerState, LoopMode, ManualClock};
use crate::scoring::TokenStatus;

const CAPTIONS: &str = r#"{"events": [
    {"tStartMs": 0, "segs": [
        {"utf8": "all"}, {"utf8": " of", "tOffsetMs": 400}, {"utf8": " the", "tOffsetMs": 700},
        {"utf8": " prompts", "tOffsetMs": 1000}, {"utf8": " in", "tOffsetMs": 1600},
        {"utf8": " order.", "tOffsetMs": 1900}
    ]},
    {"tStartMs": 3000, "segs": [
        {"utf8": "then"}, {"utf8": " we", "tOffsetMs": 300}, {"utf8": " go", "tOffsetMs": 600}
    ]}
]}"#;

fn batch(video_id: Option<&str>) -> CaptionBatch {
    CaptionBatch::from_json(video_id.map(str::to_string), "en", CAPTIONS).unwrap()
}

fn session() -> PracticeSession<ManualClock> {
    let mut session = PracticeSession::new(EngineConfig::default());
    session.attach_clock(ManualClock::new());
    session.navigate("vid1");
    assert!(session.ingest(batch(Some("vid1"))));
    session
}

fn clock(session: &mut PracticeSession<ManualClock>) -> &mut ManualClock {
    session.controller_mut().clock_mut().unwrap()
}

#[test]
fn test_ingest_builds_segments_and_groups() {
    let session = session();
    assert_eq!(session.segments().len(), 9);
    assert_eq!(session.groups().len(), 2);
    assert_eq!(session.groups()[0].text(), "all of the prompts in order.");
    assert_eq!(session.groups()[1].text(), "then we go");
    assert_eq!(session.language(), Some("en"));
}

#[test]
fn test_batch_for_other_video_is_ignored() {
    let mut session = session();
    session.select_group(0);

    assert!(!session.ingest(batch(Some("vid2"))));
    assert_eq!(session.selected_group(), Some(0));
    assert_eq!(session.segments().len(), 9);
}

#[test]
fn test_batch_adopts_video_when_none_active() {
    let mut session: PracticeSession<ManualClock> = PracticeSession::new(EngineConfig::default());
    assert!(session.ingest(batch(Some("vid9"))));
    assert_eq!(session.video_id(), Some("vid9"));
    assert!(!session.ingest(batch(Some("vid1"))));

    // A batch without a video id applies to whatever is active
    assert!(session.ingest(batch(None)));
}

#[test]
fn test_navigate_discards_previous_video_state() {
    let mut session = session();
    session.token_store().insert("vid1", "t1");
    session.token_store().insert("vid2", "t2");
    session.select_group(0);
    session.play_selection(Some(3));

    session.navigate("vid1");
    assert_eq!(session.selected_group(), Some(0));

    session.navigate("vid2");
    assert!(session.segments().is_empty());
    assert!(session.groups().is_empty());
    assert!(session.practice().is_none());
    assert_eq!(session.controller().state(), ControllerState::Idle);
    assert_eq!(session.token_store().get("vid1"), None);
    assert_eq!(session.token_store().get("vid2"), Some("t2".to_string()));
}

#[test]
fn test_play_selection_stops_inside_group() {
    let mut session = session();
    session.select_group(0);
    session.play_selection(None).unwrap();
    assert_eq!(
        session.controller().state(),
        ControllerState::Playing(LoopMode::PlayOnce)
    );

    let mut last = None;
    for _ in 0..1000 {
        clock(&mut session).advance(0.05);
        let highlight = session.on_position_update();
        if let BoundaryOutcome::Stopped { position } = highlight.outcome {
            last = Some(position);
            break;
        }
        assert_eq!(highlight.active_group, Some(0));
    }

    let position = last.unwrap();
    assert!(position >= 0.0 && position < 2.999);
    assert_eq!(session.controller().state(), ControllerState::Idle);
}

#[test]
fn test_highlight_reports_active_token() {
    let mut session = session();
    session.select_group(0);
    session.play_selection(None);
    clock(&mut session).advance(1.2);

    let highlight = session.on_position_update();
    assert_eq!(highlight.outcome, BoundaryOutcome::Within);
    assert_eq!(highlight.active_segment, Some(3));
    assert_eq!(highlight.active_group, Some(0));
    assert_eq!(highlight.active_token, Some(3));
    assert_eq!(highlight.practice_range.unwrap().end, 2.999);
}

#[test]
fn test_word_selection_uses_selected_group() {
    let mut session = session();
    session.select_group(1);

    let practice = session
        .select(Selection::Words {
            group_index: None,
            words: vec!["We".to_string()],
        })
        .unwrap();
    assert_eq!(practice.group_index, 1);
    assert_eq!(practice.tokens, vec!["we"]);
    assert_eq!(practice.time_range, TimeRange { start: 3.3, end: 3.6 });
}

#[test]
fn test_empty_word_selection_reverts_to_group() {
    let mut session = session();
    session.select_group(0);
    session.select(Selection::Words {
        group_index: None,
        words: vec!["prompts".to_string()],
    });
    assert_eq!(session.practice().unwrap().tokens, vec!["prompts"]);

    session.select(Selection::Words {
        group_index: None,
        words: vec![" ".to_string()],
    });
    assert_eq!(session.practice().unwrap().tokens.len(), 6);
}

#[test]
fn test_char_span_selection_switches_group() {
    let mut session = session();
    session.select_group(0);
    let practice = session
        .select(Selection::CharSpan {
            group_index: 1,
            char_start: 5,
            char_end: 10,
        })
        .unwrap();
    assert_eq!(practice.tokens, vec!["we", "go"]);
    assert_eq!(session.selected_group(), Some(1));
}

#[test]
fn test_scoring_follows_final_transcript() {
    let mut session = session();
    session.select_group(0);

    assert!(session.push_transcript("all of", false).is_none());
    assert_eq!(session.transcript().interim(), "all of");

    session.push_transcript("all of the", true);
    let evaluation = session.evaluation().unwrap();
    assert_eq!(evaluation.tokens.len(), 6);
    assert_eq!(evaluation.tokens[3].status, TokenStatus::Wrong);

    let evaluation = session.push_transcript("prompts in order", true).unwrap();
    assert!(evaluation.all_correct());
    assert_eq!(session.transcript().final_text(), "all of the prompts in order");

    // A new selection starts a new attempt
    session.select_group(1);
    assert!(session.evaluation().is_none());
    assert_eq!(session.transcript().final_text(), "");
}

#[test]
fn test_unresolved_selection_replaces_previous() {
    let mut session = session();
    session.select_group(0);
    session.push_transcript("all of the", true);
    assert!(session.evaluation().is_some());

    let missing = Selection::CharSpan {
        group_index: 7,
        char_start: 0,
        char_end: 3,
    };
    assert!(session.select(missing).is_none());
    assert!(session.practice().is_none());
    assert!(session.evaluation().is_none());
    assert_eq!(session.transcript().final_text(), "");
    assert!(session.play_selection(None).is_none());

    session.select_group(1);
    assert!(session.select_group(9).is_none());
    assert!(session.practice().is_none());
}

#[test]
fn test_word_selection_without_any_group_clears_practice() {
    let mut session: PracticeSession<ManualClock> = PracticeSession::new(EngineConfig::default());
    session.attach_clock(ManualClock::new());
    assert!(session.ingest(batch(Some("vid1"))));

    let words = Selection::Words {
        group_index: None,
        words: vec!["then".to_string()],
    };
    assert!(session.select(words).is_none());
    assert!(session.practice().is_none());
}

#[test]
fn test_score_needs_target_and_transcript() {
    let mut session = session();
    assert!(session.push_transcript("hello", true).is_none());

    session.select_group(0);
    assert!(session.score().is_none());
}

#[test]
fn test_set_speed_replays_selection() {
    let mut session = session();
    session.select_group(1);
    session.play_selection(Some(3));
    clock(&mut session).advance(1.0);

    assert!(session.set_speed(0.75).is_some());
    let state = *session.controller().loop_state();
    assert_eq!(state.range_start, 3.0);
    assert_eq!(state.range_end, 5.6);
    assert_eq!(state.mode, LoopMode::PlayOnce);
    assert_eq!(session.controller().position(), Some(3.0));
    assert_eq!(session.controller().clock().unwrap().playback_rate(), 0.75);
}

#[test]
fn test_play_group_and_segment() {
    let mut session = session();

    assert!(session.play_group(1, true));
    assert_eq!(session.controller().state(), ControllerState::Idle);
    assert_eq!(session.controller().position(), Some(3.0));
    assert!(!session.controller().clock().unwrap().is_paused());

    assert!(session.play_group(0, false));
    assert_eq!(session.controller().loop_state().range_end, 2.999);
    assert!(!session.play_group(5, false));

    assert!(session.play_segment(3).is_some());
    assert_eq!(session.controller().loop_state().range_start, 1.0);
    assert_eq!(session.controller().loop_state().range_end, 1.6);
    assert!(session.play_segment(99).is_none());
}

#[test]
fn test_stale_tick_after_new_range() {
    let mut session = session();
    let generation = session.play_segment(0).unwrap();
    session.play_segment(1);
    let highlight = session.on_tick(BoundaryTick { generation });
    assert_eq!(highlight.outcome, BoundaryOutcome::Stale);
}

#[test]
fn test_reingest_resets_selection() {
    let mut session = session();
    session.select_group(0);
    session.play_selection(None);
    session.push_transcript("all", true);

    assert!(session.ingest(batch(Some("vid1"))));
    assert!(session.practice().is_none());
    assert!(session.evaluation().is_none());
    assert_eq!(session.controller().state(), ControllerState::Idle);
}

#[test]
fn test_caption_request_carries_token() {
    let session = session();
    let tracks = vec![CaptionTrack {
        base_url: "https://example.test/api/timedtext?v=vid1".to_string(),
        language_code: "en".to_string(),
        kind: None,
    }];
    assert_eq!(
        session.caption_request(&tracks).unwrap(),
        "https://example.test/api/timedtext?v=vid1&fmt=json3&c=WEB&lang=en"
    );

    session
        .token_store()
        .capture_from_url("https://example.test/api/timedtext?v=vid1&pot=P", None);
    assert!(session.caption_request(&tracks).unwrap().contains("&pot=P&"));
    assert!(session.caption_request(&[]).is_none());
}
