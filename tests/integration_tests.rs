//! Integration tests for the shadowing engine
//!
//! Drives timed-text payloads through parsing, grouping, selection, looped
//! playback and scoring using only the public API.

use shadowing::captions::{parse, CaptionBatch, RawEvent, RawPiece, Segment};
use shadowing::loop_control::{BoundaryOutcome, ControllerState, LoopController, LoopMode, ManualClock};
use shadowing::{
    group, groups_from_json, resolve, score_attempt, score_attempt_with_config, segments_from_json, EngineConfig,
    PracticeSession, Rating, Selection, TokenStatus,
};

const TALK: &str = r#"{"events": [
    {"tStartMs": 0, "dDurationMs": 3000},
    {"tStartMs": 0, "segs": [
        {"utf8": "all"}, {"utf8": " of", "tOffsetMs": 400}, {"utf8": " the", "tOffsetMs": 700},
        {"utf8": " prompts", "tOffsetMs": 1000}, {"utf8": " in", "tOffsetMs": 1600},
        {"utf8": " order.", "tOffsetMs": 1900}
    ]},
    {"tStartMs": 3000, "segs": [{"utf8": "\n"}]},
    {"tStartMs": 3000, "segs": [
        {"utf8": "[Music]"}, {"utf8": " so", "tOffsetMs": 200}, {"utf8": " here", "tOffsetMs": 500},
        {"utf8": " we", "tOffsetMs": 800}, {"utf8": " go", "tOffsetMs": 1000},
        {"utf8": " again!", "tOffsetMs": 1300}
    ]}
]}"#;

/// Deterministic pseudo-random sequence for property-style tests
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

fn random_events(rng: &mut Lcg) -> Vec<RawEvent> {
    let words = ["so", "here", "we", "go.", "[Music]", "", "well", "yes!", "\n"];
    let count = rng.next(8) as usize + 1;
    (0..count)
        .map(|_| {
            let start = rng.next(10_000);
            let pieces = (0..rng.next(5))
                .map(|_| {
                    let text = words[rng.next(words.len() as u64) as usize];
                    RawPiece::new(text, rng.next(2_500))
                })
                .collect();
            RawEvent::new(start, pieces)
        })
        .collect()
}

#[test]
fn test_parse_boundary_rules() {
    let payload = r#"{"events": [
        {"tStartMs": 0, "segs": [{"utf8": "so,", "tOffsetMs": 0}]},
        {"tStartMs": 2000, "segs": [{"utf8": "I'm", "tOffsetMs": 0}, {"utf8": "going", "tOffsetMs": 400}]}
    ]}"#;
    let segments = segments_from_json(payload).unwrap();

    assert_eq!(
        segments,
        vec![
            Segment::from_millis(0, 1999, "so,"),
            Segment::from_millis(2000, 2400, "I'm"),
            Segment::from_millis(2400, 4400, "going"),
        ]
    );
}

#[test]
fn test_segments_are_ordered_and_positive() {
    let mut rng = Lcg(7);
    for _ in 0..200 {
        let events = random_events(&mut rng);
        let segments = parse(&events);

        for pair in segments.windows(2) {
            assert!(pair[0].start_seconds <= pair[1].start_seconds, "{:?}", events);
        }
        for segment in &segments {
            assert!(segment.end_seconds > segment.start_seconds, "{:?}", segment);
            assert!(!segment.text.is_empty());
            assert!(!segment.text.contains("[Music]"));
        }
    }
}

#[test]
fn test_groups_cover_segments_in_order() {
    let mut rng = Lcg(42);
    for round in 0..200 {
        let segments = parse(&random_events(&mut rng));
        let max_duration = if round % 2 == 0 { None } else { Some(1.5) };

        let flattened: Vec<Segment> = group(&segments, max_duration)
            .into_iter()
            .flat_map(|g| g.into_segments())
            .collect();
        assert_eq!(flattened, segments);
    }
}

#[test]
fn test_five_segment_sentence_is_one_group() {
    let segments: Vec<Segment> = ["we", "will", "start", "right", "now."]
        .iter()
        .enumerate()
        .map(|(i, word)| Segment::from_millis(i as i64 * 300, (i as i64 + 1) * 300, *word))
        .collect();

    let groups = group(&segments, None);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 5);
}

#[test]
fn test_payload_to_groups() {
    let groups = groups_from_json(TALK).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].text(), "all of the prompts in order.");
    assert_eq!(groups[1].text(), "so here we go again!");
    assert_eq!(groups[1].start_seconds(), 3.2);
    assert_eq!(groups[1].end_seconds(), 6.3);
}

#[test]
fn test_char_span_selection() {
    let groups = groups_from_json(TALK).unwrap();

    let selection = Selection::CharSpan {
        group_index: 0,
        char_start: 3,
        char_end: 10,
    };
    let practice = resolve(&selection, &groups).unwrap();
    assert_eq!(practice.tokens, vec!["of", "the"]);
    assert_eq!(practice.time_range.start, 0.4);
    assert_eq!(practice.time_range.end, 1.0);

    // Reaching into "prompts" pulls in the whole word
    let selection = Selection::CharSpan {
        group_index: 0,
        char_start: 3,
        char_end: 13,
    };
    let practice = resolve(&selection, &groups).unwrap();
    assert_eq!(practice.target_text(), "of the prompts");
    assert_eq!(practice.time_range.end, 1.6);
}

#[test]
fn test_evaluate_misheard_word() {
    let evaluation = score_attempt("all of the prompts", "all uv the prompts");
    let statuses: Vec<TokenStatus> = evaluation.tokens.iter().map(|t| t.status).collect();

    assert_eq!(
        statuses,
        vec![
            TokenStatus::Correct,
            TokenStatus::Wrong,
            TokenStatus::Correct,
            TokenStatus::Correct,
        ]
    );
    assert_eq!(evaluation.rating, Some(Rating::Good));
}

#[test]
fn test_exact_attempt_is_all_correct() {
    for target in ["all of the prompts in order.", "So, here we go... again!", "ça va très bien"] {
        let evaluation = score_attempt(target, target);
        assert!(evaluation.all_correct(), "{}", target);
        assert_eq!(evaluation.rating, Some(Rating::Excellent));
    }
}

#[test]
fn test_thresholds_from_yaml() {
    let config = EngineConfig::from_yaml_str("scoring:\n  correct_threshold: 0.9\n  partial_threshold: 0.5\n").unwrap();

    let strict = score_attempt_with_config("prompts", "promts", &config);
    assert_eq!(strict.tokens[0].status, TokenStatus::Partial);

    let lenient = score_attempt("prompts", "promts");
    assert_eq!(lenient.tokens[0].status, TokenStatus::Correct);
}

#[test]
fn test_finite_repeat_ends_idle_inside_range() {
    let mut controller = LoopController::new(EngineConfig::default().playback);
    controller.attach(ManualClock::new());
    controller.play_range(2.0, 4.0, Some(3)).unwrap();

    let mut traversals = 0;
    let mut stopped_at = None;
    for _ in 0..1000 {
        controller.clock_mut().unwrap().advance(0.05);
        match controller.on_time_update() {
            BoundaryOutcome::Repeated { .. } => traversals += 1,
            BoundaryOutcome::Stopped { position } => {
                traversals += 1;
                stopped_at = Some(position);
                break;
            }
            _ => {}
        }
    }

    assert_eq!(traversals, 3);
    let position = stopped_at.unwrap();
    assert!((2.0..4.0).contains(&position));
    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(controller.position(), Some(position));
}

#[test]
fn test_session_practice_round() {
    let mut session: PracticeSession<ManualClock> = PracticeSession::new(EngineConfig::default());
    session.attach_clock(ManualClock::new());
    session.navigate("abc123");

    let batch = CaptionBatch::from_json(Some("abc123".to_string()), "en", TALK).unwrap();
    assert!(session.ingest(batch));
    assert_eq!(session.groups().len(), 2);

    session.select_group(1);
    let practice = session
        .select(Selection::Words {
            group_index: None,
            words: vec!["here".to_string(), "we".to_string(), "go".to_string()],
        })
        .unwrap();
    assert_eq!(practice.time_range.start, 3.5);
    assert_eq!(practice.time_range.end, 4.3);

    session.play_selection(Some(2)).unwrap();
    assert_eq!(
        session.controller().state(),
        ControllerState::Playing(LoopMode::FiniteRepeat(2))
    );

    let mut repeats = 0;
    let mut highlighted = Vec::new();
    loop {
        session.controller_mut().clock_mut().unwrap().advance(0.05);
        let highlight = session.on_position_update();
        if let Some(token) = highlight.active_token {
            if highlighted.last() != Some(&token) {
                highlighted.push(token);
            }
        }
        match highlight.outcome {
            BoundaryOutcome::Repeated { .. } => repeats += 1,
            BoundaryOutcome::Stopped { position } => {
                assert!((3.5..4.3).contains(&position));
                break;
            }
            _ => {}
        }
        assert!(repeats <= 1);
    }
    assert_eq!(repeats, 1);
    assert_eq!(&highlighted[..3], &[0, 1, 2]);

    session.push_transcript("here we", true);
    let evaluation = session.push_transcript("go", true).unwrap();
    assert!(evaluation.all_correct());
    assert_eq!(evaluation.rating, Some(Rating::Excellent));

    session.navigate("def456");
    assert!(session.groups().is_empty());
    assert!(session.evaluation().is_none());
}
