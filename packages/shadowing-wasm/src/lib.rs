use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use shadowing::captions::Segment;
use shadowing::config::PlaybackConfig;
use shadowing::loop_control::{BoundaryOutcome, BoundaryTick, LoopController, PlaybackCommand, RemoteClock};
use shadowing::practice::Selection;
use shadowing::segmenter::Group;

#[derive(Serialize)]
struct BindingError {
    message: String,
}

#[derive(Deserialize)]
struct GroupInput {
    segments: Vec<Segment>,
}

#[derive(Serialize)]
struct LoopUpdate {
    outcome: Option<BoundaryOutcome>,
    commands: Vec<PlaybackCommand>,
}

fn js_error(message: impl ToString) -> JsValue {
    let error = BindingError {
        message: message.to_string(),
    };
    let json = serde_json::to_string(&error).unwrap_or_else(|_| String::from(r#"{"message":"error"}"#));
    JsValue::from_str(&json)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_error)
}

fn from_json<'a, T: Deserialize<'a>>(json: &'a str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(js_error)
}

/// Parse a timed-text payload into word segments (JSON array)
#[wasm_bindgen]
pub fn parse_captions(payload: &str) -> Result<String, JsValue> {
    let segments = shadowing::segments_from_json(payload).map_err(js_error)?;
    to_json(&segments)
}

/// Group segments (JSON array) into practice chunks
#[wasm_bindgen]
pub fn group_segments(segments_json: &str, max_duration: Option<f64>) -> Result<String, JsValue> {
    let segments: Vec<Segment> = from_json(segments_json)?;
    to_json(&shadowing::group(&segments, max_duration))
}

/// Score a spoken attempt; returns tokens, score and rating
#[wasm_bindgen]
pub fn evaluate(target: &str, spoken: &str) -> Result<String, JsValue> {
    to_json(&shadowing::score_attempt(target, spoken))
}

/// Resolve a selection against groups as returned by `group_segments`.
/// Returns `null` when the selection names no existing group.
#[wasm_bindgen]
pub fn resolve_selection(groups_json: &str, selection_json: &str) -> Result<String, JsValue> {
    let inputs: Vec<GroupInput> = from_json(groups_json)?;
    let selection: Selection = from_json(selection_json)?;
    let groups: Vec<Group> = inputs.into_iter().filter_map(|g| Group::new(g.segments)).collect();
    to_json(&shadowing::resolve(&selection, &groups))
}

/// Loop controller for a media element living in the page
///
/// Every call returns the playback commands the page should apply, as JSON.
#[wasm_bindgen]
pub struct LoopHandle {
    controller: LoopController<RemoteClock>,
}

#[wasm_bindgen]
impl LoopHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> LoopHandle {
        let mut controller = LoopController::new(PlaybackConfig::default());
        controller.attach(RemoteClock::new());
        LoopHandle { controller }
    }

    /// Generation of the active range, for matching timer callbacks
    pub fn generation(&self) -> u64 {
        self.controller.generation()
    }

    pub fn set_loop_forever(&mut self, enabled: bool) {
        self.controller.set_loop_forever(enabled);
    }

    pub fn play_range(&mut self, start: f64, end: f64, repeat: Option<u32>) -> Result<String, JsValue> {
        self.controller.play_range(start, end, repeat);
        self.update(None)
    }

    pub fn stop(&mut self) -> Result<String, JsValue> {
        self.controller.stop();
        self.update(None)
    }

    pub fn set_speed(&mut self, rate: f64) -> Result<String, JsValue> {
        self.controller.set_speed(rate);
        self.update(None)
    }

    /// Report the element's state after a `timeupdate` event
    pub fn sample(&mut self, position: f64, paused: bool, rate: f64) -> Result<String, JsValue> {
        if let Some(clock) = self.controller.clock_mut() {
            clock.sample(position, paused, rate);
        }
        let outcome = self.controller.on_time_update();
        self.update(Some(outcome))
    }

    /// Boundary check from the page's interval timer
    pub fn poll(&mut self, generation: u64) -> Result<String, JsValue> {
        let outcome = self.controller.poll(BoundaryTick { generation });
        self.update(Some(outcome))
    }

    /// Current loop state as a JS object
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.controller.loop_state()).map_err(js_error)
    }
}

impl LoopHandle {
    fn update(&mut self, outcome: Option<BoundaryOutcome>) -> Result<String, JsValue> {
        let commands = self
            .controller
            .clock_mut()
            .map(RemoteClock::drain_commands)
            .unwrap_or_default();
        to_json(&LoopUpdate { outcome, commands })
    }
}

impl Default for LoopHandle {
    fn default() -> Self {
        Self::new()
    }
}
