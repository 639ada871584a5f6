//! Loop controller type definitions

use serde::Serialize;

/// Repeat policy of the active range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "count", rename_all = "camelCase")]
pub enum LoopMode {
    /// No range is active
    Off,
    /// Play the range once, then stop inside it
    PlayOnce,
    /// Play the range this many times, then stop inside it
    FiniteRepeat(u32),
    /// Replay the range until told otherwise
    InfiniteRepeat,
}

/// The range a controller is enforcing
///
/// `remaining` counts the traversals left in `FiniteRepeat` mode, including
/// the current one, and is 0 in every other mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopState {
    pub range_start: f64,
    pub range_end: f64,
    pub mode: LoopMode,
    pub remaining: u32,
}

impl Default for LoopState {
    fn default() -> Self {
        Self {
            range_start: 0.0,
            range_end: 0.0,
            mode: LoopMode::Off,
            remaining: 0,
        }
    }
}

/// Coarse controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "mode", rename_all = "camelCase")]
pub enum ControllerState {
    Idle,
    Playing(LoopMode),
}

/// A poll request from the boundary timer, tagged with the range it was
/// armed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundaryTick {
    pub generation: u64,
}

/// Result of one boundary check
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum BoundaryOutcome {
    /// No range is active
    Idle,
    /// The tick belongs to a range that has since been replaced or stopped
    Stale,
    /// A seek back to the range start has not reached the media yet
    AwaitingSeek,
    /// The position has not reached the guard yet
    Within,
    /// The range was replayed from its start; `remaining` is `None` when
    /// repeating forever
    Repeated { remaining: Option<u32> },
    /// Playback paused and the cursor parked at `position`
    Stopped { position: f64 },
}

/// A command for a media element that is driven remotely
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PlaybackCommand {
    Seek(f64),
    Play,
    Pause,
    SetRate(f64),
}
