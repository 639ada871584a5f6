//! Media clocks
//!
//! The controller never touches a media element directly. It reads and drives
//! playback through [`MediaClock`], which lets the same state machine run
//! against a real player, a remote page, or a simulated timeline.

use super::types::PlaybackCommand;

/// Position source and sink of a media element
pub trait MediaClock {
    /// Current position in seconds
    fn current_time(&self) -> f64;
    fn playback_rate(&self) -> f64;
    fn is_paused(&self) -> bool;
    fn seek(&mut self, seconds: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn set_playback_rate(&mut self, rate: f64);
}

/// A timeline that only moves when told to
///
/// # Example
/// ```rust
/// use shadowing::loop_control::{ManualClock, MediaClock};
///
/// let mut clock = ManualClock::new();
/// clock.set_playback_rate(0.5);
/// clock.play();
/// clock.advance(1.0);
/// assert_eq!(clock.current_time(), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ManualClock {
    position: f64,
    rate: f64,
    paused: bool,
}

impl ManualClock {
    /// A paused clock at position 0 and normal speed.
    pub fn new() -> Self {
        Self {
            position: 0.0,
            rate: 1.0,
            paused: true,
        }
    }

    /// Advance by `seconds` of wall time, scaled by the playback rate.
    /// Does nothing while paused.
    pub fn advance(&mut self, seconds: f64) {
        if !self.paused {
            self.position += seconds * self.rate;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaClock for ManualClock {
    fn current_time(&self) -> f64 {
        self.position
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn seek(&mut self, seconds: f64) {
        self.position = seconds;
    }

    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }
}

/// Mirror of a media element living in another process
///
/// Position samples reported by the host update the mirror; commands issued
/// by the controller update it optimistically and queue up until the host
/// drains them.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteClock {
    position: f64,
    rate: f64,
    paused: bool,
    commands: Vec<PlaybackCommand>,
}

impl RemoteClock {
    pub fn new() -> Self {
        Self {
            position: 0.0,
            rate: 1.0,
            paused: true,
            commands: Vec::new(),
        }
    }

    /// Record a state sample from the host.
    pub fn sample(&mut self, position: f64, paused: bool, rate: f64) {
        self.position = position;
        self.paused = paused;
        self.rate = rate;
    }

    /// Take every command issued since the last drain, oldest first.
    pub fn drain_commands(&mut self) -> Vec<PlaybackCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Default for RemoteClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaClock for RemoteClock {
    fn current_time(&self) -> f64 {
        self.position
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn seek(&mut self, seconds: f64) {
        self.position = seconds;
        self.commands.push(PlaybackCommand::Seek(seconds));
    }

    fn play(&mut self) {
        self.paused = false;
        self.commands.push(PlaybackCommand::Play);
    }

    fn pause(&mut self) {
        self.paused = true;
        self.commands.push(PlaybackCommand::Pause);
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
        self.commands.push(PlaybackCommand::SetRate(rate));
    }
}
