//! Range playback state machine

use log::{debug, warn};

use super::clock::MediaClock;
use super::timer::{BoundaryTimer, NoopTimer};
use super::types::{BoundaryOutcome, BoundaryTick, ControllerState, LoopMode, LoopState};
use crate::config::PlaybackConfig;

/// Distance from a seek target at which the seek counts as landed even when
/// the position is already past the guard (ranges shorter than the guard).
const SEEK_LANDING_TOLERANCE: f64 = 0.05;

/// A seek the clock has not confirmed yet
#[derive(Debug, Clone, Copy)]
struct PendingSeek {
    target: f64,
    /// Boundary checks since the seek was (re)issued
    checks: u32,
    reissued: bool,
}

impl PendingSeek {
    fn new(target: f64) -> Self {
        Self {
            target,
            checks: 0,
            reissued: false,
        }
    }
}

/// Enforces play-once and repeat semantics over a time range of a media clock
///
/// Every range gets a fresh generation number. Starting a new range, stopping,
/// or any unrelated playback command moves to a new generation, so a boundary
/// tick armed for an older range is recognised and dropped by [`poll`].
///
/// [`poll`]: LoopController::poll
#[derive(Debug)]
pub struct LoopController<C: MediaClock, T: BoundaryTimer = NoopTimer> {
    clock: Option<C>,
    timer: T,
    config: PlaybackConfig,
    state: LoopState,
    generation: u64,
    loop_forever: bool,
    seek_pending: Option<PendingSeek>,
}

impl<C: MediaClock> LoopController<C, NoopTimer> {
    pub fn new(config: PlaybackConfig) -> Self {
        Self::with_timer(config, NoopTimer)
    }
}

impl<C: MediaClock, T: BoundaryTimer> LoopController<C, T> {
    pub fn with_timer(config: PlaybackConfig, timer: T) -> Self {
        Self {
            clock: None,
            timer,
            config,
            state: LoopState::default(),
            generation: 0,
            loop_forever: false,
            seek_pending: None,
        }
    }

    /// Attach a media clock, replacing (and returning) any previous one.
    /// Loop state belongs to the old clock and is discarded.
    pub fn attach(&mut self, clock: C) -> Option<C> {
        self.reset();
        self.clock.replace(clock)
    }

    pub fn detach(&mut self) -> Option<C> {
        self.reset();
        self.clock.take()
    }

    pub fn clock(&self) -> Option<&C> {
        self.clock.as_ref()
    }

    pub fn clock_mut(&mut self) -> Option<&mut C> {
        self.clock.as_mut()
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn position(&self) -> Option<f64> {
        self.clock.as_ref().map(|c| c.current_time())
    }

    pub fn state(&self) -> ControllerState {
        match self.state.mode {
            LoopMode::Off => ControllerState::Idle,
            mode => ControllerState::Playing(mode),
        }
    }

    pub fn is_playing_range(&self) -> bool {
        self.state.mode != LoopMode::Off
    }

    pub fn loop_state(&self) -> &LoopState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loop_forever(&self) -> bool {
        self.loop_forever
    }

    /// Ranges started without a repeat count loop until stopped while set.
    /// Takes effect on the next [`play_range`](Self::play_range).
    pub fn set_loop_forever(&mut self, enabled: bool) {
        self.loop_forever = enabled;
    }

    /// Start playing `[start, end]`.
    ///
    /// Inverted or negative bounds are clamped. A `repeat` above 1 plays the
    /// range that many times; otherwise the range loops forever when
    /// [`loop_forever`](Self::set_loop_forever) is set and plays once when
    /// not. Any active range is replaced.
    ///
    /// Returns the generation of the new range, or `None` when no clock is
    /// attached.
    pub fn play_range(&mut self, start: f64, end: f64, repeat: Option<u32>) -> Option<u64> {
        let Some(clock) = self.clock.as_mut() else {
            warn!("no media clock attached, ignoring range {}..{}", start, end);
            return None;
        };

        let start = start.max(0.0);
        let end = end.max(start);

        let (mode, remaining) = match repeat {
            Some(n) if n > 1 => (LoopMode::FiniteRepeat(n), n),
            _ if self.loop_forever => (LoopMode::InfiniteRepeat, 0),
            _ => (LoopMode::PlayOnce, 0),
        };

        self.timer.disarm();
        self.generation += 1;
        self.state = LoopState {
            range_start: start,
            range_end: end,
            mode,
            remaining,
        };

        clock.seek(start);
        clock.play();
        self.seek_pending = Some(PendingSeek::new(start));

        self.timer.arm(self.generation, self.config.poll_interval());
        debug!(
            "generation {}: playing {:.3}..{:.3} as {:?}",
            self.generation, start, end, mode
        );
        Some(self.generation)
    }

    /// Check the boundary after the clock reported a new position.
    pub fn on_time_update(&mut self) -> BoundaryOutcome {
        self.check_boundary()
    }

    /// Check the boundary on behalf of a timer tick.
    pub fn poll(&mut self, tick: BoundaryTick) -> BoundaryOutcome {
        if tick.generation != self.generation {
            debug!(
                "dropping stale tick for generation {} (active {})",
                tick.generation, self.generation
            );
            return BoundaryOutcome::Stale;
        }
        self.check_boundary()
    }

    /// Stop enforcing the active range. Playback itself is left alone.
    pub fn stop(&mut self) {
        if self.is_playing_range() {
            debug!("generation {}: range stopped", self.generation);
        }
        self.reset();
    }

    /// The host document changed identity, e.g. navigation to another video.
    pub fn invalidate(&mut self) {
        debug!("generation {}: invalidated", self.generation);
        self.reset();
    }

    pub fn pause(&mut self) {
        self.reset();
        if let Some(clock) = self.clock.as_mut() {
            clock.pause();
        }
    }

    pub fn seek(&mut self, seconds: f64) {
        self.reset();
        if let Some(clock) = self.clock.as_mut() {
            clock.seek(seconds.max(0.0));
        }
    }

    /// Unbounded playback from `seconds`.
    pub fn play_from(&mut self, seconds: f64) {
        self.reset();
        if let Some(clock) = self.clock.as_mut() {
            clock.seek(seconds.max(0.0));
            clock.play();
        }
    }

    /// Change the playback rate. Non-positive or non-finite rates are ignored.
    ///
    /// Like every explicit command this clears the active range; callers that
    /// want the range to continue at the new speed play it again.
    pub fn set_speed(&mut self, rate: f64) {
        if !(rate.is_finite() && rate > 0.0) {
            warn!("ignoring invalid playback rate {}", rate);
            return;
        }
        self.reset();
        if let Some(clock) = self.clock.as_mut() {
            clock.set_playback_rate(rate);
        }
    }

    fn reset(&mut self) {
        self.timer.disarm();
        self.generation += 1;
        self.state.mode = LoopMode::Off;
        self.state.remaining = 0;
        self.seek_pending = None;
    }

    /// Position at which the current traversal ends.
    fn guard(&self) -> f64 {
        let last_traversal = match self.state.mode {
            LoopMode::PlayOnce => true,
            LoopMode::FiniteRepeat(_) => self.state.remaining <= 1,
            _ => false,
        };
        if last_traversal {
            self.state.range_end - self.config.guard_seconds
        } else {
            self.state.range_end
        }
    }

    fn check_boundary(&mut self) -> BoundaryOutcome {
        if self.state.mode == LoopMode::Off {
            return BoundaryOutcome::Idle;
        }
        let Some(position) = self.position() else {
            return BoundaryOutcome::Idle;
        };
        let guard = self.guard();

        if let Some(pending) = self.seek_pending {
            if position < guard || (position - pending.target).abs() <= SEEK_LANDING_TOLERANCE {
                self.seek_pending = None;
            } else {
                return self.await_seek(pending);
            }
        }

        if position < guard {
            return BoundaryOutcome::Within;
        }

        match self.state.mode {
            LoopMode::FiniteRepeat(_) if self.state.remaining > 1 => {
                self.state.remaining -= 1;
                self.rewind();
                debug!(
                    "generation {}: repeat, {} traversals left",
                    self.generation, self.state.remaining
                );
                BoundaryOutcome::Repeated {
                    remaining: Some(self.state.remaining),
                }
            }
            LoopMode::InfiniteRepeat => {
                self.rewind();
                BoundaryOutcome::Repeated { remaining: None }
            }
            _ => self.finish(),
        }
    }

    fn rewind(&mut self) {
        let start = self.state.range_start;
        if let Some(clock) = self.clock.as_mut() {
            clock.seek(start);
        }
        self.seek_pending = Some(PendingSeek::new(start));
    }

    /// Count one more check against an unconfirmed seek. The seek is issued
    /// once more when the wait runs out; a second expiry stops the range.
    fn await_seek(&mut self, mut pending: PendingSeek) -> BoundaryOutcome {
        pending.checks += 1;
        if pending.checks < self.config.seek_wait_checks {
            self.seek_pending = Some(pending);
            return BoundaryOutcome::AwaitingSeek;
        }

        if pending.reissued {
            warn!(
                "generation {}: seek to {:.3} never landed, stopping range",
                self.generation, pending.target
            );
            return self.finish();
        }

        warn!(
            "generation {}: seek to {:.3} unconfirmed after {} checks, issuing again",
            self.generation, pending.target, pending.checks
        );
        if let Some(clock) = self.clock.as_mut() {
            clock.seek(pending.target);
        }
        self.seek_pending = Some(PendingSeek {
            target: pending.target,
            checks: 0,
            reissued: true,
        });
        BoundaryOutcome::AwaitingSeek
    }

    /// Pause and park the cursor just inside the range end.
    fn finish(&mut self) -> BoundaryOutcome {
        let parked = (self.state.range_end - self.config.snap_seconds).max(self.state.range_start);
        if let Some(clock) = self.clock.as_mut() {
            clock.pause();
            clock.seek(parked);
        }
        debug!("generation {}: stopped at {:.3}", self.generation, parked);
        self.reset();
        BoundaryOutcome::Stopped { position: parked }
    }
}
