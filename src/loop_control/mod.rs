//! # Loop Control Module
//!
//! Plays arbitrary time ranges of a media element once, a fixed number of
//! times, or forever, and stops them cleanly.
//!
//! ## Sub-modules
//! - `types` - LoopState, LoopMode, BoundaryOutcome and friends
//! - `clock` - The MediaClock capability plus manual and remote clocks
//! - `timer` - Cancelable supplementary boundary polling
//! - `controller` - The LoopController state machine
//!
//! ## States
//! A controller is either `Idle` or `Playing(mode)` with mode one of
//! `PlayOnce`, `FiniteRepeat(n)` and `InfiniteRepeat`.
//!
//! ## Boundary Check
//! Runs on every position update and on every timer tick. The guard is the
//! range end, moved 80 ms earlier on the final traversal so the next word is
//! never heard. Once the position reaches the guard:
//! - the final traversal pauses and parks the cursor 20 ms before the end
//! - a non-final `FiniteRepeat` traversal counts down and seeks back
//! - `InfiniteRepeat` seeks back
//!
//! After a seek back, checks are ignored until the clock reports a position
//! that shows the seek landed, which keeps the check idempotent when a
//! position update and a tick observe the same stale position.
//!
//! ## Example
//! ```rust
//! use shadowing::config::PlaybackConfig;
//! use shadowing::loop_control::{
//!     BoundaryOutcome, ControllerState, LoopController, ManualClock, MediaClock,
//! };
//!
//! let mut controller = LoopController::new(PlaybackConfig::default());
//! controller.attach(ManualClock::new());
//! controller.play_range(2.0, 4.0, None);
//!
//! let outcome = loop {
//!     controller.clock_mut().unwrap().advance(0.05);
//!     match controller.on_time_update() {
//!         BoundaryOutcome::Within => continue,
//!         other => break other,
//!     }
//! };
//!
//! assert!(matches!(outcome, BoundaryOutcome::Stopped { .. }));
//! assert_eq!(controller.state(), ControllerState::Idle);
//! let position = controller.position().unwrap();
//! assert!(position >= 2.0 && position < 4.0);
//! ```

mod clock;
mod controller;
mod timer;
mod types;


pub use clock::{ManualClock, MediaClock, RemoteClock};
pub use controller::LoopController;
pub use timer::{BoundaryTimer, NoopTimer};
#[cfg(feature = "async")]
pub use timer::TokioBoundaryTimer;
pub use types::{
    BoundaryOutcome, BoundaryTick, ControllerState, LoopMode, LoopState, PlaybackCommand,
};
