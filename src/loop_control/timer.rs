//! Supplementary boundary polling
//!
//! Media elements report their position opportunistically and may stop
//! reporting altogether while paused at a boundary. A boundary timer asks the
//! controller to re-check on a fixed interval. Each arm carries the
//! generation of the range it belongs to, so a tick that outlives its range is
//! recognised as stale by the controller.

use std::time::Duration;

#[cfg(feature = "async")]
use log::{debug, warn};
#[cfg(feature = "async")]
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
#[cfg(feature = "async")]
use tokio::task::JoinHandle;
#[cfg(feature = "async")]
use tokio::time::MissedTickBehavior;

use super::types::BoundaryTick;

/// Schedules periodic boundary checks
pub trait BoundaryTimer {
    /// Start ticking for `generation`, replacing any previous schedule.
    fn arm(&mut self, generation: u64, interval: Duration);
    /// Stop ticking. Safe to call when nothing is scheduled.
    fn disarm(&mut self);
}

/// For hosts that drive [`poll`](super::LoopController::poll) themselves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopTimer;

impl BoundaryTimer for NoopTimer {
    fn arm(&mut self, _generation: u64, _interval: Duration) {}

    fn disarm(&mut self) {}
}

/// Emits [`BoundaryTick`]s from a tokio task
///
/// The receiving half is handed to whoever owns the controller, which feeds
/// each tick back into [`LoopController::poll`](super::LoopController::poll).
///
/// # Example
/// ```rust
/// use shadowing::loop_control::{BoundaryTimer, TokioBoundaryTimer};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (mut timer, mut ticks) = TokioBoundaryTimer::new();
/// timer.arm(1, Duration::from_millis(5));
/// let tick = ticks.recv().await.unwrap();
/// assert_eq!(tick.generation, 1);
/// timer.disarm();
/// # }
/// ```
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct TokioBoundaryTimer {
    ticks: UnboundedSender<BoundaryTick>,
    task: Option<JoinHandle<()>>,
}

#[cfg(feature = "async")]
impl TokioBoundaryTimer {
    pub fn new() -> (Self, UnboundedReceiver<BoundaryTick>) {
        let (ticks, receiver) = unbounded_channel();
        (Self { ticks, task: None }, receiver)
    }

    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

#[cfg(feature = "async")]
impl BoundaryTimer for TokioBoundaryTimer {
    fn arm(&mut self, generation: u64, interval: Duration) {
        self.disarm();

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("no async runtime available, boundary polling disabled for generation {}", generation);
                return;
            }
        };

        let ticks = self.ticks.clone();
        let period = interval.max(Duration::from_millis(1));
        self.task = Some(handle.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if ticks.send(BoundaryTick { generation }).is_err() {
                    break;
                }
            }
        }));
        debug!("boundary polling armed for generation {} every {:?}", generation, period);
    }

    fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(feature = "async")]
impl Drop for TokioBoundaryTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
