//! Loop controller: polls the active player against the playback window and
//! enforces the repeat budget.
//!
//! The controller never runs its own thread. The egui frame loop calls
//! [`LoopController::tick`] every frame and the controller gates the work on
//! a poll deadline, so ticks are strictly sequential and cancelling a
//! session (reset or budget exhaustion) guarantees no further poll fires.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::player::PlayerAdapter;
use crate::window::{BudgetOutcome, WindowStore};

/// Why a loop could not be started.
#[derive(Debug, Error, PartialEq)]
pub enum LoopError {
    /// The adapter has not signalled readiness (duration unknown).
    #[error("Source is still loading; try again once it is ready")]
    AdapterNotReady,
    /// The window has no extent, so looping it would be zero-length.
    #[error("Loop window is empty: end ({end:.1}s) must be after start ({start:.1}s)")]
    InvalidWindow {
        /// Start bound at the time of the attempt.
        start: f32,
        /// End bound at the time of the attempt.
        end: f32,
    },
}

/// One active loop run. Only the poll schedule lives here; bounds and budget
/// are resolved from the store on every tick so mid-loop edits take effect.
#[derive(Debug)]
struct LoopSession {
    next_poll_at: Instant,
}

/// Poll-driven state machine, `Idle` while `session` is `None`.
pub struct LoopController {
    poll_interval: Duration,
    session: Option<LoopSession>,
}

impl LoopController {
    /// Create an idle controller with the configured poll cadence.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            session: None,
        }
    }

    /// Poll cadence in use.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// True while a loop session is running.
    pub fn is_looping(&self) -> bool {
        self.session.is_some()
    }

    /// Begin looping over the store's current window.
    ///
    /// While already looping this is a no-op: the UI disables the control,
    /// but the guard lives here so a second session can never start.
    pub fn start(
        &mut self,
        store: &WindowStore,
        adapter: &mut dyn PlayerAdapter,
        now: Instant,
    ) -> Result<(), LoopError> {
        if self.session.is_some() {
            debug!("Loop already running; start ignored");
            return Ok(());
        }
        if !adapter.is_ready() {
            return Err(LoopError::AdapterNotReady);
        }
        let window = store.window();
        if !window.has_extent() {
            return Err(LoopError::InvalidWindow {
                start: window.start(),
                end: window.end(),
            });
        }
        adapter.seek_to(window.start());
        adapter.play();
        self.session = Some(LoopSession {
            next_poll_at: now + self.poll_interval,
        });
        info!(
            start = window.start(),
            end = window.end(),
            budget = %store.budget(),
            "Loop started"
        );
        Ok(())
    }

    /// Run at most one poll. Returns true when a boundary crossing was
    /// consumed this tick.
    ///
    /// The comparison is inclusive: a position landing exactly on the end
    /// bound counts as a crossing. Bounds and budget are read from the store
    /// here, never from a snapshot taken at start time.
    pub fn tick(
        &mut self,
        store: &mut WindowStore,
        adapter: &mut dyn PlayerAdapter,
        now: Instant,
    ) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if now < session.next_poll_at {
            return false;
        }
        session.next_poll_at = now + self.poll_interval;

        let window = store.window();
        if adapter.current_time() < window.end() {
            return false;
        }
        match store.consume_budget() {
            BudgetOutcome::Continue => {
                adapter.seek_to(window.start());
            }
            BudgetOutcome::Exhausted => {
                self.session = None;
                adapter.pause();
                info!("Repeat budget exhausted; loop stopped");
            }
        }
        true
    }

    /// Cancel the active session without touching the store or the adapter.
    ///
    /// Used when the source goes away under a running loop (backend failure,
    /// source switch). Safe to call from `Idle`.
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            debug!("Loop cancelled");
        }
    }

    /// Stop any active session and restore the default loop settings.
    ///
    /// Idempotent; safe to call from `Idle`.
    pub fn reset(&mut self, store: &mut WindowStore, adapter: &mut dyn PlayerAdapter) {
        self.session = None;
        adapter.pause();
        adapter.seek_to(0.0);
        store.reset();
        info!("Loop reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerError;
    use crate::window::RepeatBudget;

    /// Minimal adapter whose position is set by the test.
    struct FakeAdapter {
        ready: bool,
        position: f32,
        seeks: Vec<f32>,
        pauses: usize,
        plays: usize,
    }

    impl FakeAdapter {
        fn ready() -> Self {
            Self {
                ready: true,
                position: 0.0,
                seeks: Vec::new(),
                pauses: 0,
                plays: 0,
            }
        }
    }

    impl PlayerAdapter for FakeAdapter {
        fn pump(&mut self) -> Option<PlayerError> {
            None
        }
        fn is_ready(&self) -> bool {
            self.ready
        }
        fn duration(&self) -> Option<f32> {
            self.ready.then_some(100.0)
        }
        fn current_time(&self) -> f32 {
            self.position
        }
        fn seek_to(&mut self, seconds: f32) {
            self.seeks.push(seconds);
            self.position = seconds;
        }
        fn play(&mut self) {
            self.plays += 1;
        }
        fn pause(&mut self) {
            self.pauses += 1;
        }
        fn is_playing(&self) -> bool {
            self.plays > self.pauses
        }
    }

    const INTERVAL: Duration = Duration::from_millis(500);

    fn looping_setup() -> (LoopController, WindowStore, FakeAdapter, Instant) {
        let mut controller = LoopController::new(INTERVAL);
        let mut store = WindowStore::new(10.0);
        store.set_duration(100.0);
        let mut adapter = FakeAdapter::ready();
        let t0 = Instant::now();
        controller.start(&store, &mut adapter, t0).unwrap();
        (controller, store, adapter, t0)
    }

    #[test]
    fn start_requires_a_ready_adapter() {
        let mut controller = LoopController::new(INTERVAL);
        let store = WindowStore::new(10.0);
        let mut adapter = FakeAdapter::ready();
        adapter.ready = false;
        let err = controller
            .start(&store, &mut adapter, Instant::now())
            .unwrap_err();
        assert_eq!(err, LoopError::AdapterNotReady);
        assert!(!controller.is_looping());
    }

    #[test]
    fn start_rejects_an_empty_window() {
        let mut controller = LoopController::new(INTERVAL);
        let mut store = WindowStore::new(10.0);
        store.set_duration(100.0);
        store.set_start(5.0);
        store.set_end(5.0);
        let mut adapter = FakeAdapter::ready();
        let err = controller
            .start(&store, &mut adapter, Instant::now())
            .unwrap_err();
        assert_eq!(
            err,
            LoopError::InvalidWindow {
                start: 5.0,
                end: 5.0
            }
        );
        assert!(adapter.seeks.is_empty());
    }

    #[test]
    fn start_seeks_to_window_start_and_plays() {
        let (controller, _store, adapter, _) = looping_setup();
        assert!(controller.is_looping());
        assert_eq!(adapter.seeks, vec![0.0]);
        assert_eq!(adapter.plays, 1);
    }

    #[test]
    fn second_start_is_a_no_op() {
        let (mut controller, store, mut adapter, t0) = looping_setup();
        controller.start(&store, &mut adapter, t0 + INTERVAL).unwrap();
        // No second seek or play; the existing poll schedule is untouched.
        assert_eq!(adapter.seeks.len(), 1);
        assert_eq!(adapter.plays, 1);
    }

    #[test]
    fn tick_before_the_deadline_does_nothing() {
        let (mut controller, mut store, mut adapter, t0) = looping_setup();
        adapter.position = 100.0;
        assert!(!controller.tick(&mut store, &mut adapter, t0 + INTERVAL / 2));
        assert_eq!(adapter.seeks.len(), 1);
    }

    #[test]
    fn position_exactly_on_end_counts_as_a_crossing() {
        let (mut controller, mut store, mut adapter, t0) = looping_setup();
        adapter.position = store.window().end();
        assert!(controller.tick(&mut store, &mut adapter, t0 + INTERVAL));
        assert_eq!(adapter.seeks, vec![0.0, 0.0]);
    }

    #[test]
    fn exhausted_budget_pauses_and_goes_idle() {
        let (mut controller, mut store, mut adapter, t0) = looping_setup();
        store.set_budget(RepeatBudget::Finite(1));
        adapter.position = 10.0;
        assert!(controller.tick(&mut store, &mut adapter, t0 + INTERVAL));
        assert!(!controller.is_looping());
        assert_eq!(adapter.pauses, 1);
        assert_eq!(store.budget(), RepeatBudget::Finite(0));
        // The cancelled schedule never fires again.
        adapter.position = 50.0;
        assert!(!controller.tick(&mut store, &mut adapter, t0 + INTERVAL * 10));
        assert_eq!(adapter.pauses, 1);
    }

    #[test]
    fn reset_is_idempotent() {
        let (mut controller, mut store, mut adapter, _) = looping_setup();
        controller.reset(&mut store, &mut adapter);
        controller.reset(&mut store, &mut adapter);
        assert!(!controller.is_looping());
        assert_eq!(store.budget(), RepeatBudget::Unbounded);
        assert_eq!(store.window().start(), 0.0);
        assert_eq!(store.window().end(), 10.0);
        assert_eq!(adapter.seeks.last(), Some(&0.0));
    }
}
