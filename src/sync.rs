//! Playback/event synchronization
//!
//! [`Synchronizer::on_tick`] runs two passes for every clock notification:
//!
//! 1. a one-shot pass that fires every still-pending event whose time has
//!    been reached and appends it to the [`AlertLog`];
//! 2. a read-only continuous pass that selects the event to draw.
//!
//! Fired state is never reset within a run, so seeking backward does not
//! re-fire alerts. Loading a new run replaces the events, fired state and
//! log together.

use tracing::{debug, trace, warn};

use crate::alert_log::{AlertEntry, AlertLog};
use crate::event::{AnalysisRun, TimedEvent};

/// Default active-event window, seconds.
pub const DEFAULT_TOLERANCE: f64 = 0.3;

/// One-shot state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiredState {
    Pending,
    Fired,
}

/// Result of one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Store indices fired during this tick, ascending by time
    pub fired: Vec<usize>,
    /// Store index of the active event, if any
    pub active: Option<usize>,
}

/// Drives one analysis run against a playback clock.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    run: AnalysisRun,
    fired: Vec<FiredState>,
    // Every event below this index is fired; the rest are pending.
    next_pending: usize,
    log: AlertLog,
    tolerance: f64,
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl Synchronizer {
    /// Synchronizer with an empty run.
    pub fn new(tolerance: f64) -> Self {
        Self::with_run(AnalysisRun::empty(), tolerance)
    }

    pub fn with_run(run: AnalysisRun, tolerance: f64) -> Self {
        let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
            tolerance
        } else {
            warn!(tolerance, "invalid tolerance, using default");
            DEFAULT_TOLERANCE
        };
        let mut sync = Self {
            run: AnalysisRun::empty(),
            fired: Vec::new(),
            next_pending: 0,
            log: AlertLog::new(),
            tolerance,
        };
        sync.load(run);
        sync
    }

    /// Replace the current run. All fired state and log entries are discarded.
    pub fn load(&mut self, run: AnalysisRun) {
        let previous_pending = self.pending_count();
        self.fired = vec![FiredState::Pending; run.events().len()];
        self.next_pending = 0;
        self.log.clear();
        self.run = run;
        debug!(
            events = self.fired.len(),
            discarded_pending = previous_pending,
            "synchronizer reset for new run"
        );
    }

    /// Process a clock position: fire due alerts, then select the active event.
    pub fn on_tick(&mut self, t: f64) -> TickOutcome {
        if !t.is_finite() {
            warn!(t, "ignoring non-finite clock position");
            return TickOutcome::default();
        }

        let fired = self.fire_due(t);
        let active = self.active_at(t);
        trace!(t, fired = fired.len(), ?active, "tick");
        TickOutcome { fired, active }
    }

    /// One-shot pass: fire every pending event with `time <= t`.
    ///
    /// Returns the fired indices in ascending time order. Ticks behind the
    /// already-fired frontier fire nothing.
    pub fn fire_due(&mut self, t: f64) -> Vec<usize> {
        let mut fired = Vec::new();
        if !t.is_finite() {
            return fired;
        }

        for (index, event) in self.run.events().pending(self.next_pending) {
            if event.time > t {
                break;
            }
            debug_assert_eq!(self.fired[index], FiredState::Pending);
            self.fired[index] = FiredState::Fired;
            let entry = AlertEntry::from_event(index, event);
            debug!(index, time = event.time, category = %event.category, "alert fired");
            self.log.append(entry);
            fired.push(index);
        }

        self.next_pending += fired.len();
        fired
    }

    /// Continuous pass: index of the event to draw at `t`, if any.
    pub fn active_at(&self, t: f64) -> Option<usize> {
        self.run
            .events()
            .query(t, self.tolerance)
            .map(|(index, _)| index)
    }

    /// The event to draw at `t`, if any.
    pub fn active_event(&self, t: f64) -> Option<&TimedEvent> {
        self.run
            .events()
            .query(t, self.tolerance)
            .map(|(_, event)| event)
    }

    pub fn state(&self, index: usize) -> Option<FiredState> {
        self.fired.get(index).copied()
    }

    pub fn pending_count(&self) -> usize {
        self.fired.len() - self.next_pending
    }

    pub fn run(&self) -> &AnalysisRun {
        &self.run
    }

    pub fn event(&self, index: usize) -> Option<&TimedEvent> {
        self.run.events().get(index)
    }

    pub fn log(&self) -> &AlertLog {
        &self.log
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}
