//! Playback session: wires clock notifications to the synchronizer and the
//! overlay renderer.

use std::fmt;

use tracing::{debug, info};

use crate::alert_log::{AlertEntry, AlertLog};
use crate::clock::{ClockEvent, PlaybackClock, PlaybackState};
use crate::event::AnalysisRun;
use crate::overlay::{DrawCommand, OverlayRenderer, Surface};
use crate::sync::{Synchronizer, DEFAULT_TOLERANCE};

/// User-visible status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Analyzing,
    Playing,
    NoAlerts,
    Failed(String),
}

impl Status {
    /// Status after a run was received.
    pub fn for_run(run: &AnalysisRun) -> Self {
        if run.events().is_empty() {
            Self::NoAlerts
        } else {
            Self::Playing
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("Select a video to analyze"),
            Self::Analyzing => f.write_str("⏳ Analyzing video... please wait"),
            Self::Playing => f.write_str("▶️ Analysis Complete. Playing with Live Alerts."),
            Self::NoAlerts => f.write_str("✅ Analysis finished (No safety alerts detected)"),
            Self::Failed(reason) => write!(f, "❌ Error analyzing video: {reason}"),
        }
    }
}

/// What the host should present after one clock notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub position: f64,
    /// Alerts fired by this notification, oldest first
    pub fired: Vec<AlertEntry>,
    /// Store index of the active event
    pub active: Option<usize>,
    pub draw: Vec<DrawCommand>,
}

/// Clock snapshot as last reported by the host.
#[derive(Debug, Clone, Copy, Default)]
struct ClockSnapshot {
    position: f64,
    state: PlaybackState,
}

impl PlaybackClock for ClockSnapshot {
    fn position(&self) -> f64 {
        self.position
    }

    fn state(&self) -> PlaybackState {
        self.state
    }
}

/// One player surface: synchronizer, renderer and the host clock state.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    sync: Synchronizer,
    renderer: OverlayRenderer,
    surface: Surface,
    clock: ClockSnapshot,
    status: Status,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new(
            Synchronizer::new(DEFAULT_TOLERANCE),
            OverlayRenderer::default(),
            Surface::default(),
        )
    }
}

impl PlaybackSession {
    pub fn new(sync: Synchronizer, renderer: OverlayRenderer, surface: Surface) -> Self {
        Self {
            sync,
            renderer,
            surface,
            clock: ClockSnapshot::default(),
            status: Status::Idle,
        }
    }

    /// Swap in a freshly analyzed run. Takes effect before the next tick.
    pub fn load_run(&mut self, run: AnalysisRun) {
        self.status = Status::for_run(&run);
        info!(events = run.events().len(), status = %self.status, "run loaded into session");
        self.sync.load(run);
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Apply one clock notification. Position-bearing events produce a frame.
    pub fn handle(&mut self, event: ClockEvent) -> Option<Frame> {
        match event {
            ClockEvent::Play => self.clock.state = PlaybackState::Playing,
            ClockEvent::Pause => self.clock.state = PlaybackState::Paused,
            ClockEvent::Ended => self.clock.state = PlaybackState::Ended,
            ClockEvent::Seeked(t) => debug!(t, "seek"),
            ClockEvent::TimeUpdate(_) => {}
        }
        let t = event.position()?;
        self.clock.position = t;
        Some(self.tick(t))
    }

    /// Sample an external clock, ticking only while it is playing.
    pub fn poll(&mut self, clock: &impl PlaybackClock) -> Option<Frame> {
        self.clock.state = clock.state();
        if clock.state() != PlaybackState::Playing {
            return None;
        }
        let t = clock.position();
        self.clock.position = t;
        Some(self.tick(t))
    }

    fn tick(&mut self, t: f64) -> Frame {
        let outcome = self.sync.on_tick(t);
        let fired = outcome
            .fired
            .iter()
            .filter_map(|&index| self.sync.event(index).map(|e| AlertEntry::from_event(index, e)))
            .collect();
        let active = outcome.active.and_then(|index| self.sync.event(index));
        let draw = self.renderer.render(active, self.surface);

        Frame {
            position: t,
            fired,
            active: outcome.active,
            draw,
        }
    }

    pub fn clock(&self) -> &impl PlaybackClock {
        &self.clock
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn log(&self) -> &AlertLog {
        self.sync.log()
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.sync
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ScriptedClock, Seek};
    use crate::event::{Category, TimedEvent};

    fn run_at(times: &[f64]) -> AnalysisRun {
        AnalysisRun::from_events(
            times
                .iter()
                .map(|&t| TimedEvent::new(t, Category::ToolProximity))
                .collect(),
        )
    }

    #[test]
    fn test_status_lines() {
        assert_eq!(Status::for_run(&run_at(&[1.0])), Status::Playing);
        assert_eq!(Status::for_run(&AnalysisRun::empty()), Status::NoAlerts);
        assert_eq!(
            Status::Failed("HTTP 500".into()).to_string(),
            "❌ Error analyzing video: HTTP 500"
        );
    }

    #[test]
    fn test_scripted_playback_with_backward_seek() {
        let mut session = PlaybackSession::default();
        session.load_run(run_at(&[1.0, 2.0]));

        let clock = ScriptedClock::new(0.0, 3.0, 0.25).with_seeks(vec![Seek { at: 2.5, to: 0.5 }]);
        let mut fired = Vec::new();
        for event in clock {
            if let Some(frame) = session.handle(event) {
                fired.extend(frame.fired.into_iter().map(|e| e.index));
            }
        }

        assert_eq!(fired, vec![0, 1]);
        assert_eq!(session.log().len(), 2);
        assert_eq!(session.clock().state(), PlaybackState::Ended);
        assert_eq!(session.clock().position(), 3.0);
    }

    #[test]
    fn test_frame_draws_active_event_and_clears_otherwise() {
        let mut session = PlaybackSession::default();
        session.load_run(run_at(&[5.0, 5.2]));

        let frame = session.handle(ClockEvent::TimeUpdate(5.1)).unwrap();
        assert_eq!(frame.active, Some(0));
        assert_eq!(frame.fired.len(), 1);
        assert!(frame.draw.len() > 1);

        let frame = session.handle(ClockEvent::TimeUpdate(6.0)).unwrap();
        assert_eq!(frame.active, None);
        assert_eq!(frame.draw.len(), 1);
        assert!(matches!(frame.draw[0], DrawCommand::Clear { .. }));
    }

    #[test]
    fn test_non_positional_events_yield_no_frame() {
        let mut session = PlaybackSession::default();
        assert!(session.handle(ClockEvent::Play).is_none());
        assert!(session.handle(ClockEvent::Pause).is_none());
        assert_eq!(session.clock().state(), PlaybackState::Paused);
    }

    #[test]
    fn test_poll_ticks_only_while_playing() {
        let mut session = PlaybackSession::default();
        session.load_run(run_at(&[0.0]));

        let mut clock = ScriptedClock::new(0.0, 1.0, 0.5);
        assert!(session.poll(&clock).is_none());

        clock.next();
        let frame = session.poll(&clock).unwrap();
        assert_eq!(frame.fired.len(), 1);
    }

    #[test]
    fn test_reload_mid_playback_starts_clean() {
        let mut session = PlaybackSession::default();
        session.load_run(run_at(&[1.0, 2.0, 10.0]));
        session.handle(ClockEvent::TimeUpdate(2.0));
        assert_eq!(session.log().len(), 2);

        session.load_run(AnalysisRun::empty());
        assert!(session.log().is_empty());
        assert_eq!(session.status(), &Status::NoAlerts);

        let frame = session.handle(ClockEvent::TimeUpdate(10.0)).unwrap();
        assert!(frame.fired.is_empty());
        assert_eq!(frame.draw.len(), 1);
    }
}
