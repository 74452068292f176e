//! Playback clock abstraction
//!
//! A host (browser video element, media player, replay driver) reports its
//! position through [`ClockEvent`]s. Positions are monotonically
//! non-decreasing while playing and may jump arbitrarily on seek.
//! [`ScriptedClock`] produces such a stream for offline replays.

use std::fmt;
use std::str::FromStr;

/// Interval between `timeupdate` notifications used by browsers, seconds.
pub const DEFAULT_STEP: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
    Ended,
}

/// Clock transition reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockEvent {
    Play,
    Pause,
    /// Position advanced during normal playback
    TimeUpdate(f64),
    /// Position jumped (user seek)
    Seeked(f64),
    Ended,
}

impl ClockEvent {
    /// Position carried by the event, if any.
    pub fn position(&self) -> Option<f64> {
        match self {
            Self::TimeUpdate(t) | Self::Seeked(t) => Some(*t),
            Self::Play | Self::Pause | Self::Ended => None,
        }
    }
}

/// Read-only view of a media clock.
pub trait PlaybackClock {
    /// Current media position, seconds.
    fn position(&self) -> f64;

    fn state(&self) -> PlaybackState;
}

/// A seek performed when playback reaches `at`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seek {
    pub at: f64,
    pub to: f64,
}

/// Error for seek directives that are not `AT:TO`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid seek {0:?}, expected AT:TO in seconds (e.g. 4.5:1.0)")]
pub struct ParseSeekError(String);

impl FromStr for Seek {
    type Err = ParseSeekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeekError(s.to_string());
        let (at, to) = s.split_once(':').ok_or_else(err)?;
        let at: f64 = at.trim().parse().map_err(|_| err())?;
        let to: f64 = to.trim().parse().map_err(|_| err())?;
        if !at.is_finite() || !to.is_finite() || at < 0.0 || to < 0.0 {
            return Err(err());
        }
        Ok(Self { at, to })
    }
}

impl fmt::Display for Seek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.at, self.to)
    }
}

/// Deterministic playback from `from` to `to`, emitting a `TimeUpdate` every
/// `step` seconds and performing scripted seeks along the way.
///
/// Each seek fires once, the first time playback reaches its `at` position.
#[derive(Debug, Clone)]
pub struct ScriptedClock {
    position: f64,
    state: PlaybackState,
    to: f64,
    step: f64,
    // Sorted by `at`; consumed front to back.
    seeks: Vec<Seek>,
    next_seek: usize,
    started: bool,
    emitted_first: bool,
}

impl ScriptedClock {
    pub fn new(from: f64, to: f64, step: f64) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            DEFAULT_STEP
        };
        let from = if from.is_finite() { from.max(0.0) } else { 0.0 };
        Self {
            position: from,
            state: PlaybackState::Paused,
            to: if to.is_finite() { to.max(from) } else { from },
            step,
            seeks: Vec::new(),
            next_seek: 0,
            started: false,
            emitted_first: false,
        }
    }

    #[must_use]
    pub fn with_seeks(mut self, mut seeks: Vec<Seek>) -> Self {
        seeks.sort_by(|a, b| a.at.total_cmp(&b.at));
        self.seeks = seeks;
        self.next_seek = 0;
        self
    }

    pub fn end(&self) -> f64 {
        self.to
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

impl PlaybackClock for ScriptedClock {
    fn position(&self) -> f64 {
        self.position
    }

    fn state(&self) -> PlaybackState {
        self.state
    }
}

impl Iterator for ScriptedClock {
    type Item = ClockEvent;

    fn next(&mut self) -> Option<ClockEvent> {
        if !self.started {
            self.started = true;
            self.state = PlaybackState::Playing;
            return Some(ClockEvent::Play);
        }
        if self.state == PlaybackState::Ended {
            return None;
        }
        if !self.emitted_first {
            self.emitted_first = true;
            return Some(ClockEvent::TimeUpdate(self.position));
        }
        if self.position >= self.to {
            self.state = PlaybackState::Ended;
            return Some(ClockEvent::Ended);
        }

        let next = (self.position + self.step).min(self.to);
        // `step` below the float spacing at `position` would never advance.
        if next <= self.position {
            self.state = PlaybackState::Ended;
            return Some(ClockEvent::Ended);
        }
        if let Some(seek) = self.seeks.get(self.next_seek).copied() {
            if seek.at <= next {
                self.next_seek += 1;
                self.position = seek.to.min(self.to);
                return Some(ClockEvent::Seeked(self.position));
            }
        }

        self.position = next;
        Some(ClockEvent::TimeUpdate(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(clock: ScriptedClock) -> Vec<ClockEvent> {
        clock.collect()
    }

    #[test]
    fn test_plain_playback() {
        let events = positions(ScriptedClock::new(0.0, 1.0, 0.5));
        assert_eq!(
            events,
            vec![
                ClockEvent::Play,
                ClockEvent::TimeUpdate(0.0),
                ClockEvent::TimeUpdate(0.5),
                ClockEvent::TimeUpdate(1.0),
                ClockEvent::Ended,
            ]
        );
    }

    #[test]
    fn test_last_step_lands_on_end() {
        let events = positions(ScriptedClock::new(0.0, 0.6, 0.25));
        assert_eq!(events[events.len() - 2], ClockEvent::TimeUpdate(0.6));
    }

    #[test]
    fn test_backward_seek_fires_once() {
        let clock = ScriptedClock::new(0.0, 2.0, 0.5).with_seeks(vec![Seek { at: 1.0, to: 0.0 }]);
        let events = positions(clock);
        let seeks = events
            .iter()
            .filter(|e| matches!(e, ClockEvent::Seeked(_)))
            .count();
        assert_eq!(seeks, 1);
        assert_eq!(events.last(), Some(&ClockEvent::Ended));
        assert!(events.contains(&ClockEvent::Seeked(0.0)));
    }

    #[test]
    fn test_forward_seek_jumps() {
        let clock = ScriptedClock::new(0.0, 10.0, 1.0).with_seeks(vec![Seek { at: 2.0, to: 8.0 }]);
        let events = positions(clock);
        assert_eq!(
            &events[..5],
            &[
                ClockEvent::Play,
                ClockEvent::TimeUpdate(0.0),
                ClockEvent::TimeUpdate(1.0),
                ClockEvent::Seeked(8.0),
                ClockEvent::TimeUpdate(9.0),
            ]
        );
    }

    #[test]
    fn test_state_follows_iteration() {
        let mut clock = ScriptedClock::new(0.0, 0.0, 1.0);
        assert_eq!(clock.state(), PlaybackState::Paused);
        assert_eq!(clock.next(), Some(ClockEvent::Play));
        assert_eq!(clock.state(), PlaybackState::Playing);
        assert_eq!(clock.next(), Some(ClockEvent::TimeUpdate(0.0)));
        assert_eq!(clock.next(), Some(ClockEvent::Ended));
        assert_eq!(clock.state(), PlaybackState::Ended);
        assert_eq!(clock.next(), None);
    }

    #[test]
    fn test_step_absorbed_by_position_ends_playback() {
        let events = positions(ScriptedClock::new(1e17, 1e17 + 100.0, 1.0));
        assert_eq!(
            events,
            vec![
                ClockEvent::Play,
                ClockEvent::TimeUpdate(1e17),
                ClockEvent::Ended,
            ]
        );
    }

    #[test]
    fn test_invalid_step_uses_default() {
        assert_eq!(ScriptedClock::new(0.0, 1.0, 0.0).step(), DEFAULT_STEP);
    }

    #[test]
    fn test_parse_seek() {
        assert_eq!("4.5:1".parse::<Seek>(), Ok(Seek { at: 4.5, to: 1.0 }));
        assert!("4.5".parse::<Seek>().is_err());
        assert!("a:b".parse::<Seek>().is_err());
        assert!("-1:2".parse::<Seek>().is_err());
    }

    #[test]
    fn test_event_position() {
        assert_eq!(ClockEvent::Seeked(3.0).position(), Some(3.0));
        assert_eq!(ClockEvent::Pause.position(), None);
    }
}
