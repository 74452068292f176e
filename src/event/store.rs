//! Time-ordered event storage for one analysis run

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::wire::{AnalysisResponse, RawEvent, RunSummary};
use super::TimedEvent;

/// Events of one run, sorted ascending by `time`.
///
/// Sorting is stable: events sharing a timestamp keep their load order, which
/// is the tie-break used both for firing and for active-event selection.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<TimedEvent>,
}

impl EventStore {
    /// Build from already-parsed events (any order).
    pub fn from_events(mut events: Vec<TimedEvent>) -> Self {
        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { events }
    }

    /// Parse raw records, dropping those without a usable `time`.
    pub fn parse<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut skipped = 0usize;
        let events = records
            .into_iter()
            .enumerate()
            .filter_map(|(position, record)| {
                let parsed = serde_json::from_value::<RawEvent>(record)
                    .map_err(|err| debug!(position, %err, "dropping malformed event record"))
                    .ok()
                    .and_then(|raw| {
                        let event = TimedEvent::from_raw(raw);
                        if event.is_none() {
                            debug!(position, "dropping event record without a valid time");
                        }
                        event
                    });
                if parsed.is_none() {
                    skipped += 1;
                }
                parsed
            })
            .collect();

        if skipped > 0 {
            debug!(skipped, "event records rejected");
        }
        Self::from_events(events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimedEvent> {
        self.events.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedEvent> {
        self.events.iter()
    }

    pub fn first_time(&self) -> Option<f64> {
        self.events.first().map(|e| e.time)
    }

    pub fn last_time(&self) -> Option<f64> {
        self.events.last().map(|e| e.time)
    }

    /// Events from `from_index` onward, in time order, with their indices.
    pub fn pending(&self, from_index: usize) -> impl Iterator<Item = (usize, &TimedEvent)> {
        self.events.iter().enumerate().skip(from_index)
    }

    /// The event closest to `t` with `|time - t| < tolerance`.
    ///
    /// Equal distances resolve to the earlier event (lower index).
    pub fn query(&self, t: f64, tolerance: f64) -> Option<(usize, &TimedEvent)> {
        if !t.is_finite() || tolerance.is_nan() || tolerance <= 0.0 {
            return None;
        }

        let start = self.events.partition_point(|e| e.time < t - tolerance);
        let mut best: Option<(usize, f64)> = None;

        for (index, event) in self.events.iter().enumerate().skip(start) {
            if event.time > t + tolerance {
                break;
            }
            let distance = (event.time - t).abs();
            if distance < tolerance && best.map_or(true, |(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }

        best.map(|(index, _)| (index, &self.events[index]))
    }
}

/// Everything received from one analysis: the sorted events plus the
/// optional run summary.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRun {
    events: EventStore,
    overall_visibility: Option<String>,
    summary: Option<RunSummary>,
}

impl AnalysisRun {
    /// Run with no events (the state before anything was analyzed).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load raw event records into a run without summary data.
    pub fn load<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            events: EventStore::parse(records),
            ..Self::default()
        }
    }

    #[instrument(skip(response), fields(records = response.events.len()))]
    pub fn from_response(response: AnalysisResponse) -> Self {
        let AnalysisResponse {
            events,
            overall_visibility,
            report,
        } = response;

        let run = Self {
            events: EventStore::parse(events),
            overall_visibility,
            summary: report,
        };

        info!(
            events = run.events.len(),
            first = ?run.events.first_time(),
            last = ?run.events.last_time(),
            has_report = run.summary.is_some(),
            "analysis run loaded"
        );
        run
    }

    pub fn from_events(events: Vec<TimedEvent>) -> Self {
        Self {
            events: EventStore::from_events(events),
            ..Self::default()
        }
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    pub fn overall_visibility(&self) -> Option<&str> {
        self.overall_visibility.as_deref()
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }
}
