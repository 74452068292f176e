//! Log of fired one-shot alerts
//!
//! Entries are stored in firing order (oldest first). Displays show them
//! newest first, the way the alert list prepends new entries.

use std::fmt;

use crate::event::{Category, TimedEvent};

/// A fired alert, as shown in the log.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEntry {
    /// Index of the event in its run's store; identifies the event
    pub index: usize,
    pub time: f64,
    pub category: Category,
    pub confidence: f64,
}

impl AlertEntry {
    pub fn from_event(index: usize, event: &TimedEvent) -> Self {
        Self {
            index,
            time: event.time,
            category: event.category.clone(),
            confidence: event.confidence,
        }
    }
}

impl fmt::Display for AlertEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "⏱ {:.2}s: {} (Conf: {:.1}%)",
            self.time,
            self.category,
            self.confidence * 100.0
        )
    }
}

/// Append-only alert log scoped to one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    entries: Vec<AlertEntry>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly fired alert.
    ///
    /// Events fire in store order, so indices in the log are strictly
    /// increasing.
    pub fn append(&mut self, entry: AlertEntry) {
        debug_assert!(
            self.entries.last().map_or(true, |last| last.index < entry.index),
            "alert {} appended out of order or twice",
            entry.index
        );
        self.entries.push(entry);
    }

    /// Drop every entry. Only done when a new run is loaded.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in firing order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &AlertEntry> {
        self.entries.iter()
    }

    /// Entries newest first, for display.
    pub fn newest_first(&self) -> impl Iterator<Item = &AlertEntry> {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&AlertEntry> {
        self.entries.last()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries
            .binary_search_by_key(&index, |entry| entry.index)
            .is_ok()
    }
}
