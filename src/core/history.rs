//! Deep history and the transition journal.
//!
//! [`HistoryTracker`] remembers, per compound state, the deepest leaf that
//! was active when the compound was last exited, so a help or timeout detour
//! can resume the exact sub-step. [`TransitionJournal`] keeps a bounded log
//! of accepted transitions for diagnostics.

use super::event::EventKind;
use super::state::StateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Deep-history records keyed by compound state.
///
/// # Example
///
/// ```rust
/// use parley::config::DialogueConfig;
/// use parley::core::HistoryTracker;
/// use parley::dialogue::appointment_chart;
/// use parley::nlu::GrammarResolver;
/// use std::sync::Arc;
///
/// let chart = appointment_chart(Arc::new(GrammarResolver::default()), &DialogueConfig::default())
///     .unwrap();
/// let meeting = chart.lookup("meeting").unwrap();
/// let when = chart.lookup("meeting.when").unwrap();
///
/// let mut history = HistoryTracker::new();
/// assert_eq!(history.resume(meeting), None);
///
/// history.record(meeting, when);
/// assert_eq!(history.resume(meeting), Some(when));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTracker {
    records: HashMap<StateId, StateId>,
}

impl HistoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `leaf` as the deepest active descendant of `compound`.
    pub fn record(&mut self, compound: StateId, leaf: StateId) {
        self.records.insert(compound, leaf);
    }

    /// The leaf to resume when re-entering `compound` via history, if any.
    pub fn resume(&self, compound: StateId) -> Option<StateId> {
        self.records.get(&compound).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Record of a single accepted transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Active leaf path before the transition
    pub from: String,
    /// Active leaf path after the transition
    pub to: String,
    /// Event that triggered it
    pub event: EventKind,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// Consecutive-timeout count at the time (0 if none)
    pub attempt: u32,
}

/// Bounded, ordered log of accepted transitions. Oldest entries are dropped
/// once `capacity` is reached.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionJournal {
    capacity: usize,
    records: VecDeque<TransitionRecord>,
}

impl Default for TransitionJournal {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl TransitionJournal {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: VecDeque::new(),
        }
    }

    pub fn record(&mut self, record: TransitionRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Leaf paths traversed: the first `from`, then every `to`.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.front() {
            path.push(first.from.as_str());
        }
        for record in &self.records {
            path.push(record.to.as_str());
        }
        path
    }

    /// Time between the first and last retained transitions.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Retained records, oldest first.
    pub fn records(&self) -> &VecDeque<TransitionRecord> {
        &self.records
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }
}
