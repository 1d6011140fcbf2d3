//! Failure log: every action failure observed during a run.

use modelwalk_model::Sequence;

/// A failed action invocation and the sequence that led to it.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureReport<S> {
    /// Unique failure ID, assigned by the log.
    pub id: u64,
    /// Catalog index of the failing action.
    pub action: usize,
    pub action_name: String,
    /// State in which the action was invoked.
    pub state: S,
    /// Transitions since the last reset, excluding the failing action.
    pub sequence: Sequence<S>,
    pub message: String,
    /// Engine step counter when the failure happened.
    pub step: u64,
}

impl<S: Clone> FailureReport<S> {
    /// Catalog indices to replay from reset, failing action last.
    pub fn replay_actions(&self) -> Vec<usize> {
        let mut actions = self.sequence.actions();
        actions.push(self.action);
        actions
    }
}

/// Append-only store of failures, in discovery order.
#[derive(Debug, Clone)]
pub struct FailureLog<S> {
    entries: Vec<FailureReport<S>>,
    next_id: u64,
}

impl<S: Clone> FailureLog<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a failure, assigning its ID. Returns the ID.
    pub fn add(&mut self, mut report: FailureReport<S>) -> u64 {
        report.id = self.next_id;
        self.next_id += 1;
        let id = report.id;
        self.entries.push(report);
        id
    }

    pub fn get(&self, id: u64) -> Option<&FailureReport<S>> {
        self.entries.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FailureReport<S>> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&FailureReport<S>> {
        self.entries.last()
    }

    /// Shortest recorded failing sequence, earliest on ties.
    pub fn shortest(&self) -> Option<&FailureReport<S>> {
        self.entries
            .iter()
            .min_by_key(|r| (r.sequence.len(), r.id))
    }

    /// Number of distinct (action, message) failure signatures.
    pub fn distinct_signatures(&self) -> usize {
        let mut seen = std::collections::BTreeSet::new();
        for r in &self.entries {
            seen.insert((r.action, r.message.as_str()));
        }
        seen.len()
    }
}

impl<S: Clone> Default for FailureLog<S> {
    fn default() -> Self {
        Self::new()
    }
}
