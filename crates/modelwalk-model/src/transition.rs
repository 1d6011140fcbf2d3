//! Transitions and the per-run sequence of them.

use serde::{Deserialize, Serialize};

/// One executed action: `start --action--> end`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Transition<S> {
    pub start: S,
    /// Catalog index of the action.
    pub action: usize,
    pub end: S,
}

impl<S> Transition<S> {
    pub fn new(start: S, action: usize, end: S) -> Self {
        Self { start, action, end }
    }
}

/// Transitions executed since the last reset, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence<S> {
    transitions: Vec<Transition<S>>,
}

impl<S: Clone> Sequence<S> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    pub fn from_transitions(transitions: Vec<Transition<S>>) -> Self {
        Self { transitions }
    }

    pub fn push(&mut self, transition: Transition<S>) {
        self.transitions.push(transition);
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn transitions(&self) -> &[Transition<S>] {
        &self.transitions
    }

    pub fn into_transitions(self) -> Vec<Transition<S>> {
        self.transitions
    }

    /// Action indices in execution order.
    pub fn actions(&self) -> Vec<usize> {
        self.transitions.iter().map(|t| t.action).collect()
    }

    /// Visited states: the start of each transition followed by the final
    /// end state. Empty for an empty sequence.
    pub fn states(&self) -> Vec<S> {
        let mut states: Vec<S> = self.transitions.iter().map(|t| t.start.clone()).collect();
        if let Some(last) = self.transitions.last() {
            states.push(last.end.clone());
        }
        states
    }

    pub fn last_state(&self) -> Option<&S> {
        self.transitions.last().map(|t| &t.end)
    }
}

impl<S: Clone> Default for Sequence<S> {
    fn default() -> Self {
        Self::new()
    }
}
