//! Incremental graph construction from observed transitions.
//!
//! Each vertex carries an [`ExplorationRecord`]: the actions already taken
//! from it (`done`) and the actions seen enabled but not yet taken
//! (`todo`). Vertices with a non-empty `todo` are tracked in an
//! unexplored set so frontier queries stay cheap.

use crate::graph::{StateGraph, VertexId};
use log::{debug, trace};
use modelwalk_model::Transition;
use std::collections::BTreeSet;

/// Per-vertex exploration bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorationRecord {
    /// Actions taken from this vertex at least once.
    pub done: BTreeSet<usize>,
    /// Actions observed enabled here but never taken.
    pub todo: BTreeSet<usize>,
    /// Actions whose invocation failed here. They leave `todo` without an
    /// edge and are not offered again.
    pub failed: BTreeSet<usize>,
}

impl ExplorationRecord {
    fn merge_enabled(&mut self, enabled: &BTreeSet<usize>) {
        for &action in enabled {
            if !self.done.contains(&action) && !self.failed.contains(&action) {
                self.todo.insert(action);
            }
        }
    }

    /// Every action known at this vertex, taken or not.
    pub fn known(&self) -> BTreeSet<usize> {
        self.done.union(&self.todo).copied().collect()
    }
}

/// Result of recording a reset observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRecord {
    pub vertex: VertexId,
    pub new_vertex: bool,
}

/// Result of recording one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRecord {
    pub from: VertexId,
    pub to: VertexId,
    pub new_vertex: bool,
    pub new_edge: bool,
    /// No action is enabled at the end state.
    pub dead_end: bool,
}

/// Builds the [`StateGraph`] online, one observation at a time.
#[derive(Debug, Clone)]
pub struct GraphBuilder<S> {
    graph: StateGraph<S>,
    records: Vec<ExplorationRecord>,
    unexplored: BTreeSet<VertexId>,
    actions_done: BTreeSet<usize>,
}

impl<S: Clone + Ord> GraphBuilder<S> {
    pub fn new() -> Self {
        Self {
            graph: StateGraph::new(),
            records: Vec::new(),
            unexplored: BTreeSet::new(),
            actions_done: BTreeSet::new(),
        }
    }

    pub fn graph(&self) -> &StateGraph<S> {
        &self.graph
    }

    pub fn record(&self, vertex: VertexId) -> &ExplorationRecord {
        &self.records[vertex.0]
    }

    pub fn todo(&self, vertex: VertexId) -> &BTreeSet<usize> {
        &self.records[vertex.0].todo
    }

    pub fn done(&self, vertex: VertexId) -> &BTreeSet<usize> {
        &self.records[vertex.0].done
    }

    pub fn has_todo(&self, vertex: VertexId) -> bool {
        self.unexplored.contains(&vertex)
    }

    /// Vertices with at least one untaken action, in handle order.
    pub fn unexplored(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.unexplored.iter().copied()
    }

    /// True once no known vertex has an untaken action.
    pub fn is_fully_explored(&self) -> bool {
        self.unexplored.is_empty()
    }

    /// Whether `action` has been taken anywhere in the graph.
    pub fn action_done(&self, action: usize) -> bool {
        self.actions_done.contains(&action)
    }

    pub fn num_actions_done(&self) -> usize {
        self.actions_done.len()
    }

    /// Record a state observed after a reset, with the actions enabled in it.
    pub fn record_state(&mut self, state: S, enabled: &BTreeSet<usize>) -> StateRecord {
        let (vertex, new_vertex) = self.graph.add_vertex(state);
        if new_vertex {
            trace!("new vertex {} with {} enabled actions", vertex.0, enabled.len());
            self.records.push(ExplorationRecord::default());
        }
        let record = &mut self.records[vertex.0];
        record.merge_enabled(enabled);
        if !record.todo.is_empty() {
            self.unexplored.insert(vertex);
        }
        StateRecord { vertex, new_vertex }
    }

    /// Record a completed transition and the actions enabled at its end.
    pub fn record_transition(
        &mut self,
        transition: &Transition<S>,
        enabled_at_end: &BTreeSet<usize>,
    ) -> TransitionRecord {
        let from = self.ensure_vertex(transition.start.clone());
        let end = self.record_state(transition.end.clone(), enabled_at_end);
        let new_edge = self
            .graph
            .add_edge(from, transition.action, end.vertex)
            .is_some();

        let record = &mut self.records[from.0];
        record.todo.remove(&transition.action);
        record.done.insert(transition.action);
        if record.todo.is_empty() {
            self.unexplored.remove(&from);
        }
        self.actions_done.insert(transition.action);

        TransitionRecord {
            from,
            to: end.vertex,
            new_vertex: end.new_vertex,
            new_edge,
            dead_end: enabled_at_end.is_empty(),
        }
    }

    /// Retire an action whose invocation failed at `state`.
    pub fn record_failure(&mut self, state: &S, action: usize) {
        let Some(vertex) = self.graph.vertex(state) else {
            return;
        };
        let record = &mut self.records[vertex.0];
        record.todo.remove(&action);
        if !record.done.contains(&action) {
            debug!("retiring action {} at vertex {} after failure", action, vertex.0);
            record.failed.insert(action);
        }
        if record.todo.is_empty() {
            self.unexplored.remove(&vertex);
        }
    }

    fn ensure_vertex(&mut self, state: S) -> VertexId {
        let (vertex, new_vertex) = self.graph.add_vertex(state);
        if new_vertex {
            self.records.push(ExplorationRecord::default());
        }
        vertex
    }

    /// Check the bookkeeping against the graph. Returns the first violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        for vertex in self.graph.vertices() {
            let record = &self.records[vertex.0];
            if let Some(a) = record.done.intersection(&record.todo).next() {
                return Err(format!("action {} both done and todo at {:?}", a, vertex));
            }
            for &action in &record.done {
                if !self.graph.has_action_edge(vertex, action) {
                    return Err(format!("done action {} has no edge at {:?}", action, vertex));
                }
            }
            if record.todo.is_empty() == self.unexplored.contains(&vertex) {
                return Err(format!("unexplored set out of sync at {:?}", vertex));
            }
        }
        Ok(())
    }
}

impl<S: Clone + Ord> Default for GraphBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[usize]) -> BTreeSet<usize> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_record_state_seeds_todo() {
        let mut b = GraphBuilder::new();
        let rec = b.record_state("s0", &set(&[0, 1]));
        assert!(rec.new_vertex);
        assert_eq!(b.todo(rec.vertex), &set(&[0, 1]));
        assert!(!b.is_fully_explored());
        assert!(b.check_invariants().is_ok());
    }

    #[test]
    fn test_record_transition_moves_action_to_done() {
        let mut b = GraphBuilder::new();
        let s0 = b.record_state("s0", &set(&[0, 1])).vertex;
        let rec = b.record_transition(&Transition::new("s0", 0, "s1"), &set(&[1]));

        assert!(rec.new_vertex);
        assert!(rec.new_edge);
        assert!(!rec.dead_end);
        assert_eq!(rec.from, s0);
        assert_eq!(b.done(s0), &set(&[0]));
        assert_eq!(b.todo(s0), &set(&[1]));
        assert!(b.action_done(0));
        assert!(!b.action_done(1));
        assert!(b.check_invariants().is_ok());
    }

    #[test]
    fn test_repeat_transition_is_idempotent() {
        let mut b = GraphBuilder::new();
        b.record_state(0u32, &set(&[0]));
        let first = b.record_transition(&Transition::new(0, 0, 0), &set(&[0]));
        let second = b.record_transition(&Transition::new(0, 0, 0), &set(&[0]));
        assert!(first.new_edge);
        assert!(!second.new_edge);
        assert_eq!(b.graph().num_edges(), 1);
        assert!(b.is_fully_explored());
    }

    #[test]
    fn test_revisit_merges_newly_enabled_actions() {
        let mut b = GraphBuilder::new();
        let v = b.record_state("s", &set(&[0])).vertex;
        b.record_transition(&Transition::new("s", 0, "s"), &set(&[0]));
        assert!(b.is_fully_explored());

        // Guards depending on hidden variables may enable more later.
        b.record_state("s", &set(&[0, 2]));
        assert_eq!(b.todo(v), &set(&[2]));
        assert!(b.has_todo(v));
        assert!(b.check_invariants().is_ok());
    }

    #[test]
    fn test_dead_end_flagged() {
        let mut b = GraphBuilder::new();
        b.record_state("s0", &set(&[0]));
        let rec = b.record_transition(&Transition::new("s0", 0, "sink"), &BTreeSet::new());
        assert!(rec.dead_end);
        assert!(b.is_fully_explored());
    }

    #[test]
    fn test_failed_action_leaves_todo() {
        let mut b = GraphBuilder::new();
        let v = b.record_state("s0", &set(&[0, 1])).vertex;
        b.record_failure(&"s0", 1);
        assert_eq!(b.todo(v), &set(&[0]));
        assert_eq!(b.record(v).failed, set(&[1]));

        b.record_state("s0", &set(&[0, 1]));
        assert_eq!(b.todo(v), &set(&[0]));
        assert!(b.check_invariants().is_ok());
    }

    #[test]
    fn test_nondeterministic_edges_share_action() {
        let mut b = GraphBuilder::new();
        let s = b.record_state("s", &set(&[0])).vertex;
        b.record_transition(&Transition::new("s", 0, "a"), &set(&[]));
        let rec = b.record_transition(&Transition::new("s", 0, "b"), &set(&[]));
        assert!(rec.new_edge);
        assert_eq!(b.graph().successors(s, 0).len(), 2);
        assert_eq!(b.done(s), &set(&[0]));
        assert!(b.check_invariants().is_ok());
    }
}
