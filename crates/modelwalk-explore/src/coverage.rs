//! Coverage metrics over actions, states, transitions and transition pairs.
//!
//! Metrics are [`WalkListener`]s: the tester feeds them transitions and
//! resets while testing, and a graph snapshot after graph construction
//! supplies their maxima.

use crate::graph::StateGraph;
use crate::listener::WalkListener;
use modelwalk_model::{ResetReason, Transition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A coverage metric: something covered out of an optional known maximum.
pub trait CoverageMetric<S>: WalkListener<S> {
    fn name(&self) -> &'static str;

    fn covered(&self) -> usize;

    /// Known maximum, if any. Graph-derived maxima are only known after a
    /// graph snapshot.
    fn maximum(&self) -> Option<usize>;

    fn percentage(&self) -> Option<f64> {
        match self.maximum() {
            Some(max) if max > 0 => Some(100.0 * self.covered() as f64 / max as f64),
            _ => None,
        }
    }

    fn clear(&mut self);
}

/// Distinct actions executed.
#[derive(Debug, Clone)]
pub struct ActionCoverage {
    covered: BTreeSet<usize>,
    num_actions: usize,
}

impl ActionCoverage {
    pub fn new(num_actions: usize) -> Self {
        Self {
            covered: BTreeSet::new(),
            num_actions,
        }
    }

    pub fn is_covered(&self, action: usize) -> bool {
        self.covered.contains(&action)
    }
}

impl<S> WalkListener<S> for ActionCoverage {
    fn on_transition(&mut self, transition: &Transition<S>) {
        self.covered.insert(transition.action);
    }
}

impl<S> CoverageMetric<S> for ActionCoverage {
    fn name(&self) -> &'static str {
        "actions"
    }

    fn covered(&self) -> usize {
        self.covered.len()
    }

    fn maximum(&self) -> Option<usize> {
        Some(self.num_actions)
    }

    fn clear(&mut self) {
        self.covered.clear();
    }
}

/// Visit counts per state. The first state after a reset is counted when
/// the first transition leaves it.
#[derive(Debug, Clone)]
pub struct StateCoverage<S> {
    visits: BTreeMap<S, u64>,
    after_reset: bool,
    maximum: Option<usize>,
}

impl<S: Clone + Ord> StateCoverage<S> {
    pub fn new() -> Self {
        Self {
            visits: BTreeMap::new(),
            after_reset: true,
            maximum: None,
        }
    }

    /// Number of times `state` has been visited.
    pub fn count(&self, state: &S) -> u64 {
        self.visits.get(state).copied().unwrap_or(0)
    }

    fn visit(&mut self, state: &S) {
        *self.visits.entry(state.clone()).or_insert(0) += 1;
    }
}

impl<S: Clone + Ord> Default for StateCoverage<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + Ord> WalkListener<S> for StateCoverage<S> {
    fn on_reset(&mut self, _reason: ResetReason, _testing: bool) {
        self.after_reset = true;
    }

    fn on_transition(&mut self, transition: &Transition<S>) {
        if self.after_reset {
            self.visit(&transition.start);
            self.after_reset = false;
        }
        self.visit(&transition.end);
    }

    fn on_graph_snapshot(&mut self, graph: &StateGraph<S>) {
        self.maximum = Some(graph.num_vertices());
    }
}

impl<S: Clone + Ord> CoverageMetric<S> for StateCoverage<S> {
    fn name(&self) -> &'static str {
        "states"
    }

    fn covered(&self) -> usize {
        self.visits.len()
    }

    fn maximum(&self) -> Option<usize> {
        self.maximum
    }

    fn clear(&mut self) {
        self.visits.clear();
        self.after_reset = true;
    }
}

/// Distinct `(start, action, end)` transitions executed.
#[derive(Debug, Clone)]
pub struct TransitionCoverage<S> {
    covered: BTreeSet<Transition<S>>,
    maximum: Option<usize>,
}

impl<S: Clone + Ord> TransitionCoverage<S> {
    pub fn new() -> Self {
        Self {
            covered: BTreeSet::new(),
            maximum: None,
        }
    }

    pub fn is_covered(&self, transition: &Transition<S>) -> bool {
        self.covered.contains(transition)
    }
}

impl<S: Clone + Ord> Default for TransitionCoverage<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + Ord> WalkListener<S> for TransitionCoverage<S> {
    fn on_transition(&mut self, transition: &Transition<S>) {
        if !self.covered.contains(transition) {
            self.covered.insert(transition.clone());
        }
    }

    fn on_graph_snapshot(&mut self, graph: &StateGraph<S>) {
        self.maximum = Some(graph.num_edges());
    }
}

impl<S: Clone + Ord> CoverageMetric<S> for TransitionCoverage<S> {
    fn name(&self) -> &'static str {
        "transitions"
    }

    fn covered(&self) -> usize {
        self.covered.len()
    }

    fn maximum(&self) -> Option<usize> {
        self.maximum
    }

    fn clear(&mut self) {
        self.covered.clear();
    }
}

/// Distinct pairs of consecutive transitions within one run.
#[derive(Debug, Clone)]
pub struct TransitionPairCoverage<S> {
    covered: BTreeSet<(Transition<S>, Transition<S>)>,
    previous: Option<Transition<S>>,
    maximum: Option<usize>,
}

impl<S: Clone + Ord> TransitionPairCoverage<S> {
    pub fn new() -> Self {
        Self {
            covered: BTreeSet::new(),
            previous: None,
            maximum: None,
        }
    }
}

impl<S: Clone + Ord> Default for TransitionPairCoverage<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + Ord> WalkListener<S> for TransitionPairCoverage<S> {
    fn on_reset(&mut self, _reason: ResetReason, _testing: bool) {
        self.previous = None;
    }

    fn on_transition(&mut self, transition: &Transition<S>) {
        if let Some(previous) = self.previous.take() {
            self.covered.insert((previous, transition.clone()));
        }
        self.previous = Some(transition.clone());
    }

    fn on_graph_snapshot(&mut self, graph: &StateGraph<S>) {
        // Each incoming edge pairs with each outgoing edge of its target.
        let pairs = graph
            .vertices()
            .map(|v| graph.in_degree(v) * graph.out_degree(v))
            .sum();
        self.maximum = Some(pairs);
    }
}

impl<S: Clone + Ord> CoverageMetric<S> for TransitionPairCoverage<S> {
    fn name(&self) -> &'static str {
        "transition-pairs"
    }

    fn covered(&self) -> usize {
        self.covered.len()
    }

    fn maximum(&self) -> Option<usize> {
        self.maximum
    }

    fn clear(&mut self) {
        self.covered.clear();
        self.previous = None;
    }
}

/// Coverage of one metric at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub name: String,
    pub covered: usize,
    pub maximum: Option<usize>,
}

impl MetricSummary {
    fn of<S>(metric: &dyn CoverageMetric<S>) -> Self {
        Self {
            name: metric.name().to_string(),
            covered: metric.covered(),
            maximum: metric.maximum(),
        }
    }

    pub fn percentage(&self) -> Option<f64> {
        match self.maximum {
            Some(max) if max > 0 => Some(100.0 * self.covered as f64 / max as f64),
            _ => None,
        }
    }
}

/// Covered counts after a given number of transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSample {
    pub transitions: u64,
    pub actions: usize,
    pub states: usize,
    pub edges: usize,
    pub pairs: usize,
}

/// The four standard metrics plus their history.
#[derive(Debug, Clone)]
pub struct CoverageCollector<S> {
    pub actions: ActionCoverage,
    pub states: StateCoverage<S>,
    pub transitions: TransitionCoverage<S>,
    pub pairs: TransitionPairCoverage<S>,
    history: Vec<CoverageSample>,
    total_transitions: u64,
}

impl<S: Clone + Ord> CoverageCollector<S> {
    pub fn new(num_actions: usize) -> Self {
        Self {
            actions: ActionCoverage::new(num_actions),
            states: StateCoverage::new(),
            transitions: TransitionCoverage::new(),
            pairs: TransitionPairCoverage::new(),
            history: Vec::new(),
            total_transitions: 0,
        }
    }

    /// One sample per transition seen while testing.
    pub fn history(&self) -> &[CoverageSample] {
        &self.history
    }

    pub fn summary(&self) -> Vec<MetricSummary> {
        vec![
            MetricSummary::of::<S>(&self.actions),
            MetricSummary::of::<S>(&self.states),
            MetricSummary::of::<S>(&self.transitions),
            MetricSummary::of::<S>(&self.pairs),
        ]
    }

    pub fn clear(&mut self) {
        CoverageMetric::<S>::clear(&mut self.actions);
        self.states.clear();
        self.transitions.clear();
        self.pairs.clear();
        self.history.clear();
        self.total_transitions = 0;
    }
}

impl<S: Clone + Ord> WalkListener<S> for CoverageCollector<S> {
    fn on_reset(&mut self, reason: ResetReason, testing: bool) {
        self.states.on_reset(reason, testing);
        self.pairs.on_reset(reason, testing);
    }

    fn on_transition(&mut self, transition: &Transition<S>) {
        WalkListener::<S>::on_transition(&mut self.actions, transition);
        self.states.on_transition(transition);
        self.transitions.on_transition(transition);
        self.pairs.on_transition(transition);
        self.total_transitions += 1;
        self.history.push(CoverageSample {
            transitions: self.total_transitions,
            actions: CoverageMetric::<S>::covered(&self.actions),
            states: self.states.covered(),
            edges: self.transitions.covered(),
            pairs: self.pairs.covered(),
        });
    }

    fn on_graph_snapshot(&mut self, graph: &StateGraph<S>) {
        self.states.on_graph_snapshot(graph);
        self.transitions.on_graph_snapshot(graph);
        self.pairs.on_graph_snapshot(graph);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StateGraph;

    fn tr(start: u32, action: usize, end: u32) -> Transition<u32> {
        Transition::new(start, action, end)
    }

    #[test]
    fn test_action_coverage() {
        let mut cov = ActionCoverage::new(3);
        WalkListener::<u32>::on_transition(&mut cov, &tr(0, 1, 1));
        WalkListener::<u32>::on_transition(&mut cov, &tr(1, 1, 2));
        assert_eq!(CoverageMetric::<u32>::covered(&cov), 1);
        assert!(cov.is_covered(1));
        let pct = CoverageMetric::<u32>::percentage(&cov).unwrap();
        assert!((pct - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_state_coverage_counts_initial_state() {
        let mut cov = StateCoverage::new();
        cov.on_reset(ResetReason::Initial, true);
        cov.on_transition(&tr(0, 0, 1));
        cov.on_transition(&tr(1, 1, 0));
        assert_eq!(cov.count(&0), 2);
        assert_eq!(cov.count(&1), 1);
        assert_eq!(cov.covered(), 2);
        assert_eq!(cov.maximum(), None);
    }

    #[test]
    fn test_transition_coverage_dedupes() {
        let mut cov = TransitionCoverage::new();
        cov.on_transition(&tr(0, 0, 1));
        cov.on_transition(&tr(0, 0, 1));
        cov.on_transition(&tr(1, 0, 0));
        assert_eq!(cov.covered(), 2);
        assert!(cov.is_covered(&tr(1, 0, 0)));
    }

    #[test]
    fn test_pairs_break_at_reset() {
        let mut cov = TransitionPairCoverage::new();
        cov.on_transition(&tr(0, 0, 1));
        cov.on_transition(&tr(1, 0, 2));
        cov.on_reset(ResetReason::Random, true);
        cov.on_transition(&tr(0, 0, 1));
        assert_eq!(cov.covered(), 1);
    }

    #[test]
    fn test_snapshot_sets_maxima() {
        let mut g = StateGraph::new();
        let (a, _) = g.add_vertex(0u32);
        let (b, _) = g.add_vertex(1u32);
        g.add_edge(a, 0, b);
        g.add_edge(b, 1, a);
        g.add_edge(b, 2, b);

        let mut collector = CoverageCollector::new(3);
        collector.on_graph_snapshot(&g);
        let summary = collector.summary();
        assert_eq!(summary[1].maximum, Some(2));
        assert_eq!(summary[2].maximum, Some(3));
        // a: in 1 * out 1, b: in 2 * out 2.
        assert_eq!(summary[3].maximum, Some(5));
    }

    #[test]
    fn test_collector_history() {
        let mut collector = CoverageCollector::new(2);
        collector.on_reset(ResetReason::Initial, true);
        collector.on_transition(&tr(0, 0, 1));
        collector.on_transition(&tr(1, 1, 0));
        let history = collector.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].actions, 1);
        assert_eq!(history[1].actions, 2);
        assert_eq!(history[1].states, 2);
        assert_eq!(history[1].pairs, 1);
    }
}
