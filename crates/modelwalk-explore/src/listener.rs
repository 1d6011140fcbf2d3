//! Walk listeners: observers notified by the tester.

use crate::failure::FailureReport;
use crate::graph::StateGraph;
use log::{debug, info, warn};
use modelwalk_model::{ResetReason, Transition};
use std::fmt::Debug;

/// Receives engine events. All hooks default to no-ops.
///
/// Transition and reset events are only delivered while testing, never
/// during graph construction.
pub trait WalkListener<S> {
    fn on_reset(&mut self, _reason: ResetReason, _testing: bool) {}

    fn on_transition(&mut self, _transition: &Transition<S>) {}

    /// Called once after a complete or bounded graph build.
    fn on_graph_snapshot(&mut self, _graph: &StateGraph<S>) {}

    fn on_failure(&mut self, _failure: &FailureReport<S>) {}
}

/// Logs every event through the `log` facade.
#[derive(Debug, Default)]
pub struct LoggingListener {
    action_names: Vec<String>,
}

impl LoggingListener {
    pub fn new(action_names: Vec<String>) -> Self {
        Self { action_names }
    }

    fn name(&self, action: usize) -> &str {
        self.action_names
            .get(action)
            .map(String::as_str)
            .unwrap_or("?")
    }
}

impl<S: Clone + Ord + Debug> WalkListener<S> for LoggingListener {
    fn on_reset(&mut self, reason: ResetReason, testing: bool) {
        debug!("reset ({}), testing={}", reason, testing);
    }

    fn on_transition(&mut self, transition: &Transition<S>) {
        debug!(
            "{:?} --{}--> {:?}",
            transition.start,
            self.name(transition.action),
            transition.end
        );
    }

    fn on_graph_snapshot(&mut self, graph: &StateGraph<S>) {
        info!(
            "Graph snapshot: {} states, {} transitions",
            graph.num_vertices(),
            graph.num_edges()
        );
    }

    fn on_failure(&mut self, failure: &FailureReport<S>) {
        warn!(
            "Failure #{}: {} in {:?} after {} steps: {}",
            failure.id,
            failure.action_name,
            failure.state,
            failure.sequence.len(),
            failure.message
        );
    }
}
