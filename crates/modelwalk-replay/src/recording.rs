//! Recordings: a failing run captured as action names, replayable later.

use modelwalk_explore::FailureReport;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

/// A recorded failing run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Name of the model the run was made against.
    pub model: String,
    /// Strategy that produced the run.
    pub strategy: String,
    /// Tester seed.
    pub seed: u64,
    /// When the recording was made (Unix timestamp).
    pub timestamp: u64,
    /// Action names from reset, failing action last.
    pub actions: Vec<String>,
    /// Rendered states visited before each action.
    pub states: Vec<String>,
    pub failing_action: String,
    pub message: String,
}

impl Recording {
    /// Capture a failure. `action_name` maps catalog indices to names.
    pub fn from_failure<S: Clone + Debug>(
        model: &str,
        strategy: &str,
        seed: u64,
        failure: &FailureReport<S>,
        action_name: impl Fn(usize) -> String,
    ) -> Self {
        let mut actions: Vec<String> = failure
            .sequence
            .actions()
            .into_iter()
            .map(&action_name)
            .collect();
        actions.push(failure.action_name.clone());

        let mut states: Vec<String> = failure
            .sequence
            .transitions()
            .iter()
            .map(|t| render_state(&t.start))
            .collect();
        states.push(render_state(&failure.state));

        Self {
            model: model.to_string(),
            strategy: strategy.to_string(),
            seed,
            timestamp: unix_now(),
            actions,
            states,
            failing_action: failure.action_name.clone(),
            message: failure.message.clone(),
        }
    }

    /// Number of actions, failing action included.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Render a state for a recording: its `Debug` form, without the quotes
/// a string state would carry.
pub fn render_state<S: Debug>(state: &S) -> String {
    let rendered = format!("{:?}", state);
    match rendered
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) if !inner.contains('"') => inner.to_string(),
        _ => rendered,
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
