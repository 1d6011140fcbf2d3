//! Triage: compare an original failing run with its shrunk reproducer.

use crate::recording::Recording;
use crate::shrink::{ShrinkConfig, ShrinkError, ShrinkStats, Shrinker};
use modelwalk_explore::StateGraph;
use modelwalk_model::{FsmModel, Model, ModelError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from shrinking a recording.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("model error: {0}")]
    Model(#[from] ModelError),
    #[error("shrink error: {0}")]
    Shrink(#[from] ShrinkError),
}

/// Builds triage reports.
pub struct TriageEngine;

impl TriageEngine {
    /// Build a report from the original recording and its shrunk form.
    pub fn triage(original: &Recording, shrunk: &Recording) -> TriageReport {
        let steps = shrunk
            .actions
            .iter()
            .zip(shrunk.states.iter())
            .enumerate()
            .map(|(i, (action, state))| TimelineEntry {
                step: i + 1,
                state: state.clone(),
                action: action.clone(),
            })
            .collect();

        let severity = if shrunk.len() <= 2 {
            Severity::Shallow
        } else if shrunk.len() <= 8 {
            Severity::Moderate
        } else {
            Severity::Deep
        };

        TriageReport {
            model: original.model.clone(),
            summary: format!(
                "{} fails after {} steps ({} before shrinking): {}",
                shrunk.failing_action,
                shrunk.len(),
                original.len(),
                shrunk.message
            ),
            failing_action: shrunk.failing_action.clone(),
            message: shrunk.message.clone(),
            original_len: original.len(),
            shrunk_len: shrunk.len(),
            steps,
            reproduction: ReproductionInfo {
                model: shrunk.model.clone(),
                seed: original.seed,
                strategy: original.strategy.clone(),
                actions: shrunk.actions.clone(),
            },
            severity,
        }
    }

    /// Shrink a recorded failure against `model` and triage the result.
    pub fn shrink_recording<M: FsmModel>(
        original: &Recording,
        model: &mut Model<M>,
        graph: &StateGraph<M::State>,
        config: ShrinkConfig,
    ) -> Result<(TriageReport, ShrinkStats), TriageError> {
        let actions = original
            .actions
            .iter()
            .map(|name| model.action_index(name))
            .collect::<Result<Vec<_>, _>>()?;
        let mut shrinker = Shrinker::new(config);
        let result = shrinker.shrink(&actions, graph, model)?;
        let shrunk = Recording::from_failure(
            &original.model,
            &original.strategy,
            original.seed,
            &result.failure,
            |i| model.action_name(i).to_string(),
        );
        Ok((Self::triage(original, &shrunk), result.stats))
    }
}

/// A failure report for human consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageReport {
    pub model: String,
    /// One-line summary.
    pub summary: String,
    pub failing_action: String,
    pub message: String,
    pub original_len: usize,
    pub shrunk_len: usize,
    /// Shrunk reproducer, one entry per action.
    pub steps: Vec<TimelineEntry>,
    pub reproduction: ReproductionInfo,
    pub severity: Severity,
}

/// One step of the reproducer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub step: usize,
    /// State the action ran in.
    pub state: String,
    pub action: String,
}

/// Instructions for reproducing the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReproductionInfo {
    pub model: String,
    /// Seed of the run that found it.
    pub seed: u64,
    pub strategy: String,
    /// Action names to replay from reset.
    pub actions: Vec<String>,
}

/// How deep in the state space the failure sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Reachable within two actions of reset.
    Shallow,
    /// Up to eight actions.
    Moderate,
    Deep,
}
