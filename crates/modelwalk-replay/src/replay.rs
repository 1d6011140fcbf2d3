//! Replay engine: re-executes an action list from reset.

use log::trace;
use modelwalk_explore::FailureReport;
use modelwalk_model::{FsmModel, Model, ModelError, Sequence, StepError};
use thiserror::Error;

/// Errors that can occur during replay.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReplayError {
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

/// How a replay ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayOutcome<S> {
    /// The action at index `at` failed.
    Failed { at: usize, failure: FailureReport<S> },
    /// Every action ran without failure.
    Passed { sequence: Sequence<S> },
    /// The action at index `at` was not enabled, so the run left the
    /// recorded path.
    Diverged { at: usize, action: String, state: S },
}

impl<S> ReplayOutcome<S> {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Replays action lists against a model, each from a fresh reset.
pub struct ReplayEngine<'a, M: FsmModel> {
    model: &'a mut Model<M>,
    replays: u64,
}

impl<'a, M: FsmModel> ReplayEngine<'a, M> {
    pub fn new(model: &'a mut Model<M>) -> Self {
        Self { model, replays: 0 }
    }

    /// Number of replays run so far.
    pub fn replays(&self) -> u64 {
        self.replays
    }

    pub fn model(&self) -> &Model<M> {
        &*self.model
    }

    /// Replay catalog indices from reset.
    pub fn replay(&mut self, actions: &[usize]) -> Result<ReplayOutcome<M::State>, ReplayError> {
        self.replays += 1;
        self.model.reset(true)?;
        let mut sequence = Sequence::new();

        for (at, &action) in actions.iter().enumerate() {
            let state = match self.model.state() {
                Some(state) => state.clone(),
                None => {
                    return Err(ModelError::NullState {
                        after: "replay step".to_string(),
                    }
                    .into())
                }
            };
            if !self.model.is_enabled(action) {
                trace!("replay diverged at step {}", at);
                return Ok(ReplayOutcome::Diverged {
                    at,
                    action: self.model.action_name(action).to_string(),
                    state,
                });
            }
            match self.model.execute(action) {
                Ok(transition) => sequence.push(transition),
                Err(StepError::Model(e)) => return Err(e.into()),
                Err(StepError::Action { action: name, source }) => {
                    trace!("replay failed at step {}: {}", at, source);
                    return Ok(ReplayOutcome::Failed {
                        at,
                        failure: FailureReport {
                            id: 0,
                            action,
                            action_name: name,
                            state,
                            sequence,
                            message: source.message,
                            step: at as u64,
                        },
                    });
                }
            }
        }
        Ok(ReplayOutcome::Passed { sequence })
    }

    /// Replay action names from reset.
    pub fn replay_names(&mut self, names: &[String]) -> Result<ReplayOutcome<M::State>, ReplayError> {
        let actions = names
            .iter()
            .map(|name| self.model.action_index(name))
            .collect::<Result<Vec<_>, _>>()?;
        self.replay(&actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelwalk_demo::{CounterModel, SetBug, SetModel};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_replay_reproduces_failure() {
        let mut model = Model::new(SetModel::with_bug(SetBug::RemoveFromFull)).unwrap();
        let mut engine = ReplayEngine::new(&mut model);
        let outcome = engine
            .replay_names(&names(&["addS1", "addS2", "removeS2"]))
            .unwrap();
        match outcome {
            ReplayOutcome::Failed { at, failure } => {
                assert_eq!(at, 2);
                assert_eq!(failure.action_name, "removeS2");
                assert_eq!(failure.state, "TT");
                assert_eq!(failure.sequence.len(), 2);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_replay_passes_on_correct_model() {
        let mut model = Model::new(SetModel::new()).unwrap();
        let mut engine = ReplayEngine::new(&mut model);
        let outcome = engine
            .replay_names(&names(&["addS1", "addS2", "removeS2"]))
            .unwrap();
        match outcome {
            ReplayOutcome::Passed { sequence } => {
                assert_eq!(sequence.last_state().map(String::as_str), Some("TF"))
            }
            other => panic!("expected pass, got {:?}", other),
        }
    }

    #[test]
    fn test_replay_diverges_on_disabled_action() {
        let mut model = Model::new(CounterModel::new(3)).unwrap();
        let mut engine = ReplayEngine::new(&mut model);
        let outcome = engine.replay_names(&names(&["inc", "dec", "dec"])).unwrap();
        assert_eq!(
            outcome,
            ReplayOutcome::Diverged {
                at: 2,
                action: "dec".to_string(),
                state: 0
            }
        );
        assert_eq!(engine.replays(), 1);
    }

    #[test]
    fn test_unknown_action_name() {
        let mut model = Model::new(CounterModel::new(3)).unwrap();
        let mut engine = ReplayEngine::new(&mut model);
        assert_eq!(
            engine.replay_names(&names(&["jump"])),
            Err(ReplayError::Model(ModelError::UnknownAction("jump".to_string())))
        );
    }
}
