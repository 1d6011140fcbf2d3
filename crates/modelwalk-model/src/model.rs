//! The FSM model contract and the engine-side wrapper around it.

use crate::action::{ActionCatalog, ActionDef, ActionError};
use crate::transition::Transition;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// A finite state machine description of a system under test.
///
/// Implementations own the system under test (or a handle to it) and
/// expose it through an observation function plus guarded actions.
pub trait FsmModel: Sized {
    /// Abstract state. Equal observations are the same graph vertex.
    type State: Clone + Ord + fmt::Debug;

    /// Return the system to its initial state.
    ///
    /// `testing` is false while the engine is only mapping the state
    /// space, so adapters can skip expensive checks.
    fn reset(&mut self, testing: bool);

    /// Observe the current abstract state. `None` is a model bug.
    fn state(&self) -> Option<Self::State>;

    /// The actions of this model, in any order.
    fn actions(&self) -> Vec<ActionDef<Self>>;
}

/// Fatal errors in the model itself (never retried).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("model returned no state after {after}")]
    NullState { after: String },

    #[error("reset returned {actual}, expected initial state {expected}")]
    ResetMismatch { expected: String, actual: String },

    #[error("no actions enabled in initial state {state}")]
    NoEnabledActions { state: String },

    #[error("duplicate action name: {0}")]
    DuplicateAction(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("model has no actions")]
    NoActions,
}

/// Outcome of a failed step: either the model broke or the action failed.
#[derive(Debug, Clone, Error)]
pub enum StepError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("action {action} failed: {source}")]
    Action {
        action: String,
        #[source]
        source: ActionError,
    },
}

/// Why the engine reset the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResetReason {
    /// First reset of a run.
    Initial,
    /// Requested by the caller.
    User,
    /// Random reset chosen by a walk.
    Random,
    /// Dead end, failure recovery, or length budget.
    Forced,
    /// A loop back to an already visited state was closed.
    FoundLoop,
}

impl fmt::Display for ResetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initial => "initial",
            Self::User => "user",
            Self::Random => "random",
            Self::Forced => "forced",
            Self::FoundLoop => "found-loop",
        };
        f.write_str(s)
    }
}

/// Engine-side wrapper around an [`FsmModel`].
///
/// Owns the action catalog, caches the current observation, and enforces
/// the adapter contract: states are never missing, and every reset lands
/// on the same initial state.
pub struct Model<M: FsmModel> {
    inner: M,
    catalog: ActionCatalog<M>,
    initial: Option<M::State>,
    current: Option<M::State>,
}

impl<M: FsmModel> Model<M> {
    /// Wrap a model, building its action catalog.
    pub fn new(inner: M) -> Result<Self, ModelError> {
        let catalog = ActionCatalog::new(inner.actions())?;
        if catalog.is_empty() {
            return Err(ModelError::NoActions);
        }
        Ok(Self {
            inner,
            catalog,
            initial: None,
            current: None,
        })
    }

    pub fn catalog(&self) -> &ActionCatalog<M> {
        &self.catalog
    }

    pub fn num_actions(&self) -> usize {
        self.catalog.len()
    }

    pub fn action_name(&self, index: usize) -> &str {
        self.catalog.name(index)
    }

    pub fn action_index(&self, name: &str) -> Result<usize, ModelError> {
        self.catalog
            .index_of(name)
            .ok_or_else(|| ModelError::UnknownAction(name.to_string()))
    }

    /// The last observed state (`None` before the first reset).
    pub fn state(&self) -> Option<&M::State> {
        self.current.as_ref()
    }

    /// The initial state recorded at the first reset.
    pub fn initial_state(&self) -> Option<&M::State> {
        self.initial.as_ref()
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut M {
        &mut self.inner
    }

    /// Reset the model and verify the initial state is stable.
    pub fn reset(&mut self, testing: bool) -> Result<M::State, ModelError> {
        self.inner.reset(testing);
        let state = self.observe("reset")?;
        if let Some(expected) = &self.initial {
            if *expected != state {
                return Err(ModelError::ResetMismatch {
                    expected: format!("{:?}", expected),
                    actual: format!("{:?}", state),
                });
            }
        } else {
            self.initial = Some(state.clone());
        }
        trace!("reset to {:?} (testing={})", state, testing);
        self.current = Some(state.clone());
        Ok(state)
    }

    /// Enabledness of action `index` in the current state.
    pub fn enabledness(&self, index: usize) -> f64 {
        self.catalog.enabledness(index, &self.inner)
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.enabledness(index) > 0.0
    }

    /// All actions enabled in the current state.
    pub fn enabled_actions(&self) -> BTreeSet<usize> {
        self.catalog.enabled(&self.inner)
    }

    /// Execute action `index` and observe the resulting transition.
    ///
    /// The caller is responsible for checking the guard first.
    pub fn execute(&mut self, index: usize) -> Result<Transition<M::State>, StepError> {
        let start = match &self.current {
            Some(state) => state.clone(),
            None => self.observe("start of step")?,
        };
        if let Err(source) = self.catalog.invoke(index, &mut self.inner) {
            // The post-failure state is unknown until the next reset.
            self.current = None;
            return Err(StepError::Action {
                action: self.catalog.name(index).to_string(),
                source,
            });
        }
        let end = self.observe(self.catalog.name(index))?;
        self.current = Some(end.clone());
        Ok(Transition::new(start, index, end))
    }

    fn observe(&self, after: &str) -> Result<M::State, ModelError> {
        self.inner.state().ok_or_else(|| ModelError::NullState {
            after: after.to_string(),
        })
    }
}

impl<M: FsmModel + fmt::Debug> fmt::Debug for Model<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("inner", &self.inner)
            .field("catalog", &self.catalog)
            .field("current", &self.current)
            .finish()
    }
}
