//! Guarded actions and the alphabetically indexed action catalog.

use crate::model::ModelError;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Failure raised by an action against the system under test.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

type InvokeFn<M> = Box<dyn Fn(&mut M) -> Result<(), ActionError>>;
type GuardFn<M> = Box<dyn Fn(&M) -> f64>;

/// A named action of a model, with an optional guard.
///
/// A guard returns `0.0` when the action is disabled and a positive
/// enabledness otherwise. Actions without a guard are always enabled.
pub struct ActionDef<M> {
    name: String,
    invoke: InvokeFn<M>,
    guard: Option<GuardFn<M>>,
}

impl<M> ActionDef<M> {
    /// Create an unguarded action.
    pub fn new(
        name: impl Into<String>,
        invoke: impl Fn(&mut M) -> Result<(), ActionError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            invoke: Box::new(invoke),
            guard: None,
        }
    }

    /// Attach a weighted guard.
    pub fn with_guard(mut self, guard: impl Fn(&M) -> f64 + 'static) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    /// Attach a boolean guard (`true` maps to enabledness 1.0).
    pub fn enabled_when(self, guard: impl Fn(&M) -> bool + 'static) -> Self {
        self.with_guard(move |m| if guard(m) { 1.0 } else { 0.0 })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_guard(&self) -> bool {
        self.guard.is_some()
    }
}

impl<M> fmt::Debug for ActionDef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDef")
            .field("name", &self.name)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

/// The ordered action list of a model.
///
/// Actions are sorted by name when the catalog is built; the position in
/// that order is the action index used everywhere else.
pub struct ActionCatalog<M> {
    actions: Vec<ActionDef<M>>,
}

impl<M> ActionCatalog<M> {
    /// Build a catalog, sorting actions alphabetically.
    ///
    /// Duplicate names are rejected since they would make indices ambiguous.
    pub fn new(mut actions: Vec<ActionDef<M>>) -> Result<Self, ModelError> {
        actions.sort_by(|a, b| a.name.cmp(&b.name));
        for pair in actions.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(ModelError::DuplicateAction(pair[0].name.clone()));
            }
        }
        Ok(Self { actions })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Name of the action at `index`.
    pub fn name(&self, index: usize) -> &str {
        &self.actions[index].name
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|a| a.name.as_str())
    }

    /// Look up an action index by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.actions
            .binary_search_by(|a| a.name.as_str().cmp(name))
            .ok()
    }

    /// Evaluate the guard of action `index` against `model`.
    pub fn enabledness(&self, index: usize, model: &M) -> f64 {
        match &self.actions[index].guard {
            Some(guard) => guard(model).max(0.0),
            None => 1.0,
        }
    }

    /// Indices of all actions enabled in the model's current state.
    pub fn enabled(&self, model: &M) -> BTreeSet<usize> {
        (0..self.actions.len())
            .filter(|&i| self.enabledness(i, model) > 0.0)
            .collect()
    }

    /// Run action `index` against `model`.
    pub fn invoke(&self, index: usize, model: &mut M) -> Result<(), ActionError> {
        (self.actions[index].invoke)(model)
    }
}

impl<M> fmt::Debug for ActionCatalog<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
