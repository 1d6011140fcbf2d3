//! Table-driven FSM: any deterministic machine given as `(from, action, to)`.
//!
//! An action is enabled in a state iff the table has a row for that
//! `(state, action)` pair. Rows marked as failing raise an action error
//! instead of moving.

use modelwalk_model::{ActionDef, ActionError, FsmModel};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct TableModel {
    initial: String,
    current: String,
    rows: BTreeMap<(String, String), String>,
    failing: BTreeSet<(String, String)>,
}

impl TableModel {
    pub fn new(initial: impl Into<String>) -> Self {
        let initial = initial.into();
        Self {
            current: initial.clone(),
            initial,
            rows: BTreeMap::new(),
            failing: BTreeSet::new(),
        }
    }

    /// Add a row `from --action--> to`.
    pub fn with_transition(mut self, from: &str, action: &str, to: &str) -> Self {
        self.rows
            .insert((from.to_string(), action.to_string()), to.to_string());
        self
    }

    /// Make `action` fail when invoked in `from`. Also enables it there.
    pub fn with_failure(mut self, from: &str, action: &str) -> Self {
        self.failing.insert((from.to_string(), action.to_string()));
        self
    }

    fn enabled(&self, action: &str) -> bool {
        let key = (self.current.clone(), action.to_string());
        self.rows.contains_key(&key) || self.failing.contains(&key)
    }

    fn fire(&mut self, action: &str) -> Result<(), ActionError> {
        let key = (self.current.clone(), action.to_string());
        if self.failing.contains(&key) {
            return Err(ActionError::new(format!(
                "{} is broken in state {}",
                action, self.current
            )));
        }
        match self.rows.get(&key) {
            Some(next) => {
                self.current = next.clone();
                Ok(())
            }
            None => Err(ActionError::new(format!(
                "no transition for {} in state {}",
                action, self.current
            ))),
        }
    }

    fn action_names(&self) -> BTreeSet<String> {
        self.rows
            .keys()
            .chain(self.failing.iter())
            .map(|(_, action)| action.clone())
            .collect()
    }
}

/// A ladder of `rungs` states `0..rungs` with `up`/`down` moves and a
/// `touch<k>` self-loop that is only enabled on rung `k`.
pub fn ladder(rungs: usize) -> TableModel {
    let mut model = TableModel::new("0");
    for k in 0..rungs {
        let here = k.to_string();
        if k + 1 < rungs {
            model = model.with_transition(&here, "up", &(k + 1).to_string());
        }
        if k > 0 {
            model = model.with_transition(&here, "down", &(k - 1).to_string());
        }
        model = model.with_transition(&here, &format!("touch{}", k), &here);
    }
    model
}

impl FsmModel for TableModel {
    type State = String;

    fn reset(&mut self, _testing: bool) {
        self.current = self.initial.clone();
    }

    fn state(&self) -> Option<String> {
        Some(self.current.clone())
    }

    fn actions(&self) -> Vec<ActionDef<Self>> {
        self.action_names()
            .into_iter()
            .map(|name| {
                let guard_name = name.clone();
                let fire_name = name.clone();
                ActionDef::new(name, move |m: &mut TableModel| m.fire(&fire_name))
                    .enabled_when(move |m| m.enabled(&guard_name))
            })
            .collect()
    }
}
