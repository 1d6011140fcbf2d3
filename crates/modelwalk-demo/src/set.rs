//! A set over two elements, observed as two flags.
//!
//! States are rendered `FF`, `TF`, `FT`, `TT` (is `s1` present, is `s2`
//! present). All four actions are always enabled, so the full graph has
//! four vertices and sixteen edges.

use modelwalk_model::{ActionDef, ActionError, FsmModel};

/// Injected bug variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetBug {
    /// Correct implementation.
    #[default]
    None,
    /// `removeS2` fails while both elements are in the set.
    RemoveFromFull,
}

#[derive(Debug, Clone, Default)]
pub struct SetModel {
    s1: bool,
    s2: bool,
    bug: SetBug,
}

impl SetModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bug(bug: SetBug) -> Self {
        Self {
            bug,
            ..Self::default()
        }
    }

    fn remove_s2(&mut self) -> Result<(), ActionError> {
        if self.bug == SetBug::RemoveFromFull && self.s1 && self.s2 {
            return Err(ActionError::new("removeS2 dropped both elements"));
        }
        self.s2 = false;
        Ok(())
    }
}

fn flag(b: bool) -> char {
    if b {
        'T'
    } else {
        'F'
    }
}

impl FsmModel for SetModel {
    type State = String;

    fn reset(&mut self, _testing: bool) {
        self.s1 = false;
        self.s2 = false;
    }

    fn state(&self) -> Option<String> {
        Some(format!("{}{}", flag(self.s1), flag(self.s2)))
    }

    fn actions(&self) -> Vec<ActionDef<Self>> {
        vec![
            ActionDef::new("addS1", |m: &mut SetModel| {
                m.s1 = true;
                Ok(())
            }),
            ActionDef::new("addS2", |m: &mut SetModel| {
                m.s2 = true;
                Ok(())
            }),
            ActionDef::new("removeS1", |m: &mut SetModel| {
                m.s1 = false;
                Ok(())
            }),
            ActionDef::new("removeS2", SetModel::remove_s2),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelwalk_model::Model;

    #[test]
    fn test_set_states() {
        let mut model = Model::new(SetModel::new()).unwrap();
        assert_eq!(model.reset(true).unwrap(), "FF");
        let add2 = model.action_index("addS2").unwrap();
        let tr = model.execute(add2).unwrap();
        assert_eq!(tr.end, "FT");
    }

    #[test]
    fn test_set_action_order() {
        let model = Model::new(SetModel::new()).unwrap();
        let names: Vec<_> = model.catalog().names().collect();
        assert_eq!(names, vec!["addS1", "addS2", "removeS1", "removeS2"]);
    }

    #[test]
    fn test_buggy_set_fails_only_when_full() {
        let mut model = Model::new(SetModel::with_bug(SetBug::RemoveFromFull)).unwrap();
        model.reset(true).unwrap();
        let remove2 = model.action_index("removeS2").unwrap();
        assert!(model.execute(remove2).is_ok());

        model.execute(model.action_index("addS1").unwrap()).unwrap();
        model.execute(model.action_index("addS2").unwrap()).unwrap();
        assert!(model.execute(remove2).is_err());
    }
}
