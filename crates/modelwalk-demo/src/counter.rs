//! A bounded counter with an optional injected overflow bug.

use modelwalk_model::{ActionDef, ActionError, FsmModel};

#[derive(Debug, Clone)]
pub struct CounterModel {
    count: u32,
    max: u32,
    /// `inc` fails when invoked at this value.
    fail_at: Option<u32>,
}

impl CounterModel {
    pub fn new(max: u32) -> Self {
        Self {
            count: 0,
            max,
            fail_at: None,
        }
    }

    pub fn failing_at(max: u32, fail_at: u32) -> Self {
        Self {
            count: 0,
            max,
            fail_at: Some(fail_at),
        }
    }

    fn inc(&mut self) -> Result<(), ActionError> {
        if self.fail_at == Some(self.count) {
            return Err(ActionError::new(format!("overflow at {}", self.count)));
        }
        self.count += 1;
        Ok(())
    }
}

impl FsmModel for CounterModel {
    type State = u32;

    fn reset(&mut self, _testing: bool) {
        self.count = 0;
    }

    fn state(&self) -> Option<u32> {
        Some(self.count)
    }

    fn actions(&self) -> Vec<ActionDef<Self>> {
        vec![
            ActionDef::new("dec", |m: &mut CounterModel| {
                m.count -= 1;
                Ok(())
            })
            .enabled_when(|m| m.count > 0),
            ActionDef::new("inc", CounterModel::inc).enabled_when(|m| m.count < m.max),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelwalk_model::Model;

    #[test]
    fn test_counter_guards() {
        let mut model = Model::new(CounterModel::new(1)).unwrap();
        model.reset(true).unwrap();
        let dec = model.action_index("dec").unwrap();
        let inc = model.action_index("inc").unwrap();
        assert!(!model.is_enabled(dec));
        model.execute(inc).unwrap();
        assert!(!model.is_enabled(inc));
        assert!(model.is_enabled(dec));
    }

    #[test]
    fn test_counter_bug() {
        let mut model = Model::new(CounterModel::failing_at(5, 1)).unwrap();
        model.reset(true).unwrap();
        let inc = model.action_index("inc").unwrap();
        model.execute(inc).unwrap();
        let err = model.execute(inc).unwrap_err();
        assert!(err.to_string().contains("overflow at 1"));
    }
}
