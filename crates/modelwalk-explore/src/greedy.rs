//! Greedy walk: prefer transitions not yet taken from the current state.

use crate::strategy::{greedy_action, random_reset, Choice, Strategy, WalkContext};
use modelwalk_model::{FsmModel, ResetReason};
use rand_chacha::ChaCha8Rng;

/// Random walk biased toward the current vertex's untaken actions.
#[derive(Debug, Clone, Default)]
pub struct GreedyWalk;

impl GreedyWalk {
    pub fn new() -> Self {
        Self
    }
}

impl<M: FsmModel> Strategy<M> for GreedyWalk {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn choose(&mut self, ctx: &WalkContext<'_, M>, rng: &mut ChaCha8Rng) -> Choice {
        if random_reset(ctx, rng) {
            return Choice::Reset(ResetReason::Random);
        }
        greedy_action(ctx, rng)
    }
}
