//! Uniform random walk.

use crate::strategy::{random_action, random_reset, Choice, Strategy, WalkContext};
use modelwalk_model::{FsmModel, ResetReason};
use rand_chacha::ChaCha8Rng;

/// Resets with the configured probability, otherwise takes a uniformly
/// random enabled action.
#[derive(Debug, Clone, Default)]
pub struct RandomWalk;

impl RandomWalk {
    pub fn new() -> Self {
        Self
    }
}

impl<M: FsmModel> Strategy<M> for RandomWalk {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose(&mut self, ctx: &WalkContext<'_, M>, rng: &mut ChaCha8Rng) -> Choice {
        if random_reset(ctx, rng) {
            return Choice::Reset(ResetReason::Random);
        }
        random_action(ctx, rng)
    }
}
