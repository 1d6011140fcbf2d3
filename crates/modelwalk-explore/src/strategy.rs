//! Traversal strategies: what to do next from the current state.

use crate::exploration::GraphBuilder;
use crate::graph::VertexId;
use modelwalk_model::{FsmModel, Model, ResetReason, Transition};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// A strategy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Execute the action with this catalog index.
    Action(usize),
    Reset(ResetReason),
}

/// Everything a strategy may look at when choosing.
pub struct WalkContext<'a, M: FsmModel> {
    pub model: &'a Model<M>,
    pub builder: &'a GraphBuilder<M::State>,
    /// Vertex of the current state.
    pub current: VertexId,
    /// Transitions taken since the last reset.
    pub steps_since_reset: usize,
    pub reset_probability: f64,
}

/// A test-generation algorithm.
pub trait Strategy<M: FsmModel> {
    fn name(&self) -> &'static str;

    fn choose(&mut self, ctx: &WalkContext<'_, M>, rng: &mut ChaCha8Rng) -> Choice;

    fn on_reset(&mut self, _reason: ResetReason) {}

    fn on_transition(&mut self, _transition: &Transition<M::State>) {}
}

impl<M: FsmModel> Strategy<M> for Box<dyn Strategy<M>> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn choose(&mut self, ctx: &WalkContext<'_, M>, rng: &mut ChaCha8Rng) -> Choice {
        (**self).choose(ctx, rng)
    }

    fn on_reset(&mut self, reason: ResetReason) {
        (**self).on_reset(reason)
    }

    fn on_transition(&mut self, transition: &Transition<M::State>) {
        (**self).on_transition(transition)
    }
}

/// Roll for a random reset.
pub(crate) fn random_reset<M: FsmModel>(ctx: &WalkContext<'_, M>, rng: &mut ChaCha8Rng) -> bool {
    ctx.reset_probability > 0.0 && rng.gen::<f64>() < ctx.reset_probability
}

/// Pick a uniformly random enabled action by sampling without replacement,
/// or force a reset if none is enabled.
pub(crate) fn random_action<M: FsmModel>(ctx: &WalkContext<'_, M>, rng: &mut ChaCha8Rng) -> Choice {
    let mut untried: Vec<usize> = (0..ctx.model.num_actions()).collect();
    while !untried.is_empty() {
        let action = untried.swap_remove(rng.gen_range(0..untried.len()));
        if ctx.model.is_enabled(action) {
            return Choice::Action(action);
        }
    }
    Choice::Reset(ResetReason::Forced)
}

/// Prefer an untaken action of the current vertex that is enabled now.
pub(crate) fn greedy_action<M: FsmModel>(ctx: &WalkContext<'_, M>, rng: &mut ChaCha8Rng) -> Choice {
    let candidates: Vec<usize> = ctx
        .builder
        .todo(ctx.current)
        .iter()
        .copied()
        .filter(|&a| ctx.model.is_enabled(a))
        .collect();
    if candidates.is_empty() {
        random_action(ctx, rng)
    } else {
        Choice::Action(candidates[rng.gen_range(0..candidates.len())])
    }
}

/// Strategy names accepted by [`by_name`].
pub const STRATEGY_NAMES: &[&str] = &["random", "greedy", "lookahead", "round-trips"];

/// Build a boxed strategy from its name with default settings.
pub fn by_name<M: FsmModel + 'static>(name: &str) -> Option<Box<dyn Strategy<M>>> {
    let strategy: Box<dyn Strategy<M>> = match name {
        "random" => Box::new(crate::random::RandomWalk::new()),
        "greedy" => Box::new(crate::greedy::GreedyWalk::new()),
        "lookahead" => Box::new(crate::lookahead::LookaheadWalk::new(
            crate::lookahead::LookaheadConfig::default(),
        )),
        "round-trips" => Box::new(crate::round_trip::RoundTripWalk::<M::State>::new()),
        _ => return None,
    };
    Some(strategy)
}
