//! All-round-trips walk: greedy, but reset as soon as a loop closes.

use crate::coverage::{CoverageMetric, StateCoverage};
use crate::listener::WalkListener;
use crate::strategy::{greedy_action, random_reset, Choice, Strategy, WalkContext};
use modelwalk_model::{FsmModel, ResetReason, Transition};
use rand_chacha::ChaCha8Rng;

/// Greedy walk that resets whenever it revisits a state within the
/// current run, so each run is a simple path ending in one loop.
#[derive(Debug, Clone)]
pub struct RoundTripWalk<S> {
    visits: StateCoverage<S>,
}

impl<S: Clone + Ord> RoundTripWalk<S> {
    pub fn new() -> Self {
        Self {
            visits: StateCoverage::new(),
        }
    }
}

impl<S: Clone + Ord> Default for RoundTripWalk<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: FsmModel> Strategy<M> for RoundTripWalk<M::State> {
    fn name(&self) -> &'static str {
        "round-trips"
    }

    fn choose(&mut self, ctx: &WalkContext<'_, M>, rng: &mut ChaCha8Rng) -> Choice {
        let state = ctx.builder.graph().state(ctx.current);
        if self.visits.count(state) > 1 {
            return Choice::Reset(ResetReason::FoundLoop);
        }
        if random_reset(ctx, rng) {
            return Choice::Reset(ResetReason::Random);
        }
        greedy_action(ctx, rng)
    }

    fn on_reset(&mut self, _reason: ResetReason) {
        self.visits.clear();
    }

    fn on_transition(&mut self, transition: &Transition<M::State>) {
        self.visits.on_transition(transition);
    }
}
