//! Lookahead walk: bounded search of the known graph for unexplored
//! transitions.
//!
//! Each action enabled at the current vertex is scored by what it leads
//! to within `depth` steps of the graph built so far. A transition not
//! yet taken from a vertex is worth `new_trans_value`, plus
//! `new_action_value` if the action has never been taken anywhere. A
//! taken transition is worth the best score reachable from its end
//! states one level deeper. The highest value wins; among equal values
//! the one found at a shallower depth wins, then the lowest action index.
//! If nothing scores, the walk falls back to [`GreedyWalk`], random
//! reset roll included.

use crate::exploration::GraphBuilder;
use crate::greedy::GreedyWalk;
use crate::graph::VertexId;
use crate::strategy::{Choice, Strategy, WalkContext};
use log::trace;
use modelwalk_model::{FsmModel, ResetReason};
use rand_chacha::ChaCha8Rng;

/// Lookahead tuning.
#[derive(Debug, Clone)]
pub struct LookaheadConfig {
    /// Search depth in transitions (at least 1).
    pub depth: usize,
    /// Bonus for an action never taken anywhere.
    pub new_action_value: u64,
    /// Value of a transition not yet taken from its vertex.
    pub new_trans_value: u64,
    /// Forced reset after this many transitions without a reset.
    pub max_length: usize,
}

impl Default for LookaheadConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            new_action_value: 100,
            new_trans_value: 50,
            max_length: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Score {
    value: u64,
    /// Depth at which `value` was found (1 = an untaken action here).
    depth: usize,
}

impl Score {
    const NONE: Score = Score { value: 0, depth: 0 };

    fn beats(&self, other: &Score) -> bool {
        if self.value != other.value {
            return self.value > other.value;
        }
        self.value > 0 && self.depth < other.depth
    }
}

/// Lookahead walk strategy.
#[derive(Debug, Clone)]
pub struct LookaheadWalk {
    config: LookaheadConfig,
    fallback: GreedyWalk,
}

impl LookaheadWalk {
    pub fn new(config: LookaheadConfig) -> Self {
        Self {
            config: LookaheadConfig {
                depth: config.depth.max(1),
                ..config
            },
            fallback: GreedyWalk::new(),
        }
    }

    pub fn config(&self) -> &LookaheadConfig {
        &self.config
    }

    fn evaluate<S: Clone + Ord>(
        &self,
        builder: &GraphBuilder<S>,
        vertex: VertexId,
        action: usize,
        depth: usize,
    ) -> Score {
        let record = builder.record(vertex);
        if !record.done.contains(&action) {
            if record.failed.contains(&action) {
                return Score::NONE;
            }
            let mut value = self.config.new_trans_value;
            if !builder.action_done(action) {
                value += self.config.new_action_value;
            }
            return Score { value, depth: 1 };
        }

        let mut best = Score::NONE;
        if depth > 1 {
            for end in builder.graph().successors(vertex, action) {
                let below = self.best_at(builder, end, depth - 1);
                if below.value == 0 {
                    continue;
                }
                let candidate = Score {
                    value: below.value,
                    depth: below.depth + 1,
                };
                if candidate.beats(&best) {
                    best = candidate;
                }
            }
        }
        best
    }

    fn best_at<S: Clone + Ord>(&self, builder: &GraphBuilder<S>, vertex: VertexId, depth: usize) -> Score {
        let mut best = Score::NONE;
        for action in builder.record(vertex).known() {
            let score = self.evaluate(builder, vertex, action, depth);
            if score.beats(&best) {
                best = score;
            }
        }
        best
    }
}

impl Default for LookaheadWalk {
    fn default() -> Self {
        Self::new(LookaheadConfig::default())
    }
}

impl<M: FsmModel> Strategy<M> for LookaheadWalk {
    fn name(&self) -> &'static str {
        "lookahead"
    }

    fn choose(&mut self, ctx: &WalkContext<'_, M>, rng: &mut ChaCha8Rng) -> Choice {
        if ctx.steps_since_reset >= self.config.max_length {
            return Choice::Reset(ResetReason::Forced);
        }

        let mut best: Option<usize> = None;
        let mut best_score = Score::NONE;
        for action in 0..ctx.model.num_actions() {
            if !ctx.model.is_enabled(action) {
                continue;
            }
            let score = self.evaluate(ctx.builder, ctx.current, action, self.config.depth);
            if score.beats(&best_score) {
                best = Some(action);
                best_score = score;
            }
        }

        match best {
            Some(action) => {
                trace!(
                    "lookahead picked {} (value {}, depth {})",
                    ctx.model.action_name(action),
                    best_score.value,
                    best_score.depth
                );
                Choice::Action(action)
            }
            None => Strategy::<M>::choose(&mut self.fallback, ctx, rng),
        }
    }
}
