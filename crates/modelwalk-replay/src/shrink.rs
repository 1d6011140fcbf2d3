//! Failure shrinking: reduce a failing action sequence to a shorter one
//! that still fails.
//!
//! Two reductions are applied until neither makes progress:
//!
//! 1. **Cycle collapse.** If the prefix visits the same state at steps
//!    `i < j`, the actions `i..j` form a loop and are dropped.
//! 2. **Shortest splice.** For two visited states `i < j`, a path in the
//!    built graph shorter than `j - i` replaces the actions between them.
//!
//! A candidate is kept only if replaying it from reset still fails. A
//! candidate that fails earlier than its last action is truncated at the
//! failure. Long sequences have too many loops and splices to try them
//! all, so each round draws a bounded sample from a seeded source and tries
//! larger spans first.

use crate::replay::{ReplayEngine, ReplayError, ReplayOutcome};
use log::{debug, info};
use modelwalk_explore::{FailureReport, StateGraph};
use modelwalk_model::{FsmModel, Model};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors from the shrinker.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShrinkError {
    #[error("sequence does not fail on replay")]
    NotReproducible,

    #[error("replay error: {0}")]
    Replay(#[from] ReplayError),
}

/// Shrinker configuration.
#[derive(Debug, Clone)]
pub struct ShrinkConfig {
    /// Seed for candidate ordering.
    pub seed: u64,
    /// Maximum number of candidate replays.
    pub max_attempts: usize,
    /// Maximum number of full reduction passes.
    pub max_passes: usize,
    /// Loop ranges tried per round. All loops are tried when there are no
    /// more than this many, otherwise the widest plus a random sample.
    pub cycle_candidates: usize,
    /// Splice ranges tried per round. All ranges are tried when there are
    /// no more than this many, otherwise a random sample of this size.
    pub splice_candidates: usize,
    /// Only accept candidates that fail on the same action as the input.
    pub same_action: bool,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_attempts: 1000,
            max_passes: 64,
            cycle_candidates: 16,
            splice_candidates: 16,
            same_action: true,
        }
    }
}

/// Shrinker counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShrinkStats {
    pub attempts: usize,
    pub passes: usize,
    pub cycle_reductions: usize,
    pub splice_reductions: usize,
    /// Accepted candidates that failed before their last action.
    pub truncations: usize,
}

/// A shrunk failing sequence.
#[derive(Debug, Clone)]
pub struct ShrinkResult<S> {
    /// Actions from reset, failing action last.
    pub actions: Vec<usize>,
    /// The failure observed when replaying `actions`.
    pub failure: FailureReport<S>,
    /// Length of the input sequence.
    pub original_len: usize,
    pub stats: ShrinkStats,
}

impl<S> ShrinkResult<S> {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

struct Best<S> {
    actions: Vec<usize>,
    failure: FailureReport<S>,
}

impl<S: Clone> Best<S> {
    /// States visited by the prefix: `s_0 .. s_k`, where `s_k` is the
    /// state the failing action ran in.
    fn states(&self) -> Vec<S> {
        let mut states = self.failure.sequence.states();
        if states.is_empty() {
            states.push(self.failure.state.clone());
        }
        states
    }
}

/// Per-shrink bookkeeping.
struct Search {
    target_action: usize,
    tried: BTreeSet<Vec<usize>>,
    stats: ShrinkStats,
}

/// Shortens failing sequences by replaying candidates against the model.
pub struct Shrinker {
    config: ShrinkConfig,
    rng: ChaCha8Rng,
}

impl Shrinker {
    pub fn new(config: ShrinkConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    pub fn config(&self) -> &ShrinkConfig {
        &self.config
    }

    /// Shrink `failing` (catalog indices from reset, failing action last),
    /// using `graph` for shortcut paths.
    pub fn shrink<M: FsmModel>(
        &mut self,
        failing: &[usize],
        graph: &StateGraph<M::State>,
        model: &mut Model<M>,
    ) -> Result<ShrinkResult<M::State>, ShrinkError> {
        let mut engine = ReplayEngine::new(model);
        let mut best = match engine.replay(failing)? {
            ReplayOutcome::Failed { at, failure } => Best {
                actions: failing[..=at].to_vec(),
                failure,
            },
            _ => return Err(ShrinkError::NotReproducible),
        };
        info!(
            "Shrinking failure of {} after {} actions",
            best.failure.action_name,
            failing.len()
        );

        let mut search = Search {
            target_action: best.failure.action,
            tried: BTreeSet::new(),
            stats: ShrinkStats::default(),
        };
        search.tried.insert(best.actions.clone());

        while search.stats.passes < self.config.max_passes
            && search.stats.attempts < self.config.max_attempts
        {
            search.stats.passes += 1;
            let mut improved = false;
            while self.collapse_cycle(&mut engine, &mut best, &mut search)? {
                search.stats.cycle_reductions += 1;
                improved = true;
            }
            while self.splice_shortcut(&mut engine, &mut best, &mut search, graph)? {
                search.stats.splice_reductions += 1;
                improved = true;
            }
            if !improved {
                break;
            }
        }

        info!(
            "Shrunk {} -> {} actions ({} attempts, {} passes)",
            failing.len(),
            best.actions.len(),
            search.stats.attempts,
            search.stats.passes
        );
        Ok(ShrinkResult {
            actions: best.actions,
            failure: best.failure,
            original_len: failing.len(),
            stats: search.stats,
        })
    }

    /// Try to drop one loop from the prefix.
    fn collapse_cycle<M: FsmModel>(
        &mut self,
        engine: &mut ReplayEngine<'_, M>,
        best: &mut Best<M::State>,
        search: &mut Search,
    ) -> Result<bool, ShrinkError> {
        let states = best.states();
        let mut ranges = self.cycle_ranges(&states);
        ranges.sort_by_key(|&(i, j)| Reverse(j - i));

        for (i, j) in ranges {
            let mut candidate = best.actions[..i].to_vec();
            candidate.extend_from_slice(&best.actions[j..]);
            if self.try_candidate(engine, best, search, candidate)? {
                debug!("collapsed loop {}..{}", i, j);
                return Ok(true);
            }
            if self.out_of_budget(search) {
                break;
            }
        }
        Ok(false)
    }

    /// Try to replace one stretch of the prefix with a shorter graph path.
    fn splice_shortcut<M: FsmModel>(
        &mut self,
        engine: &mut ReplayEngine<'_, M>,
        best: &mut Best<M::State>,
        search: &mut Search,
        graph: &StateGraph<M::State>,
    ) -> Result<bool, ShrinkError> {
        let states = best.states();
        let mut ranges = self.splice_ranges(states.len());
        ranges.sort_by_key(|&(i, j)| Reverse(j - i));

        for (i, j) in ranges {
            let (Some(from), Some(to)) = (graph.vertex(&states[i]), graph.vertex(&states[j]))
            else {
                continue;
            };
            let Some(path) = graph.shortest_path(from, to) else {
                continue;
            };
            if path.len() >= j - i {
                continue;
            }
            let mut candidate = best.actions[..i].to_vec();
            candidate.extend(path.iter().map(|&e| graph.edge(e).action));
            candidate.extend_from_slice(&best.actions[j..]);
            if self.try_candidate(engine, best, search, candidate)? {
                debug!("spliced {}..{} down to {} steps", i, j, path.len());
                return Ok(true);
            }
            if self.out_of_budget(search) {
                break;
            }
        }
        Ok(false)
    }

    /// Loops `(i, j)` with `states[i] == states[j]`. All of them when there
    /// are at most `cycle_candidates`, otherwise the widest loop plus a
    /// random sample.
    fn cycle_ranges<S: Ord>(&mut self, states: &[S]) -> Vec<(usize, usize)> {
        let mut positions: BTreeMap<&S, Vec<usize>> = BTreeMap::new();
        for (i, state) in states.iter().enumerate() {
            positions.entry(state).or_default().push(i);
        }
        let repeated: Vec<Vec<usize>> = positions
            .into_values()
            .filter(|indices| indices.len() > 1)
            .collect();
        if repeated.is_empty() {
            return Vec::new();
        }

        let limit = self.config.cycle_candidates;
        let total: usize = repeated
            .iter()
            .map(|indices| indices.len() * (indices.len() - 1) / 2)
            .sum();
        if total <= limit {
            let mut ranges = Vec::with_capacity(total);
            for indices in &repeated {
                for (a, &i) in indices.iter().enumerate() {
                    for &j in &indices[a + 1..] {
                        ranges.push((i, j));
                    }
                }
            }
            ranges.shuffle(&mut self.rng);
            return ranges;
        }

        let mut picked = BTreeSet::new();
        let mut ranges = Vec::with_capacity(limit.max(1));
        if let Some(widest) = repeated
            .iter()
            .map(|indices| (indices[0], indices[indices.len() - 1]))
            .max_by_key(|&(i, j)| j - i)
        {
            picked.insert(widest);
            ranges.push(widest);
        }
        for _ in 0..limit * 4 {
            if ranges.len() >= limit {
                break;
            }
            let indices = &repeated[self.rng.gen_range(0..repeated.len())];
            let a = self.rng.gen_range(0..indices.len() - 1);
            let b = self.rng.gen_range(a + 1..indices.len());
            if picked.insert((indices[a], indices[b])) {
                ranges.push((indices[a], indices[b]));
            }
        }
        ranges
    }

    /// Ranges `(i, j)` with `j - i >= 2` over `num_states` visited states.
    fn splice_ranges(&mut self, num_states: usize) -> Vec<(usize, usize)> {
        if num_states < 3 {
            return Vec::new();
        }
        let last = num_states - 1;
        let total = (last - 1) * last / 2;
        if total <= self.config.splice_candidates {
            let mut ranges = Vec::with_capacity(total);
            for i in 0..last - 1 {
                for j in i + 2..=last {
                    ranges.push((i, j));
                }
            }
            ranges.shuffle(&mut self.rng);
            return ranges;
        }

        let mut picked = BTreeSet::new();
        let mut ranges = Vec::with_capacity(self.config.splice_candidates);
        for _ in 0..self.config.splice_candidates * 4 {
            if ranges.len() == self.config.splice_candidates {
                break;
            }
            let i = self.rng.gen_range(0..last - 1);
            let j = self.rng.gen_range(i + 2..=last);
            if picked.insert((i, j)) {
                ranges.push((i, j));
            }
        }
        ranges
    }

    /// Replay a candidate and adopt it if it still fails and is shorter.
    fn try_candidate<M: FsmModel>(
        &mut self,
        engine: &mut ReplayEngine<'_, M>,
        best: &mut Best<M::State>,
        search: &mut Search,
        mut candidate: Vec<usize>,
    ) -> Result<bool, ShrinkError> {
        if self.out_of_budget(search) || !search.tried.insert(candidate.clone()) {
            return Ok(false);
        }
        search.stats.attempts += 1;

        let ReplayOutcome::Failed { at, failure } = engine.replay(&candidate)? else {
            return Ok(false);
        };
        if self.config.same_action && failure.action != search.target_action {
            return Ok(false);
        }
        if at + 1 >= best.actions.len() {
            return Ok(false);
        }
        if at + 1 < candidate.len() {
            search.stats.truncations += 1;
            candidate.truncate(at + 1);
        }
        *best = Best {
            actions: candidate,
            failure,
        };
        Ok(true)
    }

    fn out_of_budget(&self, search: &Search) -> bool {
        search.stats.attempts >= self.config.max_attempts
    }
}
