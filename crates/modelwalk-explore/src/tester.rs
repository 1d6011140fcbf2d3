//! The test engine: drives a strategy over a model and records
//! everything it observes.

use crate::coverage::CoverageCollector;
use crate::exploration::GraphBuilder;
use crate::failure::{FailureLog, FailureReport};
use crate::graph::{StateGraph, VertexId};
use crate::listener::WalkListener;
use crate::report::{GraphStats, TesterReport};
use crate::strategy::{Choice, Strategy, WalkContext};
use log::{debug, info, warn};
use modelwalk_model::{FsmModel, Model, ModelError, ResetReason, Sequence, StepError, Transition};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Errors that stop a walk.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalkError {
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("action {action} failed (failure #{failure_id}): {message}")]
    ActionFailed {
        failure_id: u64,
        action: String,
        message: String,
    },
}

/// Configuration for a [`Tester`].
#[derive(Debug, Clone)]
pub struct TesterConfig {
    /// Seed for the tester's random source.
    pub seed: u64,
    /// Probability of a random reset before each step.
    pub reset_probability: f64,
    /// Return [`WalkError::ActionFailed`] on the first failure instead
    /// of resetting and carrying on.
    pub stop_on_failure: bool,
    /// Stop after this many failures, if set.
    pub max_failures: Option<usize>,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            reset_probability: 0.05,
            stop_on_failure: false,
            max_failures: None,
        }
    }
}

/// What one call to [`Tester::step`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<S> {
    Transition(Transition<S>),
    Reset(ResetReason),
    /// An action failed; the ID refers to the tester's failure log.
    Failure(u64),
}

/// Running counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TesterStats {
    /// Steps taken while testing (transitions, resets and failures).
    pub steps: u64,
    pub transitions: u64,
    pub resets: u64,
    pub failures: u64,
    /// Transitions taken while building the graph.
    pub build_transitions: u64,
}

/// Walks a model with a strategy, building the state graph as it goes.
pub struct Tester<M: FsmModel, W: Strategy<M>> {
    config: TesterConfig,
    model: Model<M>,
    strategy: W,
    builder: GraphBuilder<M::State>,
    coverage: CoverageCollector<M::State>,
    listeners: Vec<Box<dyn WalkListener<M::State>>>,
    rng: ChaCha8Rng,
    sequence: Sequence<M::State>,
    failures: FailureLog<M::State>,
    stats: TesterStats,
    pending_reset: Option<ResetReason>,
}

impl<M: FsmModel, W: Strategy<M>> Tester<M, W> {
    pub fn new(model: Model<M>, strategy: W, config: TesterConfig) -> Self {
        let coverage = CoverageCollector::new(model.num_actions());
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            model,
            strategy,
            builder: GraphBuilder::new(),
            coverage,
            listeners: Vec::new(),
            rng,
            sequence: Sequence::new(),
            failures: FailureLog::new(),
            stats: TesterStats::default(),
            pending_reset: Some(ResetReason::Initial),
        }
    }

    /// Replace the random source.
    pub fn with_rng(mut self, rng: ChaCha8Rng) -> Self {
        self.rng = rng;
        self
    }

    pub fn add_listener(&mut self, listener: Box<dyn WalkListener<M::State>>) {
        self.listeners.push(listener);
    }

    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    pub fn model(&self) -> &Model<M> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model<M> {
        &mut self.model
    }

    pub fn strategy(&self) -> &W {
        &self.strategy
    }

    pub fn graph(&self) -> &StateGraph<M::State> {
        self.builder.graph()
    }

    pub fn builder(&self) -> &GraphBuilder<M::State> {
        &self.builder
    }

    pub fn coverage(&self) -> &CoverageCollector<M::State> {
        &self.coverage
    }

    pub fn failures(&self) -> &FailureLog<M::State> {
        &self.failures
    }

    pub fn stats(&self) -> TesterStats {
        self.stats
    }

    /// Transitions since the last reset.
    pub fn sequence(&self) -> &Sequence<M::State> {
        &self.sequence
    }

    /// Request a reset before the next step.
    pub fn reset(&mut self) {
        self.pending_reset = Some(ResetReason::User);
    }

    /// Take one step: a transition, a reset, or a failed action.
    pub fn step(&mut self) -> Result<StepOutcome<M::State>, WalkError> {
        if let Some(reason) = self.pending_reset {
            self.reset_model(reason, true)?;
        }
        let current = self.current_vertex()?;

        let choice = {
            let ctx = WalkContext {
                model: &self.model,
                builder: &self.builder,
                current,
                steps_since_reset: self.sequence.len(),
                reset_probability: self.config.reset_probability,
            };
            self.strategy.choose(&ctx, &mut self.rng)
        };

        self.stats.steps += 1;
        match choice {
            Choice::Reset(reason) => {
                self.reset_model(reason, true)?;
                Ok(StepOutcome::Reset(reason))
            }
            Choice::Action(action) => self.take_action(action, true),
        }
    }

    /// Take `length` steps, stopping early on a fatal error.
    pub fn generate(&mut self, length: usize) -> Result<Vec<StepOutcome<M::State>>, WalkError> {
        info!(
            "Generating {} steps with {} walk (seed {})",
            length,
            self.strategy.name(),
            self.config.seed
        );
        let mut outcomes = Vec::with_capacity(length);
        for _ in 0..length {
            outcomes.push(self.step()?);
        }
        Ok(outcomes)
    }

    /// Explore the model until every enabled action of every reachable
    /// state has been taken at least once, or `max_transitions` are spent.
    ///
    /// Runs with `testing = false` and sends no coverage events except a
    /// final graph snapshot. Returns whether the graph is complete.
    pub fn build_graph(&mut self, rng: &mut ChaCha8Rng, max_transitions: usize) -> Result<bool, WalkError> {
        info!("Building state graph (budget {} transitions)", max_transitions);
        self.reset_model(ResetReason::Initial, false)?;

        let mut taken = 0;
        let mut reset_without_progress = false;
        while !self.builder.is_fully_explored() {
            if taken >= max_transitions {
                warn!(
                    "Graph build stopped after {} transitions with {} unexplored states",
                    taken,
                    self.builder.unexplored().count()
                );
                self.finish_build();
                return Ok(false);
            }

            let current = self.current_vertex()?;
            let action = match self.next_build_action(rng, current) {
                Some(action) => action,
                None if reset_without_progress => {
                    warn!("Unexplored states are unreachable from the initial state");
                    self.finish_build();
                    return Ok(false);
                }
                None => {
                    self.reset_model(ResetReason::Forced, false)?;
                    reset_without_progress = true;
                    continue;
                }
            };

            self.take_action(action, false)?;
            reset_without_progress = false;
            taken += 1;
        }

        info!(
            "Graph complete: {} states, {} transitions ({} steps)",
            self.builder.graph().num_vertices(),
            self.builder.graph().num_edges(),
            taken
        );
        self.finish_build();
        Ok(true)
    }

    /// An untaken enabled action here, or the first step toward the
    /// nearest vertex that has one.
    fn next_build_action(&self, rng: &mut ChaCha8Rng, current: VertexId) -> Option<usize> {
        let here: Vec<usize> = self
            .builder
            .todo(current)
            .iter()
            .copied()
            .filter(|&a| self.model.is_enabled(a))
            .collect();
        if !here.is_empty() {
            return Some(here[rng.gen_range(0..here.len())]);
        }

        let graph = self.builder.graph();
        let path = graph.find_path(current, |v| v != current && self.builder.has_todo(v))?;
        let first = path.first()?;
        let action = graph.edge(*first).action;
        self.model.is_enabled(action).then_some(action)
    }

    fn finish_build(&mut self) {
        let graph = self.builder.graph();
        self.coverage.on_graph_snapshot(graph);
        for listener in &mut self.listeners {
            listener.on_graph_snapshot(graph);
        }
        self.pending_reset = Some(ResetReason::Initial);
    }

    /// Summary of the run so far.
    pub fn report(&self) -> TesterReport {
        let graph = self.builder.graph();
        TesterReport {
            strategy: self.strategy.name().to_string(),
            seed: self.config.seed,
            stats: self.stats,
            coverage: self.coverage.summary(),
            graph: GraphStats {
                states: graph.num_vertices(),
                transitions: graph.num_edges(),
                unexplored: self.builder.unexplored().count(),
            },
            failures: self.failures.len(),
            distinct_failures: self.failures.distinct_signatures(),
        }
    }

    fn current_vertex(&mut self) -> Result<VertexId, WalkError> {
        if let Some(vertex) = self.model.state().and_then(|s| self.builder.graph().vertex(s)) {
            return Ok(vertex);
        }
        // State unknown (never reset, or lost after a failure).
        self.reset_model(ResetReason::Forced, true)?;
        self.model
            .state()
            .and_then(|s| self.builder.graph().vertex(s))
            .ok_or_else(|| {
                ModelError::NullState {
                    after: "reset".to_string(),
                }
                .into()
            })
    }

    fn reset_model(&mut self, reason: ResetReason, testing: bool) -> Result<(), WalkError> {
        let state = self.model.reset(testing)?;
        let enabled = self.model.enabled_actions();
        if enabled.is_empty() {
            return Err(ModelError::NoEnabledActions {
                state: format!("{:?}", state),
            }
            .into());
        }
        self.builder.record_state(state, &enabled);
        self.sequence.clear();
        self.pending_reset = None;

        if testing {
            self.stats.resets += 1;
            self.coverage.on_reset(reason, testing);
            for listener in &mut self.listeners {
                listener.on_reset(reason, testing);
            }
        }
        self.strategy.on_reset(reason);
        debug!("reset ({})", reason);
        Ok(())
    }

    fn take_action(&mut self, action: usize, testing: bool) -> Result<StepOutcome<M::State>, WalkError> {
        let start = self.model.state().cloned();
        match self.model.execute(action) {
            Ok(transition) => {
                let enabled = self.model.enabled_actions();
                let record = self.builder.record_transition(&transition, &enabled);
                self.sequence.push(transition.clone());
                if testing {
                    self.stats.transitions += 1;
                    self.coverage.on_transition(&transition);
                    for listener in &mut self.listeners {
                        listener.on_transition(&transition);
                    }
                } else {
                    self.stats.build_transitions += 1;
                }
                self.strategy.on_transition(&transition);

                if record.dead_end {
                    debug!("dead end at {:?}, forcing reset", transition.end);
                    self.reset_model(ResetReason::Forced, testing)?;
                }
                Ok(StepOutcome::Transition(transition))
            }
            Err(StepError::Model(e)) => Err(e.into()),
            Err(StepError::Action { action: name, source }) => {
                let Some(state) = start else {
                    return Err(ModelError::NullState { after: name }.into());
                };
                self.builder.record_failure(&state, action);
                let id = self.failures.add(FailureReport {
                    id: 0,
                    action,
                    action_name: name.clone(),
                    state,
                    sequence: self.sequence.clone(),
                    message: source.message.clone(),
                    step: self.stats.steps,
                });
                self.stats.failures += 1;
                warn!("Action {} failed after {} transitions: {}", name, self.sequence.len(), source.message);

                if let Some(report) = self.failures.get(id) {
                    for listener in &mut self.listeners {
                        listener.on_failure(report);
                    }
                }

                let limit_hit = self
                    .config
                    .max_failures
                    .is_some_and(|max| self.failures.len() >= max);
                if self.config.stop_on_failure || limit_hit {
                    self.pending_reset = Some(ResetReason::Forced);
                    return Err(WalkError::ActionFailed {
                        failure_id: id,
                        action: name,
                        message: source.message,
                    });
                }
                self.reset_model(ResetReason::Forced, testing)?;
                Ok(StepOutcome::Failure(id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CoverageMetric;
    use crate::greedy::GreedyWalk;
    use crate::lookahead::{LookaheadConfig, LookaheadWalk};
    use crate::random::RandomWalk;
    use crate::round_trip::RoundTripWalk;
    use crate::strategy::{by_name, STRATEGY_NAMES};
    use modelwalk_demo::{ladder, CounterModel, SetBug, SetModel, TableModel};

    fn config(seed: u64, reset_probability: f64) -> TesterConfig {
        TesterConfig {
            seed,
            reset_probability,
            ..Default::default()
        }
    }

    fn lookahead(depth: usize) -> LookaheadWalk {
        LookaheadWalk::new(LookaheadConfig {
            depth,
            ..Default::default()
        })
    }

    fn transitions<S: Clone>(outcomes: &[StepOutcome<S>]) -> Vec<Transition<S>> {
        outcomes
            .iter()
            .filter_map(|o| match o {
                StepOutcome::Transition(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    fn names<M: FsmModel, W: Strategy<M>>(tester: &Tester<M, W>, trs: &[Transition<M::State>]) -> Vec<String> {
        trs.iter()
            .map(|t| tester.model().action_name(t.action).to_string())
            .collect()
    }

    #[test]
    fn test_lookahead_covers_set_model_in_19_steps() {
        let model = Model::new(SetModel::new()).unwrap();
        let mut tester = Tester::new(model, lookahead(3), config(1, 0.3));
        let outcomes = tester.generate(19).unwrap();
        let trs = transitions(&outcomes);
        assert_eq!(trs.len(), 19);

        let expected = [
            ("FF", "addS1", "TF"),
            ("TF", "addS2", "TT"),
            ("TT", "removeS1", "FT"),
            ("FT", "removeS2", "FF"),
            ("FF", "addS2", "FT"),
            ("FT", "addS1", "TT"),
            ("TT", "addS1", "TT"),
            ("TT", "addS2", "TT"),
            ("TT", "removeS2", "TF"),
            ("TF", "addS1", "TF"),
            ("TF", "removeS1", "FF"),
            ("FF", "removeS1", "FF"),
            ("FF", "removeS2", "FF"),
            ("FF", "addS1", "TF"),
            ("TF", "removeS2", "TF"),
            ("TF", "addS2", "TT"),
            ("TT", "removeS1", "FT"),
            ("FT", "addS2", "FT"),
            ("FT", "removeS1", "FT"),
        ];
        let action_names = names(&tester, &trs);
        for (i, (start, action, end)) in expected.iter().enumerate() {
            assert_eq!(trs[i].start, *start, "step {}", i);
            assert_eq!(action_names[i], *action, "step {}", i);
            assert_eq!(trs[i].end, *end, "step {}", i);
        }
        assert_eq!(tester.graph().num_vertices(), 4);
        assert_eq!(tester.graph().num_edges(), 16);
        assert!(tester.builder().is_fully_explored());
        assert_eq!(tester.coverage().transitions.covered(), 16);
    }

    #[test]
    fn test_shallow_lookahead_takes_new_transitions_first() {
        let model = Model::new(SetModel::new()).unwrap();
        let mut tester = Tester::new(model, lookahead(1), config(1, 0.0));
        let outcomes = tester.generate(13).unwrap();
        assert_eq!(transitions(&outcomes).len(), 13);
        assert_eq!(tester.graph().num_edges(), 13);
        assert_eq!(tester.model().state(), Some(&"FF".to_string()));
        // Every action of FF is taken; the rest is out of a depth-1 reach.
        assert!(tester.builder().todo(tester.graph().vertex(&"FF".to_string()).unwrap()).is_empty());
        assert!(!tester.builder().is_fully_explored());
    }

    #[test]
    fn test_shallow_lookahead_falls_back_to_greedy_resets() {
        let model = Model::new(SetModel::new()).unwrap();
        let mut tester = Tester::new(model, lookahead(1), config(1, 1.0));
        let outcomes = tester.generate(17).unwrap();

        assert_eq!(transitions(&outcomes[..13]).len(), 13);
        for outcome in &outcomes[13..] {
            assert_eq!(*outcome, StepOutcome::Reset(ResetReason::Random));
        }
        assert_eq!(tester.model().state(), Some(&"FF".to_string()));
        assert_eq!(tester.graph().num_edges(), 13);
    }

    #[test]
    fn test_shallow_lookahead_covers_set_model() {
        for seed in 0..8 {
            let model = Model::new(SetModel::new()).unwrap();
            let mut tester = Tester::new(model, lookahead(1), config(seed, 0.25));
            let outcomes = tester.generate(400).unwrap();

            assert!(tester.builder().is_fully_explored(), "seed {}", seed);
            assert_eq!(tester.coverage().transitions.covered(), 16, "seed {}", seed);
            assert!(outcomes
                .iter()
                .any(|o| *o == StepOutcome::Reset(ResetReason::Random)));
        }
    }

    #[test]
    fn test_shallow_lookahead_without_reset_probability_never_rolls() {
        let model = Model::new(SetModel::new()).unwrap();
        let mut tester = Tester::new(model, lookahead(1), config(1, 0.0));
        let outcomes = tester.generate(200).unwrap();
        assert!(outcomes
            .iter()
            .all(|o| *o != StepOutcome::Reset(ResetReason::Random)));
    }

    #[test]
    fn test_random_walk_forced_path() {
        // 0 -a-> 1 -b-> 2 -c-> 3 -d-> 4 -a-> 1
        let table = TableModel::new("0")
            .with_transition("0", "a", "1")
            .with_transition("1", "b", "2")
            .with_transition("2", "c", "3")
            .with_transition("3", "d", "4")
            .with_transition("4", "a", "1");
        for seed in 0..5 {
            let model = Model::new(table.clone()).unwrap();
            let mut tester = Tester::new(model, RandomWalk::new(), config(seed, 0.0));
            tester.step().unwrap();
            assert_eq!(tester.coverage().history()[0].actions, 1);
            tester.step().unwrap();
            tester.step().unwrap();
            assert_eq!(tester.coverage().history()[2].actions, 3);
            assert_eq!(tester.model().state(), Some(&"3".to_string()));
        }
    }

    #[test]
    fn test_greedy_beats_random_on_ladder() {
        fn steps_to_cover<W: Strategy<TableModel>>(walk: W, seed: u64) -> u64 {
            let model = Model::new(ladder(5)).unwrap();
            let num_actions = model.num_actions();
            let mut tester = Tester::new(model, walk, config(seed, 0.0));
            for step in 1..=10_000u64 {
                tester.step().unwrap();
                if tester.coverage().summary()[0].covered == num_actions {
                    return step;
                }
            }
            10_000
        }

        let greedy: u64 = (0..20).map(|s| steps_to_cover(GreedyWalk::new(), s)).sum();
        let random: u64 = (0..20).map(|s| steps_to_cover(RandomWalk::new(), s)).sum();
        assert!(greedy < random, "greedy {} vs random {}", greedy, random);
    }

    #[test]
    fn test_build_graph_explores_everything() {
        let model = Model::new(SetModel::new()).unwrap();
        let mut tester = Tester::new(model, GreedyWalk::new(), config(7, 0.0));
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(tester.build_graph(&mut rng, 1000).unwrap());
        assert_eq!(tester.graph().num_vertices(), 4);
        assert_eq!(tester.graph().num_edges(), 16);
        assert!(tester.builder().check_invariants().is_ok());

        // Graph building sends no coverage events, only the snapshot.
        assert_eq!(tester.stats().transitions, 0);
        assert_eq!(tester.coverage().summary()[2].covered, 0);
        assert_eq!(tester.coverage().summary()[2].maximum, Some(16));
    }

    #[test]
    fn test_build_graph_respects_budget() {
        let model = Model::new(SetModel::new()).unwrap();
        let mut tester = Tester::new(model, GreedyWalk::new(), config(0, 0.0));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(!tester.build_graph(&mut rng, 3).unwrap());
        assert_eq!(tester.stats().build_transitions, 3);
        // The next step starts from a fresh reset.
        tester.step().unwrap();
        assert_eq!(tester.stats().resets, 1);
    }

    #[test]
    fn test_failure_is_logged_and_walk_continues() {
        let model = Model::new(CounterModel::failing_at(5, 2)).unwrap();
        let mut tester = Tester::new(model, GreedyWalk::new(), config(3, 0.0));
        tester.generate(200).unwrap();

        assert!(tester.stats().failures > 0);
        let failure = tester.failures().iter().next().unwrap();
        assert_eq!(failure.action_name, "inc");
        assert_eq!(failure.state, 2);
        assert!(failure.message.contains("overflow"));
        let last_state = failure.sequence.last_state().copied();
        assert_eq!(last_state, Some(2));
    }

    #[test]
    fn test_stop_on_failure() {
        let model = Model::new(SetModel::with_bug(SetBug::RemoveFromFull)).unwrap();
        let cfg = TesterConfig {
            stop_on_failure: true,
            ..config(11, 0.0)
        };
        let mut tester = Tester::new(model, lookahead(3), cfg);
        let err = tester.generate(100).unwrap_err();
        match err {
            WalkError::ActionFailed { action, .. } => assert_eq!(action, "removeS2"),
            other => panic!("unexpected error: {:?}", other),
        }
        let failure = tester.failures().last().unwrap();
        assert_eq!(failure.state, "TT");
    }

    #[test]
    fn test_round_trips_reset_on_loop() {
        let model = Model::new(SetModel::new()).unwrap();
        let mut tester = Tester::new(model, RoundTripWalk::new(), config(5, 0.0));
        let outcomes = tester.generate(200).unwrap();
        assert!(outcomes
            .iter()
            .any(|o| *o == StepOutcome::Reset(ResetReason::FoundLoop)));

        // Between resets no state repeats except the one closing the loop.
        let mut run: Vec<String> = vec!["FF".to_string()];
        for outcome in &outcomes {
            match outcome {
                StepOutcome::Transition(t) => {
                    let closes = run.contains(&t.end);
                    run.push(t.end.clone());
                    if closes {
                        let repeated = run.len() - run.iter().collect::<std::collections::BTreeSet<_>>().len();
                        assert_eq!(repeated, 1);
                    }
                }
                StepOutcome::Reset(_) | StepOutcome::Failure(_) => run = vec!["FF".to_string()],
            }
        }
    }

    #[test]
    fn test_lookahead_forced_reset_at_max_length() {
        let model = Model::new(SetModel::new()).unwrap();
        let walk = LookaheadWalk::new(LookaheadConfig {
            max_length: 4,
            ..Default::default()
        });
        let mut tester = Tester::new(model, walk, config(0, 0.0));
        let outcomes = tester.generate(5).unwrap();
        assert_eq!(outcomes[4], StepOutcome::Reset(ResetReason::Forced));
    }

    #[test]
    fn test_no_enabled_actions_is_fatal() {
        let table = TableModel::new("stuck").with_transition("other", "go", "stuck");
        let model = Model::new(table).unwrap();
        let mut tester = Tester::new(model, RandomWalk::new(), TesterConfig::default());
        assert!(matches!(
            tester.step(),
            Err(WalkError::Model(ModelError::NoEnabledActions { .. }))
        ));
    }

    #[test]
    fn test_dead_end_forces_reset() {
        let table = TableModel::new("start").with_transition("start", "fall", "pit");
        let model = Model::new(table).unwrap();
        let mut tester = Tester::new(model, RandomWalk::new(), config(0, 0.0));
        tester.generate(3).unwrap();
        assert_eq!(tester.stats().transitions, 3);
        assert_eq!(tester.stats().resets, 4);
    }

    #[test]
    fn test_same_seed_same_walk() {
        let run = |seed| {
            let model = Model::new(ladder(4)).unwrap();
            let mut tester = Tester::new(model, GreedyWalk::new(), config(seed, 0.1));
            tester.generate(50).unwrap()
        };
        assert_eq!(run(9), run(9));
    }

    /// A small machine with a loop, a shortcut, a dead end and a broken action.
    fn hazards() -> TableModel {
        TableModel::new("a")
            .with_transition("a", "go", "b")
            .with_transition("b", "go", "c")
            .with_transition("b", "jump", "a")
            .with_transition("c", "back", "a")
            .with_transition("c", "fall", "pit")
            .with_failure("b", "break")
    }

    #[test]
    fn test_invariants_hold_after_every_step() {
        for table in [ladder(5), hazards()] {
            for name in STRATEGY_NAMES {
                for seed in 0..4 {
                    let model = Model::new(table.clone()).unwrap();
                    let walk = by_name::<TableModel>(name).unwrap();
                    let mut tester = Tester::new(model, walk, config(seed, 0.1));
                    for step in 0..150 {
                        tester.step().unwrap();
                        if let Err(violation) = tester.builder().check_invariants() {
                            panic!("{} seed {} step {}: {}", name, seed, step, violation);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_coverage_is_monotonic_and_bounded_after_full_build() {
        for table in [ladder(5), hazards()] {
            for name in STRATEGY_NAMES {
                let model = Model::new(table.clone()).unwrap();
                let walk = by_name::<TableModel>(name).unwrap();
                let mut tester = Tester::new(model, walk, config(3, 0.1));
                let mut rng = ChaCha8Rng::seed_from_u64(3);
                assert!(tester.build_graph(&mut rng, 10_000).unwrap());
                tester.generate(300).unwrap();

                for pair in tester.coverage().history().windows(2) {
                    let (before, after) = (pair[0], pair[1]);
                    assert_eq!(after.transitions, before.transitions + 1);
                    assert!(after.actions >= before.actions, "{}", name);
                    assert!(after.states >= before.states, "{}", name);
                    assert!(after.edges >= before.edges, "{}", name);
                    assert!(after.pairs >= before.pairs, "{}", name);
                }

                let summary = tester.coverage().summary();
                for metric in &summary {
                    let maximum = metric.maximum.unwrap();
                    assert!(
                        metric.covered <= maximum,
                        "{} {}: {} > {}",
                        name,
                        metric.name,
                        metric.covered,
                        maximum
                    );
                }
                assert_eq!(summary[1].maximum, Some(tester.graph().num_vertices()));
                assert_eq!(summary[2].maximum, Some(tester.graph().num_edges()));
            }
        }
    }
}
