//! Online exploration of FSM models.
//!
//! Drives a [`Model`](modelwalk_model::Model) with a traversal strategy,
//! building the state graph from the transitions it observes and measuring
//! coverage along the way.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │                      Tester                       │
//! │                                                   │
//! │  ┌──────────┐   choose   ┌──────────────────────┐ │
//! │  │ Strategy │◄───────────│ WalkContext          │ │
//! │  └────┬─────┘            │  model, graph, depth │ │
//! │       │ action / reset   └──────────────────────┘ │
//! │       ▼                                           │
//! │  ┌──────────┐ transition ┌──────────────┐         │
//! │  │  Model   │───────────►│ GraphBuilder │         │
//! │  └────┬─────┘            └──────────────┘         │
//! │       │ events                                    │
//! │       ▼                                           │
//! │  ┌──────────────────┐    ┌────────────┐           │
//! │  │ CoverageCollector│    │ FailureLog │           │
//! │  │ + WalkListeners  │    └────────────┘           │
//! │  └──────────────────┘                             │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! # Strategies
//!
//! - [`RandomWalk`]: uniform over enabled actions.
//! - [`GreedyWalk`]: prefers actions not yet taken from the current state.
//! - [`LookaheadWalk`]: searches the known graph for the nearest untaken
//!   transition, valuing never-taken actions highest.
//! - [`RoundTripWalk`]: greedy, resetting whenever a loop closes.
//!
//! # Example
//!
//! ```rust,no_run
//! use modelwalk_demo::SetModel;
//! use modelwalk_explore::{GreedyWalk, Tester, TesterConfig};
//! use modelwalk_model::Model;
//!
//! let model = Model::new(SetModel::new()).unwrap();
//! let mut tester = Tester::new(model, GreedyWalk::new(), TesterConfig::default());
//! tester.generate(100).unwrap();
//! println!("{}", modelwalk_explore::format_report(&tester.report()));
//! ```

pub mod coverage;
pub mod exploration;
pub mod failure;
pub mod graph;
pub mod greedy;
pub mod listener;
pub mod lookahead;
pub mod random;
pub mod report;
pub mod round_trip;
pub mod strategy;
pub mod tester;

pub use coverage::{
    ActionCoverage, CoverageCollector, CoverageMetric, CoverageSample, MetricSummary,
    StateCoverage, TransitionCoverage, TransitionPairCoverage,
};
pub use exploration::{ExplorationRecord, GraphBuilder};
pub use failure::{FailureLog, FailureReport};
pub use graph::{Edge, EdgeId, StateGraph, VertexId};
pub use greedy::GreedyWalk;
pub use listener::{LoggingListener, WalkListener};
pub use lookahead::{LookaheadConfig, LookaheadWalk};
pub use random::RandomWalk;
pub use report::{format_failure, format_report, GraphStats, TesterReport};
pub use round_trip::RoundTripWalk;
pub use strategy::{by_name, Choice, Strategy, WalkContext, STRATEGY_NAMES};
pub use tester::{StepOutcome, Tester, TesterConfig, TesterStats, WalkError};
