//! Replay, shrinking and triage of failing model walks.
//!
//! A failure found by the tester is only as useful as its reproducer.
//! This crate replays recorded action sequences against a model, shrinks
//! them to short sequences that still fail, and renders triage reports.
//!
//! # Pipeline
//!
//! ```text
//! Tester ──failure──► Recording ──save──► failure.json
//!                         │
//!                         ▼
//!                  Shrinker::shrink ◄── StateGraph (from build_graph)
//!                         │  replays every candidate
//!                         ▼
//!                  ReplayEngine ──► ReplayOutcome
//!                         │
//!                         ▼
//!                   TriageReport ──► markdown / JSON
//! ```
//!
//! # Module Organization
//!
//! - [`replay`]: replay engine and outcomes
//! - [`shrink`]: cycle collapse and graph-splice shrinking
//! - [`recording`]: serializable failing runs
//! - [`triage`]: triage reports
//! - [`serialize`]: save/load recordings and reports

pub mod recording;
pub mod replay;
pub mod serialize;
pub mod shrink;
pub mod triage;

pub use recording::{render_state, Recording};
pub use replay::{ReplayEngine, ReplayError, ReplayOutcome};
pub use serialize::{
    format_triage_markdown, load_recording, load_triage_json, save_recording, save_triage_json,
    save_triage_report, SerializeError,
};
pub use shrink::{ShrinkConfig, ShrinkError, ShrinkResult, ShrinkStats, Shrinker};
pub use triage::{
    ReproductionInfo, Severity, TimelineEntry, TriageEngine, TriageError, TriageReport,
};

#[cfg(test)]
mod tests {
    use super::*;
    use modelwalk_demo::{SetBug, SetModel};
    use modelwalk_explore::{LookaheadWalk, Tester, TesterConfig};
    use modelwalk_model::Model;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_walk_record_shrink_workflow() {
        let inner = SetModel::with_bug(SetBug::RemoveFromFull);
        let config = TesterConfig {
            seed: 8,
            reset_probability: 0.0,
            ..Default::default()
        };
        let mut tester = Tester::new(
            Model::new(inner.clone()).unwrap(),
            LookaheadWalk::default(),
            config,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        tester.build_graph(&mut rng, 500).unwrap();
        tester.generate(60).unwrap();

        let failure = tester.failures().shortest().unwrap();
        let recording = Recording::from_failure("buggy-set", "lookahead", 8, failure, |i| {
            tester.model().action_name(i).to_string()
        });
        assert_eq!(recording.failing_action, "removeS2");

        let mut model = Model::new(inner).unwrap();
        let (report, _) = TriageEngine::shrink_recording(
            &recording,
            &mut model,
            tester.graph(),
            ShrinkConfig::default(),
        )
        .unwrap();
        assert!(report.shrunk_len <= recording.len());
        assert_eq!(report.shrunk_len, 3);
        assert_eq!(report.failing_action, "removeS2");
    }
}
