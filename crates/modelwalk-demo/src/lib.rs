//! Demo systems under test for modelwalk.
//!
//! These models have **zero engine dependencies** beyond the adapter
//! contract, so they double as fixtures for the explorer and shrinker
//! tests and as targets for the `modelwalk` CLI.
//!
//! - [`SetModel`]: a set over two elements; four states, four actions
//! - [`CounterModel`]: a bounded counter with an optional injected bug
//! - [`TableModel`]: any FSM given as a transition table

pub mod counter;
pub mod set;
pub mod table;

pub use counter::CounterModel;
pub use set::{SetBug, SetModel};
pub use table::{ladder, TableModel};

/// Names accepted by [`DemoKind::parse`].
pub const DEMO_NAMES: &[&str] = &["set", "buggy-set", "counter", "ladder"];

/// Built-in demo models selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoKind {
    /// Correct two-element set.
    Set,
    /// Two-element set whose `removeS2` fails when both elements are present.
    BuggySet,
    /// Counter to 5 whose `inc` fails at 3.
    Counter,
    /// Five-rung ladder (table model) with per-rung actions.
    Ladder,
}

impl DemoKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "set" => Some(Self::Set),
            "buggy-set" | "buggy_set" => Some(Self::BuggySet),
            "counter" => Some(Self::Counter),
            "ladder" => Some(Self::Ladder),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::BuggySet => "buggy-set",
            Self::Counter => "counter",
            Self::Ladder => "ladder",
        }
    }
}
