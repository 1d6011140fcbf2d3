//! Format tester reports for human consumption.

use crate::coverage::MetricSummary;
use crate::failure::FailureReport;
use crate::tester::TesterStats;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Size of the state graph at report time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub states: usize,
    pub transitions: usize,
    /// States with at least one enabled action never taken.
    pub unexplored: usize,
}

/// Summary of a test run.
#[derive(Debug, Clone)]
pub struct TesterReport {
    pub strategy: String,
    pub seed: u64,
    pub stats: TesterStats,
    pub coverage: Vec<MetricSummary>,
    pub graph: GraphStats,
    pub failures: usize,
    pub distinct_failures: usize,
}

/// Format a run report.
pub fn format_report(report: &TesterReport) -> String {
    let mut output = String::new();

    output.push_str("═══════════════════════════════════════════════════════════════════════\n");
    output.push_str("  Model Walk Report\n");
    output.push_str("═══════════════════════════════════════════════════════════════════════\n\n");

    output.push_str(&format!("Strategy:               {}\n", report.strategy));
    output.push_str(&format!("Seed:                   {}\n", report.seed));
    output.push_str(&format!("Steps:                  {}\n", report.stats.steps));
    output.push_str(&format!("Transitions:            {}\n", report.stats.transitions));
    output.push_str(&format!("Resets:                 {}\n", report.stats.resets));
    if report.stats.build_transitions > 0 {
        output.push_str(&format!(
            "Graph build steps:      {}\n",
            report.stats.build_transitions
        ));
    }
    output.push('\n');

    output.push_str("─── Coverage ──────────────────────────────────────────────────────────\n");
    for metric in &report.coverage {
        let line = match (metric.maximum, metric.percentage()) {
            (Some(max), Some(pct)) => {
                format!("{:<24}{}/{} ({:.1}%)\n", metric.name, metric.covered, max, pct)
            }
            _ => format!("{:<24}{}\n", metric.name, metric.covered),
        };
        output.push_str(&line);
    }
    output.push('\n');

    output.push_str("─── State Graph ───────────────────────────────────────────────────────\n");
    output.push_str(&format!("States:                 {}\n", report.graph.states));
    output.push_str(&format!("Transitions:            {}\n", report.graph.transitions));
    output.push_str(&format!("Unexplored states:      {}\n", report.graph.unexplored));
    output.push('\n');

    if report.failures > 0 {
        output.push_str("─── Failures ──────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "{} failures ({} distinct)\n\n",
            report.failures, report.distinct_failures
        ));
    } else {
        output.push_str("─── No Failures ───────────────────────────────────────────────────────\n");
        output.push_str("No action failures detected.\n\n");
    }

    output.push_str("═══════════════════════════════════════════════════════════════════════\n");
    output
}

/// Format a failure with its reproduction steps.
///
/// `action_name` maps catalog indices to names.
pub fn format_failure<S: Clone + Debug>(
    failure: &FailureReport<S>,
    action_name: impl Fn(usize) -> String,
) -> String {
    let mut output = String::new();
    output.push_str(&format!("Failure #{}\n", failure.id));
    output.push_str(&format!("  Action:   {}\n", failure.action_name));
    output.push_str(&format!("  State:    {:?}\n", failure.state));
    output.push_str(&format!("  Message:  {}\n", failure.message));
    output.push_str(&format!("  Step:     {}\n", failure.step));
    output.push_str(&format!(
        "  Reproduction ({} actions from reset):\n",
        failure.sequence.len() + 1
    ));
    for (i, transition) in failure.sequence.transitions().iter().enumerate() {
        output.push_str(&format!(
            "    {:>3}. {:?} --{}--> {:?}\n",
            i + 1,
            transition.start,
            action_name(transition.action),
            transition.end
        ));
    }
    output.push_str(&format!(
        "    {:>3}. {:?} --{}--> FAIL\n",
        failure.sequence.len() + 1,
        failure.state,
        failure.action_name
    ));
    output
}
