//! modelwalk CLI: walk demo models, record failures, shrink and triage them.

use clap::{Args, Parser, Subcommand};
use log::info;
use modelwalk_demo::{ladder, CounterModel, DemoKind, SetBug, SetModel, DEMO_NAMES};
use modelwalk_explore::{
    by_name, format_failure, format_report, GreedyWalk, LoggingListener, StateGraph, Tester,
    TesterConfig, WalkError, STRATEGY_NAMES,
};
use modelwalk_model::{FsmModel, Model, ModelError};
use modelwalk_replay::{
    format_triage_markdown, load_recording, save_recording, save_triage_json, save_triage_report,
    Recording, SerializeError, ShrinkConfig, TriageEngine, TriageError, TriageReport,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use snafu::Snafu;
use std::path::{Path, PathBuf};

/// CLI errors for the modelwalk binary.
#[derive(Debug, Snafu)]
enum CliError {
    #[snafu(display("Walk error: {source}"), context(false))]
    Walk { source: WalkError },
    #[snafu(display("Model error: {source}"), context(false))]
    Model { source: ModelError },
    #[snafu(display("Triage error: {source}"), context(false))]
    Triage { source: TriageError },
    #[snafu(display("Serialization error: {source}"), context(false))]
    Serialize { source: SerializeError },
    #[snafu(display("I/O error: {source}"), context(false))]
    Io { source: std::io::Error },
    #[snafu(display("{message}"))]
    Other { message: String },
}

#[derive(Parser)]
#[command(name = "modelwalk")]
#[command(about = "Model-based test generation over FSM models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a demo model and report coverage and failures
    Run(RunArgs),

    /// Shrink a recorded failure and print a triage report
    Shrink(ShrinkArgs),

    /// Show recording metadata
    Info {
        /// Path to recording file
        #[arg(short, long)]
        recording: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Demo model (set, buggy-set, counter, ladder)
    #[arg(short, long, default_value = "buggy-set")]
    model: String,

    /// Walk strategy (random, greedy, lookahead, round-trips)
    #[arg(short, long, default_value = "greedy")]
    strategy: String,

    /// Tester seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of steps to generate
    #[arg(short, long, default_value_t = 1000)]
    length: usize,

    /// Probability of a random reset before each step
    #[arg(long, default_value_t = 0.05)]
    reset_probability: f64,

    /// Build the full state graph first, spending at most this many transitions
    #[arg(long)]
    build_graph: Option<usize>,

    /// Stop at the first failure
    #[arg(long)]
    stop_on_failure: bool,

    /// Shrink the shortest failure after the walk
    #[arg(long)]
    shrink: bool,

    /// Output directory for recordings and triage reports
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ShrinkArgs {
    /// Path to recording file
    #[arg(short, long)]
    recording: PathBuf,

    /// Seed for candidate ordering
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Maximum candidate replays
    #[arg(long, default_value_t = 1000)]
    max_attempts: usize,

    /// Transition budget for building the graph used for splicing
    #[arg(long, default_value_t = 10_000)]
    build_budget: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "markdown")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Shrink(args) => cmd_shrink(args),
        Commands::Info { recording } => cmd_info(recording),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_model(name: &str) -> Result<DemoKind, CliError> {
    DemoKind::parse(name).ok_or_else(|| CliError::Other {
        message: format!(
            "unknown model '{}' (expected one of: {})",
            name,
            DEMO_NAMES.join(", ")
        ),
    })
}

fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let kind = parse_model(&args.model)?;
    match kind {
        DemoKind::Set => run_model(kind, SetModel::new(), &args),
        DemoKind::BuggySet => run_model(kind, SetModel::with_bug(SetBug::RemoveFromFull), &args),
        DemoKind::Counter => run_model(kind, CounterModel::failing_at(5, 3), &args),
        DemoKind::Ladder => run_model(kind, ladder(5), &args),
    }
}

fn run_model<M: FsmModel + Clone + 'static>(
    kind: DemoKind,
    inner: M,
    args: &RunArgs,
) -> Result<(), CliError> {
    let strategy = by_name::<M>(&args.strategy).ok_or_else(|| CliError::Other {
        message: format!(
            "unknown strategy '{}' (expected one of: {})",
            args.strategy,
            STRATEGY_NAMES.join(", ")
        ),
    })?;
    let config = TesterConfig {
        seed: args.seed,
        reset_probability: args.reset_probability,
        stop_on_failure: args.stop_on_failure,
        max_failures: None,
    };

    let model = Model::new(inner.clone())?;
    let names = model.catalog().names().map(str::to_string).collect();
    let mut tester = Tester::new(model, strategy, config);
    tester.add_listener(Box::new(LoggingListener::new(names)));

    if let Some(budget) = args.build_graph {
        let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
        let complete = tester.build_graph(&mut rng, budget)?;
        println!(
            "State graph {}: {} states, {} transitions",
            if complete { "complete" } else { "incomplete" },
            tester.graph().num_vertices(),
            tester.graph().num_edges()
        );
    }

    match tester.generate(args.length) {
        Ok(_) => {}
        Err(WalkError::ActionFailed { .. }) => println!("Stopped at first failure."),
        Err(e) => return Err(e.into()),
    }
    println!("{}", format_report(&tester.report()));

    let Some(failure) = tester.failures().shortest() else {
        return Ok(());
    };
    let action_name = |i: usize| tester.model().action_name(i).to_string();
    println!("{}", format_failure(failure, action_name));

    let recording = Recording::from_failure(
        kind.name(),
        &args.strategy,
        args.seed,
        failure,
        action_name,
    );
    if let Some(dir) = &args.output {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("failure-{}.json", failure.id));
        save_recording(&recording, &path)?;
        println!("Recording saved to {}", path.display());
    }

    if args.shrink {
        let config = ShrinkConfig {
            seed: args.seed,
            ..Default::default()
        };
        let report = shrink_with_graph(inner, &recording, tester.graph(), config)?;
        match &args.output {
            Some(dir) => {
                let path = dir.join(format!("failure-{}.md", failure.id));
                save_triage_report(&report, &path)?;
                println!("Triage report saved to {}", path.display());
            }
            None => println!("{}", format_triage_markdown(&report)),
        }
    }
    Ok(())
}

fn shrink_with_graph<M: FsmModel>(
    inner: M,
    recording: &Recording,
    graph: &StateGraph<M::State>,
    config: ShrinkConfig,
) -> Result<TriageReport, CliError> {
    let mut model = Model::new(inner)?;
    let (report, stats) = TriageEngine::shrink_recording(recording, &mut model, graph, config)?;
    info!(
        "Shrink: {} attempts, {} loops collapsed, {} splices",
        stats.attempts, stats.cycle_reductions, stats.splice_reductions
    );
    println!(
        "Shrunk {} -> {} actions ({} attempts)",
        report.original_len, report.shrunk_len, stats.attempts
    );
    Ok(report)
}

fn cmd_shrink(args: ShrinkArgs) -> Result<(), CliError> {
    println!("Loading recording from {:?}...", args.recording);
    let recording = load_recording(&args.recording)?;
    let kind = parse_model(&recording.model)?;

    let report = match kind {
        DemoKind::Set => shrink_model(SetModel::new(), &recording, &args),
        DemoKind::BuggySet => {
            shrink_model(SetModel::with_bug(SetBug::RemoveFromFull), &recording, &args)
        }
        DemoKind::Counter => shrink_model(CounterModel::failing_at(5, 3), &recording, &args),
        DemoKind::Ladder => shrink_model(ladder(5), &recording, &args),
    }?;

    match (args.format, &args.output) {
        (OutputFormat::Markdown, Some(path)) => save_triage_report(&report, path)?,
        (OutputFormat::Json, Some(path)) => save_triage_json(&report, path)?,
        (OutputFormat::Markdown, None) => println!("{}", format_triage_markdown(&report)),
        (OutputFormat::Json, None) => println!(
            "{}",
            serde_json::to_string_pretty(&report).map_err(SerializeError::from)?
        ),
    }
    if let Some(path) = &args.output {
        println!("Triage report saved to {}", path.display());
    }
    Ok(())
}

/// Build the state graph with a greedy tester, then shrink against it.
fn shrink_model<M: FsmModel + Clone>(
    inner: M,
    recording: &Recording,
    args: &ShrinkArgs,
) -> Result<TriageReport, CliError> {
    let config = TesterConfig {
        seed: args.seed,
        reset_probability: 0.0,
        ..Default::default()
    };
    let mut tester = Tester::new(Model::new(inner.clone())?, GreedyWalk::new(), config);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    if !tester.build_graph(&mut rng, args.build_budget)? {
        println!("Warning: state graph incomplete, splicing limited to known paths");
    }

    let shrink_config = ShrinkConfig {
        seed: args.seed,
        max_attempts: args.max_attempts,
        ..Default::default()
    };
    shrink_with_graph(inner, recording, tester.graph(), shrink_config)
}

fn cmd_info(recording_path: PathBuf) -> Result<(), CliError> {
    let recording = load_recording(Path::new(&recording_path))?;

    println!("=== Recording Info ===");
    println!("Model:          {}", recording.model);
    println!("Strategy:       {}", recording.strategy);
    println!("Seed:           {}", recording.seed);
    println!("Timestamp:      {}", recording.timestamp);
    println!("Length:         {} actions", recording.len());
    println!("Failing action: {}", recording.failing_action);
    println!("Message:        {}", recording.message);
    println!();
    println!("=== Actions ===");
    for (i, (action, state)) in recording
        .actions
        .iter()
        .zip(recording.states.iter())
        .enumerate()
    {
        println!("{:>4}. {} in {}", i + 1, action, state);
    }
    Ok(())
}
