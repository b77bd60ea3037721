use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use egobot_contracts::modes::ModeRegistry;
use egobot_contracts::results::{AnalysisOutput, FullAnalysis, ParsedResult};
use egobot_engine::{ActionPlanner, BenchmarkRunner, Config, ReasoningEngine, DEFAULT_MAX_FRAMES};
use serde_json::{Map, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const FULL_MODE: &str = "full";
const REASONING_DISPLAY_MAX_CHARS: usize = 2000;
const ANSWER_DISPLAY_MAX_CHARS: usize = 3000;

#[derive(Debug, Parser)]
#[command(
    name = "egobot",
    version,
    about = "Egocentric robot reasoning with Cosmos Reason"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze an image, video, or image URL.
    Analyze(AnalyzeArgs),
    /// List the available analysis modes.
    Modes,
    /// Run the evaluation benchmark over a dataset.
    Benchmark(BenchmarkArgs),
}

#[derive(Debug, Parser)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["image", "video", "image_url"])
))]
struct AnalyzeArgs {
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    video: Option<PathBuf>,
    #[arg(long)]
    image_url: Option<String>,
    #[arg(long, default_value = "social")]
    mode: String,
    /// Plan a multi-step task for the image instead of running a mode.
    #[arg(long, requires = "image")]
    task: Option<String>,
    /// With --task, plan a gripper trajectory instead of a step list.
    #[arg(long, requires = "task")]
    trajectory: bool,
    #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
    max_frames: usize,
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct BenchmarkArgs {
    #[arg(long)]
    dataset: PathBuf,
    #[arg(short, long, default_value = "results")]
    output: PathBuf,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("egobot error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Modes => {
            for name in ModeRegistry::default().names() {
                println!("{name}");
            }
            Ok(0)
        }
        Command::Benchmark(args) => run_benchmark(args),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_analyze(args: AnalyzeArgs) -> Result<i32> {
    let config = Config::from_env()?;
    debug!(config = ?config, "loaded configuration");
    println!("EgoBot Reason | mode: {}", args.mode);

    let output = if args.mode == FULL_MODE {
        let target = args
            .image
            .as_deref()
            .or(args.video.as_deref())
            .context("--mode full needs --image or --video")?;
        let engine = ReasoningEngine::new(config)?;
        AnalysisOutput::Full(engine.full_analysis(target))
    } else if let (Some(task), Some(image)) = (args.task.as_deref(), args.image.as_deref()) {
        let planner = ActionPlanner::new(config)?;
        let result = if args.trajectory {
            planner.plan_gripper_trajectory(image, task)?
        } else {
            planner.plan_multi_step(image, task)?
        };
        AnalysisOutput::Single(result)
    } else {
        let engine = ReasoningEngine::new(config)?;
        let result = if let Some(video) = args.video.as_deref() {
            engine.analyze_video(video, &args.mode, args.max_frames)?
        } else if let Some(url) = args.image_url.as_deref() {
            engine.analyze_image_url(url, &args.mode)?
        } else if let Some(image) = args.image.as_deref() {
            engine.analyze_image(image, &args.mode)?
        } else {
            anyhow::bail!("provide --image, --video, or --image-url");
        };
        AnalysisOutput::Single(result)
    };

    match &output {
        AnalysisOutput::Single(result) => print_result(result),
        AnalysisOutput::Full(analysis) => print_full_analysis(analysis),
    }

    if let Some(path) = args.output.as_deref() {
        write_output(path, &output)?;
        println!("\nSaved to {}", path.display());
    }
    Ok(0)
}

fn print_result(result: &ParsedResult) {
    if !result.reasoning.is_empty() {
        println!("\n== Reasoning ==");
        println!("{}", clip(&result.reasoning, REASONING_DISPLAY_MAX_CHARS));
    }
    match non_empty(result.parsed.as_ref()) {
        Some(parsed) => {
            println!("\n== Output ==");
            println!("{}", pretty(parsed));
        }
        None => {
            println!("\n== Answer ==");
            println!("{}", clip(&result.answer, ANSWER_DISPLAY_MAX_CHARS));
        }
    }
}

fn print_full_analysis(analysis: &FullAnalysis) {
    for (name, outcome) in &analysis.results {
        println!("\n-- {} --", name.to_uppercase());
        if let Some(error) = outcome.error() {
            println!("error: {error}");
        } else if let Some(parsed) = outcome.result().and_then(|r| non_empty(r.parsed.as_ref())) {
            println!("{}", pretty(parsed));
        }
    }
}

fn run_benchmark(args: BenchmarkArgs) -> Result<i32> {
    let config = Config::from_env()?;
    let runner = BenchmarkRunner::new(config)?;
    let cases = BenchmarkRunner::load_test_cases(&args.dataset)?;
    let summary = runner.run(&cases, &args.output)?;
    println!("Benchmark Results");
    println!(
        "Total: {} | Passed: {} | Failed: {} | Errors: {}",
        summary.total, summary.passed, summary.failed, summary.errors
    );
    println!(
        "Accuracy: {:.1}% | Avg Latency: {}s",
        summary.accuracy * 100.0,
        summary.avg_latency_sec
    );
    Ok(0)
}

fn write_output(path: &Path, output: &AnalysisOutput) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(output)?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

fn non_empty(parsed: Option<&Map<String, Value>>) -> Option<&Map<String, Value>> {
    parsed.filter(|map| !map.is_empty())
}

fn pretty(parsed: &Map<String, Value>) -> String {
    serde_json::to_string_pretty(parsed).unwrap_or_default()
}

fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
