/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, error, info};

use dagsched::attributes::explain::explain;
use dagsched::config::SchedulerConfig;
use dagsched::graph::input::GraphSpec;
use dagsched::scheduler::ExhaustiveSchedule;
use dagsched::{Attribute, Heuristic, ListScheduler, PriorityAttributes, TaskGraph, Time, Trace};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Static list scheduling of task DAGs with step-by-step traces.
///
/// Example:
///   dagsched schedule demos/diamond.json --heuristic mcp -p 3
#[derive(Debug, Parser)]
#[command(name = "dagsched", version, long_about = None)]
struct Cli {
    /// Path to the YAML scheduler configuration (limits and defaults).
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the priority attributes of every node.
    Attributes {
        #[command(flatten)]
        input: GraphArgs,

        /// Only this attribute (SL, T-Level, EST, LST, B-Level).
        #[arg(short = 'a', long = "attribute")]
        attribute: Option<String>,

        /// Show how each value was derived.
        #[arg(short = 'e', long = "explain", default_value_t = false)]
        explain: bool,
    },

    /// Run one heuristic and print its trace.
    Schedule {
        #[command(flatten)]
        input: GraphArgs,

        /// HLFET, MCP, ETF or DLS (defaults to the configured heuristic).
        #[arg(short = 'H', long = "heuristic")]
        heuristic: Option<String>,
    },

    /// Run all four heuristics concurrently and compare makespans.
    Compare {
        #[command(flatten)]
        input: GraphArgs,
    },

    /// Search for the best list schedule of a small graph, within the
    /// configured deadline.
    Optimal {
        #[command(flatten)]
        input: GraphArgs,
    },
}

#[derive(Debug, Args)]
struct GraphArgs {
    /// Graph file (.json, .yaml or .yml).
    graph: PathBuf,

    /// Number of processors; overrides the graph file and the configuration.
    #[arg(short = 'p', long = "processors")]
    processors: Option<u32>,

    #[arg(short = 'f', long = "format", value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout only carries results.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(config = ?cli.config, command = ?cli.command, "Configuration");

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => SchedulerConfig::load_from_file(path)?,
        None => {
            info!("No scheduler configuration file provided, using defaults");
            SchedulerConfig::default()
        }
    };
    let scheduler = ListScheduler::new(Arc::new(config));

    match cli.command {
        Command::Attributes {
            input,
            attribute,
            explain,
        } => {
            let (graph, _) = load_graph(&input, scheduler.config())?;
            let attribute = attribute.map(|a| a.parse::<Attribute>()).transpose()?;
            print_attributes(&graph, attribute, explain, input.format)
        }

        Command::Schedule { input, heuristic } => {
            let (graph, processors) = load_graph(&input, scheduler.config())?;
            let heuristic = match heuristic {
                Some(name) => name.parse::<Heuristic>()?,
                None => scheduler.config().default_heuristic,
            };
            let trace = scheduler.schedule(&graph, processors, heuristic)?;
            match input.format {
                Format::Text => println!("{trace}"),
                Format::Json => print_json(&trace)?,
            }
            Ok(())
        }

        Command::Compare { input } => {
            let (graph, processors) = load_graph(&input, scheduler.config())?;
            let rows = compare(Arc::new(graph), scheduler, processors).await?;
            match input.format {
                Format::Text => {
                    println!("{:<6} {:>10} {:>6}  title", "name", "makespan", "steps");
                    for r in &rows {
                        println!(
                            "{:<6} {:>10} {:>6}  {}",
                            r.heuristic, r.makespan, r.steps, r.title
                        );
                    }
                }
                Format::Json => print_json(&rows)?,
            }
            Ok(())
        }

        Command::Optimal { input } => {
            let (graph, processors) = load_graph(&input, scheduler.config())?;
            let result = optimal(graph, scheduler, processors).await?;
            match input.format {
                Format::Text => {
                    println!(
                        "optimal makespan {} on {} processor(s); best heuristic {} reached {} ({} partial schedules explored)",
                        result.makespan, processors, result.seed, result.seed_makespan, result.explored
                    );
                    for a in &result.assignments {
                        println!("  node {} -> P{} [{}, {}]", a.node, a.processor, a.start, a.end);
                    }
                }
                Format::Json => print_json(&result)?,
            }
            Ok(())
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Load and validate the graph, and settle the processor count:
/// `-p` first, then the file's `num_processors`, then the configuration.
fn load_graph(input: &GraphArgs, config: &SchedulerConfig) -> Result<(TaskGraph, u32)> {
    let spec = GraphSpec::load_from_file(&input.graph)?;
    let graph = spec
        .build()
        .with_context(|| format!("Rejected graph file: {}", input.graph.display()))?;
    let processors = input
        .processors
        .or(spec.num_processors)
        .unwrap_or(config.default_processors);
    info!(
        nodes = graph.len(),
        edges = graph.edge_count(),
        processors,
        "task graph ready"
    );
    Ok((graph, processors))
}

fn print_attributes(
    graph: &TaskGraph,
    attribute: Option<Attribute>,
    with_explanation: bool,
    format: Format,
) -> Result<()> {
    let selected: Vec<Attribute> = match attribute {
        Some(a) => vec![a],
        None => Attribute::ALL.to_vec(),
    };

    if with_explanation {
        let derivations: Vec<_> = selected.iter().map(|&a| (a, explain(graph, a))).collect();
        match format {
            Format::Text => {
                for (a, steps) in &derivations {
                    println!("{a}:");
                    for d in steps {
                        println!("  {}", d.description);
                    }
                }
            }
            Format::Json => {
                let by_name: BTreeMap<Attribute, _> = derivations.into_iter().collect();
                print_json(&by_name)?;
            }
        }
        return Ok(());
    }

    let attrs = PriorityAttributes::compute(graph);
    match (format, attribute) {
        (Format::Text, None) => print!("{}", attrs.report(graph)),
        (Format::Text, Some(a)) => {
            for (n, value) in attrs.get(a).iter().enumerate() {
                println!("{:<8} {}", graph.id(n), value);
            }
        }
        (Format::Json, None) => print_json(&attrs.to_maps(graph))?,
        (Format::Json, Some(a)) => print_json(&attrs.to_map(graph, a))?,
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ComparisonRow {
    heuristic: Heuristic,
    title: &'static str,
    makespan: Time,
    steps: usize,
}

/// All four heuristics in parallel on a shared graph, bounded by the
/// configured deadline.
async fn compare(
    graph: Arc<TaskGraph>,
    scheduler: ListScheduler,
    processors: u32,
) -> Result<Vec<ComparisonRow>> {
    let deadline = Duration::from_millis(scheduler.config().deadline_ms);

    let handles: Vec<_> = Heuristic::ALL
        .into_iter()
        .map(|h| {
            let graph = Arc::clone(&graph);
            let scheduler = scheduler.clone();
            (
                h,
                tokio::task::spawn_blocking(move || scheduler.schedule(&graph, processors, h)),
            )
        })
        .collect();

    let joined = async {
        let mut traces: Vec<(Heuristic, Trace)> = Vec::with_capacity(handles.len());
        for (h, handle) in handles {
            let trace = handle
                .await
                .with_context(|| format!("{h} worker did not complete"))??;
            traces.push((h, trace));
        }
        Ok::<_, anyhow::Error>(traces)
    };

    let traces = tokio::time::timeout(deadline, joined)
        .await
        .map_err(|_| anyhow!("comparison exceeded the {} ms deadline", deadline.as_millis()))??;

    Ok(traces
        .into_iter()
        .map(|(h, trace)| ComparisonRow {
            heuristic: h,
            title: h.title(),
            makespan: trace.makespan(),
            steps: trace.steps().len(),
        })
        .collect())
}

/// Exhaustive search on a blocking worker, bounded by the configured
/// deadline.
async fn optimal(
    graph: TaskGraph,
    scheduler: ListScheduler,
    processors: u32,
) -> Result<ExhaustiveSchedule> {
    let deadline = Duration::from_millis(scheduler.config().deadline_ms);
    let worker = tokio::task::spawn_blocking(move || scheduler.optimal(&graph, processors));

    let result = tokio::time::timeout(deadline, worker)
        .await
        .map_err(|_| {
            anyhow!(
                "exhaustive search exceeded the {} ms deadline",
                deadline.as_millis()
            )
        })?
        .context("exhaustive search worker did not complete")??;
    Ok(result)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialise output")?;
    println!("{text}");
    Ok(())
}
