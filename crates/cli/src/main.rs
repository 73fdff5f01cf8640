//! Cached channel simulator CLI.
//!
//! This binary runs a request trace through the channel and reports statistics. It performs:
//! 1. **Run:** Load a JSON trace (and optional config), simulate until every response is delivered, print the report.
//! 2. **Defaults:** Print the default configuration as JSON, as a starting point for a config file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chansim_core::Config;
use chansim_core::Simulator;
use chansim_core::common::SimError;
use chansim_core::sim::loader;

#[derive(Parser, Debug)]
#[command(
    name = "chansim",
    author,
    version,
    about = "Cycle-accurate cached request/response channel simulator",
    long_about = "Replay a request trace through a cache on a ready/valid channel.\n\nExamples:\n  chansim run --trace trace.json\n  chansim run --trace trace.json --config channel.json --latency 20 --sections summary,cache\n  chansim defaults > channel.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a trace until every request has been answered.
    Run {
        /// JSON request trace.
        #[arg(short, long)]
        trace: PathBuf,

        /// JSON configuration; built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the downstream memory latency in ticks.
        #[arg(long)]
        latency: Option<u64>,

        /// Override the downstream memory queue depth.
        #[arg(long)]
        queue_depth: Option<usize>,

        /// Override the cycle budget.
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Report sections to print (summary, cache, backpressure); all when omitted.
        #[arg(long, value_delimiter = ',')]
        sections: Vec<String>,

        /// Log at debug level unless `RUST_LOG` says otherwise.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the default configuration as JSON.
    Defaults,
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            trace,
            config,
            latency,
            queue_depth,
            max_cycles,
            sections,
            verbose,
        } => {
            init_logging(verbose);
            let overrides = Overrides {
                latency,
                queue_depth,
                max_cycles,
            };
            match cmd_run(&trace, config.as_deref(), &overrides, &sections) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!("{e}");
                    eprintln!("chansim: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Defaults => match serde_json::to_string_pretty(&Config::default()) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("chansim: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

/// Harness parameters given on the command line.
#[derive(Debug, Default)]
struct Overrides {
    latency: Option<u64>,
    queue_depth: Option<usize>,
    max_cycles: Option<u64>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(latency) = self.latency {
            config.sim.latency = latency;
        }
        if let Some(depth) = self.queue_depth {
            config.sim.queue_depth = depth;
        }
        if let Some(cycles) = self.max_cycles {
            config.sim.max_cycles = cycles;
        }
    }
}

/// Loads the inputs, runs the simulation to completion and prints the report.
fn cmd_run(
    trace: &std::path::Path,
    config: Option<&std::path::Path>,
    overrides: &Overrides,
    sections: &[String],
) -> Result<(), SimError> {
    let mut config = match config {
        Some(path) => loader::load_config(path)?,
        None => Config::default(),
    };
    overrides.apply(&mut config);
    config.validate()?;

    let requests = loader::load_trace(trace)?;
    info!(
        requests = requests.len(),
        ways = config.cache.ways,
        lines = config.cache.lines,
        cam_ways = config.tracker.cam_ways,
        policy = ?config.cache.policy,
        "starting run"
    );

    let mut sim = Simulator::new(&config, requests)?;
    let cycles = sim.run()?;

    println!(
        "Delivered {} responses to {} issued requests in {} cycles",
        sim.sink().received().len(),
        sim.source().issued(),
        cycles
    );
    println!();
    sim.channel().stats().print_sections(sections);
    Ok(())
}
