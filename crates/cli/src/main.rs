//! Temporal prefetch engine simulator CLI.
//!
//! This binary drives the engine from a training trace. It provides:
//! 1. **Trace run:** Feed a JSON-lines trace through the engine and a reference metadata
//!    store, then print statistics or a JSON report.
//! 2. **Default config:** Print the built-in configuration as JSON, as a starting point for
//!    `--config`.
//!
//! Engine telemetry is emitted through `tracing`; set `RUST_LOG` (for example
//! `RUST_LOG=tpsim::send=debug`) to see it.

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tpsim_core::config::Config;
use tpsim_core::sim::{Simulator, load_trace};

#[derive(Parser, Debug)]
#[command(
    name = "tpsim",
    author,
    version,
    about = "Temporal prefetch engine simulator",
    long_about = "Replay a training trace through a cycle-driven temporal prefetch engine.\n\nExamples:\n  tpsim run --trace trace.jsonl\n  tpsim run --trace trace.jsonl --config tpsim.json --json\n  tpsim default-config > tpsim.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a training trace through the engine.
    Run {
        /// JSON-lines trace, one train event per line.
        #[arg(short, long)]
        trace: String,

        /// JSON configuration file (defaults apply to omitted fields).
        #[arg(short, long)]
        config: Option<String>,

        /// Print the full report as JSON instead of the statistics table.
        #[arg(long)]
        json: bool,

        /// Stop after this many ticks even if the engine has not drained.
        #[arg(long, default_value_t = 10_000_000)]
        max_cycles: u64,
    },

    /// Print the default configuration as JSON.
    DefaultConfig,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            trace,
            config,
            json,
            max_cycles,
        } => cmd_run(&trace, config.as_deref(), json, max_cycles),
        Commands::DefaultConfig => cmd_default_config(),
    }
}

fn cmd_run(trace: &str, config: Option<&str>, json: bool, max_cycles: u64) {
    let config = match config {
        Some(path) => Config::load(path).unwrap_or_else(|e| fatal(&e)),
        None => Config::default(),
    };
    let events = load_trace(trace).unwrap_or_else(|e| fatal(&e));

    let report = Simulator::new(&config).run(&events, max_cycles);

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => fatal(&e),
        }
        return;
    }

    report.stats.print();
    println!("records.stored           {}", report.records_stored);
    if report.truncated {
        eprintln!(
            "[!] Stopped at --max-cycles {max_cycles} before the trace drained ({} of {} events fed)",
            report.events_fed,
            events.len()
        );
    }
}

fn cmd_default_config() {
    match serde_json::to_string_pretty(&Config::default()) {
        Ok(text) => println!("{text}"),
        Err(e) => fatal(&e),
    }
}

fn fatal(err: &dyn std::fmt::Display) -> ! {
    eprintln!("\n[!] FATAL: {err}");
    process::exit(1);
}
