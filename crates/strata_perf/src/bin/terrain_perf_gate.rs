//! # Terrain Perf Gate
//!
//! CI entry point: evaluates a recorded metrics file against the terrain
//! budgets.
//!
//! ```text
//! terrain_perf_gate <metrics.json> [--budget <budget.toml>]
//! ```
//!
//! Markdown summary on stdout, logs on stderr. Exit 0 pass, 1 over budget,
//! 2 bad input.

use std::process::ExitCode;

use strata_perf::{GateExitCode, PerfBudget, TerrainPerfCiGate};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let Some(metrics_path) = args.get(1).filter(|arg| !arg.starts_with("--")) else {
        eprintln!("Usage: terrain_perf_gate <metrics.json> [--budget <budget.toml>]");
        return ExitCode::from(GateExitCode::BadInput.code());
    };

    let budget = match args.iter().position(|arg| arg == "--budget") {
        None => PerfBudget::default(),
        Some(i) => {
            let Some(path) = args.get(i + 1) else {
                eprintln!("--budget needs a file path");
                return ExitCode::from(GateExitCode::BadInput.code());
            };
            match PerfBudget::load(path) {
                Ok(budget) => budget,
                Err(error) => {
                    let outcome = TerrainPerfCiGate::bad_input(&error);
                    println!("{}", outcome.summary_markdown);
                    return ExitCode::from(outcome.exit_code.code());
                }
            }
        }
    };

    tracing::info!(path = %metrics_path, "Evaluating terrain metrics");
    let outcome = TerrainPerfCiGate::new(budget).evaluate_file(metrics_path);
    println!("{}", outcome.summary_markdown);
    ExitCode::from(outcome.exit_code.code())
}
