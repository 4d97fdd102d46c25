//! # STRATA Perf
//!
//! Performance budgets for the terrain runtime and the CI gate that enforces
//! them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_perf::{GateExitCode, TerrainPerfCiGate};
//!
//! let outcome = TerrainPerfCiGate::default().evaluate_file("target/perf/metrics.json");
//! println!("{}", outcome.summary_markdown);
//! std::process::exit(i32::from(outcome.exit_code.code()));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ci_gate;
pub mod error;
pub mod gate;
pub mod metrics;

pub use ci_gate::{CiOutcome, GateExitCode, TerrainPerfCiGate};
pub use error::{PerfError, PerfResult};
pub use gate::{BudgetViolation, GateReport, PerfBudget, TerrainPerformanceGate};
pub use metrics::{MetricName, PerfMetrics};
