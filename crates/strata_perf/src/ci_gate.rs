//! # CI Gate
//!
//! Wraps [`TerrainPerformanceGate`] for pipelines: a process exit code plus a
//! Markdown summary suitable for a job log or PR comment.
//!
//! | Exit | Meaning |
//! |------|---------|
//! | 0 | all metrics within budget |
//! | 1 | at least one metric over budget |
//! | 2 | metrics missing, empty or malformed |

use std::fmt::Write as _;
use std::path::Path;

use tracing::{info, warn};

use crate::error::PerfError;
use crate::gate::{GateReport, PerfBudget, TerrainPerformanceGate};
use crate::metrics::{MetricName, PerfMetrics};

/// Process exit codes of the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum GateExitCode {
    /// Within budget.
    Pass = 0,
    /// Over budget.
    BudgetExceeded = 1,
    /// Input unusable.
    BadInput = 2,
}

impl GateExitCode {
    /// Numeric code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Exit code plus human-readable summary.
#[derive(Clone, Debug, PartialEq)]
pub struct CiOutcome {
    /// Code for the process to exit with.
    pub exit_code: GateExitCode,
    /// Markdown summary.
    pub summary_markdown: String,
    /// Gate verdict, absent for bad input.
    pub report: Option<GateReport>,
}

/// CI-facing gate.
#[derive(Clone, Debug, Default)]
pub struct TerrainPerfCiGate {
    gate: TerrainPerformanceGate,
}

impl TerrainPerfCiGate {
    /// Creates a CI gate with a custom budget.
    #[must_use]
    pub const fn new(budget: PerfBudget) -> Self {
        Self {
            gate: TerrainPerformanceGate::new(budget),
        }
    }

    /// Evaluates an already parsed sample.
    #[must_use]
    pub fn evaluate_metrics(&self, metrics: &PerfMetrics) -> CiOutcome {
        if let Err(error) = metrics.validate() {
            return Self::bad_input(&error);
        }

        let report = self.gate.evaluate(metrics);
        let exit_code = if report.pass {
            info!("Terrain perf gate passed");
            GateExitCode::Pass
        } else {
            warn!(failures = report.failures.len(), "Terrain perf gate failed");
            GateExitCode::BudgetExceeded
        };

        CiOutcome {
            exit_code,
            summary_markdown: self.render_summary(metrics, &report),
            report: Some(report),
        }
    }

    /// Loads and evaluates a metrics file.
    #[must_use]
    pub fn evaluate_file(&self, path: impl AsRef<Path>) -> CiOutcome {
        match PerfMetrics::load(path) {
            Ok(metrics) => self.evaluate_metrics(&metrics),
            Err(error) => Self::bad_input(&error),
        }
    }

    /// Evaluates a JSON document.
    #[must_use]
    pub fn evaluate_json(&self, json: &str) -> CiOutcome {
        match PerfMetrics::from_json_str(json) {
            Ok(metrics) => self.evaluate_metrics(&metrics),
            Err(error) => Self::bad_input(&error),
        }
    }

    /// Outcome for unusable input.
    #[must_use]
    pub fn bad_input(error: &PerfError) -> CiOutcome {
        warn!(%error, "Terrain perf gate input rejected");
        let summary_markdown = format!(
            "## Terrain Performance Gate: BAD INPUT\n\n\
             The metrics could not be evaluated.\n\n\
             ```\n{error}\n```\n\n\
             Expected a JSON object with `avg_frame_ms`, `p95_frame_ms`, \
             `chunk_rebuilds_per_second` and `gpu_memory_mb`.\n"
        );
        CiOutcome {
            exit_code: GateExitCode::BadInput,
            summary_markdown,
            report: None,
        }
    }

    fn render_summary(&self, metrics: &PerfMetrics, report: &GateReport) -> String {
        let budget = self.gate.budget();
        let verdict = if report.pass { "PASS" } else { "FAIL" };

        let mut out = format!("## Terrain Performance Gate: {verdict}\n\n");
        out.push_str("| Metric | Value | Budget | Status |\n");
        out.push_str("|--------|------:|-------:|:------:|\n");
        for metric in MetricName::ALL {
            let failed = report.failures.iter().any(|v| v.metric == metric);
            let unit = metric.unit();
            // Writing into a String cannot fail
            let _ = writeln!(
                out,
                "| `{metric}` | {:.2}{unit} | {:.2}{unit} | {} |",
                metrics.get(metric),
                budget.limit(metric),
                if failed { "❌" } else { "✅" },
            );
        }

        if !report.failures.is_empty() {
            out.push_str("\n### Over budget\n\n");
            for violation in &report.failures {
                let _ = writeln!(
                    out,
                    "- `{}`: {:.2} > {:.2} (+{:.0}%)",
                    violation.metric,
                    violation.value,
                    violation.limit,
                    violation.overshoot() * 100.0
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_exit_code() {
        let outcome = TerrainPerfCiGate::default().evaluate_metrics(&PerfMetrics::new(12.0, 16.0, 7.0, 1024.0));
        assert_eq!(outcome.exit_code, GateExitCode::Pass);
        assert_eq!(outcome.exit_code.code(), 0);
        assert!(outcome.summary_markdown.contains("PASS"));
    }

    #[test]
    fn test_fail_exit_code() {
        let outcome = TerrainPerfCiGate::default().evaluate_metrics(&PerfMetrics::new(33.0, 48.0, 55.0, 6000.0));
        assert_eq!(outcome.exit_code.code(), 1);
        assert!(!outcome.summary_markdown.is_empty());
        for metric in MetricName::ALL {
            assert!(outcome.summary_markdown.contains(&format!("- `{metric}`")));
        }
    }

    #[test]
    fn test_non_finite_is_bad_input() {
        let outcome = TerrainPerfCiGate::default().evaluate_metrics(&PerfMetrics::new(f64::NAN, 1.0, 1.0, 1.0));
        assert_eq!(outcome.exit_code, GateExitCode::BadInput);
        assert!(outcome.report.is_none());
    }

    #[test]
    fn test_bad_json_is_bad_input() {
        let gate = TerrainPerfCiGate::default();
        assert_eq!(gate.evaluate_json("").exit_code, GateExitCode::BadInput);
        assert_eq!(gate.evaluate_json("[1, 2]").exit_code, GateExitCode::BadInput);
        assert_eq!(gate.evaluate_file("/no/such/metrics.json").exit_code, GateExitCode::BadInput);
    }
}
