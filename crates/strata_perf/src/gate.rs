//! # Performance Gate
//!
//! Compares one [`PerfMetrics`] sample against upper limits. Every metric is
//! "lower is better"; a value equal to its limit passes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PerfError, PerfResult};
use crate::metrics::{MetricName, PerfMetrics};

/// Upper limits for each metric.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfBudget {
    /// Mean frame time limit (ms). 16.7 ms is 60 FPS.
    pub avg_frame_ms: f64,
    /// 95th percentile frame time limit (ms).
    pub p95_frame_ms: f64,
    /// Chunk rebuild rate limit.
    pub chunk_rebuilds_per_second: f64,
    /// GPU memory limit (MB).
    pub gpu_memory_mb: f64,
}

impl Default for PerfBudget {
    fn default() -> Self {
        Self {
            avg_frame_ms: 16.7,
            p95_frame_ms: 25.0,
            chunk_rebuilds_per_second: 24.0,
            gpu_memory_mb: 2048.0,
        }
    }
}

impl PerfBudget {
    /// Limit for one metric.
    #[must_use]
    pub const fn limit(&self, metric: MetricName) -> f64 {
        match metric {
            MetricName::AvgFrameMs => self.avg_frame_ms,
            MetricName::P95FrameMs => self.p95_frame_ms,
            MetricName::ChunkRebuildsPerSecond => self.chunk_rebuilds_per_second,
            MetricName::GpuMemoryMb => self.gpu_memory_mb,
        }
    }

    /// Parses a TOML budget; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// [`PerfError::Budget`] for malformed TOML.
    pub fn from_toml_str(toml: &str) -> PerfResult<Self> {
        Ok(toml::from_str(toml)?)
    }

    /// Reads a TOML budget file.
    ///
    /// # Errors
    ///
    /// [`PerfError::Io`] if unreadable, [`PerfError::Budget`] if malformed.
    pub fn load(path: impl AsRef<Path>) -> PerfResult<Self> {
        let path = path.as_ref();
        let toml = std::fs::read_to_string(path).map_err(|source| PerfError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&toml)
    }
}

/// One metric over its limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BudgetViolation {
    /// Which metric.
    pub metric: MetricName,
    /// Recorded value.
    pub value: f64,
    /// Budget limit.
    pub limit: f64,
}

impl BudgetViolation {
    /// How far over the limit, as a fraction of the limit.
    #[must_use]
    pub fn overshoot(&self) -> f64 {
        if self.limit > 0.0 {
            (self.value - self.limit) / self.limit
        } else {
            f64::INFINITY
        }
    }
}

impl std::fmt::Display for BudgetViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unit = self.metric.unit();
        write!(f, "{} = {}{unit} (limit {}{unit})", self.metric, self.value, self.limit)
    }
}

/// Gate verdict. `failures` is empty exactly when `pass` is true.
#[derive(Clone, Debug, PartialEq)]
pub struct GateReport {
    /// True if every metric is within budget.
    pub pass: bool,
    /// Every metric over budget, in report order.
    pub failures: Vec<BudgetViolation>,
}

/// Budget checker.
#[derive(Clone, Debug, Default)]
pub struct TerrainPerformanceGate {
    budget: PerfBudget,
}

impl TerrainPerformanceGate {
    /// Creates a gate with a custom budget.
    #[must_use]
    pub const fn new(budget: PerfBudget) -> Self {
        Self { budget }
    }

    /// The budget in force.
    #[must_use]
    pub const fn budget(&self) -> &PerfBudget {
        &self.budget
    }

    /// Checks every metric against its limit.
    #[must_use]
    pub fn evaluate(&self, metrics: &PerfMetrics) -> GateReport {
        let failures: Vec<BudgetViolation> = MetricName::ALL
            .into_iter()
            .filter_map(|metric| {
                let value = metrics.get(metric);
                let limit = self.budget.limit(metric);
                (value > limit).then_some(BudgetViolation { metric, value, limit })
            })
            .collect();
        GateReport {
            pass: failures.is_empty(),
            failures,
        }
    }
}
