//! # Recorded Metrics
//!
//! One sample from a profiling run, as written by the harness:
//!
//! ```json
//! { "avg_frame_ms": 12.0, "p95_frame_ms": 16.0,
//!   "chunk_rebuilds_per_second": 7.0, "gpu_memory_mb": 1024.0 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PerfError, PerfResult};

/// Names of the gated metrics, as they appear in the JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricName {
    /// Mean frame time.
    AvgFrameMs,
    /// 95th percentile frame time.
    P95FrameMs,
    /// Chunk mesh rebuilds per second.
    ChunkRebuildsPerSecond,
    /// GPU memory in use.
    GpuMemoryMb,
}

impl MetricName {
    /// All metrics, in report order.
    pub const ALL: [Self; 4] = [
        Self::AvgFrameMs,
        Self::P95FrameMs,
        Self::ChunkRebuildsPerSecond,
        Self::GpuMemoryMb,
    ];

    /// JSON key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AvgFrameMs => "avg_frame_ms",
            Self::P95FrameMs => "p95_frame_ms",
            Self::ChunkRebuildsPerSecond => "chunk_rebuilds_per_second",
            Self::GpuMemoryMb => "gpu_memory_mb",
        }
    }

    /// Display unit.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::AvgFrameMs | Self::P95FrameMs => "ms",
            Self::ChunkRebuildsPerSecond => "/s",
            Self::GpuMemoryMb => "MB",
        }
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A performance sample. All four fields are required; extra fields are
/// ignored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerfMetrics {
    /// Mean frame time in milliseconds.
    pub avg_frame_ms: f64,
    /// 95th percentile frame time in milliseconds.
    pub p95_frame_ms: f64,
    /// Chunk mesh rebuilds per second.
    pub chunk_rebuilds_per_second: f64,
    /// GPU memory in megabytes.
    pub gpu_memory_mb: f64,
}

impl PerfMetrics {
    /// Creates a sample.
    #[must_use]
    pub const fn new(
        avg_frame_ms: f64,
        p95_frame_ms: f64,
        chunk_rebuilds_per_second: f64,
        gpu_memory_mb: f64,
    ) -> Self {
        Self {
            avg_frame_ms,
            p95_frame_ms,
            chunk_rebuilds_per_second,
            gpu_memory_mb,
        }
    }

    /// Value of one metric.
    #[must_use]
    pub const fn get(&self, metric: MetricName) -> f64 {
        match metric {
            MetricName::AvgFrameMs => self.avg_frame_ms,
            MetricName::P95FrameMs => self.p95_frame_ms,
            MetricName::ChunkRebuildsPerSecond => self.chunk_rebuilds_per_second,
            MetricName::GpuMemoryMb => self.gpu_memory_mb,
        }
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// [`PerfError::Empty`] for blank input, [`PerfError::Json`] for
    /// malformed or incomplete JSON, [`PerfError::InvalidValue`] for a
    /// negative or non-finite metric.
    pub fn from_json_str(json: &str) -> PerfResult<Self> {
        if json.trim().is_empty() {
            return Err(PerfError::Empty);
        }
        let metrics: Self = serde_json::from_str(json)?;
        metrics.validate()?;
        Ok(metrics)
    }

    /// Reads and parses a metrics file.
    ///
    /// # Errors
    ///
    /// [`PerfError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> PerfResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| PerfError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Rejects negative or non-finite values.
    ///
    /// # Errors
    ///
    /// [`PerfError::InvalidValue`] naming the first bad metric.
    pub fn validate(&self) -> PerfResult<()> {
        for metric in MetricName::ALL {
            let value = self.get(metric);
            if !value.is_finite() || value < 0.0 {
                return Err(PerfError::InvalidValue {
                    metric: metric.as_str(),
                    value,
                });
            }
        }
        Ok(())
    }
}
