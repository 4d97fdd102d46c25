//! # Perf Gate Error Types
//!
//! Everything that makes a metrics or budget input unusable. All of these
//! map to the CI "bad input" exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reading metrics or budgets.
#[derive(Error, Debug)]
pub enum PerfError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The metrics input has no content.
    #[error("metrics input is empty")]
    Empty,

    /// The metrics input is not valid metrics JSON.
    #[error("invalid metrics JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A metric is negative or not finite.
    #[error("invalid value for {metric}: {value}")]
    InvalidValue {
        /// Metric name.
        metric: &'static str,
        /// Offending value.
        value: f64,
    },

    /// The budget file is not valid budget TOML.
    #[error("invalid budget TOML: {0}")]
    Budget(#[from] toml::de::Error),
}

/// Result type for perf gate operations.
pub type PerfResult<T> = Result<T, PerfError>;
