//! # Terrain Error Types
//!
//! Failures at the configuration boundary. The terrain math itself never
//! fails; degenerate input there yields empty output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up the terrain runtime.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// Config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid TOML for this schema.
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but a value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for terrain setup.
pub type TerrainResult<T> = Result<T, TerrainError>;
