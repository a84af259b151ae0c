//! Error types for the run driver.

use gridforge_core::GridError;
use gridforge_env::EnvError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors in resolving what to run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Arguments were given but none of them names a model file
    #[error("No model file given (run with --help for usage)")]
    MissingModel,

    /// A recognized flag carried an unusable value
    #[error("{0}")]
    Cli(String),

    /// Batch index could not be read
    #[error("Cannot read model index {path}: {source}")]
    IndexRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Batch index is malformed
    #[error("Malformed model index {path}: {source}")]
    IndexParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors that abort a model run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Env(#[from] EnvError),

    /// Standard output rejected the text dump
    #[error("Cannot write text dump: {0}")]
    TextDump(#[source] std::io::Error),
}
