//! Error types for the engine binary.

use std::path::PathBuf;

/// Top-level error for the engine binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: reclaim_core::config::ConfigError,
    },

    /// The world could not be built from the configuration.
    #[error("setup error: {source}")]
    Setup {
        /// The underlying setup error.
        #[from]
        source: reclaim_core::world::SetupError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: reclaim_core::runner::RunnerError,
    },

    /// The final report could not be serialized.
    #[error("report serialization failed: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The final report could not be written.
    #[error("failed to write report to {path}: {source}")]
    ReportWrite {
        /// Target file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// A console line that is not an operator command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The first word names no command.
    #[error("unknown command {0:?} (expected pause, resume, speed <ms>, status or stop)")]
    Unknown(String),

    /// `speed` was given without an interval.
    #[error("speed needs a tick interval in milliseconds")]
    MissingInterval,

    /// The interval given to `speed` is not a number.
    #[error("invalid tick interval {value:?}: {source}")]
    InvalidInterval {
        /// The text that failed to parse.
        value: String,
        /// The underlying parse error.
        source: std::num::ParseIntError,
    },
}
