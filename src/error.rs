//! Error taxonomy for the reporting pipeline.
//!
//! Library operations return [`ReportError`] so callers (and tests) can tell
//! a malformed export from an empty one. The binaries wrap these in
//! `color_eyre` reports and exit non-zero.

use std::io;
use std::path::PathBuf;

use crate::config::ValidationError;

/// Errors produced by the extractor, formatter and run analyzers
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Malformed input at line {line}: {reason}")]
    MalformedInput { line: u64, reason: String },

    #[error("Input format error: {0}")]
    InputFormat(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Latency summary contains no traffic classes")]
    MissingClass,

    #[error("Invalid simulation duration: {0} (must be a positive number of seconds)")]
    InvalidDuration(f64),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid class map: {0}")]
    Config(#[from] ValidationError),

    #[error("External tool failed: {0}")]
    ExternalTool(String),
}

impl ReportError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReportError::Read { path: path.into(), source }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReportError::OutputWrite { path: path.into(), source }
    }
}

/// Result alias used across the library
pub type Result<T, E = ReportError> = std::result::Result<T, E>;
