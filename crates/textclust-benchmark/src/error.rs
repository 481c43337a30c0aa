//! Benchmark error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::{PipelineError, Variant};

/// Errors surfaced by a benchmark run or the batch around it.
#[derive(Debug, Error)]
pub enum BenchmarkError {
    /// A pipeline failed with a non-recoverable error.
    ///
    /// `source` is the pipeline's own error, unchanged.
    #[error("{variant} pipeline failed at record {sequence_index}: {source}")]
    Pipeline {
        /// Which pipeline raised the error.
        variant: Variant,
        /// Sequence index of the observation being processed.
        sequence_index: u64,
        /// The original pipeline error.
        #[source]
        source: PipelineError,
    },

    /// Neither the dataset file nor its `.json` sibling exists.
    #[error("Dataset '{dataset}' not found under {}", .dir.display())]
    SourceUnavailable {
        /// Dataset name.
        dataset: String,
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// IO error reading or writing a file.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON error reading a config file.
    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration '{field}': {reason}")]
    InvalidConfig {
        /// Offending field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The streaming model rejected its configuration.
    #[error("Pipeline construction failed: {0}")]
    PipelineConfig(#[from] textclust_stream::StreamError),
}

/// Result alias for benchmark operations.
pub type BenchmarkResult<T> = Result<T, BenchmarkError>;
