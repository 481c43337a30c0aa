//! # Streaming Clustering Robustness Benchmark
//!
//! Replays labelled text streams through two independently stateful streaming
//! clustering pipelines, a fixed-radius variant and a self-adjusting
//! (`auto_r`) variant, and tracks windowed NMI against the ground truth.
//!
//! ## Flow
//!
//! ```text
//! Record Source -> Orchestrator -> {fixed, adaptive} pipelines
//!                       |
//!                Error Isolation Policy (skip numeric failures, propagate the rest)
//!                       |
//!                Windowed Evaluator --(every `horizon` scored)--> Run Result
//! ```
//!
//! ## Key Properties
//!
//! 1. **Alignment**: an observation is appended to all buffers or to none.
//! 2. **Window determinism**: every window holds exactly `horizon` triples.
//! 3. **Failure isolation**: a `math domain error` from either pipeline skips one
//!    observation; the count is exact regardless of how many are logged.
//!
//! ## Usage
//!
//! ```bash
//! # Run the built-in dataset catalog from ./datasets
//! cargo run -p textclust-benchmark --bin textclust-bench -- --format both --output results
//!
//! # Run a generated stream
//! cargo run -p textclust-benchmark --bin textclust-bench -- --synthetic 5000 --horizon 1000
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod orchestrator;
pub mod pipeline;
pub mod policy;
pub mod reports;
pub mod source;
pub mod synthetic;

// Re-export key types for convenience
pub use config::{BenchmarkConfig, DatasetConfig, PipelineParams};
pub use driver::{BatchDriver, BatchResults, DatasetOutcome, DatasetRun};
pub use error::{BenchmarkError, BenchmarkResult};
pub use evaluator::{Assignment, WindowScores, WindowedEvaluator};
pub use metrics::normalized_mutual_info;
pub use orchestrator::{BenchmarkOrchestrator, RunResult, WindowResult};
pub use pipeline::{build_variant, ClusterId, ClusteringPipeline, PipelineError, Variant};
pub use policy::{classify, ErrorIsolationPolicy, FailureClass};
pub use reports::{BatchReport, ReportFormat};
pub use source::{JsonlRecordSource, Label, Observation};
pub use synthetic::{SyntheticStream, SyntheticStreamConfig, TopicOrdering};
