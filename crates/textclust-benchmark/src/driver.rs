//! Multi-dataset batch driver.
//!
//! Each dataset is an independent run with its own pipelines and evaluator.
//! A missing dataset file is skipped before any model work, and a fatal
//! pipeline failure ends only that dataset's run.

use std::error::Error;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::{BenchmarkConfig, DatasetConfig};
use crate::error::{BenchmarkError, BenchmarkResult};
use crate::orchestrator::{BenchmarkOrchestrator, RunResult};
use crate::pipeline::{build_variant, ClusteringPipeline, Variant};
use crate::policy::ErrorIsolationPolicy;
use crate::source::{resolve_dataset_path, JsonlRecordSource, Observation};

/// A completed dataset run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRun {
    /// Dataset configuration used.
    pub dataset: DatasetConfig,
    /// Windowed scores and counters.
    pub result: RunResult,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
}

/// What happened to one dataset in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DatasetOutcome {
    /// The run finished (possibly with no completed window).
    Completed(DatasetRun),
    /// The source was unavailable; no model work was done.
    Skipped {
        /// Dataset name.
        dataset: String,
        /// Why it was skipped.
        reason: String,
    },
    /// The run aborted on a fatal error.
    Failed {
        /// Dataset name.
        dataset: String,
        /// Rendered error chain.
        error: String,
    },
}

impl DatasetOutcome {
    /// Dataset name.
    pub fn dataset_name(&self) -> &str {
        match self {
            DatasetOutcome::Completed(run) => &run.dataset.name,
            DatasetOutcome::Skipped { dataset, .. } | DatasetOutcome::Failed { dataset, .. } => {
                dataset
            }
        }
    }

    /// The completed run, if any.
    pub fn as_completed(&self) -> Option<&DatasetRun> {
        match self {
            DatasetOutcome::Completed(run) => Some(run),
            _ => None,
        }
    }
}

/// Outcomes of a whole batch, in dataset order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration the batch ran with.
    pub config: BenchmarkConfig,
    /// One outcome per configured dataset.
    pub outcomes: Vec<DatasetOutcome>,
}

impl BatchResults {
    /// Completed runs only.
    pub fn completed(&self) -> impl Iterator<Item = &DatasetRun> {
        self.outcomes.iter().filter_map(DatasetOutcome::as_completed)
    }

    /// Short text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();
        for outcome in &self.outcomes {
            match outcome {
                DatasetOutcome::Completed(run) if run.result.is_empty() => {
                    s.push_str(&format!("{}: no data processed\n", run.dataset.name));
                }
                DatasetOutcome::Completed(run) => {
                    s.push_str(&format!(
                        "{}: {} windows, mean NMI fixed={:.3} adaptive={:.3}, skipped errors={}\n",
                        run.dataset.name,
                        run.result.windows.len(),
                        run.result.mean_score(Variant::Fixed).unwrap_or(0.0),
                        run.result.mean_score(Variant::Adaptive).unwrap_or(0.0),
                        run.result.recoverable_failures
                    ));
                }
                DatasetOutcome::Skipped { dataset, reason } => {
                    s.push_str(&format!("{dataset}: skipped ({reason})\n"));
                }
                DatasetOutcome::Failed { dataset, error } => {
                    s.push_str(&format!("{dataset}: failed ({error})\n"));
                }
            }
        }
        s
    }
}

/// Runs every configured dataset in order.
pub struct BatchDriver {
    config: BenchmarkConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl BatchDriver {
    /// Create a driver after validating the configuration.
    pub fn new(config: BenchmarkConfig) -> BenchmarkResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: None,
        })
    }

    /// Share a cancellation flag with every dataset run.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run every dataset from disk.
    pub fn run_all(&self) -> BatchResults {
        info!(datasets = self.config.datasets.len(), "Starting multi-dataset benchmark");

        let outcomes = self
            .config
            .datasets
            .iter()
            .map(|dataset| self.run_from_disk(dataset))
            .collect();

        info!("All benchmarks finished");
        BatchResults {
            config: self.config.clone(),
            outcomes,
        }
    }

    /// Run one dataset from its file, converting failures into outcomes.
    pub fn run_from_disk(&self, dataset: &DatasetConfig) -> DatasetOutcome {
        let source = match self.open_source(dataset) {
            Ok(source) => source,
            Err(e) => {
                warn!(dataset = %dataset.name, error = %e, "SKIPPING dataset: source unavailable");
                return DatasetOutcome::Skipped {
                    dataset: dataset.name.clone(),
                    reason: e.to_string(),
                };
            }
        };
        info!(dataset = %dataset.name, path = %source.path().display(), "Processing dataset");
        self.run_stream(dataset, source)
    }

    /// Run one dataset over any observation stream with freshly built pipelines.
    pub fn run_stream<I>(&self, dataset: &DatasetConfig, source: I) -> DatasetOutcome
    where
        I: IntoIterator<Item = Observation>,
    {
        let params = &self.config.pipeline;
        let pipelines = build_variant(Variant::Fixed, dataset, params).and_then(|fixed| {
            build_variant(Variant::Adaptive, dataset, params).map(|adaptive| (fixed, adaptive))
        });

        match pipelines {
            Ok((fixed, adaptive)) => self.run_with_pipelines(dataset, fixed, adaptive, source),
            Err(e) => failed(dataset, &e),
        }
    }

    /// Run one dataset with caller-supplied pipelines.
    ///
    /// Fatal pipeline errors are caught here, at the dataset boundary.
    pub fn run_with_pipelines<F, A, I>(
        &self,
        dataset: &DatasetConfig,
        fixed: F,
        adaptive: A,
        source: I,
    ) -> DatasetOutcome
    where
        F: ClusteringPipeline,
        A: ClusteringPipeline,
        I: IntoIterator<Item = Observation>,
    {
        info!(
            dataset = %dataset.name,
            fading_factor = dataset.fading_factor,
            horizon = dataset.horizon,
            "Config: Fading(λ)={} | Horizon={}",
            dataset.fading_factor,
            dataset.horizon
        );

        let start = Instant::now();
        match self.execute(dataset, fixed, adaptive, source) {
            Ok(result) => {
                if result.is_empty() {
                    warn!(dataset = %dataset.name, "No data processed");
                } else {
                    info!(
                        dataset = %dataset.name,
                        windows = result.windows.len(),
                        skipped = result.recoverable_failures,
                        "Finished (total skipped errors: {})",
                        result.recoverable_failures
                    );
                }
                DatasetOutcome::Completed(DatasetRun {
                    dataset: dataset.clone(),
                    result,
                    elapsed_ms: start.elapsed().as_millis() as u64,
                })
            }
            Err(e) => failed(dataset, &e),
        }
    }

    fn open_source(&self, dataset: &DatasetConfig) -> BenchmarkResult<JsonlRecordSource> {
        let path = resolve_dataset_path(&self.config.datasets_dir, &dataset.filename).ok_or_else(
            || BenchmarkError::SourceUnavailable {
                dataset: dataset.name.clone(),
                dir: self.config.datasets_dir.clone(),
            },
        )?;
        JsonlRecordSource::open(path)
    }

    fn execute<F, A, I>(
        &self,
        dataset: &DatasetConfig,
        fixed: F,
        adaptive: A,
        source: I,
    ) -> BenchmarkResult<RunResult>
    where
        F: ClusteringPipeline,
        A: ClusteringPipeline,
        I: IntoIterator<Item = Observation>,
    {
        let mut orchestrator = BenchmarkOrchestrator::try_new(fixed, adaptive, dataset.horizon)?
            .with_policy(ErrorIsolationPolicy::new(self.config.failure_log_cap));
        if let Some(cancel) = &self.cancel {
            orchestrator = orchestrator.with_cancel_flag(Arc::clone(cancel));
        }
        orchestrator.run(source)
    }
}

fn failed(dataset: &DatasetConfig, e: &BenchmarkError) -> DatasetOutcome {
    let chain = render_chain(e);
    error!(dataset = %dataset.name, error = %chain, "Unrecoverable error");
    DatasetOutcome::Failed {
        dataset: dataset.name.clone(),
        error: chain,
    }
}

/// Render an error and its sources as `outer: inner: ...`.
pub fn render_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut current = error.source();
    while let Some(source) = current {
        let message = source.to_string();
        if !rendered.contains(&message) {
            rendered.push_str(": ");
            rendered.push_str(&message);
        }
        current = source.source();
    }
    rendered
}
