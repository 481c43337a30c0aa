//! Benchmark orchestrator: replays one stream through both pipeline variants.
//!
//! Per observation, in stream order:
//!
//! 1. fixed pipeline: observe, then assign
//! 2. adaptive pipeline: observe, then assign
//! 3. on a recoverable failure from either, the observation is skipped for
//!    every buffer; a fatal failure ends the run with an error
//! 4. otherwise the aligned triple is appended to the evaluator
//! 5. every `horizon` scored observations the window is flushed
//!
//! The window countdown follows the scored count, not the record index, so
//! every emitted window holds exactly `horizon` entries.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BenchmarkError, BenchmarkResult};
use crate::evaluator::WindowedEvaluator;
use crate::pipeline::{ClusterId, ClusteringPipeline, PipelineError, Variant};
use crate::policy::ErrorIsolationPolicy;
use crate::source::Observation;

/// Scores of one completed evaluation window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowResult {
    /// Zero-based window number.
    pub window_index: usize,
    /// Scored observations up to and including this window.
    pub cumulative_count: u64,
    /// Fixed variant NMI.
    pub fixed_score: f64,
    /// Adaptive variant NMI.
    pub adaptive_score: f64,
}

/// Outcome of one run over a stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Completed windows in ascending `cumulative_count` order.
    pub windows: Vec<WindowResult>,
    /// Observations pulled from the source.
    pub observations_seen: u64,
    /// Observations appended to the evaluator.
    pub observations_scored: u64,
    /// Observations skipped by the error isolation policy.
    pub recoverable_failures: usize,
    /// Scored observations in the unfinished final window (never evaluated).
    pub discarded_tail: usize,
    /// False when the run was cancelled before the source was exhausted.
    pub completed: bool,
}

impl RunResult {
    /// Whether any window was completed.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Mean score of a variant across windows.
    pub fn mean_score(&self, variant: Variant) -> Option<f64> {
        if self.windows.is_empty() {
            return None;
        }
        let sum: f64 = self
            .windows
            .iter()
            .map(|w| match variant {
                Variant::Fixed => w.fixed_score,
                Variant::Adaptive => w.adaptive_score,
            })
            .sum();
        Some(sum / self.windows.len() as f64)
    }
}

/// Drives a stream through a fixed and an adaptive pipeline.
pub struct BenchmarkOrchestrator<F, A> {
    fixed: F,
    adaptive: A,
    horizon: NonZeroUsize,
    policy: ErrorIsolationPolicy,
    evaluator: WindowedEvaluator,
    cancel: Option<Arc<AtomicBool>>,
}

impl<F, A> BenchmarkOrchestrator<F, A>
where
    F: ClusteringPipeline,
    A: ClusteringPipeline,
{
    /// Create an orchestrator over two freshly built pipelines.
    pub fn new(fixed: F, adaptive: A, horizon: NonZeroUsize) -> Self {
        Self {
            fixed,
            adaptive,
            horizon,
            policy: ErrorIsolationPolicy::default(),
            evaluator: WindowedEvaluator::new(horizon.get()),
            cancel: None,
        }
    }

    /// Create from a plain horizon, rejecting zero.
    pub fn try_new(fixed: F, adaptive: A, horizon: usize) -> BenchmarkResult<Self> {
        let horizon = NonZeroUsize::new(horizon).ok_or_else(|| BenchmarkError::InvalidConfig {
            field: "horizon".to_string(),
            reason: "must be a positive integer".to_string(),
        })?;
        Ok(Self::new(fixed, adaptive, horizon))
    }

    /// Replace the error isolation policy.
    pub fn with_policy(mut self, policy: ErrorIsolationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the evaluator (e.g. to score with a different metric).
    pub fn with_evaluator(mut self, evaluator: WindowedEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Check this flag between observations and stop when it is set.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The pipelines, for inspection after a run.
    pub fn pipelines(&self) -> (&F, &A) {
        (&self.fixed, &self.adaptive)
    }

    /// Run the whole stream.
    ///
    /// Returns an error only for a fatal pipeline failure; the error carries
    /// the pipeline's original error as its source. Counters start from zero
    /// on every call; pipeline state carries over.
    pub fn run<I>(&mut self, source: I) -> BenchmarkResult<RunResult>
    where
        I: IntoIterator<Item = Observation>,
    {
        let horizon = self.horizon.get() as u64;
        self.policy.reset();
        let mut result = RunResult {
            completed: true,
            ..Default::default()
        };
        let mut scored: u64 = 0;

        for observation in source {
            if self.is_cancelled() {
                info!(
                    observations = result.observations_seen,
                    windows = result.windows.len(),
                    "Run cancelled"
                );
                result.completed = false;
                break;
            }
            result.observations_seen += 1;

            let (pred_fixed, pred_adaptive) = match self.step(&observation.text) {
                Ok(predictions) => predictions,
                Err((variant, error)) => {
                    self.policy
                        .admit(variant, result.observations_seen, error)
                        .map_err(|source| BenchmarkError::Pipeline {
                            variant,
                            sequence_index: observation.sequence_index,
                            source,
                        })?;
                    continue;
                }
            };

            self.evaluator
                .append(observation.label, pred_fixed, pred_adaptive);
            scored += 1;

            if scored % horizon == 0 {
                if let Some(scores) = self.evaluator.flush() {
                    let window = WindowResult {
                        window_index: result.windows.len(),
                        cumulative_count: scored,
                        fixed_score: scores.fixed,
                        adaptive_score: scores.adaptive,
                    };
                    info!(
                        step = scored,
                        "Step {}: Fixed={:.3} | Adaptive={:.3}",
                        scored,
                        window.fixed_score,
                        window.adaptive_score
                    );
                    result.windows.push(window);
                }
            }
        }

        result.observations_scored = scored;
        result.recoverable_failures = self.policy.recoverable_failures();
        result.discarded_tail = self.evaluator.discard();

        debug!(
            seen = result.observations_seen,
            scored = result.observations_scored,
            skipped = result.recoverable_failures,
            discarded_tail = result.discarded_tail,
            "Run finished"
        );
        Ok(result)
    }

    /// Feed one text to both pipelines, fixed first.
    fn step(
        &mut self,
        text: &str,
    ) -> Result<(Option<ClusterId>, Option<ClusterId>), (Variant, PipelineError)> {
        let fixed = observe_and_assign(&mut self.fixed, text).map_err(|e| (Variant::Fixed, e))?;
        let adaptive =
            observe_and_assign(&mut self.adaptive, text).map_err(|e| (Variant::Adaptive, e))?;
        Ok((fixed, adaptive))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

fn observe_and_assign<P: ClusteringPipeline>(
    pipeline: &mut P,
    text: &str,
) -> Result<Option<ClusterId>, PipelineError> {
    pipeline.observe(text)?;
    pipeline.assign(text)
}
