//! JSON report generation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::driver::{BatchResults, DatasetOutcome};
use crate::orchestrator::WindowResult;
use crate::pipeline::Variant;

/// Report schema version.
pub const REPORT_VERSION: &str = "1.0";

/// Complete JSON report structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Report metadata.
    pub metadata: ReportMetadata,
    /// Pipeline parameters shared by all datasets.
    pub pipeline: PipelineSummary,
    /// Completed datasets.
    pub datasets: Vec<DatasetReport>,
    /// Datasets skipped because their source was unavailable.
    pub skipped: Vec<NamedReason>,
    /// Datasets whose run aborted.
    pub failed: Vec<NamedReason>,
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report version for schema compatibility.
    pub version: String,
    /// Batch run id.
    pub run_id: Uuid,
    /// Timestamp of generation.
    pub generated_at: String,
}

/// Variant labels and parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub fixed_label: String,
    pub adaptive_label: String,
    pub radius: f64,
    pub sigma: f64,
}

/// Time series and counters for one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetReport {
    pub name: String,
    pub fading_factor: f64,
    pub tgap: u64,
    pub horizon: usize,
    pub observations_seen: u64,
    pub observations_scored: u64,
    pub recoverable_failures: usize,
    pub completed: bool,
    pub mean_fixed: Option<f64>,
    pub mean_adaptive: Option<f64>,
    pub elapsed_ms: u64,
    pub windows: Vec<WindowResult>,
}

/// A dataset name with a reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedReason {
    pub dataset: String,
    pub reason: String,
}

/// Build the JSON report structure.
pub fn build_report(run_id: Uuid, results: &BatchResults) -> JsonReport {
    let params = &results.config.pipeline;
    let mut report = JsonReport {
        metadata: ReportMetadata {
            version: REPORT_VERSION.to_string(),
            run_id,
            generated_at: chrono::Utc::now().to_rfc3339(),
        },
        pipeline: PipelineSummary {
            fixed_label: Variant::Fixed.label(params),
            adaptive_label: Variant::Adaptive.label(params),
            radius: params.radius,
            sigma: params.sigma,
        },
        datasets: Vec::new(),
        skipped: Vec::new(),
        failed: Vec::new(),
    };

    for outcome in &results.outcomes {
        match outcome {
            DatasetOutcome::Completed(run) => report.datasets.push(DatasetReport {
                name: run.dataset.name.clone(),
                fading_factor: run.dataset.fading_factor,
                tgap: run.dataset.tgap,
                horizon: run.dataset.horizon,
                observations_seen: run.result.observations_seen,
                observations_scored: run.result.observations_scored,
                recoverable_failures: run.result.recoverable_failures,
                completed: run.result.completed,
                mean_fixed: run.result.mean_score(Variant::Fixed),
                mean_adaptive: run.result.mean_score(Variant::Adaptive),
                elapsed_ms: run.elapsed_ms,
                windows: run.result.windows.clone(),
            }),
            DatasetOutcome::Skipped { dataset, reason } => report.skipped.push(NamedReason {
                dataset: dataset.clone(),
                reason: reason.clone(),
            }),
            DatasetOutcome::Failed { dataset, error } => report.failed.push(NamedReason {
                dataset: dataset.clone(),
                reason: error.clone(),
            }),
        }
    }

    report
}

/// Generate the JSON report as a pretty-printed string.
pub fn generate_json(run_id: Uuid, results: &BatchResults) -> String {
    let report = build_report(run_id, results);
    serde_json::to_string_pretty(&report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BenchmarkConfig, DatasetConfig};
    use crate::driver::DatasetRun;
    use crate::orchestrator::RunResult;

    #[test]
    fn test_json_report_sections() {
        let dataset = DatasetConfig::new("A", "a.jsonl", 0.01, 10, 2);
        let run = DatasetRun {
            dataset,
            result: RunResult {
                windows: vec![WindowResult {
                    window_index: 0,
                    cumulative_count: 2,
                    fixed_score: 0.5,
                    adaptive_score: 0.75,
                }],
                observations_seen: 3,
                observations_scored: 2,
                recoverable_failures: 1,
                discarded_tail: 0,
                completed: true,
            },
            elapsed_ms: 1,
        };
        let results = BatchResults {
            config: BenchmarkConfig::default(),
            outcomes: vec![
                DatasetOutcome::Completed(run),
                DatasetOutcome::Skipped {
                    dataset: "B".into(),
                    reason: "missing".into(),
                },
            ],
        };

        let run_id = Uuid::new_v4();
        let parsed: JsonReport = serde_json::from_str(&generate_json(run_id, &results)).unwrap();
        assert_eq!(parsed.metadata.run_id, run_id);
        assert_eq!(parsed.datasets.len(), 1);
        assert_eq!(parsed.datasets[0].recoverable_failures, 1);
        assert_eq!(parsed.datasets[0].mean_adaptive, Some(0.75));
        assert_eq!(parsed.skipped[0].dataset, "B");
        assert!(parsed.failed.is_empty());
    }
}
