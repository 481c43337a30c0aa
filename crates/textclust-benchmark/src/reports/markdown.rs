//! Markdown report generation.
//!
//! One summary table across datasets, then a `Step | Fixed | Adaptive` table
//! per completed dataset.

use uuid::Uuid;

use crate::driver::{BatchResults, DatasetOutcome, DatasetRun};
use crate::pipeline::Variant;

/// Generate Markdown report from batch results.
pub fn generate_markdown(run_id: Uuid, results: &BatchResults) -> String {
    let params = &results.config.pipeline;
    let fixed_label = Variant::Fixed.label(params);
    let adaptive_label = Variant::Adaptive.label(params);

    let mut md = String::new();
    md.push_str("# Robustness Validation: Fixed vs Adaptive Streaming Clustering\n\n");
    md.push_str(&format!(
        "**Generated:** {}\n\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("**Run ID:** `{}`\n\n", run_id));

    md.push_str("## Summary\n\n");
    md.push_str(&format!(
        "| Dataset | λ | Horizon | Windows | Mean NMI {} | Mean NMI {} | Skipped Errors | Status |\n",
        fixed_label, adaptive_label
    ));
    md.push_str("|---------|---|---------|---------|-----|-----|----------------|--------|\n");
    for outcome in &results.outcomes {
        write_summary_row(&mut md, outcome);
    }
    md.push('\n');

    for run in results.completed().filter(|run| !run.result.is_empty()) {
        write_dataset_section(&mut md, run, &fixed_label, &adaptive_label);
    }

    md
}

fn write_summary_row(md: &mut String, outcome: &DatasetOutcome) {
    match outcome {
        DatasetOutcome::Completed(run) => {
            let status = match (run.result.completed, run.result.is_empty()) {
                (false, _) => "cancelled",
                (true, true) => "no data",
                (true, false) => "ok",
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                run.dataset.name,
                run.dataset.fading_factor,
                run.dataset.horizon,
                run.result.windows.len(),
                fmt_score(run.result.mean_score(Variant::Fixed)),
                fmt_score(run.result.mean_score(Variant::Adaptive)),
                run.result.recoverable_failures,
                status
            ));
        }
        DatasetOutcome::Skipped { dataset, .. } => {
            md.push_str(&format!("| {} | - | - | - | - | - | - | skipped |\n", dataset));
        }
        DatasetOutcome::Failed { dataset, .. } => {
            md.push_str(&format!("| {} | - | - | - | - | - | - | failed |\n", dataset));
        }
    }
}

fn write_dataset_section(md: &mut String, run: &DatasetRun, fixed: &str, adaptive: &str) {
    md.push_str(&format!(
        "## {} (λ={})\n\n",
        run.dataset.name, run.dataset.fading_factor
    ));
    md.push_str(&format!(
        "Observations: {} seen, {} scored, {} skipped.\n\n",
        run.result.observations_seen,
        run.result.observations_scored,
        run.result.recoverable_failures
    ));
    md.push_str(&format!("| Step | {} | {} |\n", fixed, adaptive));
    md.push_str("|------|-----|-----|\n");
    for w in &run.result.windows {
        md.push_str(&format!(
            "| {} | {:.3} | {:.3} |\n",
            w.cumulative_count, w.fixed_score, w.adaptive_score
        ));
    }
    md.push('\n');
}

fn fmt_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{:.3}", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BenchmarkConfig, DatasetConfig};
    use crate::orchestrator::{RunResult, WindowResult};

    #[test]
    fn test_markdown_tables() {
        let run = DatasetRun {
            dataset: DatasetConfig::new("Tweets-T", "Tweets-T", 0.01, 200, 1000),
            result: RunResult {
                windows: vec![WindowResult {
                    window_index: 0,
                    cumulative_count: 1000,
                    fixed_score: 0.4321,
                    adaptive_score: 0.6789,
                }],
                observations_seen: 1003,
                observations_scored: 1000,
                recoverable_failures: 3,
                discarded_tail: 0,
                completed: true,
            },
            elapsed_ms: 10,
        };
        let results = BatchResults {
            config: BenchmarkConfig::default(),
            outcomes: vec![
                DatasetOutcome::Completed(run),
                DatasetOutcome::Failed {
                    dataset: "NT".into(),
                    error: "boom".into(),
                },
            ],
        };

        let md = generate_markdown(Uuid::nil(), &results);
        assert!(md.contains("| 1000 | 0.432 | 0.679 |"));
        assert!(md.contains("| NT | - | - | - | - | - | - | failed |"));
        assert!(md.contains("Fixed (r=0.3)"));
        assert!(md.contains("## Tweets-T (λ=0.01)"));
    }
}
