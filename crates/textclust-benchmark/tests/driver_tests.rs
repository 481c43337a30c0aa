//! Batch driver tests over on-disk datasets.

mod common;

use std::fs;
use std::path::Path;

use common::{labelled_stream, with_text_at, Failure, ScriptedPipeline};
use tempfile::TempDir;
use textclust_benchmark::reports::json::JsonReport;
use textclust_benchmark::synthetic::write_jsonl;
use textclust_benchmark::{
    BatchDriver, BatchReport, BenchmarkConfig, DatasetConfig, DatasetOutcome, ReportFormat,
    SyntheticStream, SyntheticStreamConfig,
};

fn config_for(dir: &Path, datasets: Vec<DatasetConfig>) -> BenchmarkConfig {
    BenchmarkConfig {
        datasets_dir: dir.to_path_buf(),
        datasets,
        ..Default::default()
    }
}

fn write_lines(path: &Path, lines: &[&str]) {
    fs::write(path, lines.join("\n")).unwrap();
}

#[test]
fn test_malformed_lines_are_dropped() {
    let dir = TempDir::new().unwrap();
    let mut lines = Vec::new();
    let records: Vec<String> = (0..12)
        .map(|i| {
            format!(
                r#"{{"textCleaned": "topic{} words about item {}", "clusterNo": {}}}"#,
                i % 2,
                i,
                i % 2
            )
        })
        .collect();
    for (i, record) in records.iter().enumerate() {
        lines.push(record.as_str());
        if i == 3 {
            lines.push("{not json");
            lines.push(r#"{"textCleaned": "no label here"}"#);
            lines.push("");
        }
    }
    write_lines(&dir.path().join("Tweets-T.jsonl"), &lines);

    let config = config_for(
        dir.path(),
        vec![DatasetConfig::new("Tweets-T", "Tweets-T.jsonl", 0.01, 50, 5)],
    );
    let results = BatchDriver::new(config).unwrap().run_all();

    let run = results.outcomes[0].as_completed().expect("dataset should complete");
    assert_eq!(run.result.observations_seen, 12);
    assert_eq!(
        run.result.observations_scored + run.result.recoverable_failures as u64,
        12
    );
    assert_eq!(
        run.result.windows.len() as u64,
        run.result.observations_scored / 5
    );
}

#[test]
fn test_json_extension_fallback() {
    let dir = TempDir::new().unwrap();
    let stream = SyntheticStream::new(SyntheticStreamConfig::default(), 40);
    write_jsonl(dir.path().join("News-T.json"), stream).unwrap();

    let config = config_for(
        dir.path(),
        vec![DatasetConfig::new("News-T", "News-T", 0.005, 50, 10)],
    );
    let results = BatchDriver::new(config).unwrap().run_all();

    assert!(matches!(results.outcomes[0], DatasetOutcome::Completed(_)));
    let run = results.outcomes[0].as_completed().unwrap();
    assert_eq!(run.result.observations_seen, 40);
}

#[test]
fn test_missing_dataset_skipped_and_batch_continues() {
    let dir = TempDir::new().unwrap();
    write_jsonl(
        dir.path().join("present.jsonl"),
        SyntheticStream::new(SyntheticStreamConfig::default(), 20),
    )
    .unwrap();

    let config = config_for(
        dir.path(),
        vec![
            DatasetConfig::new("Missing", "missing.jsonl", 0.01, 50, 10),
            DatasetConfig::new("Present", "present.jsonl", 0.01, 50, 10),
        ],
    );
    let results = BatchDriver::new(config).unwrap().run_all();

    assert_eq!(results.outcomes.len(), 2);
    assert!(matches!(
        &results.outcomes[0],
        DatasetOutcome::Skipped { dataset, .. } if dataset == "Missing"
    ));
    assert!(matches!(results.outcomes[1], DatasetOutcome::Completed(_)));
    assert_eq!(results.completed().count(), 1);
    assert!(results.summary().contains("Missing: skipped"));
}

#[test]
fn test_fatal_failure_ends_only_that_dataset() {
    let dir = TempDir::new().unwrap();
    let broken = DatasetConfig::new("Broken", "broken.jsonl", 0.01, 50, 4);
    let healthy = DatasetConfig::new("Healthy", "healthy.jsonl", 0.01, 50, 10);
    let driver = BatchDriver::new(config_for(
        dir.path(),
        vec![broken.clone(), healthy.clone()],
    ))
    .unwrap();

    let first = driver.run_with_pipelines(
        &broken,
        ScriptedPipeline::failing_on("corrupt", Failure::Fatal),
        ScriptedPipeline::new(),
        with_text_at(labelled_stream(10, 2), 2, "corrupt"),
    );
    let second = driver.run_stream(
        &healthy,
        SyntheticStream::new(SyntheticStreamConfig::default(), 30),
    );

    match first {
        DatasetOutcome::Failed { dataset, error } => {
            assert_eq!(dataset, "Broken");
            assert_eq!(
                error,
                "fixed pipeline failed at record 2: corrupt input: corrupt"
            );
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(matches!(second, DatasetOutcome::Completed(_)));
}

#[test]
fn test_recoverable_failures_reported_per_dataset() {
    let dir = TempDir::new().unwrap();
    let dataset = DatasetConfig::new("Flaky", "flaky.jsonl", 0.01, 50, 3);
    let driver = BatchDriver::new(config_for(dir.path(), vec![dataset.clone()])).unwrap();

    let outcome = driver.run_with_pipelines(
        &dataset,
        ScriptedPipeline::new(),
        ScriptedPipeline::failing_on("fail-math", Failure::MathDomain),
        with_text_at(labelled_stream(10, 2), 4, "fail-math"),
    );

    let run = outcome.as_completed().unwrap();
    assert_eq!(run.result.recoverable_failures, 1);
    assert_eq!(run.result.windows.len(), 3);
}

#[test]
fn test_report_written_for_mixed_batch() {
    let dir = TempDir::new().unwrap();
    write_jsonl(
        dir.path().join("present.jsonl"),
        SyntheticStream::new(SyntheticStreamConfig::default(), 30),
    )
    .unwrap();
    let config = config_for(
        dir.path(),
        vec![
            DatasetConfig::new("Present", "present.jsonl", 0.01, 50, 10),
            DatasetConfig::new("Missing", "missing.jsonl", 0.01, 50, 10),
        ],
    );
    let report = BatchReport::new(BatchDriver::new(config).unwrap().run_all());

    let base = dir.path().join("report");
    report.write_to_file(ReportFormat::Both, &base).unwrap();

    let json = fs::read_to_string(base.with_extension("json")).unwrap();
    let parsed: JsonReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.metadata.run_id, report.run_id());
    assert_eq!(parsed.datasets.len(), 1);
    assert_eq!(parsed.datasets[0].name, "Present");
    assert_eq!(parsed.skipped.len(), 1);
    assert!(parsed.failed.is_empty());

    let markdown = fs::read_to_string(base.with_extension("md")).unwrap();
    assert!(markdown.contains("Present"));
    assert!(markdown.contains("| Step |"));
}
