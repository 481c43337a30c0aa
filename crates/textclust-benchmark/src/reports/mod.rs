//! Report generation for batch results.
//!
//! Supports JSON for automated analysis and Markdown for documentation.

pub mod json;
pub mod markdown;

use std::path::Path;

use uuid::Uuid;

use crate::driver::BatchResults;
use crate::error::{BenchmarkError, BenchmarkResult};

/// Report format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Structured JSON.
    Json,
    /// Markdown tables.
    Markdown,
    /// Both formats.
    Both,
}

/// Report generator over one batch.
pub struct BatchReport {
    run_id: Uuid,
    results: BatchResults,
}

impl BatchReport {
    /// Create a report with a fresh run id.
    pub fn new(results: BatchResults) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            results,
        }
    }

    /// Run id stamped on every output.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Generate report in specified format.
    pub fn generate(&self, format: ReportFormat) -> ReportOutput {
        let json = matches!(format, ReportFormat::Json | ReportFormat::Both)
            .then(|| json::generate_json(self.run_id, &self.results));
        let markdown = matches!(format, ReportFormat::Markdown | ReportFormat::Both)
            .then(|| markdown::generate_markdown(self.run_id, &self.results));
        ReportOutput { json, markdown }
    }

    /// Write report to `base_path` with a `.json` and/or `.md` extension.
    pub fn write_to_file(&self, format: ReportFormat, base_path: &Path) -> BenchmarkResult<()> {
        let output = self.generate(format);

        if let Some(json_content) = output.json {
            write(&base_path.with_extension("json"), &json_content)?;
        }
        if let Some(md_content) = output.markdown {
            write(&base_path.with_extension("md"), &md_content)?;
        }
        Ok(())
    }
}

/// Generated report output.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    /// JSON report content (if generated).
    pub json: Option<String>,
    /// Markdown report content (if generated).
    pub markdown: Option<String>,
}

fn write(path: &Path, content: &str) -> BenchmarkResult<()> {
    std::fs::write(path, content).map_err(|e| BenchmarkError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
