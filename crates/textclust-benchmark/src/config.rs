//! Benchmark configuration: dataset catalog, pipeline parameters, and limits.
//!
//! # Dataset Catalog
//!
//! | Dataset | Fading (λ) | tgap | Horizon |
//! |---------|-----------|------|---------|
//! | Tweets-T | 0.01 | 200 | 1,000 |
//! | News-T | 0.001 | 200 | 1,000 |
//! | NT | 0.005 | 200 | 2,000 |
//! | NTS | 0.005 | 200 | 2,000 |
//! | Trends-T | 0.01 | 200 | 5,000 |
//! | SO-T | 0.001 | 200 | 5,000 |

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BenchmarkError, BenchmarkResult};

/// Per-dataset configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset name used in logs and reports.
    pub name: String,
    /// File name under the datasets directory (`.json` is tried as a fallback).
    pub filename: String,
    /// Forgetting rate of both pipelines.
    pub fading_factor: f64,
    /// Reclustering interval of both pipelines.
    pub tgap: u64,
    /// Evaluation window size (successfully scored observations).
    pub horizon: usize,
}

impl DatasetConfig {
    /// Create a dataset entry.
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
        fading_factor: f64,
        tgap: u64,
        horizon: usize,
    ) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            fading_factor,
            tgap,
            horizon,
        }
    }

    /// Built-in catalog of labelled short-text streams.
    pub fn catalog() -> Vec<DatasetConfig> {
        vec![
            Self::new("Tweets-T", "Tweets-T", 0.01, 200, 1000),
            Self::new("News-T", "News-T", 0.001, 200, 1000),
            Self::new("NT", "NT", 0.005, 200, 2000),
            Self::new("NTS", "NTS", 0.005, 200, 2000),
            Self::new("Trends-T", "Trends-T", 0.01, 200, 5000),
            Self::new("SO-T", "SO-T", 0.001, 200, 5000),
        ]
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> BenchmarkResult<()> {
        if self.horizon == 0 {
            return Err(invalid(&self.name, "horizon", "must be a positive integer"));
        }
        if self.tgap == 0 {
            return Err(invalid(&self.name, "tgap", "must be a positive integer"));
        }
        if !(self.fading_factor > 0.0 && self.fading_factor.is_finite()) {
            return Err(invalid(&self.name, "fading_factor", "must be a positive number"));
        }
        Ok(())
    }
}

/// Parameters shared by both pipeline variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Merge radius of the fixed variant.
    pub radius: f64,
    /// Standard deviations below the mean for the adaptive threshold.
    pub sigma: f64,
    /// Largest n-gram size of the vectorizer.
    pub ngram_max: usize,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            radius: 0.3,
            sigma: 0.5,
            ngram_max: 1,
        }
    }
}

/// Main benchmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Directory holding the dataset files.
    pub datasets_dir: PathBuf,
    /// Datasets to run, in order.
    pub datasets: Vec<DatasetConfig>,
    /// Shared pipeline parameters.
    pub pipeline: PipelineParams,
    /// Recoverable failures logged individually per run; the rest are only counted.
    pub failure_log_cap: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            datasets_dir: PathBuf::from("datasets"),
            datasets: DatasetConfig::catalog(),
            pipeline: PipelineParams::default(),
            failure_log_cap: 5,
        }
    }
}

impl BenchmarkConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> BenchmarkResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BenchmarkError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_reader(file).map_err(|e| BenchmarkError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every dataset and the shared parameters.
    pub fn validate(&self) -> BenchmarkResult<()> {
        for dataset in &self.datasets {
            dataset.validate()?;
        }
        if !(self.pipeline.radius > 0.0 && self.pipeline.radius <= 2.0) {
            return Err(invalid("pipeline", "radius", "must be in (0, 2]"));
        }
        if !(self.pipeline.sigma >= 0.0 && self.pipeline.sigma.is_finite()) {
            return Err(invalid("pipeline", "sigma", "must be non-negative"));
        }
        if self.pipeline.ngram_max == 0 {
            return Err(invalid("pipeline", "ngram_max", "must be at least 1"));
        }
        Ok(())
    }

    /// Keep only the named datasets (case-insensitive). Empty `names` keeps all.
    pub fn select(mut self, names: &[String]) -> BenchmarkResult<Self> {
        if names.is_empty() {
            return Ok(self);
        }
        for name in names {
            if !self.datasets.iter().any(|d| d.name.eq_ignore_ascii_case(name)) {
                return Err(invalid(name, "dataset", "not in the configured catalog"));
            }
        }
        self.datasets
            .retain(|d| names.iter().any(|n| d.name.eq_ignore_ascii_case(n)));
        Ok(self)
    }

    /// Override the evaluation horizon of every dataset.
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        for dataset in &mut self.datasets {
            dataset.horizon = horizon;
        }
        self
    }
}

fn invalid(scope: &str, field: &str, reason: &str) -> BenchmarkError {
    BenchmarkError::InvalidConfig {
        field: format!("{scope}.{field}"),
        reason: reason.to_string(),
    }
}
