//! Robustness benchmark CLI.
//!
//! Runs every configured dataset through the fixed and adaptive pipelines and
//! reports windowed NMI per dataset.
//!
//! Usage:
//!   textclust-bench [OPTIONS]
//!
//! Options:
//!   --config <PATH>          JSON configuration (defaults to the built-in catalog)
//!   --datasets-dir <PATH>    Directory holding the dataset files
//!   --dataset <NAME>         Run only this dataset (repeatable)
//!   --horizon <N>            Override the evaluation window of every dataset
//!   --synthetic <N>          Run a generated stream of N records instead of files
//!   --format <FMT>           json | markdown | both
//!   --output <PATH>          Base path for the report (extension is added)

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use textclust_benchmark::config::{BenchmarkConfig, DatasetConfig};
use textclust_benchmark::driver::{BatchDriver, BatchResults};
use textclust_benchmark::reports::{BatchReport, ReportFormat};
use textclust_benchmark::synthetic::{SyntheticStream, SyntheticStreamConfig};

#[derive(Parser, Debug)]
#[command(name = "textclust-bench")]
#[command(about = "Windowed NMI robustness benchmark: fixed vs adaptive streaming text clustering")]
struct Args {
    /// JSON configuration file. Missing fields take built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the dataset files.
    #[arg(long)]
    datasets_dir: Option<PathBuf>,

    /// Run only these datasets (case-insensitive, repeatable).
    #[arg(long = "dataset")]
    datasets: Vec<String>,

    /// Override the evaluation horizon of every dataset.
    #[arg(long)]
    horizon: Option<usize>,

    /// Numeric failures logged individually per dataset.
    #[arg(long)]
    failure_log_cap: Option<usize>,

    /// Run a generated stream with this many records instead of dataset files.
    #[arg(long)]
    synthetic: Option<u64>,

    /// Number of topics in the generated stream.
    #[arg(long, default_value_t = 3)]
    synthetic_topics: usize,

    /// Seed for the generated stream.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
    format: ReportFormat,

    /// Base path for the report; printed to stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&args)?;
    let driver = BatchDriver::new(config).context("invalid benchmark configuration")?;

    let results = match args.synthetic {
        Some(records) => run_synthetic(&driver, &args, records),
        None => driver.run_all(),
    };

    println!("{}", results.summary());

    let report = BatchReport::new(results);
    match &args.output {
        Some(path) => {
            report
                .write_to_file(args.format, path)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!(run_id = %report.run_id(), path = %path.display(), "Report written");
        }
        None => {
            let output = report.generate(args.format);
            if let Some(json) = output.json {
                println!("{}", json);
            }
            if let Some(md) = output.markdown {
                println!("{}", md);
            }
        }
    }

    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<BenchmarkConfig> {
    let mut config = match &args.config {
        Some(path) => BenchmarkConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BenchmarkConfig::default(),
    };

    if let Some(dir) = &args.datasets_dir {
        config.datasets_dir = dir.clone();
    }
    if let Some(cap) = args.failure_log_cap {
        config.failure_log_cap = cap;
    }
    if args.synthetic.is_none() {
        config = config.select(&args.datasets)?;
    }
    if let Some(horizon) = args.horizon {
        config = config.with_horizon(horizon);
    }
    Ok(config)
}

fn run_synthetic(driver: &BatchDriver, args: &Args, records: u64) -> BatchResults {
    let template = driver.config().datasets.first().cloned();
    let dataset = DatasetConfig {
        name: "synthetic".to_string(),
        filename: String::new(),
        horizon: args
            .horizon
            .or(template.as_ref().map(|d| d.horizon))
            .unwrap_or(1000),
        ..template.unwrap_or_else(|| DatasetConfig::new("synthetic", "", 0.01, 200, 1000))
    };

    let stream = SyntheticStream::new(
        SyntheticStreamConfig {
            seed: args.seed,
            topics: args.synthetic_topics,
            ..Default::default()
        },
        records,
    );

    let outcome = driver.run_stream(&dataset, stream);
    BatchResults {
        config: driver.config().clone(),
        outcomes: vec![outcome],
    }
}
