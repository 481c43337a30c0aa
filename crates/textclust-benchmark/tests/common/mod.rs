//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::fmt;

use textclust_benchmark::{ClusterId, ClusteringPipeline, Label, Observation, PipelineError};
use textclust_stream::error::checked_sqrt;

/// Non-numeric failure used to exercise fatal propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptInput(pub String);

impl fmt::Display for CorruptInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corrupt input: {}", self.0)
    }
}

impl std::error::Error for CorruptInput {}

/// How a scripted pipeline fails on its trigger text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// `StreamError::MathDomain` from a negative variance.
    MathDomain,
    /// A foreign error whose message carries the math domain signature.
    MathDomainMessage,
    /// A non-numeric error.
    Fatal,
}

/// Pipeline that clusters by the label embedded in the text (`"<label>:<body>"`)
/// and fails on one trigger text.
#[derive(Debug, Default)]
pub struct ScriptedPipeline {
    trigger: Option<(String, Failure)>,
    /// Texts passed to `observe`, including failed ones.
    pub observed: Vec<String>,
    /// Number of successful `assign` calls.
    pub assigned: usize,
    /// Return `None` for the first `warmup` assignments.
    pub warmup: usize,
}

impl ScriptedPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(text: &str, failure: Failure) -> Self {
        Self {
            trigger: Some((text.to_string(), failure)),
            ..Default::default()
        }
    }

    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }
}

impl ClusteringPipeline for ScriptedPipeline {
    fn observe(&mut self, text: &str) -> Result<(), PipelineError> {
        self.observed.push(text.to_string());
        match &self.trigger {
            Some((trigger, failure)) if trigger == text => Err(match failure {
                Failure::MathDomain => Box::new(
                    checked_sqrt(-1.734723475976807e-18, "scripted variance").unwrap_err(),
                ),
                Failure::MathDomainMessage => "ValueError: math domain error".into(),
                Failure::Fatal => Box::new(CorruptInput(text.to_string())),
            }),
            _ => Ok(()),
        }
    }

    fn assign(&mut self, text: &str) -> Result<Option<ClusterId>, PipelineError> {
        self.assigned += 1;
        if self.assigned <= self.warmup {
            return Ok(None);
        }
        Ok(text
            .split(':')
            .next()
            .and_then(|label| label.parse::<ClusterId>().ok()))
    }
}

/// `n` observations over `labels` labels; text is `"<label>:doc-<i>"`.
pub fn labelled_stream(n: u64, labels: u64) -> Vec<Observation> {
    (0..n)
        .map(|i| {
            let label = i % labels;
            Observation::new(i, format!("{label}:doc-{i}"), Label::Int(label as i64))
        })
        .collect()
}

/// Replace the text of observation `index` with `text`, keeping its label.
pub fn with_text_at(mut stream: Vec<Observation>, index: usize, text: &str) -> Vec<Observation> {
    stream[index].text = text.to_string();
    stream
}

/// Metric reporting the window length, asserting alignment.
pub fn window_length(truth: &[Label], predicted: &[textclust_benchmark::Assignment]) -> f64 {
    assert_eq!(truth.len(), predicted.len(), "misaligned window");
    truth.len() as f64
}
