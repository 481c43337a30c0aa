//! Pipeline capability boundary.
//!
//! The orchestrator only sees a stateful object that can observe a text and
//! assign it to a cluster. Any two implementations can be compared; the
//! benchmark pairs a fixed-threshold and an adaptive [`TextPipeline`].

use serde::{Deserialize, Serialize};
use textclust_stream::{PipelineConfig, TextPipeline};

use crate::config::{DatasetConfig, PipelineParams};
use crate::error::BenchmarkResult;

pub use textclust_stream::ClusterId;

/// Error raised by a pipeline. Classified by the error isolation policy.
pub type PipelineError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A stateful streaming clustering model.
pub trait ClusteringPipeline {
    /// Update internal state with one observation.
    fn observe(&mut self, text: &str) -> Result<(), PipelineError>;

    /// Assign a cluster; `None` means no assignment yet (e.g. warm-up).
    fn assign(&mut self, text: &str) -> Result<Option<ClusterId>, PipelineError>;
}

impl ClusteringPipeline for TextPipeline {
    fn observe(&mut self, text: &str) -> Result<(), PipelineError> {
        Ok(self.learn_one(text)?)
    }

    fn assign(&mut self, text: &str) -> Result<Option<ClusterId>, PipelineError> {
        Ok(self.predict_one(text))
    }
}

impl<P: ClusteringPipeline + ?Sized> ClusteringPipeline for Box<P> {
    fn observe(&mut self, text: &str) -> Result<(), PipelineError> {
        (**self).observe(text)
    }

    fn assign(&mut self, text: &str) -> Result<Option<ClusterId>, PipelineError> {
        (**self).assign(text)
    }
}

/// The two configurations under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Fixed merge radius.
    Fixed,
    /// Self-adjusting merge threshold.
    Adaptive,
}

impl Variant {
    /// Human-readable label including the governing parameter.
    pub fn label(self, params: &PipelineParams) -> String {
        match self {
            Variant::Fixed => format!("Fixed (r={})", params.radius),
            Variant::Adaptive => format!("Adaptive (σ={})", params.sigma),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Fixed => write!(f, "fixed"),
            Variant::Adaptive => write!(f, "adaptive"),
        }
    }
}

/// Build the [`TextPipeline`] for one variant of a dataset.
pub fn build_variant(
    variant: Variant,
    dataset: &DatasetConfig,
    params: &PipelineParams,
) -> BenchmarkResult<TextPipeline> {
    let config = match variant {
        Variant::Fixed => PipelineConfig::fixed(dataset.fading_factor, dataset.tgap, params.radius),
        Variant::Adaptive => PipelineConfig::adaptive(
            dataset.fading_factor,
            dataset.tgap,
            params.radius,
            params.sigma,
        ),
    };
    Ok(TextPipeline::new(config.with_ngram_max(params.ngram_max))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_variants() {
        let dataset = DatasetConfig::new("test", "test.jsonl", 0.01, 20, 100);
        let params = PipelineParams::default();

        let fixed = build_variant(Variant::Fixed, &dataset, &params).unwrap();
        let adaptive = build_variant(Variant::Adaptive, &dataset, &params).unwrap();
        assert!(!fixed.model().config().auto_r);
        assert!(adaptive.model().config().auto_r);
        assert_eq!(adaptive.model().config().tgap, 20);
    }

    #[test]
    fn test_variant_labels() {
        let params = PipelineParams::default();
        assert_eq!(Variant::Fixed.label(&params), "Fixed (r=0.3)");
        assert_eq!(Variant::Adaptive.label(&params), "Adaptive (σ=0.5)");
        assert_eq!(Variant::Adaptive.to_string(), "adaptive");
    }

    #[test]
    fn test_text_pipeline_through_trait() {
        let dataset = DatasetConfig::new("test", "test.jsonl", 0.01, 2, 100);
        let mut p = build_variant(Variant::Fixed, &dataset, &PipelineParams::default()).unwrap();
        p.observe("stream clustering benchmark").unwrap();
        p.observe("stream clustering benchmark").unwrap();
        assert!(p.assign("stream clustering benchmark").unwrap().is_some());
    }

    #[test]
    fn test_invalid_dataset_params_rejected() {
        let dataset = DatasetConfig::new("bad", "bad.jsonl", 0.01, 0, 100);
        assert!(build_variant(Variant::Fixed, &dataset, &PipelineParams::default()).is_err());
    }
}
