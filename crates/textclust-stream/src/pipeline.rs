//! Composed `TfIdf -> TextClust` pipeline.

use serde::{Deserialize, Serialize};

use crate::error::StreamResult;
use crate::textclust::{ClusterId, TextClust, TextClustConfig};
use crate::tfidf::TfIdf;

/// Configuration for a [`TextPipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Inclusive n-gram range for the vectorizer.
    pub ngram_range: (usize, usize),
    /// Clustering model parameters.
    pub clustering: TextClustConfig,
}

impl PipelineConfig {
    /// Fixed-threshold variant: merges within `radius`.
    pub fn fixed(fading_factor: f64, tgap: u64, radius: f64) -> Self {
        Self {
            ngram_range: (1, 1),
            clustering: TextClustConfig {
                radius,
                fading_factor,
                tgap,
                auto_r: false,
                ..Default::default()
            },
        }
    }

    /// Self-adjusting variant: threshold is `mean - sigma * std` of distances.
    pub fn adaptive(fading_factor: f64, tgap: u64, radius: f64, sigma: f64) -> Self {
        Self {
            ngram_range: (1, 1),
            clustering: TextClustConfig {
                radius,
                fading_factor,
                tgap,
                auto_r: true,
                sigma,
                ..Default::default()
            },
        }
    }

    /// Use n-grams up to `max` (inclusive).
    pub fn with_ngram_max(mut self, max: usize) -> Self {
        self.ngram_range = (1, max.max(1));
        self
    }
}

/// Stateful text clustering pipeline.
#[derive(Debug, Clone)]
pub struct TextPipeline {
    vectorizer: TfIdf,
    model: TextClust,
}

impl TextPipeline {
    /// Build a pipeline from a validated config.
    pub fn new(config: PipelineConfig) -> StreamResult<Self> {
        Ok(Self {
            vectorizer: TfIdf::with_ngram_range(config.ngram_range),
            model: TextClust::new(config.clustering)?,
        })
    }

    /// Update the vectorizer, then train the model on the transformed text.
    pub fn learn_one(&mut self, text: &str) -> StreamResult<()> {
        self.vectorizer.learn_one(text);
        let x = self.vectorizer.transform_one(text);
        self.model.learn_one(&x)
    }

    /// Predict the macro cluster for a text.
    pub fn predict_one(&self, text: &str) -> Option<ClusterId> {
        let x = self.vectorizer.transform_one(text);
        self.model.predict_one(&x)
    }

    /// The underlying clustering model.
    pub fn model(&self) -> &TextClust {
        &self.model
    }

    /// The underlying vectorizer.
    pub fn vectorizer(&self) -> &TfIdf {
        &self.vectorizer
    }
}
