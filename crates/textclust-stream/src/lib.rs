//! Streaming text clustering for online benchmark runs.
//!
//! This crate provides the stateful model that a benchmark replays a text
//! stream through, one observation at a time:
//!
//! - [`tfidf`]: Incremental TF-IDF vectorizer over a growing document count
//! - [`textclust`]: Micro/macro clustering with exponential fading and an
//!   optional self-adjusting merge threshold (`auto_r`)
//! - [`pipeline`]: The composed `TfIdf -> TextClust` pipeline
//! - [`error`]: Error types and result aliases
//!
//! # Example
//!
//! ```
//! use textclust_stream::{PipelineConfig, TextPipeline};
//!
//! let mut pipeline = TextPipeline::new(PipelineConfig::fixed(0.01, 2, 0.3)).unwrap();
//! pipeline.learn_one("rust borrow checker").unwrap();
//! pipeline.learn_one("rust lifetimes and borrowing").unwrap();
//! assert!(pipeline.predict_one("rust borrow checker").is_some());
//! ```

pub mod error;
pub mod pipeline;
pub mod textclust;
pub mod tfidf;

pub use error::{StreamError, StreamResult};
pub use pipeline::{PipelineConfig, TextPipeline};
pub use textclust::{ClusterId, TextClust, TextClustConfig};
pub use tfidf::{SparseVector, TfIdf};
