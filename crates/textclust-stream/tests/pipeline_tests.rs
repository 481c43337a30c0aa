//! Integration tests for the composed streaming pipeline.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use textclust_stream::{PipelineConfig, StreamError, TextPipeline};

const TOPICS: [&[&str]; 3] = [
    &["kernel", "scheduler", "mutex", "thread", "syscall", "driver", "memory", "paging"],
    &["striker", "goal", "referee", "league", "penalty", "keeper", "match", "stadium"],
    &["flour", "oven", "dough", "yeast", "butter", "sugar", "whisk", "pastry"],
];

fn sample_text(rng: &mut ChaCha8Rng, topic: usize) -> String {
    TOPICS[topic]
        .choose_multiple(rng, 5)
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Disjoint topic vocabularies can never be single-linked together.
#[test]
fn test_disjoint_topics_get_distinct_macro_clusters() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut pipeline = TextPipeline::new(PipelineConfig::fixed(0.001, 50, 0.3)).unwrap();

    for i in 0..300 {
        let text = sample_text(&mut rng, i % 3);
        pipeline.learn_one(&text).unwrap();
    }

    let predictions: Vec<u64> = TOPICS
        .iter()
        .map(|vocab| pipeline.predict_one(&vocab.join(" ")).unwrap())
        .collect();

    assert_ne!(predictions[0], predictions[1]);
    assert_ne!(predictions[1], predictions[2]);
    assert_ne!(predictions[0], predictions[2]);
}

/// The adaptive variant either learns or reports a math domain failure; nothing else.
#[test]
fn test_adaptive_failures_are_math_domain_only() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut pipeline =
        TextPipeline::new(PipelineConfig::adaptive(0.01, 50, 0.3, 0.5)).unwrap();

    for i in 0..300 {
        let text = sample_text(&mut rng, i % 3);
        if let Err(err) = pipeline.learn_one(&text) {
            assert!(matches!(err, StreamError::MathDomain { .. }));
            assert!(err.to_string().contains("math domain error"));
        }
    }
    assert_eq!(pipeline.model().time(), 300);
}

#[test]
fn test_invalid_fading_factor_rejected() {
    let result = TextPipeline::new(PipelineConfig::fixed(0.0, 200, 0.3));
    assert!(matches!(
        result,
        Err(StreamError::InvalidParameter { name: "fading_factor", .. })
    ));
}
