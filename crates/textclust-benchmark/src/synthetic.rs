//! Synthetic labelled text streams.
//!
//! Each topic owns a private vocabulary; texts mix topic words with a shared
//! filler vocabulary. Streams are fully determined by the seed.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde_json::json;

use crate::error::{BenchmarkError, BenchmarkResult};
use crate::source::{Label, Observation};

/// Words shared by every topic.
const FILLER: &[&str] = &[
    "the", "and", "with", "from", "about", "this", "that", "today", "new", "just",
];

/// Syllables used to build topic words.
const SYLLABLES: &[&str] = &[
    "ka", "lo", "mi", "ne", "ru", "sa", "ti", "vo", "xe", "zu", "bra", "dri", "flo", "gre",
];

/// Order in which topics are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicOrdering {
    /// Topic `i % topics` for the i-th text.
    RoundRobin,
    /// Uniformly random topic per text.
    Random,
}

/// Configuration for synthetic stream generation.
#[derive(Debug, Clone)]
pub struct SyntheticStreamConfig {
    /// Random seed.
    pub seed: u64,
    /// Number of distinct true labels.
    pub topics: usize,
    /// Private words per topic.
    pub vocabulary_per_topic: usize,
    /// Words per generated text.
    pub words_per_text: usize,
    /// Probability that a word is drawn from the filler vocabulary.
    pub filler_ratio: f64,
    /// Topic order.
    pub ordering: TopicOrdering,
}

impl Default for SyntheticStreamConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            topics: 3,
            vocabulary_per_topic: 20,
            words_per_text: 8,
            filler_ratio: 0.2,
            ordering: TopicOrdering::Random,
        }
    }
}

/// Iterator producing `limit` synthetic observations.
pub struct SyntheticStream {
    config: SyntheticStreamConfig,
    rng: ChaCha8Rng,
    vocabularies: Vec<Vec<String>>,
    emitted: u64,
    limit: u64,
}

impl SyntheticStream {
    /// Create a stream of `limit` observations.
    pub fn new(config: SyntheticStreamConfig, limit: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let vocabularies = (0..config.topics.max(1))
            .map(|topic| topic_vocabulary(&mut rng, topic, config.vocabulary_per_topic.max(1)))
            .collect();
        Self {
            config,
            rng,
            vocabularies,
            emitted: 0,
            limit,
        }
    }

    /// Private vocabulary of a topic.
    pub fn vocabulary(&self, topic: usize) -> Option<&[String]> {
        self.vocabularies.get(topic).map(Vec::as_slice)
    }

    fn next_topic(&mut self) -> usize {
        let topics = self.vocabularies.len();
        match self.config.ordering {
            TopicOrdering::RoundRobin => (self.emitted % topics as u64) as usize,
            TopicOrdering::Random => self.rng.gen_range(0..topics),
        }
    }

    fn text_for(&mut self, topic: usize) -> String {
        let mut words = Vec::with_capacity(self.config.words_per_text);
        for _ in 0..self.config.words_per_text.max(1) {
            let word = if self.rng.gen_bool(self.config.filler_ratio.clamp(0.0, 1.0)) {
                FILLER[self.rng.gen_range(0..FILLER.len())].to_string()
            } else {
                let vocab = &self.vocabularies[topic];
                vocab[self.rng.gen_range(0..vocab.len())].clone()
            };
            words.push(word);
        }
        words.join(" ")
    }
}

impl Iterator for SyntheticStream {
    type Item = Observation;

    fn next(&mut self) -> Option<Observation> {
        if self.emitted >= self.limit {
            return None;
        }
        let topic = self.next_topic();
        let text = self.text_for(topic);
        let observation = Observation::new(self.emitted, text, Label::Int(topic as i64));
        self.emitted += 1;
        Some(observation)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.limit - self.emitted) as usize;
        (remaining, Some(remaining))
    }
}

/// Build a topic's private words. The `{topic}q{index}` suffix keeps vocabularies disjoint.
fn topic_vocabulary(rng: &mut ChaCha8Rng, topic: usize, size: usize) -> Vec<String> {
    (0..size)
        .map(|i| {
            let a = SYLLABLES.choose(rng).copied().unwrap_or("ka");
            let b = SYLLABLES.choose(rng).copied().unwrap_or("lo");
            format!("{a}{b}{topic}q{i}")
        })
        .collect()
}

/// Write observations as JSONL records with `text` and `label` fields.
pub fn write_jsonl<P, I>(path: P, observations: I) -> BenchmarkResult<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = Observation>,
{
    let path = path.as_ref();
    let io_err = |e| BenchmarkError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    for observation in observations {
        let record = json!({ "text": observation.text, "label": observation.label });
        writeln!(writer, "{}", record).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)
}
