//! Incremental TF-IDF vectorizer.
//!
//! Document frequencies grow with every learned text, so the same text maps to
//! different weights as the stream progresses. Vectors are L2-normalised.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Sparse term-weight vector, ordered by term for deterministic iteration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    weights: BTreeMap<String, f64>,
}

impl SparseVector {
    /// Create an empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-zero terms.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the vector has no terms.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weight of a term (0.0 if absent).
    pub fn get(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    /// Iterate over `(term, weight)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, &w)| (t.as_str(), w))
    }

    /// Add `weight` to a term.
    pub fn add(&mut self, term: &str, weight: f64) {
        *self.weights.entry(term.to_string()).or_insert(0.0) += weight;
    }

    /// Add every term of `other` into `self`.
    pub fn accumulate(&mut self, other: &SparseVector) {
        for (term, weight) in other.iter() {
            self.add(term, weight);
        }
    }

    /// Multiply every weight by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for weight in self.weights.values_mut() {
            *weight *= factor;
        }
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    /// Dot product, iterating over the smaller operand.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .weights
            .iter()
            .filter_map(|(term, w)| large.weights.get(term).map(|v| w * v))
            .sum()
    }

    /// Cosine distance in `[0, 2]`.
    ///
    /// Returns 1.0 if either vector has zero norm.
    pub fn cosine_distance(&self, other: &SparseVector) -> f64 {
        let norm_a = self.norm();
        let norm_b = other.norm();
        if norm_a < f64::EPSILON || norm_b < f64::EPSILON {
            return 1.0;
        }
        (1.0 - self.dot(other) / (norm_a * norm_b)).clamp(0.0, 2.0)
    }
}

impl FromIterator<(String, f64)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut v = SparseVector::new();
        for (term, weight) in iter {
            v.add(&term, weight);
        }
        v
    }
}

/// Incremental TF-IDF vectorizer.
#[derive(Debug, Clone)]
pub struct TfIdf {
    /// Inclusive n-gram range `(min, max)`.
    ngram_range: (usize, usize),
    /// Number of documents learned so far.
    document_count: u64,
    /// Number of learned documents containing each term.
    document_frequencies: HashMap<String, u64>,
}

impl TfIdf {
    /// Create a unigram vectorizer.
    pub fn new() -> Self {
        Self::with_ngram_range((1, 1))
    }

    /// Create a vectorizer producing n-grams in `range` (inclusive).
    pub fn with_ngram_range(range: (usize, usize)) -> Self {
        let min = range.0.max(1);
        Self {
            ngram_range: (min, range.1.max(min)),
            document_count: 0,
            document_frequencies: HashMap::new(),
        }
    }

    /// Number of documents learned so far.
    pub fn document_count(&self) -> u64 {
        self.document_count
    }

    /// Number of distinct terms seen so far.
    pub fn vocabulary_size(&self) -> usize {
        self.document_frequencies.len()
    }

    /// Update document frequencies with one text.
    pub fn learn_one(&mut self, text: &str) {
        let terms: HashSet<String> = self.terms(text).into_iter().collect();
        for term in terms {
            *self.document_frequencies.entry(term).or_insert(0) += 1;
        }
        self.document_count += 1;
    }

    /// Map a text to its normalised TF-IDF vector.
    pub fn transform_one(&self, text: &str) -> SparseVector {
        let mut tf: HashMap<String, f64> = HashMap::new();
        for term in self.terms(text) {
            *tf.entry(term).or_insert(0.0) += 1.0;
        }

        let n = self.document_count as f64;
        let mut vector: SparseVector = tf
            .into_iter()
            .map(|(term, count)| {
                let df = self.document_frequencies.get(&term).copied().unwrap_or(0) as f64;
                let idf = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
                (term, count * idf)
            })
            .collect();

        let norm = vector.norm();
        if norm > f64::EPSILON {
            vector.scale(1.0 / norm);
        }
        vector
    }

    /// Tokenize and expand into the configured n-grams.
    fn terms(&self, text: &str) -> Vec<String> {
        let tokens = tokenize(text);
        let (min, max) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min..=max {
            if n == 1 {
                terms.extend(tokens.iter().cloned());
            } else {
                terms.extend(tokens.windows(n).map(|w| w.join(" ")));
            }
        }
        terms
    }
}

impl Default for TfIdf {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase, split on non-alphanumerics, keep tokens of two or more chars.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}
