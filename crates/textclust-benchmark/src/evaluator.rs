//! Windowed metric evaluation for the two pipeline variants.
//!
//! One aligned triple `(true label, fixed prediction, adaptive prediction)` is
//! appended per successfully processed observation. A flush scores both
//! prediction buffers against the same true-label buffer and clears all three.

use serde::{Deserialize, Serialize};

use crate::metrics::normalized_mutual_info;
use crate::pipeline::{ClusterId, Variant};
use crate::source::Label;

/// A prediction normalized for scoring.
///
/// `Unassigned` stands in for "no prediction yet" and is distinct from every
/// real cluster id, so those observations form their own group instead of
/// being dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Assignment {
    /// The pipeline had no cluster for the observation.
    Unassigned,
    /// A real cluster id.
    Cluster(ClusterId),
}

impl From<Option<ClusterId>> for Assignment {
    fn from(prediction: Option<ClusterId>) -> Self {
        prediction.map_or(Assignment::Unassigned, Assignment::Cluster)
    }
}

/// Normalize a prediction sequence, preserving positions.
pub fn normalize_predictions(predictions: &[Option<ClusterId>]) -> Vec<Assignment> {
    predictions.iter().copied().map(Assignment::from).collect()
}

/// Agreement metric applied at each flush.
pub type MetricFn = fn(&[Label], &[Assignment]) -> f64;

/// Scores for one completed window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowScores {
    /// Fixed variant score.
    pub fixed: f64,
    /// Adaptive variant score.
    pub adaptive: f64,
    /// Number of aligned triples scored.
    pub size: usize,
}

/// Buffers aligned observations and scores them per window.
#[derive(Debug, Clone)]
pub struct WindowedEvaluator {
    true_labels: Vec<Label>,
    fixed: Vec<Assignment>,
    adaptive: Vec<Assignment>,
    metric: MetricFn,
}

impl WindowedEvaluator {
    /// Create an evaluator scoring with NMI.
    pub fn new(capacity: usize) -> Self {
        Self::with_metric(capacity, normalized_mutual_info::<Label, Assignment>)
    }

    /// Create an evaluator with a custom metric.
    pub fn with_metric(capacity: usize, metric: MetricFn) -> Self {
        Self {
            true_labels: Vec::with_capacity(capacity),
            fixed: Vec::with_capacity(capacity),
            adaptive: Vec::with_capacity(capacity),
            metric,
        }
    }

    /// Append one aligned triple to every buffer.
    pub fn append(
        &mut self,
        label: Label,
        fixed: Option<ClusterId>,
        adaptive: Option<ClusterId>,
    ) {
        self.true_labels.push(label);
        self.fixed.push(fixed.into());
        self.adaptive.push(adaptive.into());
        debug_assert!(self.is_aligned());
    }

    /// Entries in the current window.
    pub fn len(&self) -> usize {
        self.true_labels.len()
    }

    /// Whether the current window is empty.
    pub fn is_empty(&self) -> bool {
        self.true_labels.is_empty()
    }

    /// All buffers have the same length.
    pub fn is_aligned(&self) -> bool {
        self.fixed.len() == self.true_labels.len() && self.adaptive.len() == self.true_labels.len()
    }

    /// Normalized predictions of one variant in the current window.
    pub fn predictions(&self, variant: Variant) -> &[Assignment] {
        match variant {
            Variant::Fixed => &self.fixed,
            Variant::Adaptive => &self.adaptive,
        }
    }

    /// Score both variants against the shared true labels, then clear.
    ///
    /// Returns `None` for an empty window; the metric is undefined there.
    pub fn flush(&mut self) -> Option<WindowScores> {
        if self.is_empty() {
            return None;
        }

        let scores = WindowScores {
            fixed: (self.metric)(&self.true_labels, &self.fixed),
            adaptive: (self.metric)(&self.true_labels, &self.adaptive),
            size: self.true_labels.len(),
        };

        self.true_labels.clear();
        self.fixed.clear();
        self.adaptive.clear();

        Some(scores)
    }

    /// Drop the current window without scoring it. Returns how many entries were dropped.
    pub fn discard(&mut self) -> usize {
        let dropped = self.len();
        self.true_labels.clear();
        self.fixed.clear();
        self.adaptive.clear();
        dropped
    }
}

impl Default for WindowedEvaluator {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_substitution_positions() {
        let predicted = normalize_predictions(&[None, Some(0), Some(1)]);
        let reference = [Assignment::Cluster(0), Assignment::Cluster(0), Assignment::Cluster(1)];

        let differing: Vec<usize> = predicted
            .iter()
            .zip(reference.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(differing, vec![0]);
        assert_eq!(predicted[0], Assignment::Unassigned);
    }

    #[test]
    fn test_unassigned_is_scored_not_dropped() {
        let mut evaluator = WindowedEvaluator::new(3);
        evaluator.append(Label::Int(0), None, None);
        evaluator.append(Label::Int(0), Some(0), Some(0));
        evaluator.append(Label::Int(1), Some(1), None);

        assert_eq!(evaluator.len(), 3);
        let scores = evaluator.flush().unwrap();
        assert_eq!(scores.size, 3);
        assert!((0.0..=1.0).contains(&scores.fixed));
        assert!((0.0..=1.0).contains(&scores.adaptive));
    }

    #[test]
    fn test_flush_clears_all_buffers() {
        let mut evaluator = WindowedEvaluator::new(2);
        evaluator.append(Label::Int(0), Some(0), Some(3));
        evaluator.append(Label::Int(1), Some(1), Some(4));
        assert!(evaluator.is_aligned());

        let scores = evaluator.flush().unwrap();
        assert!((scores.fixed - 1.0).abs() < 1e-9);
        assert!((scores.adaptive - 1.0).abs() < 1e-9);
        assert!(evaluator.is_empty());
        assert!(evaluator.predictions(Variant::Fixed).is_empty());
        assert!(evaluator.predictions(Variant::Adaptive).is_empty());
        assert!(evaluator.flush().is_none());
    }

    #[test]
    fn test_both_variants_scored_against_same_labels() {
        fn record_first_label(truth: &[Label], _: &[Assignment]) -> f64 {
            match truth.first() {
                Some(Label::Int(i)) => *i as f64 / 10.0,
                _ => -1.0,
            }
        }

        let mut evaluator = WindowedEvaluator::with_metric(1, record_first_label);
        evaluator.append(Label::Int(7), Some(0), None);
        let scores = evaluator.flush().unwrap();
        assert_eq!(scores.fixed, scores.adaptive);
        assert!((scores.fixed - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_idempotent_scoring() {
        let truth = vec![Label::Int(0), Label::Int(0), Label::Int(1), Label::Int(2)];
        let predicted = normalize_predictions(&[None, Some(4), Some(4), Some(9)]);
        let first = normalized_mutual_info(&truth, &predicted);
        let second = normalized_mutual_info(&truth, &predicted);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_discard_partial_window() {
        let mut evaluator = WindowedEvaluator::new(4);
        evaluator.append(Label::Int(0), Some(0), Some(0));
        assert_eq!(evaluator.discard(), 1);
        assert!(evaluator.is_empty());
    }
}
