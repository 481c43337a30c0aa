//! Agreement metric between ground truth and predicted clusterings.

use std::collections::BTreeMap;

/// Normalized Mutual Information with arithmetic-mean normalization.
///
/// NMI = 2 * I(C; K) / (H(C) + H(K)), clamped to `[0, 1]`.
///
/// Two single-cluster labelings score 1.0. Otherwise zero mutual information
/// scores 0.0. Empty or mismatched inputs return 0.0.
///
/// Counts are kept in ordered maps so the summation order, and therefore the
/// exact floating-point result, depends only on the inputs.
pub fn normalized_mutual_info<T, P>(true_labels: &[T], predicted: &[P]) -> f64
where
    T: Ord,
    P: Ord,
{
    if true_labels.is_empty() || true_labels.len() != predicted.len() {
        return 0.0;
    }

    let n = true_labels.len() as f64;

    let mut class_counts: BTreeMap<&T, f64> = BTreeMap::new();
    let mut cluster_counts: BTreeMap<&P, f64> = BTreeMap::new();
    let mut joint_counts: BTreeMap<(&T, &P), f64> = BTreeMap::new();

    for (class, cluster) in true_labels.iter().zip(predicted.iter()) {
        *class_counts.entry(class).or_insert(0.0) += 1.0;
        *cluster_counts.entry(cluster).or_insert(0.0) += 1.0;
        *joint_counts.entry((class, cluster)).or_insert(0.0) += 1.0;
    }

    // Identical trivial partitions
    if class_counts.len() == 1 && cluster_counts.len() == 1 {
        return 1.0;
    }

    let h_class = entropy(class_counts.values().copied(), n);
    let h_cluster = entropy(cluster_counts.values().copied(), n);

    let mi: f64 = joint_counts
        .iter()
        .map(|((class, cluster), &count)| {
            let p_joint = count / n;
            let p_class = class_counts[class] / n;
            let p_cluster = cluster_counts[cluster] / n;
            p_joint * (p_joint / (p_class * p_cluster)).ln()
        })
        .sum();

    let denom = h_class + h_cluster;
    if mi <= 0.0 || denom < f64::EPSILON {
        0.0
    } else {
        (2.0 * mi / denom).clamp(0.0, 1.0)
    }
}

fn entropy(counts: impl Iterator<Item = f64>, n: f64) -> f64 {
    counts
        .map(|count| {
            let p = count / n;
            if p > 0.0 {
                -p * p.ln()
            } else {
                0.0
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nmi_perfect() {
        let truth = vec![0, 0, 0, 1, 1, 1];
        let pred = vec![5, 5, 5, 9, 9, 9];
        assert!((normalized_mutual_info(&truth, &pred) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_nmi_independent() {
        let truth = vec![0, 0, 1, 1];
        let pred = vec![0, 1, 0, 1];
        assert!(normalized_mutual_info(&truth, &pred).abs() < 1e-9);
    }

    #[test]
    fn test_nmi_single_cluster_prediction() {
        let truth = vec![0, 0, 1, 1];
        let pred = vec![7, 7, 7, 7];
        assert_eq!(normalized_mutual_info(&truth, &pred), 0.0);
        assert_eq!(normalized_mutual_info(&[1, 1], &[2, 2]), 1.0);
    }

    #[test]
    fn test_nmi_partial_in_range() {
        let truth = vec![0, 0, 0, 1, 1, 1];
        let pred = vec![0, 0, 1, 1, 1, 1];
        let nmi = normalized_mutual_info(&truth, &pred);
        assert!(nmi > 0.0 && nmi < 1.0);
    }

    #[test]
    fn test_nmi_mixed_label_types() {
        let truth = vec!["a", "a", "b"];
        let pred = vec![Some(1u64), Some(1), None];
        assert!((normalized_mutual_info(&truth, &pred) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_nmi_mismatched_lengths() {
        assert_eq!(normalized_mutual_info(&[0, 1], &[0]), 0.0);
        assert_eq!(normalized_mutual_info::<i32, i32>(&[], &[]), 0.0);
    }
}
