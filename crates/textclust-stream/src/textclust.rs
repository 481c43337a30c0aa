//! textClust-style streaming clustering.
//!
//! Observations are absorbed into micro-clusters (faded term centroids). Every
//! `tgap` observations the micro-clusters are faded, pruned, and single-linked
//! into macro clusters, which are what [`TextClust::predict_one`] reports.
//!
//! With `auto_r` the merge threshold is not fixed: it is derived from the
//! spread of the current distances as `mean - sigma * std`. The standard
//! deviation uses the one-pass variance `E[d²] - E[d]²`, which can drift
//! slightly below zero when all distances are (nearly) equal. That surfaces as
//! [`StreamError::MathDomain`]; the micro-clusters are not modified by the
//! observation that triggered it, though the logical clock still advances.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{checked_sqrt, StreamError, StreamResult};
use crate::tfidf::SparseVector;

/// Identifier of a micro or macro cluster.
pub type ClusterId = u64;

/// Clustering model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextClustConfig {
    /// Fixed merge threshold (cosine distance), used when `auto_r` is off.
    pub radius: f64,
    /// Fading rate λ; weights decay by `2^(-λ·Δt)`.
    pub fading_factor: f64,
    /// Observations between cleanup and macro reclustering.
    pub tgap: u64,
    /// Derive the threshold from the distance distribution.
    pub auto_r: bool,
    /// Number of standard deviations below the mean for `auto_r`.
    pub sigma: f64,
    /// Micro-clusters below this faded weight are dropped at cleanup.
    pub min_weight: f64,
}

impl Default for TextClustConfig {
    fn default() -> Self {
        Self {
            radius: 0.3,
            fading_factor: 0.0005,
            tgap: 100,
            auto_r: false,
            sigma: 0.5,
            min_weight: 0.5,
        }
    }
}

impl TextClustConfig {
    /// Check parameter ranges.
    pub fn validate(&self) -> StreamResult<()> {
        if !(self.fading_factor > 0.0 && self.fading_factor.is_finite()) {
            return Err(StreamError::InvalidParameter {
                name: "fading_factor",
                value: self.fading_factor.to_string(),
                reason: "must be a positive finite number",
            });
        }
        if self.tgap == 0 {
            return Err(StreamError::InvalidParameter {
                name: "tgap",
                value: self.tgap.to_string(),
                reason: "must be positive",
            });
        }
        if !(self.radius > 0.0 && self.radius <= 2.0) {
            return Err(StreamError::InvalidParameter {
                name: "radius",
                value: self.radius.to_string(),
                reason: "must be in (0, 2]",
            });
        }
        if !(self.sigma >= 0.0 && self.sigma.is_finite()) {
            return Err(StreamError::InvalidParameter {
                name: "sigma",
                value: self.sigma.to_string(),
                reason: "must be a non-negative finite number",
            });
        }
        if self.min_weight < 0.0 {
            return Err(StreamError::InvalidParameter {
                name: "min_weight",
                value: self.min_weight.to_string(),
                reason: "must be non-negative",
            });
        }
        Ok(())
    }
}

/// A faded summary of absorbed observations.
#[derive(Debug, Clone)]
struct MicroCluster {
    id: ClusterId,
    weight: f64,
    centroid: SparseVector,
    last_update: u64,
}

impl MicroCluster {
    fn fade_to(&mut self, now: u64, fading_factor: f64) {
        if now <= self.last_update {
            return;
        }
        let factor = 2f64.powf(-fading_factor * (now - self.last_update) as f64);
        self.weight *= factor;
        self.centroid.scale(factor);
        self.last_update = now;
    }
}

/// Streaming micro/macro text clustering model.
#[derive(Debug, Clone)]
pub struct TextClust {
    config: TextClustConfig,
    /// Observation counter (logical time).
    time: u64,
    next_id: ClusterId,
    micro_clusters: Vec<MicroCluster>,
    /// Micro-cluster id -> macro cluster id, as of the last reclustering.
    macro_assignment: HashMap<ClusterId, ClusterId>,
}

impl TextClust {
    /// Create a model after validating `config`.
    pub fn new(config: TextClustConfig) -> StreamResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            time: 0,
            next_id: 0,
            micro_clusters: Vec::new(),
            macro_assignment: HashMap::new(),
        })
    }

    /// Model parameters.
    pub fn config(&self) -> &TextClustConfig {
        &self.config
    }

    /// Number of observations learned.
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Number of live micro-clusters.
    pub fn micro_cluster_count(&self) -> usize {
        self.micro_clusters.len()
    }

    /// Number of macro clusters from the last reclustering.
    pub fn macro_cluster_count(&self) -> usize {
        self.macro_assignment.values().collect::<HashSet<_>>().len()
    }

    /// Learn from one vectorized observation.
    pub fn learn_one(&mut self, x: &SparseVector) -> StreamResult<()> {
        self.time += 1;

        if !x.is_empty() {
            self.absorb(x)?;
        }

        if self.time % self.config.tgap == 0 {
            self.cleanup();
            self.recluster()?;
        }

        Ok(())
    }

    /// Macro cluster of the nearest assigned micro-cluster.
    ///
    /// `None` while no reclustering has happened yet or for empty vectors.
    pub fn predict_one(&self, x: &SparseVector) -> Option<ClusterId> {
        if x.is_empty() {
            return None;
        }

        self.micro_clusters
            .iter()
            .filter_map(|mc| {
                self.macro_assignment
                    .get(&mc.id)
                    .map(|&macro_id| (macro_id, x.cosine_distance(&mc.centroid)))
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(macro_id, _)| macro_id)
    }

    /// Merge `x` into the nearest micro-cluster or open a new one.
    fn absorb(&mut self, x: &SparseVector) -> StreamResult<()> {
        let distances: Vec<f64> = self
            .micro_clusters
            .iter()
            .map(|mc| x.cosine_distance(&mc.centroid))
            .collect();

        let nearest = distances
            .iter()
            .copied()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        // Threshold is computed before any mutation so a failure leaves state intact
        let merge_into = match nearest {
            Some((idx, distance)) => {
                let threshold = self.threshold(&distances, "micro-cluster merge threshold")?;
                (distance <= threshold).then_some(idx)
            }
            None => None,
        };

        let now = self.time;
        match merge_into {
            Some(idx) => {
                let mc = &mut self.micro_clusters[idx];
                mc.fade_to(now, self.config.fading_factor);
                mc.weight += 1.0;
                mc.centroid.accumulate(x);
            }
            None => {
                self.micro_clusters.push(MicroCluster {
                    id: self.next_id,
                    weight: 1.0,
                    centroid: x.clone(),
                    last_update: now,
                });
                self.next_id += 1;
            }
        }
        Ok(())
    }

    /// Fade every micro-cluster to now and drop the light ones.
    fn cleanup(&mut self) {
        let now = self.time;
        let lambda = self.config.fading_factor;
        let before = self.micro_clusters.len();

        for mc in &mut self.micro_clusters {
            mc.fade_to(now, lambda);
        }
        let min_weight = self.config.min_weight;
        self.micro_clusters.retain(|mc| mc.weight >= min_weight);

        trace!(
            time = now,
            removed = before - self.micro_clusters.len(),
            remaining = self.micro_clusters.len(),
            "textclust cleanup"
        );
    }

    /// Single-link micro-clusters within the threshold into macro clusters.
    fn recluster(&mut self) -> StreamResult<()> {
        let m = self.micro_clusters.len();

        let mut pairs = Vec::with_capacity(m * m.saturating_sub(1) / 2);
        for i in 0..m {
            for j in (i + 1)..m {
                let d = self.micro_clusters[i]
                    .centroid
                    .cosine_distance(&self.micro_clusters[j].centroid);
                pairs.push((i, j, d));
            }
        }
        let distances: Vec<f64> = pairs.iter().map(|&(_, _, d)| d).collect();
        let threshold = self.threshold(&distances, "macro-cluster threshold")?;

        let mut parent: Vec<usize> = (0..m).collect();
        for &(i, j, d) in &pairs {
            if d <= threshold {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[rj] = ri;
                }
            }
        }

        // Label each component with its smallest micro-cluster id
        let mut labels: HashMap<usize, ClusterId> = HashMap::new();
        for i in 0..m {
            let root = find(&mut parent, i);
            let id = self.micro_clusters[i].id;
            labels
                .entry(root)
                .and_modify(|label| *label = (*label).min(id))
                .or_insert(id);
        }

        let mut assignment = HashMap::with_capacity(m);
        for i in 0..m {
            let root = find(&mut parent, i);
            let id = self.micro_clusters[i].id;
            assignment.insert(id, labels.get(&root).copied().unwrap_or(id));
        }
        self.macro_assignment = assignment;

        trace!(
            time = self.time,
            micro = m,
            macro_clusters = self.macro_cluster_count(),
            threshold,
            "textclust recluster"
        );
        Ok(())
    }

    fn threshold(&self, distances: &[f64], context: &'static str) -> StreamResult<f64> {
        if self.config.auto_r && distances.len() >= 2 {
            let (mean, std) = distance_stats(distances, context)?;
            Ok(mean - self.config.sigma * std)
        } else {
            Ok(self.config.radius)
        }
    }
}

/// Mean and standard deviation from running sums.
///
/// Fails with [`StreamError::MathDomain`] when the one-pass variance is negative.
pub fn distance_stats(distances: &[f64], context: &'static str) -> StreamResult<(f64, f64)> {
    let n = distances.len() as f64;
    let sum: f64 = distances.iter().sum();
    let sum_sq: f64 = distances.iter().map(|d| d * d).sum();
    let mean = sum / n;
    let variance = sum_sq / n - mean * mean;
    Ok((mean, checked_sqrt(variance, context)?))
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}
