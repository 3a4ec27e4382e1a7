//! Density-based clustering (DBSCAN).
//!
//! A point with at least `min_samples` neighbors within `eps` (itself
//! included) is a core point. Clusters grow from core points by
//! breadth-first expansion. Points reached by no core point are noise;
//! every noise point is returned as its own singleton cluster so the
//! result always covers the whole input.

use std::collections::VecDeque;

use rand::RngCore;
use rayon::prelude::*;
use tracing::info;

use crate::similarity::DistanceMetric;

use super::error::ClusterError;
use super::traits::{common_dimension, densify_labels, Clusterer};

#[derive(Debug, Clone, PartialEq)]
pub struct Dbscan {
    eps: f32,
    min_samples: usize,
    metric: DistanceMetric,
}

impl Dbscan {
    pub fn new(eps: f32, min_samples: usize) -> Self {
        Self {
            eps,
            min_samples,
            metric: DistanceMetric::Cosine,
        }
    }

    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    fn neighborhoods(&self, vectors: &[&[f32]]) -> Vec<Vec<usize>> {
        (0..vectors.len())
            .into_par_iter()
            .map(|i| {
                vectors
                    .iter()
                    .enumerate()
                    .filter(|(_, other)| self.metric.distance(vectors[i], other) <= self.eps)
                    .map(|(j, _)| j)
                    .collect()
            })
            .collect()
    }
}

impl Clusterer for Dbscan {
    fn fit(&self, vectors: &[&[f32]], _rng: &mut dyn RngCore) -> Result<Vec<usize>, ClusterError> {
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(ClusterError::invalid_parameter(format!(
                "eps must be positive and finite, got {}",
                self.eps
            )));
        }
        if self.min_samples == 0 {
            return Err(ClusterError::invalid_parameter(
                "min_samples must be greater than 0",
            ));
        }
        if vectors.is_empty() {
            return Err(ClusterError::insufficient_data(1, 0));
        }
        common_dimension(vectors)?;

        let neighbors = self.neighborhoods(vectors);
        let is_core: Vec<bool> = neighbors
            .iter()
            .map(|n| n.len() >= self.min_samples)
            .collect();

        let mut labels: Vec<Option<usize>> = vec![None; vectors.len()];
        let mut next_cluster = 0;

        for seed in 0..vectors.len() {
            if labels[seed].is_some() || !is_core[seed] {
                continue;
            }
            let cluster = next_cluster;
            next_cluster += 1;
            labels[seed] = Some(cluster);

            let mut queue: VecDeque<usize> = VecDeque::from(vec![seed]);
            while let Some(point) = queue.pop_front() {
                if !is_core[point] {
                    continue;
                }
                for &neighbor in &neighbors[point] {
                    if labels[neighbor].is_none() {
                        labels[neighbor] = Some(cluster);
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        let density_clusters = next_cluster;
        let mut noise = 0;
        let raw: Vec<usize> = labels
            .into_iter()
            .map(|label| {
                label.unwrap_or_else(|| {
                    let id = next_cluster;
                    next_cluster += 1;
                    noise += 1;
                    id
                })
            })
            .collect();

        info!(
            points = vectors.len(),
            clusters = density_clusters,
            noise_points = noise,
            "DBSCAN finished"
        );

        Ok(densify_labels(&raw))
    }

    fn name(&self) -> &'static str {
        "dbscan"
    }
}
