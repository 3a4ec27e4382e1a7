//! Silhouette scores for a cluster assignment.
//!
//! For point `i` in cluster `C`:
//!
//! - `a(i)` is the mean distance from `i` to the other members of `C`
//! - `b(i)` is the smallest mean distance from `i` to the members of any
//!   other cluster
//! - `s(i) = (b - a) / max(a, b)`
//!
//! Points in singleton clusters score 0, as does every point when there is
//! only one cluster.

use rayon::prelude::*;

use crate::similarity::DistanceMetric;

/// Per-point silhouette values in `[-1, 1]`, in input order.
///
/// `labels` must be dense cluster ids, one per vector.
pub fn silhouette_samples(vectors: &[&[f32]], labels: &[usize], metric: DistanceMetric) -> Vec<f32> {
    let n = vectors.len().min(labels.len());
    let cluster_count = labels.iter().take(n).max().map_or(0, |&m| m + 1);
    if cluster_count < 2 {
        return vec![0.0; n];
    }

    let mut sizes = vec![0usize; cluster_count];
    for &label in labels.iter().take(n) {
        sizes[label] += 1;
    }

    (0..n)
        .into_par_iter()
        .map(|i| {
            let own = labels[i];
            if sizes[own] <= 1 {
                return 0.0;
            }
            let mut sums = vec![0.0f64; cluster_count];
            for j in 0..n {
                if i != j {
                    sums[labels[j]] += metric.distance(vectors[i], vectors[j]) as f64;
                }
            }
            let a = sums[own] / (sizes[own] - 1) as f64;
            let b = (0..cluster_count)
                .filter(|&c| c != own && sizes[c] > 0)
                .map(|c| sums[c] / sizes[c] as f64)
                .fold(f64::INFINITY, f64::min);

            let denom = a.max(b);
            if denom <= 0.0 || !denom.is_finite() {
                0.0
            } else {
                (((b - a) / denom) as f32).clamp(-1.0, 1.0)
            }
        })
        .collect()
}

/// Mean silhouette over all points; 0 for empty input.
pub fn silhouette_score(vectors: &[&[f32]], labels: &[usize], metric: DistanceMetric) -> f32 {
    let samples = silhouette_samples(vectors, labels, metric);
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f32>() / samples.len() as f32
}
