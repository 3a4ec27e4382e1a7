//! K-means clustering over activity vectors.
//!
//! # Algorithm
//!
//! 1. Seed `k` centroids with k-means++ (D² sampling from the supplied rng)
//! 2. Assign each vector to its nearest centroid; ties go to the lowest id
//! 3. Recompute each centroid as the mean of its members; a centroid that
//!    lost all members keeps its previous position
//! 4. Repeat 2-3 until no assignment changes or `max_iterations` is reached
//! 5. Run 1-4 `n_init` times from fresh seeds and keep the run with the
//!    lowest inertia (sum of squared distances to assigned centroids);
//!    the earliest run wins ties
//!
//! Clusters left empty at the end are dropped and the remaining labels are
//! renumbered densely. Fewer than `k` clusters can come back: with fewer
//! than `k` distinct points, or when a centroid loses all its members and
//! no point moves back to it.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, RngCore};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::similarity::DistanceMetric;

use super::error::ClusterError;
use super::traits::{common_dimension, densify_labels, Clusterer};

/// K-means with k-means++ initialization.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    k: usize,
    max_iterations: usize,
    n_init: usize,
    metric: DistanceMetric,
}

/// Outcome of one seeded Lloyd run.
struct KMeansRun {
    assignments: Vec<usize>,
    inertia: f64,
    iterations: usize,
    converged: bool,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: 300,
            n_init: 10,
            metric: DistanceMetric::Cosine,
        }
    }

    /// Number of independently seeded runs; the lowest-inertia one is kept.
    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    fn validate(&self, n: usize) -> Result<(), ClusterError> {
        if self.k == 0 {
            return Err(ClusterError::invalid_parameter("k must be greater than 0"));
        }
        if self.max_iterations == 0 {
            return Err(ClusterError::invalid_parameter(
                "max_iterations must be greater than 0",
            ));
        }
        if self.n_init == 0 {
            return Err(ClusterError::invalid_parameter("n_init must be greater than 0"));
        }
        if n == 0 {
            return Err(ClusterError::insufficient_data(1, 0));
        }
        if self.k > n {
            return Err(ClusterError::too_many_clusters(self.k, n));
        }
        Ok(())
    }
}

impl KMeans {
    /// Best of `n_init` runs, with its inertia.
    fn fit_best(
        &self,
        vectors: &[&[f32]],
        rng: &mut dyn RngCore,
    ) -> Result<(Vec<usize>, f64), ClusterError> {
        let n = vectors.len();
        self.validate(n)?;
        let dim = common_dimension(vectors)?;

        let mut best: Option<KMeansRun> = None;
        for run in 0..self.n_init {
            let candidate = self.lloyd(vectors, dim, rng);
            debug!(
                run,
                inertia = candidate.inertia,
                iterations = candidate.iterations,
                "K-means run"
            );
            if best.as_ref().map_or(true, |b| candidate.inertia < b.inertia) {
                best = Some(candidate);
            }
        }
        let best =
            best.ok_or_else(|| ClusterError::invalid_parameter("n_init must be greater than 0"))?;

        info!(
            k = self.k,
            points = n,
            runs = self.n_init,
            iterations = best.iterations,
            converged = best.converged,
            inertia = best.inertia,
            "K-means finished"
        );

        Ok((densify_labels(&best.assignments), best.inertia))
    }

    fn lloyd(&self, vectors: &[&[f32]], dim: usize, rng: &mut dyn RngCore) -> KMeansRun {
        let mut centroids = initialize_centroids_kmeans_pp(vectors, self.k, self.metric, rng);
        let mut assignments: Vec<usize> = vec![usize::MAX; vectors.len()];
        let mut iterations = 0;
        let mut changed = true;

        while iterations < self.max_iterations {
            iterations += 1;

            let next: Vec<usize> = vectors
                .par_iter()
                .map(|v| find_nearest_centroid(v, &centroids, self.metric))
                .collect();
            changed = next != assignments;
            assignments = next;

            if !changed {
                break;
            }
            recompute_centroids(vectors, &assignments, &mut centroids, dim);
        }

        let inertia = vectors
            .iter()
            .zip(&assignments)
            .map(|(v, &c)| {
                let d = self.metric.distance(v, &centroids[c]) as f64;
                d * d
            })
            .sum();

        KMeansRun {
            assignments,
            inertia,
            iterations,
            converged: !changed,
        }
    }
}

impl Clusterer for KMeans {
    fn fit(&self, vectors: &[&[f32]], rng: &mut dyn RngCore) -> Result<Vec<usize>, ClusterError> {
        self.fit_best(vectors, rng).map(|(labels, _)| labels)
    }

    fn name(&self) -> &'static str {
        "kmeans"
    }
}

/// Seed centroids with k-means++.
///
/// The first centroid is drawn uniformly; each subsequent one with
/// probability proportional to the squared distance to its nearest chosen
/// centroid. If every remaining point coincides with a centroid, the lowest
/// unchosen index is taken.
fn initialize_centroids_kmeans_pp(
    vectors: &[&[f32]],
    k: usize,
    metric: DistanceMetric,
    rng: &mut dyn RngCore,
) -> Vec<Vec<f32>> {
    let n = vectors.len();
    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    chosen.push(rng.gen_range(0..n));

    let mut min_dist: Vec<f32> = vectors
        .iter()
        .map(|v| metric.distance(v, vectors[chosen[0]]))
        .collect();

    while chosen.len() < k {
        let weights: Vec<f64> = min_dist
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                if chosen.contains(&i) || !d.is_finite() {
                    0.0
                } else {
                    (d as f64) * (d as f64)
                }
            })
            .collect();

        let next = match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(rng),
            Err(_) => match (0..n).find(|i| !chosen.contains(i)) {
                Some(i) => i,
                None => break,
            },
        };
        debug!(centroid = chosen.len(), point = next, "k-means++ seed");
        chosen.push(next);

        for (i, v) in vectors.iter().enumerate() {
            let d = metric.distance(v, vectors[next]);
            if d < min_dist[i] {
                min_dist[i] = d;
            }
        }
    }

    chosen.into_iter().map(|i| vectors[i].to_vec()).collect()
}

/// Index of the nearest centroid; strict comparison keeps the lowest id on ties.
fn find_nearest_centroid(vector: &[f32], centroids: &[Vec<f32>], metric: DistanceMetric) -> usize {
    let mut best_idx = 0;
    let mut best_distance = f32::INFINITY;

    for (i, centroid) in centroids.iter().enumerate() {
        let distance = metric.distance(vector, centroid);
        if distance < best_distance {
            best_distance = distance;
            best_idx = i;
        }
    }

    best_idx
}

/// Recompute centroids from assignments in place.
fn recompute_centroids(
    vectors: &[&[f32]],
    assignments: &[usize],
    centroids: &mut [Vec<f32>],
    dim: usize,
) {
    let k = centroids.len();
    let mut sums = vec![vec![0.0f32; dim]; k];
    let mut counts = vec![0usize; k];

    for (vector, &cluster) in vectors.iter().zip(assignments.iter()) {
        counts[cluster] += 1;
        for (s, x) in sums[cluster].iter_mut().zip(vector.iter()) {
            *s += x;
        }
    }

    for ((centroid, sum), &count) in centroids.iter_mut().zip(sums).zip(counts.iter()) {
        if count == 0 {
            continue;
        }
        *centroid = sum.into_iter().map(|s| s / count as f32).collect();
    }
}
