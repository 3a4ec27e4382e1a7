//! Activity → cluster assignment and the clusterer that produces it.

use std::collections::BTreeMap;
use std::collections::HashMap;

use rand::RngCore;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ClusteringConfig, ClusteringMethod};
use crate::embedding::EmbeddingTable;
use crate::similarity::DistanceMetric;

use super::cluster::{centroid_of, Cluster};
use super::dbscan::Dbscan;
use super::error::ClusterError;
use super::kmeans::KMeans;
use super::quality::{silhouette_samples, silhouette_score};
use super::traits::{densify_labels, Clusterer};

/// Build the clusterer selected by `config.method`.
pub fn build_clusterer(config: &ClusteringConfig) -> Box<dyn Clusterer> {
    match config.method {
        ClusteringMethod::KMeans => Box::new(
            KMeans::new(config.cluster_count)
                .with_max_iterations(config.max_iterations)
                .with_n_init(config.n_init)
                .with_metric(config.metric),
        ),
        ClusteringMethod::Dbscan => {
            Box::new(Dbscan::new(config.eps, config.min_samples).with_metric(config.metric))
        }
    }
}

/// Mapping from every clustered activity to exactly one dense cluster id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    labels: Vec<String>,
    cluster_ids: Vec<usize>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    cluster_count: usize,
}

impl ClusterAssignment {
    /// Pair activity labels with raw cluster ids; ids are renumbered densely
    /// in order of first appearance.
    ///
    /// # Errors
    ///
    /// `ClusterError::DimensionMismatch` if the two lists differ in length.
    pub fn from_labels(labels: Vec<String>, raw_ids: &[usize]) -> Result<Self, ClusterError> {
        if labels.len() != raw_ids.len() {
            return Err(ClusterError::dimension_mismatch(labels.len(), raw_ids.len()));
        }
        let cluster_ids = densify_labels(raw_ids);
        let cluster_count = cluster_ids.iter().max().map_or(0, |&m| m + 1);
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        Ok(Self {
            labels,
            cluster_ids,
            index,
            cluster_count,
        })
    }

    pub fn cluster_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).map(|&i| self.cluster_ids[i])
    }

    /// Members of cluster `id`, in assignment order.
    pub fn members(&self, id: usize) -> Vec<&str> {
        self.iter()
            .filter(|(_, cluster)| *cluster == id)
            .map(|(label, _)| label)
            .collect()
    }

    #[inline]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.cluster_ids.iter().copied())
    }

    pub fn to_map(&self) -> BTreeMap<String, usize> {
        self.iter().map(|(l, c)| (l.to_string(), c)).collect()
    }

    /// Per-cluster summaries with centroids and mean silhouette.
    ///
    /// Activities missing from `table` are left out of centroids and scores.
    pub fn clusters(&self, table: &EmbeddingTable, metric: DistanceMetric) -> Vec<Cluster> {
        let (vectors, ids) = self.vectors_in(table);
        let samples = silhouette_samples(&vectors, &ids, metric);

        (0..self.cluster_count)
            .map(|id| {
                let members: Vec<String> = self.members(id).into_iter().map(String::from).collect();
                let member_vectors: Vec<&[f32]> = vectors
                    .iter()
                    .zip(ids.iter())
                    .filter(|(_, c)| **c == id)
                    .map(|(v, _)| *v)
                    .collect();
                let member_scores: Vec<f32> = samples
                    .iter()
                    .zip(ids.iter())
                    .filter(|(_, c)| **c == id)
                    .map(|(s, _)| *s)
                    .collect();

                let mut cluster = Cluster::new(id, members, centroid_of(&member_vectors));
                if !member_scores.is_empty() {
                    cluster.update_silhouette(
                        member_scores.iter().sum::<f32>() / member_scores.len() as f32,
                    );
                }
                cluster
            })
            .collect()
    }

    /// Mean silhouette of the whole assignment.
    pub fn silhouette(&self, table: &EmbeddingTable, metric: DistanceMetric) -> f32 {
        let (vectors, ids) = self.vectors_in(table);
        silhouette_score(&vectors, &ids, metric)
    }

    fn vectors_in<'t>(&self, table: &'t EmbeddingTable) -> (Vec<&'t [f32]>, Vec<usize>) {
        self.iter()
            .filter_map(|(label, id)| table.vector(label).map(|v| (v, id)))
            .unzip()
    }
}

/// Partitions an [`EmbeddingTable`] with the configured clustering policy.
pub struct ActivityClusterer {
    config: ClusteringConfig,
    clusterer: Box<dyn Clusterer>,
}

impl std::fmt::Debug for ActivityClusterer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityClusterer")
            .field("config", &self.config)
            .field("clusterer", &self.clusterer.name())
            .finish()
    }
}

impl ActivityClusterer {
    /// # Errors
    ///
    /// `ClusterError::InvalidParameter` if the configuration is invalid.
    pub fn new(config: ClusteringConfig) -> Result<Self, ClusterError> {
        config
            .validate()
            .map_err(|e| ClusterError::invalid_parameter(e.to_string()))?;
        let clusterer = build_clusterer(&config);
        Ok(Self { config, clusterer })
    }

    /// Use a custom clustering policy instead of the configured one.
    pub fn with_clusterer(config: ClusteringConfig, clusterer: Box<dyn Clusterer>) -> Self {
        Self { config, clusterer }
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Fail early if the requested cluster count cannot be met by
    /// `available` activities. Only k-means has a fixed count.
    pub fn check_capacity(&self, available: usize) -> Result<(), ClusterError> {
        if self.config.method == ClusteringMethod::KMeans && self.config.cluster_count > available {
            return Err(ClusterError::too_many_clusters(
                self.config.cluster_count,
                available,
            ));
        }
        Ok(())
    }

    /// Cluster every vector in `table`.
    pub fn cluster(
        &self,
        table: &EmbeddingTable,
        rng: &mut dyn RngCore,
    ) -> Result<ClusterAssignment, ClusterError> {
        self.check_capacity(table.len())?;
        let vectors = table.vectors();
        debug!(
            method = self.clusterer.name(),
            metric = self.config.metric.name(),
            activities = vectors.len(),
            "Clustering activity vectors"
        );

        let raw = self.clusterer.fit(&vectors, rng)?;
        let labels = table.labels().map(String::from).collect();
        let assignment = ClusterAssignment::from_labels(labels, &raw)?;

        info!(
            activities = assignment.len(),
            clusters = assignment.cluster_count(),
            "Activity clustering complete"
        );
        Ok(assignment)
    }
}
