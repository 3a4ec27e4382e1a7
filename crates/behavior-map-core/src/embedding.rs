//! Trained activity vectors.
//!
//! An [`EmbeddingTable`] is produced once by training and never mutated
//! afterwards; the clusterer and downstream consumers only read it.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::similarity::DistanceMetric;

/// One trained activity vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingEntry {
    pub label: String,
    /// Occurrences of the activity in the training corpus.
    pub count: usize,
    pub vector: Vec<f32>,
}

/// Immutable mapping from activity label to its vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingTable {
    dimension: usize,
    entries: Vec<EmbeddingEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl EmbeddingTable {
    /// Build a table, checking every vector has length `dimension`.
    ///
    /// # Errors
    ///
    /// - `CoreError::DimensionMismatch` if any vector has the wrong length
    /// - `CoreError::ValidationError` on a duplicate label
    pub fn new(dimension: usize, entries: Vec<EmbeddingEntry>) -> CoreResult<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if entry.vector.len() != dimension {
                return Err(CoreError::DimensionMismatch {
                    expected: dimension,
                    actual: entry.vector.len(),
                });
            }
            if index.insert(entry.label.clone(), i).is_some() {
                return Err(CoreError::ValidationError {
                    field: "label".into(),
                    message: format!("duplicate embedding for '{}'", entry.label),
                });
            }
        }
        Ok(Self {
            dimension,
            entries,
            index,
        })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn vector(&self, label: &str) -> Option<&[f32]> {
        self.index
            .get(label)
            .map(|&i| self.entries[i].vector.as_slice())
    }

    pub fn entries(&self) -> &[EmbeddingEntry] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Vectors in table order, for clustering.
    pub fn vectors(&self) -> Vec<&[f32]> {
        self.entries.iter().map(|e| e.vector.as_slice()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> + '_ {
        self.entries
            .iter()
            .map(|e| (e.label.as_str(), e.vector.as_slice()))
    }

    /// Distance between two activities under `metric`.
    ///
    /// # Errors
    ///
    /// `CoreError::UnknownActivity` if either label has no vector.
    pub fn distance(&self, a: &str, b: &str, metric: DistanceMetric) -> CoreResult<f32> {
        let va = self
            .vector(a)
            .ok_or_else(|| CoreError::UnknownActivity(a.to_string()))?;
        let vb = self
            .vector(b)
            .ok_or_else(|| CoreError::UnknownActivity(b.to_string()))?;
        Ok(metric.distance(va, vb))
    }

    /// Similarity between two activities: cosine similarity for
    /// [`DistanceMetric::Cosine`], `1 / (1 + d)` for Euclidean.
    pub fn similarity(&self, a: &str, b: &str, metric: DistanceMetric) -> CoreResult<f32> {
        let distance = self.distance(a, b, metric)?;
        Ok(match metric {
            DistanceMetric::Cosine => 1.0 - distance,
            DistanceMetric::Euclidean => 1.0 / (1.0 + distance),
        })
    }

    /// The `k` nearest other activities to `label`, closest first.
    pub fn nearest(
        &self,
        label: &str,
        k: usize,
        metric: DistanceMetric,
    ) -> CoreResult<Vec<(String, f32)>> {
        let query = self
            .vector(label)
            .ok_or_else(|| CoreError::UnknownActivity(label.to_string()))?;
        let mut scored: Vec<(String, f32)> = self
            .entries
            .iter()
            .filter(|e| e.label != label)
            .map(|e| (e.label.clone(), metric.distance(query, &e.vector)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        Ok(scored)
    }
}
