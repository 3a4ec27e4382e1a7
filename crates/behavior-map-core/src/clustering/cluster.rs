//! Summary of one discovered process.

use serde::Serialize;

/// Silhouette score at or above which a cluster counts as well separated.
pub const HIGH_QUALITY_THRESHOLD: f32 = 0.3;

/// One cluster of activities with its centroid and quality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Dense cluster identifier.
    pub id: usize,

    /// Member activity labels, in vocabulary order.
    pub members: Vec<String>,

    /// Mean of the member vectors.
    pub centroid: Vec<f32>,

    /// Mean silhouette of the members (-1.0..=1.0, higher is better).
    pub silhouette_score: f32,
}

impl Cluster {
    pub fn new(id: usize, members: Vec<String>, centroid: Vec<f32>) -> Self {
        Self {
            id,
            members,
            centroid,
            silhouette_score: 0.0,
        }
    }

    /// Set the silhouette score, clamped to -1.0..=1.0.
    pub fn update_silhouette(&mut self, score: f32) {
        self.silhouette_score = score.clamp(-1.0, 1.0);
    }

    #[inline]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    /// True if the silhouette score reaches [`HIGH_QUALITY_THRESHOLD`].
    #[inline]
    pub fn is_high_quality(&self) -> bool {
        self.silhouette_score >= HIGH_QUALITY_THRESHOLD
    }
}

/// Component-wise mean of `vectors`; empty for no input.
pub fn centroid_of(vectors: &[&[f32]]) -> Vec<f32> {
    let Some(first) = vectors.first() else {
        return Vec::new();
    };
    let mut sum = vec![0.0f32; first.len()];
    for v in vectors {
        for (s, x) in sum.iter_mut().zip(v.iter()) {
            *s += x;
        }
    }
    let n = vectors.len() as f32;
    sum.iter_mut().for_each(|s| *s /= n);
    sum
}
