//! Pluggable clustering policy.

use std::collections::HashMap;

use rand::RngCore;

use super::error::ClusterError;

/// A distance-based clustering procedure over dense vectors.
///
/// Implementations return one label per input vector. Labels are dense,
/// starting at 0, numbered by first appearance in input order.
pub trait Clusterer: Send + Sync {
    /// Partition `vectors` into clusters.
    ///
    /// `rng` is the only source of randomness an implementation may use.
    fn fit(&self, vectors: &[&[f32]], rng: &mut dyn RngCore) -> Result<Vec<usize>, ClusterError>;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

/// Renumber labels densely from 0 in order of first appearance.
pub fn densify_labels(labels: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|&label| {
            let next = mapping.len();
            *mapping.entry(label).or_insert(next)
        })
        .collect()
}

/// Check all vectors share one dimension; returns it.
pub(crate) fn common_dimension(vectors: &[&[f32]]) -> Result<usize, ClusterError> {
    let dim = vectors.first().map(|v| v.len()).unwrap_or(0);
    for v in vectors {
        if v.len() != dim {
            return Err(ClusterError::dimension_mismatch(dim, v.len()));
        }
    }
    Ok(dim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_densify_labels() {
        assert_eq!(densify_labels(&[4, 4, 1, 7, 1]), vec![0, 0, 1, 2, 1]);
        assert_eq!(densify_labels(&[0, 1, 2]), vec![0, 1, 2]);
        assert!(densify_labels(&[]).is_empty());
    }

    #[test]
    fn test_common_dimension() {
        let a = [1.0f32, 2.0];
        let b = [1.0f32];
        assert_eq!(common_dimension(&[&a[..], &a[..]]).unwrap(), 2);
        assert!(common_dimension(&[&a[..], &b[..]]).is_err());
    }
}
