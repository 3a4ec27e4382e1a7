//! Evaluation metrics for trained activity vectors.
//!
//! The main metric is co-occurrence separation: activities that appear
//! within the context window of each other somewhere in the corpus should
//! be more similar than activities that never do.

use std::collections::{HashMap, HashSet};

use behavior_map_core::corpus::SequenceCorpus;
use behavior_map_core::embedding::EmbeddingTable;
use behavior_map_core::similarity::cosine_similarity;
use serde::Serialize;

use super::data::context_range;

/// Mean cosine similarity of co-occurring vs never co-occurring pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeparationMetrics {
    /// Distinct unordered pairs that share a window at least once.
    pub co_occurring_pairs: usize,
    /// Distinct unordered pairs that never share a window.
    pub disjoint_pairs: usize,
    pub co_occurring_similarity: f32,
    pub disjoint_similarity: f32,
    /// `co_occurring_similarity - disjoint_similarity`.
    pub separation: f32,
}

impl SeparationMetrics {
    /// Format metrics as a summary string.
    pub fn summary(&self) -> String {
        format!(
            "CoSim={:.3} (n={}) DisjointSim={:.3} (n={}) Separation={:.3}",
            self.co_occurring_similarity,
            self.co_occurring_pairs,
            self.disjoint_similarity,
            self.disjoint_pairs,
            self.separation,
        )
    }
}

/// Unordered index pairs `(a, b)`, `a < b`, that share a window.
pub(crate) fn co_occurring_pairs(sequences: &[Vec<usize>], window: usize) -> HashSet<(usize, usize)> {
    let mut pairs = HashSet::new();
    for seq in sequences {
        for (position, &focus) in seq.iter().enumerate() {
            for j in context_range(position, seq.len(), window) {
                let other = seq[j];
                if other != focus {
                    pairs.insert((focus.min(other), focus.max(other)));
                }
            }
        }
    }
    pairs
}

/// Separation over vectors indexed like the ids in `sequences`.
///
/// `None` when either group of pairs is empty.
pub(crate) fn separation_of<V: AsRef<[f32]>>(
    vectors: &[V],
    sequences: &[Vec<usize>],
    window: usize,
) -> Option<SeparationMetrics> {
    let together = co_occurring_pairs(sequences, window);
    let n = vectors.len();

    let (mut co_sum, mut co_n, mut dis_sum, mut dis_n) = (0.0f64, 0usize, 0.0f64, 0usize);
    for a in 0..n {
        for b in (a + 1)..n {
            let sim = cosine_similarity(vectors[a].as_ref(), vectors[b].as_ref()) as f64;
            if together.contains(&(a, b)) {
                co_sum += sim;
                co_n += 1;
            } else {
                dis_sum += sim;
                dis_n += 1;
            }
        }
    }

    if co_n == 0 || dis_n == 0 {
        return None;
    }
    let co = (co_sum / co_n as f64) as f32;
    let dis = (dis_sum / dis_n as f64) as f32;
    Some(SeparationMetrics {
        co_occurring_pairs: co_n,
        disjoint_pairs: dis_n,
        co_occurring_similarity: co,
        disjoint_similarity: dis,
        separation: co - dis,
    })
}

/// Co-occurrence separation of `table` against the sequences of `corpus`.
///
/// Activities missing from the table are removed from sequences before
/// windowing, matching how training saw them.
pub fn co_occurrence_separation(
    table: &EmbeddingTable,
    corpus: &SequenceCorpus,
    window: usize,
) -> Option<SeparationMetrics> {
    let vocabulary = corpus.vocabulary();
    let index: HashMap<&str, usize> = table.labels().enumerate().map(|(i, l)| (l, i)).collect();
    let sequences: Vec<Vec<usize>> = corpus
        .iter()
        .map(|seq| {
            seq.iter()
                .filter_map(|&id| vocabulary.label_of(id).and_then(|l| index.get(l).copied()))
                .collect()
        })
        .collect();
    let vectors: Vec<&[f32]> = table.vectors();
    separation_of(&vectors, &sequences, window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_co_occurring_pairs_respect_window() {
        let pairs = co_occurring_pairs(&[vec![0, 1, 2, 3]], 1);
        assert!(pairs.contains(&(0, 1)));
        assert!(pairs.contains(&(2, 3)));
        assert!(!pairs.contains(&(0, 2)));
        assert!(!pairs.contains(&(0, 3)));
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_separation_positive_when_neighbors_align() {
        let vectors = vec![
            vec![1.0, 0.0],
            vec![0.9, 0.1],
            vec![0.0, 1.0],
            vec![0.1, 0.9],
        ];
        let sequences = vec![vec![0, 1], vec![2, 3]];
        let metrics = separation_of(&vectors, &sequences, 1).unwrap();

        assert_eq!(metrics.co_occurring_pairs, 2);
        assert_eq!(metrics.disjoint_pairs, 4);
        assert!(metrics.separation > 0.5, "{}", metrics.summary());
        println!("[PASS] test_separation_positive_when_neighbors_align {}", metrics.summary());
    }

    #[test]
    fn test_separation_undefined_without_disjoint_pairs() {
        let vectors = vec![vec![1.0], vec![1.0]];
        assert!(separation_of(&vectors, &[vec![0, 1]], 1).is_none());
    }
}
