//! Activity vocabulary with occurrence statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Dense index of an activity within a [`Vocabulary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub u32);

impl ActivityId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Distinct activity labels of a corpus.
///
/// Ids are assigned in order of first appearance. Every entry occurs at
/// least once; the vocabulary is immutable after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    labels: Vec<String>,
    index: HashMap<String, ActivityId>,
    counts: Vec<usize>,
    session_counts: Vec<usize>,
    volume_percentiles: Vec<f64>,
}

impl Vocabulary {
    pub(crate) fn builder() -> VocabularyBuilder {
        VocabularyBuilder::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn id_of(&self, label: &str) -> Option<ActivityId> {
        self.index.get(label).copied()
    }

    pub fn label_of(&self, id: ActivityId) -> Option<&str> {
        self.labels.get(id.index()).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Total occurrences of `id` across all sequences.
    pub fn count(&self, id: ActivityId) -> usize {
        self.counts.get(id.index()).copied().unwrap_or(0)
    }

    /// Occurrence counts indexed by id.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Number of distinct sessions containing `id`.
    pub fn session_count(&self, id: ActivityId) -> usize {
        self.session_counts.get(id.index()).copied().unwrap_or(0)
    }

    /// Percentile rank (0..=100) of the session count of `id`; ties share
    /// their average rank.
    pub fn volume_percentile(&self, id: ActivityId) -> Option<f64> {
        self.volume_percentiles.get(id.index()).copied()
    }

    /// Ids whose occurrence count is at least `min_count`, in id order.
    pub fn ids_with_min_count(&self, min_count: usize) -> Vec<ActivityId> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count >= min_count)
            .map(|(i, _)| ActivityId(i as u32))
            .collect()
    }

    /// Iterate `(id, label, count)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ActivityId, &str, usize)> + '_ {
        self.labels
            .iter()
            .zip(self.counts.iter())
            .enumerate()
            .map(|(i, (label, &count))| (ActivityId(i as u32), label.as_str(), count))
    }
}

#[derive(Debug, Default)]
pub(crate) struct VocabularyBuilder {
    labels: Vec<String>,
    index: HashMap<String, ActivityId>,
    counts: Vec<usize>,
    session_counts: Vec<usize>,
}

impl VocabularyBuilder {
    /// Record one occurrence and return the label's id.
    pub(crate) fn observe(&mut self, label: &str) -> ActivityId {
        if let Some(&id) = self.index.get(label) {
            self.counts[id.index()] += 1;
            return id;
        }
        let id = ActivityId(self.labels.len() as u32);
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), id);
        self.counts.push(1);
        self.session_counts.push(0);
        id
    }

    /// Record that a session contained `id` (call once per distinct id per session).
    pub(crate) fn observe_session(&mut self, id: ActivityId) {
        self.session_counts[id.index()] += 1;
    }

    pub(crate) fn build(self) -> Vocabulary {
        let volume_percentiles = percentile_ranks(&self.session_counts);
        Vocabulary {
            labels: self.labels,
            index: self.index,
            counts: self.counts,
            session_counts: self.session_counts,
            volume_percentiles,
        }
    }
}

/// Percentile ranks with average rank for ties, scaled to 0..=100.
fn percentile_ranks(values: &[usize]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| values[i]);

    let mut ranks = vec![0.0f64; n];
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        // 1-based ranks start+1..=end+1 share their mean
        let avg_rank = (start + end) as f64 / 2.0 + 1.0;
        for &i in &order[start..=end] {
            ranks[i] = avg_rank / n as f64 * 100.0;
        }
        start = end + 1;
    }
    ranks
}
