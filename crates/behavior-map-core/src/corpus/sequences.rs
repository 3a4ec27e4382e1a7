//! The sequence corpus consumed by embedding training.

use std::collections::HashSet;

use super::vocabulary::{ActivityId, Vocabulary};
use crate::session::SessionMap;

/// All activity sequences of a log, encoded against their vocabulary.
///
/// Read-only after construction. [`SequenceCorpus::iter`] may be called any
/// number of times (once per training epoch) and always yields the same
/// sequences in the same order.
#[derive(Debug, Clone, Default)]
pub struct SequenceCorpus {
    session_ids: Vec<String>,
    sequences: Vec<Vec<ActivityId>>,
    vocabulary: Vocabulary,
}

impl SequenceCorpus {
    /// Build a corpus from assembled sessions, in session id order.
    pub fn from_sessions(sessions: &SessionMap) -> Self {
        Self::from_labeled(
            sessions
                .iter()
                .map(|(id, seq)| (id.clone(), seq.activities().to_vec())),
        )
    }

    /// Build a corpus from `(session_id, labels)` pairs.
    pub fn from_labeled<I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut builder = Vocabulary::builder();
        let mut session_ids = Vec::new();
        let mut sequences = Vec::new();

        for (session_id, labels) in sessions {
            if labels.is_empty() {
                continue;
            }
            let encoded: Vec<ActivityId> = labels.iter().map(|l| builder.observe(l)).collect();
            let distinct: HashSet<ActivityId> = encoded.iter().copied().collect();
            for id in distinct {
                builder.observe_session(id);
            }
            session_ids.push(session_id);
            sequences.push(encoded);
        }

        Self {
            session_ids,
            sequences,
            vocabulary: builder.build(),
        }
    }

    /// Number of sequences.
    #[inline]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Total activity occurrences across all sequences.
    pub fn total_activities(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }

    /// Enumerate sequences. Restartable: each call starts from the first.
    pub fn iter(&self) -> Sequences<'_> {
        Sequences {
            inner: self.sequences.iter(),
        }
    }

    /// Sequence at `index`.
    pub fn get(&self, index: usize) -> Option<&[ActivityId]> {
        self.sequences.get(index).map(Vec::as_slice)
    }

    /// Session id of the sequence at `index`.
    pub fn session_id(&self, index: usize) -> Option<&str> {
        self.session_ids.get(index).map(String::as_str)
    }

    /// Decode the sequence at `index` back to labels.
    pub fn labels_of(&self, index: usize) -> Option<Vec<&str>> {
        self.get(index).map(|seq| {
            seq.iter()
                .filter_map(|id| self.vocabulary.label_of(*id))
                .collect()
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Occurrences of `label` across all sequences (0 if unknown).
    pub fn frequency(&self, label: &str) -> usize {
        self.vocabulary
            .id_of(label)
            .map(|id| self.vocabulary.count(id))
            .unwrap_or(0)
    }

    /// Distinct sessions containing `label` (0 if unknown).
    pub fn session_count(&self, label: &str) -> usize {
        self.vocabulary
            .id_of(label)
            .map(|id| self.vocabulary.session_count(id))
            .unwrap_or(0)
    }

    /// Percentile rank of the session count of `label`.
    pub fn volume_percentile(&self, label: &str) -> Option<f64> {
        self.vocabulary
            .id_of(label)
            .and_then(|id| self.vocabulary.volume_percentile(id))
    }
}

/// Iterator over the sequences of a [`SequenceCorpus`].
#[derive(Debug, Clone)]
pub struct Sequences<'a> {
    inner: std::slice::Iter<'a, Vec<ActivityId>>,
}

impl<'a> Iterator for Sequences<'a> {
    type Item = &'a [ActivityId];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Vec::as_slice)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Sequences<'_> {}

impl<'a> IntoIterator for &'a SequenceCorpus {
    type Item = &'a [ActivityId];
    type IntoIter = Sequences<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> SequenceCorpus {
        SequenceCorpus::from_labeled(vec![
            (
                "A".to_string(),
                vec!["login", "view_balance", "pay_bill", "logout"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            (
                "B".to_string(),
                vec!["login", "view_balance", "transfer_funds", "logout", "login"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
        ])
    }

    #[test]
    fn test_vocabulary_is_exact_label_set() {
        let corpus = corpus();
        assert_eq!(corpus.vocabulary_size(), 5);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.total_activities(), 9);
        for (_, label, count) in corpus.vocabulary().iter() {
            assert!(count > 0, "{} has zero occurrences", label);
        }
    }

    #[test]
    fn test_frequency_and_session_count() {
        let corpus = corpus();
        assert_eq!(corpus.frequency("login"), 3);
        assert_eq!(corpus.session_count("login"), 2);
        assert_eq!(corpus.frequency("pay_bill"), 1);
        assert_eq!(corpus.session_count("pay_bill"), 1);
        assert_eq!(corpus.frequency("unknown"), 0);

        let common = corpus.volume_percentile("login").unwrap();
        let rare = corpus.volume_percentile("pay_bill").unwrap();
        assert!(common > rare);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let corpus = corpus();
        let first: Vec<Vec<ActivityId>> = corpus.iter().map(<[ActivityId]>::to_vec).collect();
        let second: Vec<Vec<ActivityId>> = corpus.iter().map(<[ActivityId]>::to_vec).collect();
        assert_eq!(first, second);
        assert_eq!(corpus.iter().len(), 2);
        assert_eq!(
            corpus.labels_of(0).unwrap(),
            vec!["login", "view_balance", "pay_bill", "logout"]
        );
        assert_eq!(corpus.session_id(1), Some("B"));
    }

    #[test]
    fn test_empty_sequences_skipped() {
        let corpus = SequenceCorpus::from_labeled(vec![("x".to_string(), Vec::new())]);
        assert!(corpus.is_empty());
        assert_eq!(corpus.vocabulary_size(), 0);
    }
}
