//! Training windows over encoded activity sequences.
//!
//! The context window is fixed and symmetric: every activity within
//! `window` positions of the focus, on either side, is a positive context.
//! Windows are clipped at sequence ends and never wrap into a neighboring
//! sequence.

use behavior_map_core::corpus::{ActivityId, SequenceCorpus};
use rand::seq::SliceRandom;
use rand::RngCore;

/// One positive (focus, context) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextPair {
    pub focus: ActivityId,
    pub context: ActivityId,
}

/// Index range of the context around `position`, clipped to `0..len`.
#[inline]
pub fn context_range(position: usize, len: usize, window: usize) -> std::ops::Range<usize> {
    let start = position.saturating_sub(window);
    let end = (position + window + 1).min(len);
    start..end
}

/// All positive pairs of `sequence`, focus by focus, left context first.
pub fn context_pairs(sequence: &[ActivityId], window: usize) -> Vec<ContextPair> {
    let mut pairs = Vec::new();
    for (position, &focus) in sequence.iter().enumerate() {
        for j in context_range(position, sequence.len(), window) {
            if j != position {
                pairs.push(ContextPair {
                    focus,
                    context: sequence[j],
                });
            }
        }
    }
    pairs
}

/// Number of positive pairs a sequence of `len` yields with `window`.
pub fn positive_pair_count(len: usize, window: usize) -> usize {
    (0..len)
        .map(|position| context_range(position, len, window).len() - 1)
        .sum()
}

/// Corpus sequences re-encoded to the trainable vocabulary.
///
/// Activities below `min_count` are removed before windowing, so the
/// remaining neighbors of a removed activity become adjacent.
#[derive(Debug, Clone)]
pub struct TrainingSequences {
    /// Corpus id → trainable index, `None` for filtered activities.
    mapping: Vec<Option<usize>>,
    /// Trainable index → corpus id.
    kept: Vec<ActivityId>,
    sequences: Vec<Vec<usize>>,
}

impl TrainingSequences {
    pub fn new(corpus: &SequenceCorpus, min_count: usize) -> Self {
        let vocabulary = corpus.vocabulary();
        let kept = vocabulary.ids_with_min_count(min_count);
        let mut mapping = vec![None; vocabulary.len()];
        for (trainable, id) in kept.iter().enumerate() {
            mapping[id.index()] = Some(trainable);
        }

        let sequences = corpus
            .iter()
            .map(|seq| {
                seq.iter()
                    .filter_map(|id| mapping[id.index()])
                    .collect::<Vec<_>>()
            })
            .filter(|seq| !seq.is_empty())
            .collect();

        Self {
            mapping,
            kept,
            sequences,
        }
    }

    /// Trainable vocabulary size.
    pub fn vocabulary_size(&self) -> usize {
        self.kept.len()
    }

    /// Corpus id of trainable index `index`.
    pub fn activity(&self, index: usize) -> ActivityId {
        self.kept[index]
    }

    /// Trainable index of a corpus id.
    pub fn index_of(&self, id: ActivityId) -> Option<usize> {
        self.mapping.get(id.index()).copied().flatten()
    }

    pub fn sequences(&self) -> &[Vec<usize>] {
        &self.sequences
    }

    /// Total positions across all sequences.
    pub fn total_positions(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }

    /// Occurrence counts per trainable index.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.kept.len()];
        for seq in &self.sequences {
            for &i in seq {
                counts[i] += 1;
            }
        }
        counts
    }

    /// Sequence visiting order for one epoch.
    pub fn epoch_order(&self, shuffle: bool, rng: &mut dyn RngCore) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.sequences.len()).collect();
        if shuffle {
            order.shuffle(rng);
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ids(raw: &[u32]) -> Vec<ActivityId> {
        raw.iter().map(|&i| ActivityId(i)).collect()
    }

    fn corpus(sequences: &[&[&str]]) -> SequenceCorpus {
        SequenceCorpus::from_labeled(sequences.iter().enumerate().map(|(i, seq)| {
            (
                format!("s{}", i),
                seq.iter().map(|s| s.to_string()).collect(),
            )
        }))
    }

    #[test]
    fn test_window_plus_one_sequence_pairs_with_every_other_position() {
        for window in 1..6usize {
            let seq = ids(&(0..=window as u32).collect::<Vec<_>>());
            let pairs = context_pairs(&seq, window);
            assert_eq!(pairs.len(), window * (window + 1));
            for focus in &seq {
                let n = pairs.iter().filter(|p| p.focus == *focus).count();
                assert_eq!(n, window, "window {} focus {:?}", window, focus);
            }
        }
        println!("[PASS] test_window_plus_one_sequence_pairs_with_every_other_position");
    }

    #[test]
    fn test_boundaries_clip_without_wraparound() {
        let window = 2;
        let seq = ids(&[0, 1, 2, 3, 4, 5, 6]);
        let pairs = context_pairs(&seq, window);
        let per_focus: Vec<usize> = seq
            .iter()
            .map(|f| pairs.iter().filter(|p| p.focus == *f).count())
            .collect();
        assert_eq!(per_focus, vec![2, 3, 4, 4, 4, 3, 2]);
        assert!(!pairs.contains(&ContextPair {
            focus: ActivityId(0),
            context: ActivityId(6)
        }));
        assert_eq!(positive_pair_count(seq.len(), window), pairs.len());
    }

    #[test]
    fn test_single_activity_yields_no_pairs() {
        assert!(context_pairs(&ids(&[3]), 4).is_empty());
        assert_eq!(positive_pair_count(1, 4), 0);
        assert_eq!(positive_pair_count(0, 4), 0);
    }

    #[test]
    fn test_min_count_filters_before_windowing() {
        let corpus = corpus(&[&["a", "rare", "b"], &["a", "b"]]);
        let training = TrainingSequences::new(&corpus, 2);

        assert_eq!(training.vocabulary_size(), 2);
        assert_eq!(training.sequences().to_vec(), vec![vec![0usize, 1], vec![0, 1]]);
        assert_eq!(training.total_positions(), 4);
        assert_eq!(training.counts(), vec![2, 2]);
        let rare = corpus.vocabulary().id_of("rare").unwrap();
        assert_eq!(training.index_of(rare), None);
    }

    #[test]
    fn test_epoch_order_is_a_permutation() {
        let corpus = corpus(&[&["a"], &["b"], &["c"], &["d"], &["e"]]);
        let training = TrainingSequences::new(&corpus, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        assert_eq!(training.epoch_order(false, &mut rng), vec![0, 1, 2, 3, 4]);
        let mut shuffled = training.epoch_order(true, &mut rng);
        shuffled.sort_unstable();
        assert_eq!(shuffled, vec![0, 1, 2, 3, 4]);
    }
}
