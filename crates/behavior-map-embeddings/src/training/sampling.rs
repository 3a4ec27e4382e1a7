//! Frequency-based sampling: negative draws and frequent-activity
//! down-sampling.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, RngCore};

use crate::error::{EmbeddingError, EmbeddingResult};

/// Draws negative activities with probability proportional to
/// `count ^ exponent`.
///
/// An exponent below 1 flattens the unigram distribution so very common
/// activities are drawn less often than their raw frequency.
#[derive(Debug, Clone)]
pub struct NegativeSampler {
    distribution: WeightedIndex<f64>,
    probabilities: Vec<f64>,
}

impl NegativeSampler {
    /// # Errors
    ///
    /// `EmbeddingError::InvalidConfig` if `counts` is empty or yields no
    /// positive finite weight.
    pub fn new(counts: &[usize], exponent: f64) -> EmbeddingResult<Self> {
        let weights: Vec<f64> = counts
            .iter()
            .map(|&c| if c == 0 { 0.0 } else { (c as f64).powf(exponent) })
            .collect();
        let distribution = WeightedIndex::new(&weights).map_err(|e| {
            EmbeddingError::InvalidConfig(format!("negative-sampling table: {}", e))
        })?;
        let total: f64 = weights.iter().sum();
        let probabilities = weights.iter().map(|w| w / total).collect();
        Ok(Self {
            distribution,
            probabilities,
        })
    }

    /// Probability of drawing `index`.
    pub fn probability(&self, index: usize) -> f64 {
        self.probabilities.get(index).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    #[inline]
    pub fn sample(&self, rng: &mut dyn RngCore) -> usize {
        self.distribution.sample(rng)
    }

    /// Make `draws` draws, dropping any that hit `positive`.
    pub fn sample_negatives(&self, rng: &mut dyn RngCore, draws: usize, positive: usize) -> Vec<usize> {
        (0..draws)
            .map(|_| self.sample(rng))
            .filter(|&n| n != positive)
            .collect()
    }
}

/// Randomly drops occurrences of very frequent activities.
///
/// With threshold `t = sample * total`, an activity seen `c` times is kept
/// with probability `(sqrt(c / t) + 1) * t / c`, capped at 1. A `sample` of
/// 0 keeps everything.
#[derive(Debug, Clone)]
pub struct Subsampler {
    keep: Vec<f64>,
}

impl Subsampler {
    pub fn new(counts: &[usize], sample: f64) -> Self {
        let total: usize = counts.iter().sum();
        let threshold = sample * total as f64;
        let keep = counts
            .iter()
            .map(|&c| {
                if sample <= 0.0 || c == 0 {
                    1.0
                } else {
                    let c = c as f64;
                    (((c / threshold).sqrt() + 1.0) * threshold / c).min(1.0)
                }
            })
            .collect();
        Self { keep }
    }

    pub fn keep_probability(&self, index: usize) -> f64 {
        self.keep.get(index).copied().unwrap_or(1.0)
    }

    /// True when no activity can be dropped.
    pub fn is_disabled(&self) -> bool {
        self.keep.iter().all(|&p| p >= 1.0)
    }

    /// The retained positions of `sequence`, in order.
    pub fn retain(&self, sequence: &[usize], rng: &mut dyn RngCore) -> Vec<usize> {
        if self.is_disabled() {
            return sequence.to_vec();
        }
        sequence
            .iter()
            .copied()
            .filter(|&i| {
                let p = self.keep_probability(i);
                p >= 1.0 || rng.gen::<f64>() < p
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_exponent_flattens_distribution() {
        let counts = [1000, 10];
        let raw = NegativeSampler::new(&counts, 1.0).unwrap();
        let flat = NegativeSampler::new(&counts, 0.75).unwrap();

        assert!((raw.probability(1) - 10.0 / 1010.0).abs() < 1e-9);
        assert!(flat.probability(1) > raw.probability(1));
        assert!((flat.probability(0) + flat.probability(1) - 1.0).abs() < 1e-9);
        println!(
            "[PASS] test_exponent_flattens_distribution raw={:.4} flat={:.4}",
            raw.probability(1),
            flat.probability(1)
        );
    }

    #[test]
    fn test_empirical_draws_match_probabilities() {
        let sampler = NegativeSampler::new(&[1, 3], 1.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 20_000;
        let ones = (0..n).filter(|_| sampler.sample(&mut rng) == 1).count();
        let freq = ones as f64 / n as f64;
        assert!((freq - 0.75).abs() < 0.02, "freq={}", freq);
    }

    #[test]
    fn test_negatives_skip_the_positive() {
        let sampler = NegativeSampler::new(&[5, 5, 5], 0.75).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..200 {
            let draws = sampler.sample_negatives(&mut rng, 5, 1);
            assert!(draws.len() <= 5);
            assert!(!draws.contains(&1));
        }
        let single = NegativeSampler::new(&[7], 0.75).unwrap();
        assert!(single.sample_negatives(&mut rng, 5, 0).is_empty());
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(NegativeSampler::new(&[], 0.75).is_err());
    }

    #[test]
    fn test_subsampler_drops_only_frequent_activities() {
        let counts = [10_000, 10];
        let subsampler = Subsampler::new(&counts, 1e-3);
        assert!(subsampler.keep_probability(0) < 0.5);
        assert_eq!(subsampler.keep_probability(1), 1.0);

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let seq: Vec<usize> = std::iter::repeat(0).take(500).chain([1, 1, 1]).collect();
        let kept = subsampler.retain(&seq, &mut rng);
        assert_eq!(kept.iter().filter(|&&i| i == 1).count(), 3);
        assert!(kept.len() < seq.len());
    }

    #[test]
    fn test_zero_sample_keeps_everything() {
        let subsampler = Subsampler::new(&[100, 1], 0.0);
        assert!(subsampler.is_disabled());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(subsampler.retain(&[0, 1, 0], &mut rng), vec![0, 1, 0]);
    }
}
