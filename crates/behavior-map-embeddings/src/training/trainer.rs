//! Skip-gram trainer with negative sampling.
//!
//! The trainer owns the mutable vector tables for the whole run and hands
//! back an immutable [`EmbeddingTable`] when it finishes; `train` consumes
//! the trainer so no vector can be touched after hand-off.
//!
//! # Training loop
//!
//! ```text
//! for epoch in 0..epochs:
//!     for sequence in (shuffled) corpus:
//!         drop frequent activities (subsampling)
//!         for focus in sequence:
//!             for context in window(focus):
//!                 SGD on (focus, context) + negative draws
//! ```
//!
//! The learning rate decays linearly from `learning_rate` to
//! `min_learning_rate` over all positions of all epochs.

use behavior_map_core::config::TrainingConfig;
use behavior_map_core::corpus::SequenceCorpus;
use behavior_map_core::embedding::{EmbeddingEntry, EmbeddingTable};
use rand::RngCore;
use rand_distr::{Distribution, Uniform};
use serde::Serialize;
use tracing::{debug, info};

use super::data::{context_range, TrainingSequences};
use super::evaluation::{separation_of, SeparationMetrics};
use super::loss::{sgns_loss, sigmoid, LossAccumulator};
use super::sampling::{NegativeSampler, Subsampler};
use crate::error::{EmbeddingError, EmbeddingResult};

/// Summary of one training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub epochs: usize,
    /// Mean SGNS loss per positive pair, one entry per epoch.
    pub epoch_losses: Vec<f32>,
    /// Positive pairs processed over all epochs.
    pub positive_pairs: usize,
    /// Activities that received a vector.
    pub trained_activities: usize,
    /// Activities dropped by `min_count`.
    pub excluded_activities: Vec<String>,
    pub final_learning_rate: f32,
    pub separation: Option<SeparationMetrics>,
}

impl TrainingReport {
    pub fn final_loss(&self) -> Option<f32> {
        self.epoch_losses.last().copied()
    }
}

/// Input and output vectors, row-major, one row per trainable activity.
struct SkipGramModel {
    dim: usize,
    input: Vec<f32>,
    output: Vec<f32>,
    gradient: Vec<f32>,
    scores: Vec<f32>,
}

impl SkipGramModel {
    fn initialize(rows: usize, dim: usize, rng: &mut dyn RngCore) -> Self {
        let bound = 0.5 / dim as f32;
        let uniform = Uniform::new(-bound, bound);
        let input = (0..rows * dim).map(|_| uniform.sample(rng)).collect();
        let output = (0..rows * dim).map(|_| uniform.sample(rng)).collect();
        Self {
            dim,
            input,
            output,
            gradient: vec![0.0; dim],
            scores: Vec::new(),
        }
    }

    /// One SGD step on a positive pair and its negatives; returns the loss.
    fn train_pair(&mut self, focus: usize, context: usize, negatives: &[usize], lr: f32) -> f32 {
        let d = self.dim;
        let f = focus * d..(focus + 1) * d;
        self.gradient.iter_mut().for_each(|g| *g = 0.0);

        let targets = std::iter::once(context).chain(negatives.iter().copied());
        self.scores.clear();
        for target in targets.clone() {
            let t = target * d..(target + 1) * d;
            let score = self.input[f.clone()]
                .iter()
                .zip(&self.output[t])
                .map(|(a, b)| a * b)
                .sum();
            self.scores.push(score);
        }
        let loss = sgns_loss(self.scores[0], &self.scores[1..]);

        for (i, target) in targets.enumerate() {
            let label = if i == 0 { 1.0 } else { 0.0 };
            let g = (label - sigmoid(self.scores[i])) * lr;
            let t = target * d;
            for k in 0..d {
                self.gradient[k] += g * self.output[t + k];
                self.output[t + k] += g * self.input[f.start + k];
            }
        }

        for (x, g) in self.input[f].iter_mut().zip(&self.gradient) {
            *x += g;
        }
        loss
    }

    fn row(&self, index: usize) -> &[f32] {
        &self.input[index * self.dim..(index + 1) * self.dim]
    }

    fn rows(&self) -> Vec<&[f32]> {
        self.input.chunks(self.dim).collect()
    }
}

/// Linear decay from `learning_rate` to `min_learning_rate` over `total` positions.
fn decayed_learning_rate(cfg: &TrainingConfig, processed: usize, total: usize) -> f32 {
    let progress = (processed as f32 / total as f32).min(1.0);
    cfg.learning_rate - (cfg.learning_rate - cfg.min_learning_rate) * progress
}

/// Skip-gram with negative sampling over a [`SequenceCorpus`].
#[derive(Debug, Clone)]
pub struct SkipGramTrainer {
    config: TrainingConfig,
}

impl SkipGramTrainer {
    /// # Errors
    ///
    /// `EmbeddingError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: TrainingConfig) -> EmbeddingResult<Self> {
        config
            .validate()
            .map_err(|e| EmbeddingError::InvalidConfig(e.to_string()))?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train one vector per activity occurring at least `min_count` times.
    ///
    /// All randomness (initialization, shuffling, subsampling, negative
    /// draws) comes from `rng`; the same seed yields the same table.
    ///
    /// # Errors
    ///
    /// - `EmbeddingError::EmptyCorpus` if the corpus has no sequences
    /// - `EmbeddingError::AllBelowMinCount` if no activity is frequent enough
    pub fn train(
        self,
        corpus: &SequenceCorpus,
        rng: &mut dyn RngCore,
    ) -> EmbeddingResult<(EmbeddingTable, TrainingReport)> {
        if corpus.is_empty() {
            return Err(EmbeddingError::EmptyCorpus);
        }
        let cfg = &self.config;
        let data = TrainingSequences::new(corpus, cfg.min_count);
        if data.vocabulary_size() == 0 {
            return Err(EmbeddingError::AllBelowMinCount {
                min_count: cfg.min_count,
                vocab_size: corpus.vocabulary_size(),
            });
        }

        let counts = data.counts();
        let sampler = NegativeSampler::new(&counts, cfg.ns_exponent)?;
        let subsampler = Subsampler::new(&counts, cfg.sample);
        let mut model = SkipGramModel::initialize(data.vocabulary_size(), cfg.vector_dimension, rng);

        info!(
            activities = data.vocabulary_size(),
            excluded = corpus.vocabulary_size() - data.vocabulary_size(),
            sequences = data.sequences().len(),
            dimension = cfg.vector_dimension,
            epochs = cfg.epochs,
            "Starting skip-gram training"
        );

        let total_work = (cfg.epochs * data.total_positions()).max(1);
        let mut processed = 0usize;
        let mut lr = cfg.learning_rate;
        let mut epoch_losses = Vec::with_capacity(cfg.epochs);
        let mut positive_pairs = 0usize;

        for epoch in 0..cfg.epochs {
            let mut epoch_loss = LossAccumulator::default();

            for s in data.epoch_order(cfg.shuffle, rng) {
                let original = &data.sequences()[s];
                let sequence = subsampler.retain(original, rng);
                // Subsampled-away positions still count toward the schedule.
                let dropped = original.len() - sequence.len();

                for (position, &focus) in sequence.iter().enumerate() {
                    lr = decayed_learning_rate(cfg, processed, total_work);
                    processed += 1;
                    for j in context_range(position, sequence.len(), cfg.window_size) {
                        if j == position {
                            continue;
                        }
                        let context = sequence[j];
                        let negatives = sampler.sample_negatives(rng, cfg.negative_samples, context);
                        epoch_loss.add(model.train_pair(focus, context, &negatives, lr));
                    }
                }
                processed += dropped;
            }

            positive_pairs += epoch_loss.pairs();
            debug!(
                epoch = epoch + 1,
                loss = epoch_loss.mean(),
                pairs = epoch_loss.pairs(),
                learning_rate = lr,
                "Epoch complete"
            );
            epoch_losses.push(epoch_loss.mean());
        }

        let vocabulary = corpus.vocabulary();
        let entries = (0..data.vocabulary_size())
            .map(|i| {
                let id = data.activity(i);
                EmbeddingEntry {
                    label: vocabulary.label_of(id).unwrap_or_default().to_string(),
                    count: vocabulary.count(id),
                    vector: model.row(i).to_vec(),
                }
            })
            .collect();
        let table = EmbeddingTable::new(cfg.vector_dimension, entries)?;

        let excluded_activities = vocabulary
            .iter()
            .filter(|(id, _, _)| data.index_of(*id).is_none())
            .map(|(_, label, _)| label.to_string())
            .collect();
        let separation = separation_of(&model.rows(), data.sequences(), cfg.window_size);

        let report = TrainingReport {
            epochs: cfg.epochs,
            final_learning_rate: lr,
            epoch_losses,
            positive_pairs,
            trained_activities: table.len(),
            excluded_activities,
            separation,
        };

        info!(
            activities = report.trained_activities,
            positive_pairs = report.positive_pairs,
            final_loss = report.final_loss().unwrap_or(0.0),
            "Skip-gram training complete"
        );
        Ok((table, report))
    }
}
