//! End-to-end process discovery.
//!
//! raw rows → [`SessionAssembler`] → [`SequenceCorpus`] →
//! [`SkipGramTrainer`] → [`ActivityClusterer`] → [`ClusterAssignment`]
//!
//! Every configuration error is raised before training starts; malformed
//! rows are counted in the [`AssemblyReport`] and never abort a run.

use std::borrow::Borrow;

use behavior_map_core::clustering::{ActivityClusterer, Cluster, ClusterAssignment};
use behavior_map_core::config::Config;
use behavior_map_core::corpus::SequenceCorpus;
use behavior_map_core::embedding::EmbeddingTable;
use behavior_map_core::session::{AssemblyReport, SessionAssembler};
use behavior_map_core::types::RawEvent;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::training::{SkipGramTrainer, TrainingReport};

/// Per-activity corpus statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityStats {
    pub label: String,
    pub count: usize,
    pub session_count: usize,
    pub volume_percentile: f64,
}

/// Corpus-level statistics, in vocabulary order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub sequences: usize,
    pub total_activities: usize,
    pub vocabulary_size: usize,
    pub activities: Vec<ActivityStats>,
}

impl CorpusSummary {
    pub fn from_corpus(corpus: &SequenceCorpus) -> Self {
        let vocabulary = corpus.vocabulary();
        let activities = vocabulary
            .iter()
            .map(|(id, label, count)| ActivityStats {
                label: label.to_string(),
                count,
                session_count: vocabulary.session_count(id),
                volume_percentile: vocabulary.volume_percentile(id).unwrap_or(0.0),
            })
            .collect();
        Self {
            sequences: corpus.len(),
            total_activities: corpus.total_activities(),
            vocabulary_size: corpus.vocabulary_size(),
            activities,
        }
    }
}

/// Everything a discovery run produces.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryOutcome {
    pub assembly: AssemblyReport,
    pub corpus: CorpusSummary,
    pub embeddings: EmbeddingTable,
    pub assignment: ClusterAssignment,
    pub clusters: Vec<Cluster>,
    /// Mean silhouette of the whole assignment.
    pub silhouette: f32,
    pub training: TrainingReport,
}

/// The configured discovery pipeline.
#[derive(Debug)]
pub struct ProcessDiscovery {
    config: Config,
    assembler: SessionAssembler,
    clusterer: ActivityClusterer,
}

impl ProcessDiscovery {
    /// Validate `config` and build every stage.
    ///
    /// # Errors
    ///
    /// Any configuration error, including an invalid exclusion pattern.
    pub fn new(config: Config) -> EmbeddingResult<Self> {
        config.validate()?;
        let assembler = SessionAssembler::new(&config.session)?;
        let clusterer = ActivityClusterer::new(config.clustering.clone())?;
        Ok(Self {
            config,
            assembler,
            clusterer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run with a random source seeded from `config.seed`.
    pub fn run<I, R>(&self, rows: I) -> EmbeddingResult<DiscoveryOutcome>
    where
        I: IntoIterator<Item = R>,
        R: Borrow<RawEvent>,
    {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.run_with_rng(rows, &mut rng)
    }

    /// Run with an explicit random source threaded through training and
    /// clustering.
    ///
    /// # Errors
    ///
    /// - `EmbeddingError::EmptyCorpus` if no session survives assembly
    /// - `EmbeddingError::AllBelowMinCount` if nothing is frequent enough
    /// - `EmbeddingError::Cluster` if `cluster_count` exceeds the trainable
    ///   vocabulary (checked before training)
    pub fn run_with_rng<I, R>(&self, rows: I, rng: &mut dyn RngCore) -> EmbeddingResult<DiscoveryOutcome>
    where
        I: IntoIterator<Item = R>,
        R: Borrow<RawEvent>,
    {
        let (sessions, assembly) = self.assembler.assemble(rows);
        let corpus = SequenceCorpus::from_sessions(&sessions);
        if corpus.is_empty() {
            return Err(EmbeddingError::EmptyCorpus);
        }

        let min_count = self.config.training.min_count;
        let trainable = corpus.vocabulary().ids_with_min_count(min_count).len();
        if trainable == 0 {
            return Err(EmbeddingError::AllBelowMinCount {
                min_count,
                vocab_size: corpus.vocabulary_size(),
            });
        }
        self.clusterer.check_capacity(trainable)?;

        let trainer = SkipGramTrainer::new(self.config.training.clone())?;
        let (embeddings, training) = trainer.train(&corpus, rng)?;

        let assignment = self.clusterer.cluster(&embeddings, rng)?;
        let metric = self.config.clustering.metric;
        let clusters = assignment.clusters(&embeddings, metric);
        let silhouette = assignment.silhouette(&embeddings, metric);

        info!(
            sessions = assembly.sessions,
            excluded_rows = assembly.excluded_rows,
            activities = embeddings.len(),
            clusters = assignment.cluster_count(),
            silhouette = silhouette,
            "Process discovery complete"
        );

        Ok(DiscoveryOutcome {
            assembly,
            corpus: CorpusSummary::from_corpus(&corpus),
            embeddings,
            assignment,
            clusters,
            silhouette,
            training,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use behavior_map_core::config::{ClusteringConfig, SessionConfig, TrainingConfig};

    fn config(k: usize) -> Config {
        Config {
            training: TrainingConfig::default()
                .with_vector_dimension(8)
                .with_window_size(2)
                .with_epochs(5),
            clustering: ClusteringConfig::default().with_cluster_count(k),
            ..Config::default()
        }
    }

    fn rows() -> Vec<RawEvent> {
        vec![
            RawEvent::new("A", "login", 1),
            RawEvent::new("A", "pay_bill", 2),
            RawEvent::new("A", "logout", 3),
            RawEvent::new("B", "login", 1),
            RawEvent::new("B", "logout", 2),
        ]
    }

    #[test]
    fn test_cluster_count_checked_before_training() {
        let discovery = ProcessDiscovery::new(config(4)).unwrap();
        let err = discovery.run(&rows()).unwrap_err();
        assert!(matches!(err, EmbeddingError::Cluster(_)), "{}", err);
    }

    #[test]
    fn test_invalid_pattern_rejected_at_construction() {
        let mut cfg = config(2);
        cfg.session = SessionConfig::default().with_drop_activities(["(unclosed"]);
        let err = ProcessDiscovery::new(cfg).unwrap_err();
        assert!(matches!(err, EmbeddingError::Core(_)));
    }

    #[test]
    fn test_all_rows_malformed_is_empty_corpus() {
        let discovery = ProcessDiscovery::new(config(1)).unwrap();
        let err = discovery.run(vec![RawEvent::default()]).unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyCorpus));
    }

    #[test]
    fn test_outcome_is_consistent() {
        let discovery = ProcessDiscovery::new(config(2)).unwrap();
        let outcome = discovery.run(&rows()).unwrap();

        assert_eq!(outcome.corpus.vocabulary_size, 3);
        assert_eq!(outcome.embeddings.len(), 3);
        assert_eq!(outcome.assignment.len(), 3);
        assert_eq!(outcome.clusters.len(), outcome.assignment.cluster_count());
        assert_eq!(outcome.training.epoch_losses.len(), 5);
        println!("[PASS] test_outcome_is_consistent map={:?}", outcome.assignment.to_map());
    }
}
