//! Behavior Map Embeddings
//!
//! Learns one dense vector per activity with skip-gram negative sampling
//! over session sequences, and wires the full discovery pipeline:
//! session assembly, training, then clustering.
//!
//! # Example
//!
//! ```
//! use behavior_map_core::config::{ClusteringConfig, Config, TrainingConfig};
//! use behavior_map_core::types::RawEvent;
//! use behavior_map_embeddings::ProcessDiscovery;
//!
//! let config = Config {
//!     training: TrainingConfig::default().with_vector_dimension(16).with_window_size(2),
//!     clustering: ClusteringConfig::default().with_cluster_count(2),
//!     ..Config::default()
//! };
//! let rows = vec![
//!     RawEvent::new("A", "login", 1),
//!     RawEvent::new("A", "pay_bill", 2),
//!     RawEvent::new("B", "login", 1),
//!     RawEvent::new("B", "transfer_funds", 2),
//! ];
//! let outcome = ProcessDiscovery::new(config).unwrap().run(&rows).unwrap();
//! assert_eq!(outcome.assignment.len(), 3);
//! ```

pub mod error;
pub mod pipeline;
pub mod training;

pub use error::{EmbeddingError, EmbeddingResult};
pub use pipeline::{ActivityStats, CorpusSummary, DiscoveryOutcome, ProcessDiscovery};
pub use training::{SkipGramTrainer, TrainingReport};
