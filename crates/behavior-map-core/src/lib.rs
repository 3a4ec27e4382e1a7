//! Behavior Map Core Library
//!
//! Data model and the non-training stages of process discovery: turning a
//! raw interaction log into ordered per-session activity sequences, and
//! clustering trained activity vectors into discovered processes.
//!
//! # Architecture
//!
//! - Event types and timestamp parsing ([`types`])
//! - Session assembly with row validation ([`session`])
//! - Sequence corpus and vocabulary ([`corpus`])
//! - Immutable trained vector table ([`embedding`])
//! - Distance metrics ([`similarity`])
//! - K-means and DBSCAN clustering with silhouette quality ([`clustering`])
//! - Layered configuration ([`config`]) and error types ([`error`])
//!
//! # Example
//!
//! ```
//! use behavior_map_core::config::SessionConfig;
//! use behavior_map_core::corpus::SequenceCorpus;
//! use behavior_map_core::session::SessionAssembler;
//! use behavior_map_core::types::RawEvent;
//!
//! let rows = vec![
//!     RawEvent::new("s1", "login", 1),
//!     RawEvent::new("s1", "pay_bill", 2),
//!     RawEvent::new("s2", "login", 1),
//! ];
//! let assembler = SessionAssembler::new(&SessionConfig::default()).unwrap();
//! let (sessions, report) = assembler.assemble(&rows);
//! assert_eq!(report.sessions, 2);
//!
//! let corpus = SequenceCorpus::from_sessions(&sessions);
//! assert_eq!(corpus.vocabulary_size(), 2);
//! assert_eq!(corpus.frequency("login"), 2);
//! ```

pub mod clustering;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod session;
pub mod similarity;
pub mod types;

// Re-exports for convenience
pub use clustering::{ActivityClusterer, Cluster, ClusterAssignment, ClusterError, Clusterer};
pub use config::Config;
pub use corpus::{ActivityId, SequenceCorpus, Vocabulary};
pub use embedding::{EmbeddingEntry, EmbeddingTable};
pub use error::{CoreError, CoreResult};
pub use session::{ActivitySequence, AssemblyReport, SessionAssembler, SessionMap};
pub use similarity::DistanceMetric;
pub use types::{Event, RawEvent, RowDefect, Timestamp};
