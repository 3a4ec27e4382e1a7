//! Error types for embedding training and the discovery pipeline.

use behavior_map_core::{ClusterError, CoreError};
use thiserror::Error;

/// Embedding-specific errors.
///
/// Every variant is fatal and raised before any training work begins.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Training configuration rejected.
    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),

    /// No sequences to train on.
    #[error("Training corpus is empty")]
    EmptyCorpus,

    /// Every vocabulary entry falls below `min_count`.
    #[error("No activity occurs at least {min_count} times (vocabulary size {vocab_size})")]
    AllBelowMinCount { min_count: usize, vocab_size: usize },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Clustering failed: {0}")]
    Cluster(#[from] ClusterError),
}

/// Result type for embedding operations.
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;
