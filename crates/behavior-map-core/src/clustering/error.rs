//! Error types for clustering operations.

use thiserror::Error;

/// Errors that can occur during clustering operations.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Not enough data points for clustering.
    #[error("Insufficient data: required {required}, actual {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual data points provided
        actual: usize,
    },

    /// Requested more clusters than there are vectors to cluster.
    #[error("Cluster count {requested} exceeds the {available} activities available for clustering")]
    TooManyClusters {
        /// Configured cluster count
        requested: usize,
        /// Activities eligible for clustering
        available: usize,
    },

    /// Vectors of differing dimension were supplied.
    #[error("Dimension mismatch: expected {expected}, actual {actual}")]
    DimensionMismatch {
        /// Dimension of the first vector
        expected: usize,
        /// Offending dimension
        actual: usize,
    },

    /// Invalid parameter provided.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of what's wrong with the parameter
        message: String,
    },
}

impl ClusterError {
    /// Create an InsufficientData error.
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Create a TooManyClusters error.
    pub fn too_many_clusters(requested: usize, available: usize) -> Self {
        Self::TooManyClusters {
            requested,
            available,
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Whether the error stems from configuration rather than data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ClusterError::TooManyClusters { .. } | ClusterError::InvalidParameter { .. }
        )
    }
}
