//! Activity clustering: partition trained vectors into discovered processes.
//!
//! # Key Types
//!
//! - [`Clusterer`]: pluggable clustering policy (`KMeans`, `Dbscan`)
//! - [`ActivityClusterer`]: runs the configured policy over an [`EmbeddingTable`]
//! - [`ClusterAssignment`]: activity → dense cluster id
//! - [`Cluster`]: per-cluster members, centroid and silhouette
//!
//! [`EmbeddingTable`]: crate::embedding::EmbeddingTable

pub mod assignment;
pub mod cluster;
pub mod dbscan;
pub mod error;
pub mod kmeans;
pub mod quality;
pub mod traits;

pub use assignment::{build_clusterer, ActivityClusterer, ClusterAssignment};
pub use cluster::{Cluster, HIGH_QUALITY_THRESHOLD};
pub use dbscan::Dbscan;
pub use error::ClusterError;
pub use kmeans::KMeans;
pub use quality::{silhouette_samples, silhouette_score};
pub use traits::{densify_labels, Clusterer};
