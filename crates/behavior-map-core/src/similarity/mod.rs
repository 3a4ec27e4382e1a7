//! Vector similarity and distance functions.

pub mod distance;

pub use distance::{cosine_similarity, euclidean_distance, DistanceMetric};
