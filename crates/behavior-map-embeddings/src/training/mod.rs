//! Co-occurrence embedding training.
//!
//! # Modules
//!
//! - [`data`]: context windows and min-count filtered training sequences
//! - [`sampling`]: negative-sampling table and frequent-activity subsampling
//! - [`loss`]: skip-gram negative-sampling objective
//! - [`trainer`]: the SGD training loop
//! - [`evaluation`]: co-occurrence separation of trained vectors

pub mod data;
pub mod evaluation;
pub mod loss;
pub mod sampling;
pub mod trainer;

pub use data::{context_pairs, context_range, positive_pair_count, ContextPair, TrainingSequences};
pub use evaluation::{co_occurrence_separation, SeparationMetrics};
pub use loss::{log_sigmoid, sgns_loss, sigmoid, LossAccumulator};
pub use sampling::{NegativeSampler, Subsampler};
pub use trainer::{SkipGramTrainer, TrainingReport};
