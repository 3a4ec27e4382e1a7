//! Sequence corpus: read-only view over assembled sequences and their vocabulary.

pub mod sequences;
pub mod vocabulary;

pub use sequences::{Sequences, SequenceCorpus};
pub use vocabulary::{ActivityId, Vocabulary};
