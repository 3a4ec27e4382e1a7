//! Session assembly: raw rows into ordered per-session activity sequences.
//!
//! # Key Types
//!
//! - [`SessionAssembler`]: validates rows, groups by session, orders by time
//! - [`ActivitySequence`]: the ordered activity labels of one session
//! - [`AssemblyReport`]: counts of everything excluded along the way

pub mod assembler;
pub mod report;
pub mod sequence;

pub use assembler::{SessionAssembler, SessionMap};
pub use report::AssemblyReport;
pub use sequence::ActivitySequence;
