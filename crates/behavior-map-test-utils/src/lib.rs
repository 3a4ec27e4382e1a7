//! Seeded synthetic interaction logs for behavior-map tests.
//!
//! Every generator takes an explicit seed so test failures reproduce.

pub mod logs;

pub use logs::{
    banking_sessions, generate_planted_log, malformed_rows, shuffled, PlantedLog, BANKING_PROCESSES,
};
