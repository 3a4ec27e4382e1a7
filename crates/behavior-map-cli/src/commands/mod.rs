//! CLI command handlers
//!
//! # Modules
//!
//! - `discover`: full discovery pipeline
//! - `sessions`: session assembly and vocabulary statistics

pub mod discover;
pub mod sessions;
