//! Domain types for interaction-log records.

pub mod event;

pub use event::{Event, RawEvent, RawTimestamp, RowDefect, Timestamp};
