//! Session assembler.
//!
//! # Algorithm
//!
//! 1. Validate every row once; malformed rows are counted and skipped
//! 2. Drop rows whose activity matches an exclusion pattern
//! 3. Partition the remaining events by session id
//! 4. Sort each partition by (timestamp, input position)
//! 5. Project to labels, optionally collapsing consecutive repeats
//! 6. Drop sequences shorter than the configured minimum
//!
//! Step 4-5 run per session in parallel; output order is the session id
//! order of the resulting `BTreeMap`, so results do not depend on threading.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use regex::{Regex, RegexSet};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::error::{CoreError, CoreResult};
use crate::types::{RawEvent, Timestamp};

use super::report::AssemblyReport;
use super::sequence::ActivitySequence;

/// Session id to ordered activity sequence.
pub type SessionMap = BTreeMap<String, ActivitySequence>;

/// Groups validated events into per-session activity sequences.
#[derive(Debug, Clone)]
pub struct SessionAssembler {
    exclusions: Option<RegexSet>,
    remove_repeats: bool,
    min_sequence_length: usize,
}

/// (timestamp, input position, activity) for one accepted row.
type PendingStep = (Timestamp, usize, String);

impl SessionAssembler {
    /// Create an assembler.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPattern` if an exclusion pattern does not
    /// compile, or `CoreError::ConfigError` for an invalid session config.
    pub fn new(config: &SessionConfig) -> CoreResult<Self> {
        config.validate()?;

        let exclusions = if config.drop_activities.is_empty() {
            None
        } else {
            for pattern in &config.drop_activities {
                Regex::new(pattern).map_err(|e| CoreError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            }
            let set = RegexSet::new(&config.drop_activities).map_err(|e| {
                CoreError::InvalidPattern {
                    pattern: config.drop_activities.join("|"),
                    message: e.to_string(),
                }
            })?;
            Some(set)
        };

        Ok(Self {
            exclusions,
            remove_repeats: config.remove_repeats,
            min_sequence_length: config.min_sequence_length,
        })
    }

    /// Whether an activity label is removed by the exclusion patterns.
    pub fn is_excluded(&self, activity: &str) -> bool {
        self.exclusions
            .as_ref()
            .map(|set| set.is_match(activity))
            .unwrap_or(false)
    }

    /// Assemble rows into per-session sequences.
    ///
    /// Deterministic: the same rows always yield the same sequences.
    pub fn assemble<I, R>(&self, rows: I) -> (SessionMap, AssemblyReport)
    where
        I: IntoIterator<Item = R>,
        R: Borrow<RawEvent>,
    {
        let mut report = AssemblyReport::default();
        let mut groups: BTreeMap<String, Vec<PendingStep>> = BTreeMap::new();
        let mut seen_sessions: BTreeSet<String> = BTreeSet::new();

        for (position, row) in rows.into_iter().enumerate() {
            let row = row.borrow();
            report.total_rows += 1;

            let event = match row.validate() {
                Ok(event) => event,
                Err(defect) => {
                    if let Some(key) = row.session_key() {
                        seen_sessions.insert(key.to_string());
                    }
                    report.record_defect(defect);
                    continue;
                }
            };

            if self.is_excluded(&event.activity) {
                report.filtered_rows += 1;
                seen_sessions.insert(event.session_id);
                continue;
            }

            report.accepted_rows += 1;
            groups
                .entry(event.session_id)
                .or_default()
                .push((event.timestamp, position, event.activity));
        }

        report.dropped_sessions = seen_sessions
            .iter()
            .filter(|session| !groups.contains_key(*session))
            .count();

        let remove_repeats = self.remove_repeats;
        let ordered: Vec<(String, ActivitySequence)> = groups
            .into_iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(session_id, steps)| (session_id, order_steps(steps, remove_repeats)))
            .collect();

        let mut sessions = SessionMap::new();
        for (session_id, sequence) in ordered {
            if sequence.len() < self.min_sequence_length {
                report.short_sessions_dropped += 1;
                continue;
            }
            if sequence.len() == 1 {
                report.single_event_sessions += 1;
            }
            sessions.insert(session_id, sequence);
        }
        report.sessions = sessions.len();

        if report.excluded_rows > 0 {
            warn!(
                excluded_rows = report.excluded_rows,
                total_rows = report.total_rows,
                "Excluded malformed rows during session assembly"
            );
        }
        if report.dropped_sessions > 0 {
            warn!(
                dropped_sessions = report.dropped_sessions,
                "Dropped sessions with no valid events"
            );
        }
        debug!(
            sessions = report.sessions,
            accepted_rows = report.accepted_rows,
            filtered_rows = report.filtered_rows,
            short_sessions_dropped = report.short_sessions_dropped,
            "Session assembly complete"
        );

        (sessions, report)
    }
}

/// Order one session's steps by time and project to labels.
fn order_steps(mut steps: Vec<PendingStep>, remove_repeats: bool) -> ActivitySequence {
    // Equal timestamps keep input order.
    steps.sort_unstable_by_key(|(timestamp, position, _)| (*timestamp, *position));
    let mut sequence: ActivitySequence = steps.into_iter().map(|(_, _, activity)| activity).collect();
    if remove_repeats {
        sequence.collapse_repeats();
    }
    sequence
}
