//! Interaction logs with planted processes.
//!
//! A planted log is built from a fixed set of processes (ordered activity
//! lists). Each generated session walks one process from start to end, so
//! the activities of a process co-occur while activities of different
//! processes never share a session.

use behavior_map_core::types::{RawEvent, RawTimestamp};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Three disjoint banking processes.
pub const BANKING_PROCESSES: &[&[&str]] = &[
    &["open_bills", "select_payee", "enter_amount", "confirm_payment"],
    &["open_loans", "check_rates", "fill_application", "upload_documents"],
    &["open_cards", "report_lost", "freeze_card", "order_replacement"],
];

/// The two-session login/transaction/logout scenario.
///
/// Session A: `login, view_balance, pay_bill, logout`.
/// Session B: `login, view_balance, transfer_funds, logout`.
pub fn banking_sessions() -> Vec<RawEvent> {
    let mut rows = Vec::new();
    for (session, middle) in [("A", "pay_bill"), ("B", "transfer_funds")] {
        for (t, activity) in ["login", "view_balance", middle, "logout"].iter().enumerate() {
            rows.push(RawEvent::new(session, *activity, t as i64));
        }
    }
    rows
}

/// A generated log plus the process each session walked.
#[derive(Debug, Clone)]
pub struct PlantedLog {
    pub rows: Vec<RawEvent>,
    /// `(session_id, process index)` in generation order.
    pub sessions: Vec<(String, usize)>,
}

impl PlantedLog {
    /// Number of events generated for `session_id`.
    pub fn events_in(&self, session_id: &str) -> usize {
        self.rows
            .iter()
            .filter(|r| r.session_id.as_deref() == Some(session_id))
            .count()
    }
}

/// Generate `session_count` sessions over `processes`.
///
/// Timestamps increase within a session, start at a random offset, and
/// occasionally repeat so tie-breaking by input order is exercised. Rows of
/// different sessions are interleaved.
pub fn generate_planted_log(processes: &[&[&str]], session_count: usize, seed: u64) -> PlantedLog {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut per_session: Vec<Vec<RawEvent>> = Vec::with_capacity(session_count);
    let mut sessions = Vec::with_capacity(session_count);

    for s in 0..session_count {
        let process = rng.gen_range(0..processes.len());
        let session_id = format!("session-{:04}", s);
        let mut t: i64 = rng.gen_range(0..10_000);
        let events = processes[process]
            .iter()
            .map(|activity| {
                if rng.gen_bool(0.8) {
                    t += rng.gen_range(1..60);
                }
                RawEvent::new(session_id.as_str(), *activity, t)
            })
            .collect();
        per_session.push(events);
        sessions.push((session_id, process));
    }

    let mut rows = Vec::new();
    let mut cursors = vec![0usize; per_session.len()];
    let mut remaining: Vec<usize> = (0..per_session.len()).collect();
    while !remaining.is_empty() {
        let pick = rng.gen_range(0..remaining.len());
        let s = remaining[pick];
        rows.push(per_session[s][cursors[s]].clone());
        cursors[s] += 1;
        if cursors[s] == per_session[s].len() {
            remaining.swap_remove(pick);
        }
    }

    PlantedLog { rows, sessions }
}

/// One row per defect kind, all for session `bad`.
pub fn malformed_rows() -> Vec<RawEvent> {
    vec![
        RawEvent {
            session_id: None,
            activity: Some("login".into()),
            timestamp: Some(RawTimestamp::Ordinal(1)),
        },
        RawEvent {
            session_id: Some("bad".into()),
            activity: Some("   ".into()),
            timestamp: Some(RawTimestamp::Ordinal(2)),
        },
        RawEvent {
            session_id: Some("bad".into()),
            activity: Some("login".into()),
            timestamp: None,
        },
        RawEvent {
            session_id: Some("bad".into()),
            activity: Some("login".into()),
            timestamp: Some(RawTimestamp::Text("not-a-time".into())),
        },
    ]
}

/// A seeded permutation of `rows`.
pub fn shuffled(rows: &[RawEvent], seed: u64) -> Vec<RawEvent> {
    let mut out = rows.to_vec();
    out.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    out
}
