//! Session assembly properties over seeded synthetic logs.

use std::collections::{BTreeSet, HashMap};

use behavior_map_core::config::SessionConfig;
use behavior_map_core::corpus::SequenceCorpus;
use behavior_map_core::session::SessionAssembler;
use behavior_map_core::types::{RawEvent, RowDefect, Timestamp};
use behavior_map_test_utils::{
    banking_sessions, generate_planted_log, malformed_rows, shuffled, BANKING_PROCESSES,
};

fn assembler() -> SessionAssembler {
    SessionAssembler::new(&SessionConfig::default()).unwrap()
}

fn timestamps_by_session(rows: &[RawEvent]) -> HashMap<(String, String), Timestamp> {
    rows.iter()
        .filter_map(|r| r.validate().ok())
        .map(|e| ((e.session_id, e.activity), e.timestamp))
        .collect()
}

#[test]
fn test_sequences_follow_timestamps_under_permutation() {
    for seed in 0..25u64 {
        let log = generate_planted_log(BANKING_PROCESSES, 30, seed);
        let rows = shuffled(&log.rows, seed + 1_000);
        let times = timestamps_by_session(&rows);

        let (sessions, report) = assembler().assemble(&rows);
        assert!(report.is_clean());
        assert_eq!(sessions.len(), 30);

        for (session_id, sequence) in &sessions {
            assert_eq!(
                sequence.len(),
                log.events_in(session_id),
                "seed {} session {}: length must equal event count",
                seed,
                session_id
            );
            let ordered: Vec<Timestamp> = sequence
                .iter()
                .map(|a| times[&(session_id.clone(), a.to_string())])
                .collect();
            assert!(
                ordered.windows(2).all(|w| w[0] <= w[1]),
                "seed {} session {}: out of order {:?}",
                seed,
                session_id,
                ordered
            );
        }
    }
    println!("[PASS] test_sequences_follow_timestamps_under_permutation (25 seeds)");
}

#[test]
fn test_interleaved_rows_recover_planted_processes() {
    let log = generate_planted_log(BANKING_PROCESSES, 40, 11);
    let (sessions, _) = assembler().assemble(&log.rows);

    for (session_id, process) in &log.sessions {
        let expected: Vec<String> = BANKING_PROCESSES[*process]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(sessions[session_id].activities(), expected.as_slice());
    }
}

#[test]
fn test_assembly_is_idempotent() {
    let log = generate_planted_log(BANKING_PROCESSES, 50, 3);
    let assembler = assembler();
    let first = assembler.assemble(&log.rows);
    let second = assembler.assemble(&log.rows);
    assert_eq!(first, second);
}

#[test]
fn test_malformed_rows_counted_not_fatal() {
    let mut rows = banking_sessions();
    rows.extend(malformed_rows());

    let (sessions, report) = assembler().assemble(&rows);
    assert_eq!(sessions.len(), 2);
    assert_eq!(report.total_rows, 12);
    assert_eq!(report.excluded_rows, 4);
    assert_eq!(report.defect_count(RowDefect::MissingSessionId), 1);
    assert_eq!(report.defect_count(RowDefect::MissingActivity), 1);
    assert_eq!(report.defect_count(RowDefect::MissingTimestamp), 1);
    assert_eq!(report.defect_count(RowDefect::UnparseableTimestamp), 1);
    assert_eq!(report.dropped_sessions, 1, "session 'bad' had no valid rows");
    println!("[PASS] test_malformed_rows_counted_not_fatal report={:?}", report);
}

#[test]
fn test_vocabulary_counts_every_distinct_label() {
    let mut rows = banking_sessions();
    rows.push(RawEvent::new("C", "one_off_survey", 0));

    let (sessions, report) = assembler().assemble(&rows);
    assert_eq!(report.single_event_sessions, 1);

    let corpus = SequenceCorpus::from_sessions(&sessions);
    let distinct: BTreeSet<&str> = sessions.values().flat_map(|s| s.iter()).collect();

    assert_eq!(corpus.vocabulary_size(), distinct.len());
    assert_eq!(corpus.vocabulary_size(), 6);
    assert_eq!(corpus.frequency("one_off_survey"), 1);
    assert_eq!(corpus.frequency("login"), 2);
    assert_eq!(corpus.session_count("logout"), 2);
    assert!(corpus.volume_percentile("login") > corpus.volume_percentile("pay_bill"));
}

#[test]
fn test_offset_free_and_sub_millisecond_timestamps_order_sessions() {
    let rows = vec![
        RawEvent::new("iso", "pay_bill", "2024-03-01T09:16:00"),
        RawEvent::new("iso", "login", "2024-03-01T09:15:00"),
        RawEvent::new("day", "close", "2024-03-02"),
        RawEvent::new("day", "open", "2024-03-01"),
        RawEvent::new("fine", "second", "2024-03-01T09:15:00.000200Z"),
        RawEvent::new("fine", "first", "2024-03-01T09:15:00.000100Z"),
        RawEvent::new("frac", "later", 1_700_000_000.5),
        RawEvent::new("frac", "earlier", "1700000000.25"),
    ];

    let (sessions, report) = assembler().assemble(&rows);
    assert!(report.is_clean(), "every row is valid: {:?}", report);
    assert_eq!(sessions["iso"].activities(), &["login", "pay_bill"]);
    assert_eq!(sessions["day"].activities(), &["open", "close"]);
    assert_eq!(sessions["fine"].activities(), &["first", "second"]);
    assert_eq!(sessions["frac"].activities(), &["earlier", "later"]);
    println!("[PASS] timestamp shapes order sessions by time, not input order");
}
