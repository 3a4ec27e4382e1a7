//! JSONL event log loading.
//!
//! One JSON object per line:
//!
//! ```text
//! {"session_id": "u1", "activity": "login", "timestamp": "2024-03-01T09:15:00Z"}
//! ```
//!
//! Lines that are not valid JSON are kept as empty rows so session assembly
//! counts them as malformed instead of the load failing. A JSON object with
//! a field of the wrong shape keeps its session id, so the row is counted
//! against its session.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use behavior_map_core::types::{RawEvent, RawTimestamp};
use serde_json::Value;
use tracing::{debug, warn};

/// Rows read from a log, plus how many lines failed to parse.
#[derive(Debug, Default)]
pub struct LoadedLog {
    pub rows: Vec<RawEvent>,
    pub unparsable_lines: usize,
}

/// Read events from `path`, or from stdin when `path` is `-`.
pub fn load_events(path: &Path) -> anyhow::Result<LoadedLog> {
    if path == Path::new("-") {
        return read_events(io::stdin().lock());
    }
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let log = read_events(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        rows = log.rows.len(),
        unparsable_lines = log.unparsable_lines,
        "Loaded event log"
    );
    Ok(log)
}

pub fn read_events<R: BufRead>(reader: R) -> anyhow::Result<LoadedLog> {
    let mut log = LoadedLog::default();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", line_no + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawEvent>(trimmed) {
            Ok(row) => log.rows.push(row),
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "Unparsable event line");
                log.unparsable_lines += 1;
                log.rows.push(salvage_row(trimmed));
            }
        }
    }
    Ok(log)
}

/// Keep what can be read from a line that failed typed deserialization.
fn salvage_row(line: &str) -> RawEvent {
    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(line) else {
        return RawEvent::default();
    };
    let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
    RawEvent {
        session_id: text("session_id"),
        activity: text("activity"),
        // Present but unreadable stays present, so it reports as unparseable.
        timestamp: fields
            .get("timestamp")
            .filter(|v| !v.is_null())
            .map(|v| RawTimestamp::Text(v.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use behavior_map_core::types::RowDefect;
    use std::io::Write;

    #[test]
    fn test_reads_mixed_timestamp_shapes() {
        let input = r#"{"session_id":"u1","activity":"login","timestamp":1}
{"session_id":"u1","activity":"logout","timestamp":"2024-03-01T09:15:00Z"}

{"session_id":"u2","activity":"login"}
"#;
        let log = read_events(input.as_bytes()).unwrap();
        assert_eq!(log.rows.len(), 3);
        assert_eq!(log.unparsable_lines, 0);
        assert!(log.rows[0].validate().is_ok());
        assert!(log.rows[1].validate().is_ok());
        assert!(log.rows[2].validate().is_err(), "missing timestamp");
    }

    #[test]
    fn test_invalid_json_becomes_malformed_row() {
        let log = read_events("not json\n{\"session_id\":\"a\"".as_bytes()).unwrap();
        assert_eq!(log.unparsable_lines, 2);
        assert_eq!(log.rows, vec![RawEvent::default(), RawEvent::default()]);
    }

    #[test]
    fn test_fractional_and_wrongly_typed_timestamps() {
        let input = r#"{"session_id":"u1","activity":"login","timestamp":1700000000.25}
{"session_id":"u2","activity":"login","timestamp":true}
"#;
        let log = read_events(input.as_bytes()).unwrap();
        assert_eq!(log.rows.len(), 2);
        assert_eq!(log.unparsable_lines, 1);
        assert!(log.rows[0].validate().is_ok());

        assert_eq!(log.rows[1].session_key(), Some("u2"));
        assert_eq!(log.rows[1].validate(), Err(RowDefect::UnparseableTimestamp));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"session_id":"s","activity":"a","timestamp":3}}"#).unwrap();
        let log = load_events(file.path()).unwrap();
        assert_eq!(log.rows, vec![RawEvent::new("s", "a", 3)]);
        assert!(load_events(Path::new("/nonexistent/events.jsonl")).is_err());
    }
}
