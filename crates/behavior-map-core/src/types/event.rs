//! Interaction-log records.
//!
//! A [`RawEvent`] is one row as ingestion produced it: every field optional,
//! timestamps in whatever shape the source used. Validation happens exactly
//! once, at the assembly boundary, turning a raw row into a typed [`Event`]
//! or a [`RowDefect`] explaining why the row was excluded.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Naive (offset-free) datetime layouts, read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Totally ordered occurrence time of an event, in nanosecond ticks.
///
/// Datetimes are stored as nanoseconds since the Unix epoch. Numeric
/// sources (integer or fractional) are read as seconds on the same scale,
/// so a plain counter `1, 2, 3` keeps its order. Only relative order matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i128);

impl Timestamp {
    /// Timestamp for a whole number of seconds.
    pub fn from_seconds(seconds: i64) -> Self {
        Self(i128::from(seconds) * NANOS_PER_SECOND)
    }

    /// Timestamp for fractional seconds; `None` if non-finite or out of range.
    pub fn from_fractional_seconds(seconds: f64) -> Option<Self> {
        if !seconds.is_finite() || seconds.abs() >= 1e20 {
            return None;
        }
        // Split first so the fraction keeps full precision at epoch scale.
        let whole = seconds.trunc();
        let fraction = ((seconds - whole) * NANOS_PER_SECOND as f64).round();
        Some(Self(whole as i128 * NANOS_PER_SECOND + fraction as i128))
    }

    /// Raw tick value.
    #[inline]
    pub fn value(&self) -> i128 {
        self.0
    }
}

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(value: DateTime<Tz>) -> Self {
        let seconds = i128::from(value.timestamp());
        Self(seconds * NANOS_PER_SECOND + i128::from(value.timestamp_subsec_nanos()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp as it arrives from ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Integer seconds or a sequence counter.
    Ordinal(i64),
    /// Fractional seconds, e.g. `1700000000.25`.
    Fractional(f64),
    /// Textual timestamp: RFC 3339, ISO 8601 without offset (`T` or space
    /// separated), a bare `YYYY-MM-DD` date, or a number.
    Text(String),
}

impl RawTimestamp {
    /// Parse into a comparable [`Timestamp`], or `None` if unparseable.
    pub fn parse(&self) -> Option<Timestamp> {
        match self {
            RawTimestamp::Ordinal(v) => Some(Timestamp::from_seconds(*v)),
            RawTimestamp::Fractional(v) => Timestamp::from_fractional_seconds(*v),
            RawTimestamp::Text(text) => parse_text(text.trim()),
        }
    }
}

fn parse_text(text: &str) -> Option<Timestamp> {
    if text.is_empty() {
        return None;
    }
    if let Ok(v) = text.parse::<i64>() {
        return Some(Timestamp::from_seconds(v));
    }
    if let Ok(v) = text.parse::<f64>() {
        return Timestamp::from_fractional_seconds(v);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.into());
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().into());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().into())
}

impl From<i64> for RawTimestamp {
    fn from(value: i64) -> Self {
        RawTimestamp::Ordinal(value)
    }
}

impl From<i32> for RawTimestamp {
    fn from(value: i32) -> Self {
        RawTimestamp::Ordinal(i64::from(value))
    }
}

impl From<f64> for RawTimestamp {
    fn from(value: f64) -> Self {
        RawTimestamp::Fractional(value)
    }
}

impl From<&str> for RawTimestamp {
    fn from(value: &str) -> Self {
        RawTimestamp::Text(value.to_string())
    }
}

/// Why a raw row was excluded from assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RowDefect {
    MissingSessionId,
    MissingActivity,
    MissingTimestamp,
    UnparseableTimestamp,
}

/// One unvalidated log row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,
}

impl RawEvent {
    /// Build a fully populated row.
    pub fn new(
        session_id: impl Into<String>,
        activity: impl Into<String>,
        timestamp: impl Into<RawTimestamp>,
    ) -> Self {
        Self {
            session_id: Some(session_id.into()),
            activity: Some(activity.into()),
            timestamp: Some(timestamp.into()),
        }
    }

    /// Validate this row into an [`Event`].
    ///
    /// Session id and activity are trimmed; blank values count as missing.
    pub fn validate(&self) -> Result<Event, RowDefect> {
        let session_id = non_blank(self.session_id.as_deref()).ok_or(RowDefect::MissingSessionId)?;
        let activity = non_blank(self.activity.as_deref()).ok_or(RowDefect::MissingActivity)?;
        let timestamp = self
            .timestamp
            .as_ref()
            .ok_or(RowDefect::MissingTimestamp)?
            .parse()
            .ok_or(RowDefect::UnparseableTimestamp)?;

        Ok(Event {
            session_id: session_id.to_string(),
            activity: activity.to_string(),
            timestamp,
        })
    }

    /// Session id if present and non-blank, even when the row is otherwise invalid.
    pub fn session_key(&self) -> Option<&str> {
        non_blank(self.session_id.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A validated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub session_id: String,
    pub activity: String,
    pub timestamp: Timestamp,
}
