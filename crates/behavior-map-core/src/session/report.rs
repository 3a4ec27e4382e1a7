//! Assembly diagnostics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::RowDefect;

/// What assembly kept and what it excluded.
///
/// Malformed rows are recovered from locally: they are counted here rather
/// than raised as errors, since partial logs are expected in practice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReport {
    /// Rows presented to the assembler.
    pub total_rows: usize,
    /// Rows that became part of a sequence (before repeat collapsing).
    pub accepted_rows: usize,
    /// Rows failing validation.
    pub excluded_rows: usize,
    /// Breakdown of `excluded_rows` by defect.
    pub defects: BTreeMap<RowDefect, usize>,
    /// Valid rows removed by an activity exclusion pattern.
    pub filtered_rows: usize,
    /// Sessions whose every row was malformed or filtered.
    pub dropped_sessions: usize,
    /// Sessions dropped for being shorter than the minimum sequence length.
    pub short_sessions_dropped: usize,
    /// Sessions present in the output.
    pub sessions: usize,
    /// Output sessions with exactly one step (contribute no context pairs).
    pub single_event_sessions: usize,
}

impl AssemblyReport {
    pub(crate) fn record_defect(&mut self, defect: RowDefect) {
        self.excluded_rows += 1;
        *self.defects.entry(defect).or_insert(0) += 1;
    }

    /// Count of excluded rows for a specific defect.
    pub fn defect_count(&self, defect: RowDefect) -> usize {
        self.defects.get(&defect).copied().unwrap_or(0)
    }

    /// True when no row was excluded or filtered.
    pub fn is_clean(&self) -> bool {
        self.excluded_rows == 0 && self.filtered_rows == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_defect_updates_totals() {
        let mut report = AssemblyReport::default();
        assert!(report.is_clean());

        report.record_defect(RowDefect::MissingActivity);
        report.record_defect(RowDefect::MissingActivity);
        report.record_defect(RowDefect::MissingTimestamp);

        assert_eq!(report.excluded_rows, 3);
        assert_eq!(report.defect_count(RowDefect::MissingActivity), 2);
        assert_eq!(report.defect_count(RowDefect::MissingSessionId), 0);
        assert!(!report.is_clean());
    }
}
