//! `sessions`: assemble sessions and report what came out.

use std::path::PathBuf;

use anyhow::Context;
use behavior_map_core::config::Config;
use behavior_map_core::corpus::SequenceCorpus;
use behavior_map_core::session::{AssemblyReport, SessionAssembler};
use behavior_map_core::types::RawEvent;
use behavior_map_embeddings::CorpusSummary;
use clap::Args;
use serde::Serialize;

use crate::ingest::load_events;
use crate::output::write_json;

/// Arguments for the sessions command.
#[derive(Args)]
pub struct SessionsArgs {
    /// JSONL event log (`-` for stdin)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct SessionsReport {
    pub assembly: AssemblyReport,
    pub unparsable_lines: usize,
    pub corpus: CorpusSummary,
    /// Activities below the configured `min_count`.
    pub below_min_count: Vec<String>,
}

pub fn build_report(rows: &[RawEvent], config: &Config) -> anyhow::Result<SessionsReport> {
    let assembler =
        SessionAssembler::new(&config.session).context("invalid session configuration")?;
    let (sessions, assembly) = assembler.assemble(rows);
    let corpus = SequenceCorpus::from_sessions(&sessions);
    let below_min_count = corpus
        .vocabulary()
        .iter()
        .filter(|(_, _, count)| *count < config.training.min_count)
        .map(|(_, label, _)| label.to_string())
        .collect();

    Ok(SessionsReport {
        assembly,
        unparsable_lines: 0,
        corpus: CorpusSummary::from_corpus(&corpus),
        below_min_count,
    })
}

pub fn run(args: SessionsArgs, config: Config) -> anyhow::Result<()> {
    let log = load_events(&args.input)?;
    let mut report = build_report(&log.rows, &config)?;
    report.unparsable_lines = log.unparsable_lines;
    write_json(&report, args.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_and_min_count() {
        let rows = vec![
            RawEvent::new("a", "login", 1),
            RawEvent::new("a", "pay_bill", 2),
            RawEvent::new("b", "login", 1),
            RawEvent::default(),
        ];
        let mut config = Config::default();
        config.training.min_count = 2;

        let report = build_report(&rows, &config).unwrap();
        assert_eq!(report.assembly.sessions, 2);
        assert_eq!(report.assembly.excluded_rows, 1);
        assert_eq!(report.corpus.vocabulary_size, 2);
        assert_eq!(report.below_min_count, vec!["pay_bill".to_string()]);
    }
}
