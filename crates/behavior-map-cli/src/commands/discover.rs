//! `discover`: run the full pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use behavior_map_core::clustering::Cluster;
use behavior_map_core::config::{ClusteringMethod, Config};
use behavior_map_core::embedding::EmbeddingTable;
use behavior_map_core::session::AssemblyReport;
use behavior_map_embeddings::{CorpusSummary, DiscoveryOutcome, ProcessDiscovery, TrainingReport};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::ingest::load_events;
use crate::output::write_json;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum MethodArg {
    Kmeans,
    Dbscan,
}

impl From<MethodArg> for ClusteringMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Kmeans => ClusteringMethod::KMeans,
            MethodArg::Dbscan => ClusteringMethod::Dbscan,
        }
    }
}

/// Arguments for the discover command.
#[derive(Args)]
pub struct DiscoverArgs {
    /// JSONL event log (`-` for stdin)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seed for training and clustering
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of clusters (k-means)
    #[arg(short = 'k', long)]
    pub cluster_count: Option<usize>,

    /// Clustering method
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// Minimum occurrences for an activity to be trained and clustered
    #[arg(long)]
    pub min_count: Option<usize>,

    /// Include the trained vectors in the output
    #[arg(long)]
    pub include_vectors: bool,
}

impl DiscoverArgs {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(k) = self.cluster_count {
            config.clustering.cluster_count = k;
        }
        if let Some(method) = self.method {
            config.clustering.method = method.into();
        }
        if let Some(min_count) = self.min_count {
            config.training.min_count = min_count;
        }
        config
    }
}

/// What `discover` prints.
#[derive(Debug, Serialize)]
pub struct DiscoveryReport {
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub assignment: BTreeMap<String, usize>,
    pub clusters: Vec<Cluster>,
    pub silhouette: f32,
    pub assembly: AssemblyReport,
    pub corpus: CorpusSummary,
    pub training: TrainingReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<EmbeddingTable>,
}

impl DiscoveryReport {
    fn new(seed: u64, outcome: DiscoveryOutcome, include_vectors: bool) -> Self {
        Self {
            generated_at: Utc::now(),
            seed,
            assignment: outcome.assignment.to_map(),
            clusters: outcome.clusters,
            silhouette: outcome.silhouette,
            assembly: outcome.assembly,
            corpus: outcome.corpus,
            training: outcome.training,
            embeddings: include_vectors.then_some(outcome.embeddings),
        }
    }
}

pub fn run(args: DiscoverArgs, config: Config) -> anyhow::Result<()> {
    let config = args.apply(config);
    let seed = config.seed;
    let log = load_events(&args.input)?;

    let discovery = ProcessDiscovery::new(config).context("invalid configuration")?;
    let outcome = discovery.run(&log.rows).context("process discovery failed")?;

    info!(
        rows = log.rows.len(),
        unparsable_lines = log.unparsable_lines,
        clusters = outcome.assignment.cluster_count(),
        "Discovery finished"
    );

    let report = DiscoveryReport::new(seed, outcome, args.include_vectors);
    write_json(&report, args.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(input: PathBuf, output: Option<PathBuf>) -> DiscoverArgs {
        DiscoverArgs {
            input,
            output,
            seed: Some(7),
            cluster_count: Some(2),
            method: None,
            min_count: None,
            include_vectors: false,
        }
    }

    #[test]
    fn test_overrides_applied() {
        let a = DiscoverArgs {
            method: Some(MethodArg::Dbscan),
            min_count: Some(3),
            ..args(PathBuf::from("-"), None)
        };
        let config = a.apply(Config::default());
        assert_eq!(config.seed, 7);
        assert_eq!(config.clustering.cluster_count, 2);
        assert_eq!(config.clustering.method, ClusteringMethod::Dbscan);
        assert_eq!(config.training.min_count, 3);
    }

    #[test]
    fn test_discover_writes_assignment() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("events.jsonl");
        let output = dir.path().join("out.json");
        let mut file = std::fs::File::create(&input).unwrap();
        for (session, middle) in [("A", "pay_bill"), ("B", "transfer_funds")] {
            for (t, activity) in ["login", "view_balance", middle, "logout"].iter().enumerate() {
                writeln!(
                    file,
                    r#"{{"session_id":"{}","activity":"{}","timestamp":{}}}"#,
                    session, activity, t
                )
                .unwrap();
            }
        }
        writeln!(file, "garbage").unwrap();

        let mut config = Config::default();
        config.training.vector_dimension = 8;
        config.training.window_size = 2;
        run(args(input, Some(output.clone())), config).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["seed"], 7);
        assert_eq!(json["assignment"].as_object().unwrap().len(), 5);
        assert_eq!(json["assembly"]["excluded_rows"], 1);
        assert!(json.get("embeddings").is_none());
    }
}
