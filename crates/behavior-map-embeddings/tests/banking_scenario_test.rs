//! End-to-end discovery on the login / transaction / logout scenario.

use behavior_map_core::config::{ClusteringConfig, Config, TrainingConfig};
use behavior_map_embeddings::{DiscoveryOutcome, ProcessDiscovery};
use behavior_map_test_utils::banking_sessions;

fn scenario_config(seed: u64) -> Config {
    Config {
        seed,
        training: TrainingConfig::default()
            .with_vector_dimension(10)
            .with_window_size(2)
            .with_min_count(1)
            .with_epochs(500)
            .with_learning_rate(0.05),
        clustering: ClusteringConfig::default().with_cluster_count(2),
        ..Config::default()
    }
}

fn discover(seed: u64) -> DiscoveryOutcome {
    ProcessDiscovery::new(scenario_config(seed))
        .unwrap()
        .run(&banking_sessions())
        .unwrap()
}

#[test]
fn test_same_seed_same_assignment() {
    for seed in [1u64, 42, 777] {
        let first = discover(seed);
        let second = discover(seed);

        assert_eq!(first.assignment.to_map(), second.assignment.to_map());
        assert_eq!(first.embeddings, second.embeddings);

        let together = |o: &DiscoveryOutcome| {
            o.assignment.cluster_of("pay_bill") == o.assignment.cluster_of("transfer_funds")
        };
        assert_eq!(together(&first), together(&second));
    }
    println!("[PASS] test_same_seed_same_assignment");
}

#[test]
fn test_every_activity_assigned_with_configured_dimension() {
    let outcome = discover(42);
    assert_eq!(outcome.assembly.sessions, 2);
    assert_eq!(outcome.corpus.vocabulary_size, 5);
    assert_eq!(outcome.embeddings.dimension(), 10);
    assert_eq!(outcome.assignment.len(), 5);
    for label in ["login", "view_balance", "pay_bill", "transfer_funds", "logout"] {
        assert!(outcome.assignment.cluster_of(label).is_some(), "{} unassigned", label);
        assert_eq!(outcome.embeddings.vector(label).map(<[f32]>::len), Some(10));
    }
    let ids: Vec<usize> = outcome.assignment.iter().map(|(_, c)| c).collect();
    assert_eq!(ids.iter().max(), Some(&1));
}

#[test]
fn test_login_logout_grouped_apart_from_transactions_more_often_than_chance() {
    let runs = 20u64;
    let hits = (0..runs)
        .filter(|&seed| {
            let outcome = discover(seed);
            let a = &outcome.assignment;
            let login = a.cluster_of("login");
            login == a.cluster_of("logout")
                && login != a.cluster_of("pay_bill")
                && login != a.cluster_of("transfer_funds")
        })
        .count();

    // A random two-way split satisfies all three conditions about 1 time in 8.
    let rate = hits as f64 / runs as f64;
    assert!(rate > 0.5, "grouped in {}/{} runs", hits, runs);
    println!(
        "[PASS] test_login_logout_grouped_apart_from_transactions_more_often_than_chance {}/{}",
        hits, runs
    );
}
