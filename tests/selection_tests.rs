//! CELF selection, pruning and evaluation end to end.

use anyhow::Result;
use infmax::*;
use petgraph::graph::DiGraph;

fn weighted(edges: &[(u32, u32)], weight: f64) -> AttributedGraph<u32> {
    let mut g = AttributedGraph::directed();
    g.extend_edges(edges.iter().copied());
    g.set_all_weights(weight);
    g
}

fn fixed(trials: usize, workers: usize) -> InfluenceConfig {
    InfluenceConfig {
        trial_count: trials,
        worker_count: Some(workers),
        seed_policy: SeedPolicy::Fixed(2024),
        ..InfluenceConfig::default()
    }
}

#[test]
fn greedy_prefers_the_larger_component() -> Result<()> {
    let g = weighted(&[(1, 2), (2, 3), (4, 5), (4, 6), (4, 7)], 1.0);
    assert_eq!(select_seeds(&g, 1, &fixed(20, 2))?, vec![4]);
    assert_eq!(select_seeds(&g, 2, &fixed(20, 2))?, vec![4, 1]);
    Ok(())
}

#[test]
fn greedy_on_petgraph_with_json_attributes() -> Result<()> {
    let mut g = DiGraph::<serde_json::Value, ()>::new();
    let hub = g.add_node(serde_json::json!({"weight": 1.0}));
    let leaves: Vec<_> = (0..3)
        .map(|_| g.add_node(serde_json::json!({"weight": 1.0})))
        .collect();
    let lone = g.add_node(serde_json::json!({"weight": 1.0}));
    let tail = g.add_node(serde_json::json!({}));
    for &leaf in &leaves {
        g.add_edge(hub, leaf, ());
    }
    g.add_edge(lone, tail, ());

    assert_eq!(select_seeds(&g, 1, &fixed(10, 1))?, vec![hub]);
    Ok(())
}

#[test]
fn evaluate_selected_seeds_is_bounded() -> Result<()> {
    let mut g = AttributedGraph::directed();
    for u in 0..40u32 {
        g.add_edge(u, (u * 7 + 3) % 40);
        g.add_edge(u, (u * 11 + 5) % 40);
    }
    g.set_all_weights(0.2);

    let config = InfluenceConfig {
        candidate_bound: 10,
        ..fixed(50, 2)
    };
    let seeds = select_seeds(&g, 3, &config)?;
    assert_eq!(seeds.len(), 3);

    let eval_config = InfluenceConfig {
        trial_count: 300,
        ..config
    };
    let spread = evaluate(&g, &seeds, &eval_config)?;
    assert!(spread >= 0.0);
    assert!(spread <= g.node_count() as f64);
    assert!(spread >= 3.0);
    Ok(())
}

#[test]
fn selection_report_accounts_for_work() -> Result<()> {
    let g = weighted(&[(1, 2), (2, 3), (4, 5), (4, 6), (4, 7)], 1.0);
    let report = select_seeds_with_report(&g, 3, &fixed(5, 1))?;
    assert_eq!(report.seeds.len(), 3);
    assert_eq!(report.gains.len(), 3);
    assert!(report.gains.windows(2).all(|w| w[0] >= w[1]));
    assert!(report.evaluations >= report.candidates);
    let total: f64 = report.gains.iter().sum();
    assert!((total - report.expected_spread).abs() < 1e-12);
    Ok(())
}

#[test]
fn zero_k_and_zero_bound() -> Result<()> {
    let g = weighted(&[(1, 2)], 1.0);
    let bad = InfluenceConfig {
        candidate_bound: 0,
        ..fixed(5, 1)
    };
    assert!(select_seeds(&g, 0, &bad)?.is_empty());
    assert_eq!(select_seeds(&g, 1, &bad), Err(InfluenceError::InvalidCandidateBound));
    Ok(())
}

#[test]
fn pruning_with_large_bound_returns_each_node_once() -> Result<()> {
    let g = weighted(&[(1, 2), (2, 3), (3, 1), (4, 1)], 0.5);
    let snap = build_snapshot(&g);
    let mut all = prune_candidates(&snap, 10)?;
    all.sort_unstable();
    assert_eq!(all, vec![1, 2, 3, 4]);
    Ok(())
}

#[test]
fn step_cap_changes_the_best_seed() -> Result<()> {
    let g = weighted(&[(1, 2), (2, 3), (3, 4), (4, 5), (10, 11), (10, 12), (10, 13)], 1.0);
    assert_eq!(select_seeds(&g, 1, &fixed(5, 1))?, vec![1]);

    let one_hop = InfluenceConfig {
        max_steps: Some(1),
        ..fixed(5, 1)
    };
    assert_eq!(select_seeds(&g, 1, &one_hop)?, vec![10]);
    assert!((evaluate(&g, &[1], &one_hop)? - 2.0).abs() < 1e-12);
    Ok(())
}
