//! Tests for snapshot construction.

use super::*;
use crate::graph::AttributedGraph;

#[test]
fn test_snapshot_directed_keeps_out_edges() {
    let mut g = AttributedGraph::directed();
    g.extend_edges([(1, 2), (2, 3), (3, 4), (1, 5)]);
    let snap = Snapshot::from_graph(&g);

    assert!(snap.is_directed());
    assert_eq!(snap.node_count(), 5);
    assert_eq!(snap.edge_count(), 4);

    let one: Vec<_> = snap.neighbors_of(&1).unwrap().copied().collect();
    assert_eq!(one, vec![2, 5]);
    assert_eq!(snap.neighbors_of(&4).unwrap().count(), 0);
    assert!(snap.neighbors_of(&99).is_none());
}

#[test]
fn test_snapshot_undirected_lists_all_adjacent() {
    let mut g = AttributedGraph::undirected();
    g.extend_edges([(0, 1), (1, 2)]);
    let snap = Snapshot::from_graph(&g);

    assert!(!snap.is_directed());
    assert_eq!(snap.edge_count(), 4);
    let mid = snap.index_of(&1).unwrap();
    assert_eq!(snap.out_degree(mid), 2);
}

#[test]
fn test_snapshot_weights_become_probabilities() {
    let mut g = AttributedGraph::directed();
    g.add_edge("a", "b");
    g.set_weight("a", 0.75);
    g.set_weight("b", 1.5);
    let snap = Snapshot::from_graph(&g);

    let a = snap.index_of(&"a").unwrap();
    let b = snap.index_of(&"b").unwrap();
    assert_eq!(snap.probability(a), Some(0.75));
    // Out-of-range probabilities are kept verbatim.
    assert_eq!(snap.probability(b), Some(1.5));
    assert!(!snap.has_values());
    assert!((snap.value(a) - 0.0).abs() < f64::EPSILON);
}

#[test]
fn test_snapshot_missing_weight_uses_default() {
    let mut g = AttributedGraph::directed();
    g.add_node(7);
    let snap = Snapshot::from_graph(&g);

    assert_eq!(snap.probability(0), None);
    assert!((snap.probability_or(0, 0.3) - 0.3).abs() < f64::EPSILON);
}

#[test]
fn test_snapshot_from_adjacency_adds_dangling_targets() {
    let snap = Snapshot::from_adjacency(true, [("x", vec!["y", "z"], Some(0.5))]);

    assert_eq!(snap.node_count(), 3);
    let z = snap.index_of(&"z").unwrap();
    assert_eq!(snap.out_degree(z), 0);
    assert_eq!(snap.probability(z), None);
}

#[test]
fn test_snapshot_reversed_transposes() {
    // 0 -> 1, 2 ; 1 -> 2
    let snap = Snapshot::from_adjacency(
        true,
        [(0, vec![1, 2], None), (1, vec![2], None), (2, vec![], None)],
    );
    let rev = snap.reversed();

    assert_eq!(rev.edge_count(), 3);
    assert_eq!(rev.neighbors(0), &[] as &[usize]);
    assert_eq!(rev.neighbors(1), &[0]);
    assert_eq!(rev.neighbors(2), &[0, 1]);
}

#[test]
fn test_snapshot_resolve_seeds() {
    let snap = Snapshot::from_adjacency(true, [(10, vec![20], None)]);

    assert_eq!(snap.resolve_seeds(&[20, 10, 20]).unwrap(), vec![1, 0]);
    assert_eq!(
        snap.resolve_seeds(&[30]),
        Err(InfluenceError::UnknownNode("30".to_owned()))
    );
}

#[test]
fn test_snapshot_node_values() {
    let mut g = AttributedGraph::directed();
    g.add_edge(1, 2);
    g.set_attribute(2, "value", 4.0);
    let snap = Snapshot::from_graph(&g);

    assert!(snap.has_values());
    assert!((snap.value(snap.index_of(&1).unwrap()) - 0.0).abs() < f64::EPSILON);
    assert!((snap.value(snap.index_of(&2).unwrap()) - 4.0).abs() < f64::EPSILON);
}

#[test]
#[should_panic]
fn test_snapshot_out_of_range_index_panics() {
    let snap = Snapshot::from_adjacency(true, [("x", vec!["y"], None)]);
    let _ = snap.out_degree(snap.node_count());
}
