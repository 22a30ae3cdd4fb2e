//! Heuristic candidate pruning.
//!
//! Scores every node and keeps the best `M` with a bounded min-heap, which
//! costs \(O(n \log M)\) instead of a full sort. The count heuristic is
//! `activation probability (1.0 if absent) x out-degree`; under
//! [`SpreadObjective::NodeValue`] a node scores its own value plus the
//! probability-weighted value of its out-neighbors, so a valuable node with
//! no out-edges still competes.

use core::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::config::SpreadObjective;
use crate::error::{InfluenceError, Result};
use crate::graph::Snapshot;

/// Probability assumed for unweighted nodes when scoring candidates.
const UNWEIGHTED_SCORE_PROBABILITY: f64 = 1.0;

/// A scored node. Greater means a better candidate; equal scores prefer the
/// node that was inserted first.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    score: f64,
    index: usize,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Count heuristic of dense node `u`: probability times out-degree.
///
/// # Panics
///
/// Panics if `u >= snapshot.node_count()`.
#[inline]
pub fn candidate_score<N>(snapshot: &Snapshot<N>, u: usize) -> f64
where
    N: Clone + Eq + core::hash::Hash,
{
    snapshot.probability_or(u, UNWEIGHTED_SCORE_PROBABILITY) * snapshot.out_degree(u) as f64
}

/// Value heuristic of dense node `u`: its own value plus its probability
/// times the summed value of its out-neighbors.
///
/// # Panics
///
/// Panics if `u >= snapshot.node_count()`.
pub fn value_score<N>(snapshot: &Snapshot<N>, u: usize) -> f64
where
    N: Clone + Eq + core::hash::Hash,
{
    let reach: f64 = snapshot
        .neighbors(u)
        .iter()
        .map(|&v| snapshot.value(v))
        .sum();
    snapshot.value(u) + snapshot.probability_or(u, UNWEIGHTED_SCORE_PROBABILITY) * reach
}

/// Heuristic score of dense node `u` for `objective`.
///
/// # Panics
///
/// Panics if `u >= snapshot.node_count()`.
#[inline]
pub fn objective_score<N>(snapshot: &Snapshot<N>, u: usize, objective: SpreadObjective) -> f64
where
    N: Clone + Eq + core::hash::Hash,
{
    match objective {
        SpreadObjective::ActivatedCount => candidate_score(snapshot, u),
        SpreadObjective::NodeValue => value_score(snapshot, u),
    }
}

/// Dense indices of the `bound` best nodes by [`candidate_score`], best first.
///
/// A bound of at least the node count returns every node in snapshot order
/// without scoring. A zero bound is a usage error.
pub fn top_candidate_indices<N>(snapshot: &Snapshot<N>, bound: usize) -> Result<Vec<usize>>
where
    N: Clone + Eq + core::hash::Hash,
{
    top_candidate_indices_for(snapshot, bound, SpreadObjective::ActivatedCount)
}

/// Like [`top_candidate_indices`], scoring with [`objective_score`].
pub fn top_candidate_indices_for<N>(
    snapshot: &Snapshot<N>,
    bound: usize,
    objective: SpreadObjective,
) -> Result<Vec<usize>>
where
    N: Clone + Eq + core::hash::Hash,
{
    if bound == 0 {
        return Err(InfluenceError::InvalidCandidateBound);
    }
    let n = snapshot.node_count();
    if bound >= n {
        return Ok((0..n).collect());
    }

    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(bound + 1);
    for index in 0..n {
        let ranked = Ranked {
            score: objective_score(snapshot, index, objective),
            index,
        };
        if heap.len() < bound {
            heap.push(Reverse(ranked));
        } else if heap.peek().is_some_and(|Reverse(worst)| ranked > *worst) {
            heap.pop();
            heap.push(Reverse(ranked));
        }
    }

    // Ascending `Reverse` order is descending rank.
    Ok(heap
        .into_sorted_vec()
        .into_iter()
        .map(|Reverse(r)| r.index)
        .collect())
}

/// Identifiers of the `bound` best-scoring nodes; see [`top_candidate_indices`].
pub fn prune_candidates<N>(snapshot: &Snapshot<N>, bound: usize) -> Result<Vec<N>>
where
    N: Clone + Eq + core::hash::Hash,
{
    Ok(top_candidate_indices(snapshot, bound)?
        .into_iter()
        .map(|u| snapshot.node_id(u).clone())
        .collect())
}
