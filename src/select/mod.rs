//! CELF seed selection and final spread evaluation.
//!
//! The greedy selector prunes the node set to `M` candidates, estimates each
//! candidate's singleton spread, and then repeatedly pops the best stored gain
//! from a [`LazyGainQueue`]. A popped gain computed against the current seed
//! set is accepted as-is; a stale one is recomputed as
//! `spread(seeds + node) - spread(seeds)` and pushed back. Because expected
//! spread is monotone and submodular, a stale gain never underestimates the
//! true one, so most candidates are never re-evaluated.
//!
//! The baseline `spread(seeds)` is estimated at most once per round and shared
//! by every stale entry popped in that round.

pub mod candidates;
pub mod queue;

use core::fmt::Debug;
use core::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::config::InfluenceConfig;
use crate::error::Result;
use crate::estimate::SpreadEstimator;
use crate::graph::{Snapshot, SourceGraph};

pub use candidates::{
    candidate_score, objective_score, prune_candidates, top_candidate_indices,
    top_candidate_indices_for, value_score,
};
pub use queue::{GainEntry, LazyGainQueue};

/// Outcome of a CELF run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection<N> {
    /// Accepted seeds, in acceptance order.
    pub seeds: Vec<N>,
    /// Marginal gain each seed was accepted with.
    pub gains: Vec<f64>,
    /// Sum of accepted gains (the selector's running spread estimate).
    pub expected_spread: f64,
    /// Candidates left after pruning.
    pub candidates: usize,
    /// Spread estimator calls issued.
    pub evaluations: usize,
    /// Stale entries whose gain was recomputed.
    pub recomputations: usize,
}

impl<N> Selection<N> {
    fn empty() -> Self {
        Self {
            seeds: Vec::new(),
            gains: Vec::new(),
            expected_spread: 0.0,
            candidates: 0,
            evaluations: 0,
            recomputations: 0,
        }
    }
}

/// Lazy-greedy (CELF) selector over one snapshot.
pub struct GreedySelector<'a, N> {
    estimator: SpreadEstimator<'a, N>,
}

impl<'a, N> GreedySelector<'a, N>
where
    N: Clone + Eq + Hash + Ord + Debug + Send + Sync,
{
    /// Creates a selector; fails fast on a zero candidate bound.
    pub fn new(snapshot: &'a Snapshot<N>, config: &InfluenceConfig) -> Result<Self> {
        config.validate_candidate_bound()?;
        Ok(Self {
            estimator: SpreadEstimator::new(snapshot, config)?,
        })
    }

    /// Creates a selector around an existing estimator.
    pub fn with_estimator(estimator: SpreadEstimator<'a, N>) -> Result<Self> {
        estimator.config().validate_candidate_bound()?;
        Ok(Self { estimator })
    }

    /// The estimator used for every gain evaluation.
    pub fn estimator(&self) -> &SpreadEstimator<'a, N> {
        &self.estimator
    }

    /// Selects up to `k` seeds. Fewer are returned only when candidates run out.
    pub fn select(&self, k: usize) -> Result<Selection<N>> {
        if k == 0 {
            return Ok(Selection::empty());
        }

        let snapshot = self.estimator.snapshot();
        let config = self.estimator.config();
        let objective = config.objective;
        let candidates = top_candidate_indices_for(snapshot, config.candidate_bound, objective)?;

        let mut selection = Selection::empty();
        selection.candidates = candidates.len();

        let mut queue = LazyGainQueue::with_capacity(candidates.len());
        for (done, &index) in candidates.iter().enumerate() {
            let gain = self.estimator.estimate_indices(&[index])?.mean(objective);
            selection.evaluations += 1;
            queue.push(GainEntry {
                gain,
                node: snapshot.node_id(index).clone(),
                index,
                round: 0,
            });
            tracing::trace!(done = done + 1, total = candidates.len(), "initial gain");
        }
        tracing::debug!(candidates = candidates.len(), k, "candidate gains initialized");

        let mut seed_indices: Vec<usize> = Vec::with_capacity(k);
        let mut selected_round = 1usize;
        let mut baseline: Option<f64> = None;

        while selection.seeds.len() < k {
            let Some(entry) = queue.pop() else {
                break;
            };

            if entry.round == selected_round - 1 {
                tracing::info!(
                    seed = ?entry.node,
                    gain = entry.gain,
                    round = selected_round,
                    "seed accepted"
                );
                seed_indices.push(entry.index);
                selection.expected_spread += entry.gain;
                selection.gains.push(entry.gain);
                selection.seeds.push(entry.node);
                selected_round += 1;
                baseline = None;
                continue;
            }

            let base = match baseline {
                Some(base) => base,
                None => {
                    let base = self.estimator.estimate_indices(&seed_indices)?.mean(objective);
                    if !seed_indices.is_empty() {
                        selection.evaluations += 1;
                    }
                    baseline = Some(base);
                    base
                }
            };

            seed_indices.push(entry.index);
            let extended = self.estimator.estimate_indices(&seed_indices);
            seed_indices.pop();
            let marginal = extended?.mean(objective) - base;
            selection.evaluations += 1;
            selection.recomputations += 1;

            tracing::debug!(
                node = ?entry.node,
                stale = entry.gain,
                fresh = marginal,
                round = selected_round,
                "gain recomputed"
            );
            queue.push(GainEntry {
                gain: marginal,
                round: selected_round - 1,
                ..entry
            });
        }

        tracing::info!(
            seeds = selection.seeds.len(),
            expected_spread = selection.expected_spread,
            evaluations = selection.evaluations,
            recomputations = selection.recomputations,
            "selection finished"
        );
        Ok(selection)
    }
}

/// Selects up to `k` seeds maximizing expected spread on `graph`.
///
/// `k == 0` returns an empty list without touching the graph. A zero
/// `config.candidate_bound` is a usage error.
///
/// # Example
///
/// ```rust
/// use infmax::{select_seeds, AttributedGraph, InfluenceConfig};
///
/// let mut g = AttributedGraph::directed();
/// g.extend_edges([(1, 2), (2, 3), (4, 5), (4, 6), (4, 7)]);
/// g.set_all_weights(1.0);
///
/// let config = InfluenceConfig { trial_count: 20, worker_count: Some(1), ..Default::default() };
/// assert_eq!(select_seeds(&g, 1, &config).unwrap(), vec![4]);
/// ```
pub fn select_seeds<G>(graph: &G, k: usize, config: &InfluenceConfig) -> Result<Vec<G::NodeId>>
where
    G: SourceGraph,
    G::NodeId: Send + Sync,
{
    Ok(select_seeds_with_report(graph, k, config)?.seeds)
}

/// Like [`select_seeds`], also reporting gains and evaluation counts.
#[tracing::instrument(level = "debug", skip_all, fields(k = k))]
pub fn select_seeds_with_report<G>(
    graph: &G,
    k: usize,
    config: &InfluenceConfig,
) -> Result<Selection<G::NodeId>>
where
    G: SourceGraph,
    G::NodeId: Send + Sync,
{
    if k == 0 {
        return Ok(Selection::empty());
    }
    let snapshot = Snapshot::from_graph(graph);
    GreedySelector::new(&snapshot, config)?.select(k)
}

/// Estimates the expected spread of an already chosen seed set on `graph`.
///
/// Typically called with more trials than selection used (see
/// [`InfluenceConfig::evaluation`]).
#[tracing::instrument(level = "debug", skip_all, fields(seeds = seeds.len()))]
pub fn evaluate<G>(graph: &G, seeds: &[G::NodeId], config: &InfluenceConfig) -> Result<f64>
where
    G: SourceGraph,
    G::NodeId: Send + Sync,
{
    let snapshot = Snapshot::from_graph(graph);
    SpreadEstimator::new(&snapshot, config)?.estimate(seeds)
}
