//! Independent Cascade simulation on a [`Snapshot`].
//!
//! One trial starts with the seeds active. Each round, every node activated in
//! the previous round gets one independent attempt per not-yet-active
//! out-neighbor, succeeding with the *source* node's activation probability.
//! Newly activated nodes form the next frontier. The trial ends when a round
//! activates nothing or the optional step cap is reached.
//!
//! Activation state lives in a [`CascadeScratch`] whose marks are stamped
//! with a per-trial epoch, so consecutive trials reuse the buffers without
//! clearing them.

use core::fmt::Debug;
use core::hash::Hash;

use rand::Rng;

use crate::error::Result;
use crate::graph::Snapshot;

/// Reusable per-worker buffers for cascade trials.
#[derive(Debug, Default, Clone)]
pub struct CascadeScratch {
    active: Vec<u32>,
    pending: Vec<u32>,
    epoch: u32,
    frontier: Vec<usize>,
    next: Vec<usize>,
}

impl CascadeScratch {
    /// Creates buffers sized for `node_count` nodes.
    pub fn new(node_count: usize) -> Self {
        Self {
            active: vec![0; node_count],
            pending: vec![0; node_count],
            epoch: 0,
            frontier: Vec::new(),
            next: Vec::new(),
        }
    }

    /// Starts a new trial and returns its epoch stamp.
    fn begin(&mut self, node_count: usize) -> u32 {
        if self.active.len() < node_count {
            self.active.resize(node_count, 0);
            self.pending.resize(node_count, 0);
        }
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            // Stamps wrapped: stale marks could alias the new epoch.
            self.active.fill(0);
            self.pending.fill(0);
            self.epoch = 1;
        }
        self.frontier.clear();
        self.next.clear();
        self.epoch
    }
}

/// Result of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CascadeOutcome {
    /// Number of active nodes at the end of the trial.
    pub activated: usize,
    /// Sum of the active nodes' values (0.0 if the snapshot has none).
    pub value: f64,
}

/// Runs Independent Cascade trials against one snapshot with fixed parameters.
pub struct CascadeSimulator<'a, N> {
    snapshot: &'a Snapshot<N>,
    default_probability: f64,
    max_steps: Option<usize>,
    scratch: CascadeScratch,
}

impl<'a, N> CascadeSimulator<'a, N>
where
    N: Clone + Eq + Hash,
{
    /// Creates a simulator. `default_probability` applies to nodes without a
    /// stored probability; `max_steps` caps propagation rounds.
    pub fn new(
        snapshot: &'a Snapshot<N>,
        default_probability: f64,
        max_steps: Option<usize>,
    ) -> Self {
        Self {
            snapshot,
            default_probability,
            max_steps,
            scratch: CascadeScratch::new(snapshot.node_count()),
        }
    }

    /// Runs one trial from dense seed indices.
    ///
    /// Duplicate seeds are counted once.
    ///
    /// # Panics
    ///
    /// Panics if a seed is not a dense index of the snapshot
    /// (`seed >= snapshot.node_count()`).
    pub fn run<R: Rng + ?Sized>(&mut self, seeds: &[usize], rng: &mut R) -> CascadeOutcome {
        let snapshot = self.snapshot;
        let epoch = self.scratch.begin(snapshot.node_count());
        let CascadeScratch {
            active,
            pending,
            frontier,
            next,
            ..
        } = &mut self.scratch;

        let mut outcome = CascadeOutcome::default();
        for &s in seeds {
            if active[s] != epoch {
                active[s] = epoch;
                frontier.push(s);
                outcome.activated += 1;
                outcome.value += snapshot.value(s);
            }
        }

        let mut step = 0usize;
        while !frontier.is_empty() && self.max_steps.map_or(true, |cap| step < cap) {
            step += 1;
            next.clear();
            for &u in frontier.iter() {
                let p = snapshot.probability_or(u, self.default_probability);
                for &v in snapshot.neighbors(u) {
                    if active[v] == epoch {
                        continue;
                    }
                    // One coin per edge attempt, even if `v` is already pending this round.
                    if rng.gen::<f64>() < p && pending[v] != epoch {
                        pending[v] = epoch;
                        next.push(v);
                    }
                }
            }
            for &v in next.iter() {
                active[v] = epoch;
                outcome.activated += 1;
                outcome.value += snapshot.value(v);
            }
            core::mem::swap(frontier, next);
        }

        debug_assert!(outcome.activated <= snapshot.node_count());
        outcome
    }
}

/// Runs one Independent Cascade trial and returns the number of activated nodes.
///
/// Seeds are given by identifier; duplicates count once and an unknown
/// identifier is an error. An empty seed set activates nothing.
///
/// # Example
///
/// ```rust
/// use infmax::{cascade::simulate_once, graph::{AttributedGraph, Snapshot}};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut g = AttributedGraph::directed();
/// g.extend_edges([(1, 2), (2, 3), (3, 4), (1, 5)]);
/// g.set_all_weights(1.0);
/// let snap = Snapshot::from_graph(&g);
///
/// let mut rng = StdRng::seed_from_u64(42);
/// assert_eq!(simulate_once(&snap, &[1], 0.01, None, &mut rng).unwrap(), 5);
/// ```
pub fn simulate_once<N, R>(
    snapshot: &Snapshot<N>,
    seeds: &[N],
    default_probability: f64,
    max_steps: Option<usize>,
    rng: &mut R,
) -> Result<usize>
where
    N: Clone + Eq + Hash + Debug,
    R: Rng + ?Sized,
{
    let seeds = snapshot.resolve_seeds(seeds)?;
    let mut sim = CascadeSimulator::new(snapshot, default_probability, max_steps);
    Ok(sim.run(&seeds, rng).activated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn chain(n: usize, p: Option<f64>) -> Snapshot<usize> {
        Snapshot::from_adjacency(
            true,
            (0..n).map(|u| (u, if u + 1 < n { vec![u + 1] } else { vec![] }, p)),
        )
    }

    #[test]
    fn empty_seed_set_activates_nothing() {
        let snap = chain(3, Some(1.0));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(simulate_once(&snap, &[], 0.5, None, &mut rng).unwrap(), 0);
    }

    #[test]
    fn step_cap_bounds_propagation() {
        let snap = chain(10, Some(1.0));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(simulate_once(&snap, &[0], 0.5, Some(0), &mut rng).unwrap(), 1);
        assert_eq!(simulate_once(&snap, &[0], 0.5, Some(3), &mut rng).unwrap(), 4);
        assert_eq!(simulate_once(&snap, &[0], 0.5, None, &mut rng).unwrap(), 10);
    }

    #[test]
    fn default_probability_applies_to_unweighted_nodes() {
        let snap = chain(4, None);
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(simulate_once(&snap, &[0], 1.0, None, &mut rng).unwrap(), 4);
        assert_eq!(simulate_once(&snap, &[0], 0.0, None, &mut rng).unwrap(), 1);
    }

    #[test]
    fn probability_belongs_to_source_node() {
        // 0 (p = 1) -> 1 (p = 0) -> 2
        let snap = Snapshot::from_adjacency(
            true,
            [(0, vec![1], Some(1.0)), (1, vec![2], Some(0.0)), (2, vec![], Some(1.0))],
        );
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(simulate_once(&snap, &[0], 0.5, None, &mut rng).unwrap(), 2);
    }

    #[test]
    fn duplicate_and_unknown_seeds() {
        let snap = chain(3, Some(0.0));
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(simulate_once(&snap, &[1, 1, 2], 0.0, None, &mut rng).unwrap(), 2);
        assert!(simulate_once(&snap, &[17], 0.0, None, &mut rng).is_err());
    }

    #[test]
    fn scratch_is_reused_across_trials() {
        let snap = chain(5, Some(1.0));
        let mut sim = CascadeSimulator::new(&snap, 0.0, None);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..3 {
            assert_eq!(sim.run(&[2], &mut rng).activated, 3);
            assert_eq!(sim.run(&[0], &mut rng).activated, 5);
        }
    }

    #[test]
    fn epoch_wraparound_resets_marks() {
        let snap = chain(4, Some(1.0));
        let mut sim = CascadeSimulator::new(&snap, 0.0, None);
        sim.scratch.epoch = u32::MAX - 1;
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(sim.run(&[0], &mut rng).activated, 4);
        assert_eq!(sim.run(&[3], &mut rng).activated, 1);
        assert_eq!(sim.scratch.epoch, 1);
        assert_eq!(sim.run(&[2], &mut rng).activated, 2);
    }

    #[test]
    fn value_objective_sums_activated_values() {
        let mut g = crate::graph::AttributedGraph::directed();
        g.extend_edges([(0, 1), (0, 2), (3, 0)]);
        g.set_all_weights(1.0);
        g.set_attribute(1, "value", 2.5);
        g.set_attribute(2, "value", 0.5);
        g.set_attribute(3, "value", 100.0);
        let snap = Snapshot::from_graph(&g);

        let seeds = snap.resolve_seeds(&[0]).unwrap();
        let mut sim = CascadeSimulator::new(&snap, 0.0, None);
        let mut rng = StdRng::seed_from_u64(4);
        let out = sim.run(&seeds, &mut rng);
        assert_eq!(out.activated, 3);
        assert!((out.value - 3.0).abs() < 1e-12);
    }
}
