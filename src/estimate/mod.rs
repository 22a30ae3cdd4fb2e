//! Parallel Monte Carlo spread estimation.
//!
//! The trial budget is cut into [`TrialBatch`]es, each batch runs on one
//! worker with its own random stream and a reused [`CascadeSimulator`], and
//! the per-batch sums are added up in batch order and divided by the trial
//! count.
//!
//! The only state shared between workers is the read-only [`Snapshot`] and
//! the resolved seed indices, so no locking is involved.

pub mod executor;
pub(crate) mod seeding;

use core::fmt::Debug;
use core::hash::Hash;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::cascade::CascadeSimulator;
use crate::config::{InfluenceConfig, SeedPolicy, SpreadObjective};
use crate::error::Result;
use crate::graph::Snapshot;

pub use executor::{
    executor_for, BatchExecutor, BatchTotals, ScopedExecutor, SequentialExecutor, TrialBatch,
};
#[cfg(feature = "parallel")]
pub use executor::PoolExecutor;

/// Offsets handed out to entropy-seeded batches, process-wide.
static NEXT_OFFSET: AtomicU64 = AtomicU64::new(0);

/// Sample means of one estimation call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpreadEstimate {
    /// Trials simulated.
    pub trials: usize,
    /// Batches scheduled.
    pub batches: usize,
    /// Mean number of activated nodes.
    pub mean_activated: f64,
    /// Mean summed node value of the activated nodes.
    pub mean_value: f64,
}

impl SpreadEstimate {
    /// Mean score under `objective`.
    #[inline]
    pub fn mean(&self, objective: SpreadObjective) -> f64 {
        match objective {
            SpreadObjective::ActivatedCount => self.mean_activated,
            SpreadObjective::NodeValue => self.mean_value,
        }
    }
}

/// Splits `trials` into batches of at most `batch_size`, numbering offsets from `first_offset`.
pub fn plan_batches(trials: usize, batch_size: usize, first_offset: u64) -> Vec<TrialBatch> {
    let batch_size = batch_size.max(1);
    let mut plan = Vec::with_capacity(trials.div_ceil(batch_size));
    let mut remaining = trials;
    let mut offset = first_offset;
    while remaining > 0 {
        let trials = remaining.min(batch_size);
        plan.push(TrialBatch { offset, trials });
        remaining -= trials;
        offset += 1;
    }
    plan
}

/// Estimates expected spread on one snapshot, reusing its executor across calls.
pub struct SpreadEstimator<'a, N> {
    snapshot: &'a Snapshot<N>,
    config: InfluenceConfig,
    executor: Box<dyn BatchExecutor>,
}

impl<'a, N> SpreadEstimator<'a, N>
where
    N: Clone + Eq + Hash + Debug + Send + Sync,
{
    /// Creates an estimator with the executor picked for the configured worker count.
    pub fn new(snapshot: &'a Snapshot<N>, config: &InfluenceConfig) -> Result<Self> {
        config.validate_execution()?;
        let executor = executor_for(config.workers());
        Ok(Self {
            snapshot,
            config: config.clone(),
            executor,
        })
    }

    /// Creates an estimator that schedules batches on `executor`.
    pub fn with_executor(
        snapshot: &'a Snapshot<N>,
        config: &InfluenceConfig,
        executor: Box<dyn BatchExecutor>,
    ) -> Result<Self> {
        config.validate_execution()?;
        Ok(Self {
            snapshot,
            config: config.clone(),
            executor,
        })
    }

    /// The snapshot estimates run against.
    pub fn snapshot(&self) -> &'a Snapshot<N> {
        self.snapshot
    }

    /// The configuration in use.
    pub fn config(&self) -> &InfluenceConfig {
        &self.config
    }

    /// Number of workers batches are scheduled onto.
    pub fn workers(&self) -> usize {
        self.executor.workers()
    }

    /// Mean spread of `seeds` under the configured objective.
    pub fn estimate(&self, seeds: &[N]) -> Result<f64> {
        let seeds = self.snapshot.resolve_seeds(seeds)?;
        Ok(self.estimate_indices(&seeds)?.mean(self.config.objective))
    }

    /// Full estimate of `seeds` (both objectives).
    pub fn estimate_detailed(&self, seeds: &[N]) -> Result<SpreadEstimate> {
        let seeds = self.snapshot.resolve_seeds(seeds)?;
        self.estimate_indices(&seeds)
    }

    /// Estimates from dense, duplicate-free seed indices.
    pub(crate) fn estimate_indices(&self, seeds: &[usize]) -> Result<SpreadEstimate> {
        let trials = self.config.trial_count;
        if trials == 0 || seeds.is_empty() {
            return Ok(SpreadEstimate::default());
        }

        let workers = self.executor.workers();
        let batch_size = self.config.batch_size_for(trials, workers);
        let first_offset = match self.config.seed_policy {
            SeedPolicy::Fixed(_) => 0,
            SeedPolicy::Entropy => {
                let batches = trials.div_ceil(batch_size) as u64;
                NEXT_OFFSET.fetch_add(batches, Ordering::Relaxed)
            }
        };
        let plan = plan_batches(trials, batch_size, first_offset);

        let snapshot = self.snapshot;
        let policy = self.config.seed_policy;
        let default_p = self.config.default_probability;
        let max_steps = self.config.max_steps;
        let job = move |batch: TrialBatch| {
            let mut rng = seeding::batch_rng(policy, batch.offset);
            let mut sim = CascadeSimulator::new(snapshot, default_p, max_steps);
            let mut totals = BatchTotals::default();
            for _ in 0..batch.trials {
                let outcome = sim.run(seeds, &mut rng);
                totals.activated += outcome.activated as u64;
                totals.value += outcome.value;
            }
            totals
        };

        let results = self.executor.execute(&plan, &job)?;
        let mut sum = BatchTotals::default();
        for totals in results {
            sum.merge(totals);
        }

        let estimate = SpreadEstimate {
            trials,
            batches: plan.len(),
            mean_activated: sum.activated as f64 / trials as f64,
            mean_value: sum.value / trials as f64,
        };
        tracing::debug!(
            seeds = seeds.len(),
            trials,
            batches = estimate.batches,
            workers,
            mean = estimate.mean(self.config.objective),
            "spread estimated"
        );
        Ok(estimate)
    }
}

/// Estimates the expected spread of `seeds` on `snapshot`.
///
/// Runs `config.trial_count` independent trials across `config.worker_count`
/// workers and returns the sample mean under `config.objective` (activated
/// node count by default). Zero trials or an empty seed set yield 0.0 without
/// simulating anything.
pub fn estimate_spread<N>(
    snapshot: &Snapshot<N>,
    seeds: &[N],
    config: &InfluenceConfig,
) -> Result<f64>
where
    N: Clone + Eq + Hash + Debug + Send + Sync,
{
    SpreadEstimator::new(snapshot, config)?.estimate(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star(leaves: usize, p: f64) -> Snapshot<usize> {
        Snapshot::from_adjacency(true, [(0, (1..=leaves).collect::<Vec<_>>(), Some(p))])
    }

    fn fixed(trials: usize, workers: usize) -> InfluenceConfig {
        InfluenceConfig {
            trial_count: trials,
            worker_count: Some(workers),
            seed_policy: SeedPolicy::Fixed(17),
            ..InfluenceConfig::default()
        }
    }

    #[test]
    fn plan_covers_budget_exactly() {
        let plan = plan_batches(23, 5, 10);
        assert_eq!(plan.len(), 5);
        assert_eq!(plan.iter().map(|b| b.trials).sum::<usize>(), 23);
        assert_eq!(plan[0].offset, 10);
        let last = TrialBatch {
            offset: 14,
            trials: 3,
        };
        assert_eq!(plan[4], last);
        assert!(plan_batches(0, 5, 0).is_empty());
    }

    #[test]
    fn zero_trials_yield_zero() {
        let snap = star(3, 1.0);
        let cfg = fixed(0, 1);
        assert!((estimate_spread(&snap, &[0], &cfg).unwrap() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_seeds_yield_zero() {
        let snap = star(3, 1.0);
        assert!((estimate_spread(&snap, &[], &fixed(50, 2)).unwrap() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn deterministic_graph_gives_exact_mean() {
        let snap = star(4, 1.0);
        for workers in [1, 3] {
            let mean = estimate_spread(&snap, &[0], &fixed(40, workers)).unwrap();
            assert!((mean - 5.0).abs() < 1e-12, "workers={workers} mean={mean}");
        }
    }

    #[test]
    fn fixed_policy_is_reproducible_for_fixed_workers() {
        let snap = star(20, 0.3);
        let cfg = fixed(200, 3);
        let a = estimate_spread(&snap, &[0], &cfg).unwrap();
        let b = estimate_spread(&snap, &[0], &cfg).unwrap();
        assert!((a - b).abs() < f64::EPSILON);
    }

    #[test]
    fn scoped_and_sequential_agree_with_same_plan() {
        let snap = star(20, 0.5);
        let cfg = InfluenceConfig {
            batch_size: Some(8),
            ..fixed(160, 4)
        };
        let seq = SpreadEstimator::with_executor(&snap, &cfg, Box::new(SequentialExecutor))
            .unwrap()
            .estimate(&[0])
            .unwrap();
        let scoped = SpreadEstimator::with_executor(&snap, &cfg, Box::new(ScopedExecutor::new(4)))
            .unwrap()
            .estimate(&[0])
            .unwrap();
        assert!((seq - scoped).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_seed_is_an_error() {
        let snap = star(2, 1.0);
        assert!(estimate_spread(&snap, &[99], &fixed(10, 1)).is_err());
    }

    #[test]
    fn detailed_estimate_reports_plan() {
        let snap = star(2, 1.0);
        let cfg = InfluenceConfig {
            batch_size: Some(4),
            ..fixed(10, 1)
        };
        let est = SpreadEstimator::new(&snap, &cfg)
            .unwrap()
            .estimate_detailed(&[0])
            .unwrap();
        assert_eq!(est.trials, 10);
        assert_eq!(est.batches, 3);
        assert!((est.mean_activated - 3.0).abs() < 1e-12);
    }
}
