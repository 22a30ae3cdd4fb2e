//! Task-batch executors for Monte Carlo trials.
//!
//! The estimator hands an executor a list of [`TrialBatch`]es and a job that
//! turns one batch into [`BatchTotals`]. Executors only decide *where* the job
//! runs; results always come back in batch order so the caller's summation is
//! independent of scheduling.
//!
//! - [`SequentialExecutor`]: runs inline in the caller's thread.
//! - [`ScopedExecutor`]: `std::thread::scope` workers pulling batches from a
//!   shared cursor; the calling thread works too.
//! - [`PoolExecutor`] (feature `parallel`): a dedicated rayon thread pool.

use core::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::error::{InfluenceError, Result};

/// A contiguous slice of the trial budget, run by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialBatch {
    /// Distinct offset used to derive the batch's random stream.
    pub offset: u64,
    /// Number of trials in the batch.
    pub trials: usize,
}

/// Summed trial scores of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BatchTotals {
    /// Sum of activated-node counts.
    pub activated: u64,
    /// Sum of activated-node values.
    pub value: f64,
}

impl BatchTotals {
    /// Adds another batch's totals into this one.
    #[inline]
    pub fn merge(&mut self, other: BatchTotals) {
        self.activated += other.activated;
        self.value += other.value;
    }
}

/// Job run once per batch.
pub type BatchJob<'a> = dyn Fn(TrialBatch) -> BatchTotals + Sync + 'a;

/// Runs trial batches somewhere and reports per-batch totals in batch order.
pub trait BatchExecutor: Send + Sync {
    /// Number of workers this executor schedules onto.
    fn workers(&self) -> usize;

    /// Runs `job` once for every batch. The returned vector is index-aligned with `batches`.
    fn execute(&self, batches: &[TrialBatch], job: &BatchJob<'_>) -> Result<Vec<BatchTotals>>;
}

/// Runs every batch inline, in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl BatchExecutor for SequentialExecutor {
    fn workers(&self) -> usize {
        1
    }

    fn execute(&self, batches: &[TrialBatch], job: &BatchJob<'_>) -> Result<Vec<BatchTotals>> {
        Ok(batches.iter().map(|&b| job(b)).collect())
    }
}

/// Scoped std threads that pull batches from a shared cursor.
///
/// `workers - 1` threads are spawned per call; the calling thread is the last
/// worker. A thread that fails to spawn is skipped, so in the worst case every
/// batch runs inline.
#[derive(Debug, Clone, Copy)]
pub struct ScopedExecutor {
    workers: usize,
}

impl ScopedExecutor {
    /// Creates an executor with `workers` workers (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

impl BatchExecutor for ScopedExecutor {
    fn workers(&self) -> usize {
        self.workers
    }

    fn execute(&self, batches: &[TrialBatch], job: &BatchJob<'_>) -> Result<Vec<BatchTotals>> {
        let cursor = CachePadded::new(AtomicUsize::new(0));
        let drain = || {
            let mut local = Vec::new();
            loop {
                let i = cursor.fetch_add(1, Ordering::Relaxed);
                if i >= batches.len() {
                    break local;
                }
                local.push((i, job(batches[i])));
            }
        };

        let helpers = self.workers.min(batches.len()).saturating_sub(1);
        let collected: Vec<Vec<(usize, BatchTotals)>> = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(helpers);
            for tid in 0..helpers {
                match std::thread::Builder::new()
                    .name(format!("infmax-worker-{tid}"))
                    .spawn_scoped(scope, &drain)
                {
                    Ok(h) => handles.push(h),
                    Err(err) => {
                        tracing::warn!(
                            %err,
                            "failed to spawn worker; continuing with fewer threads"
                        );
                        break;
                    }
                }
            }
            let mut all = vec![drain()];
            for h in handles {
                let part = h
                    .join()
                    .map_err(|_| InfluenceError::WorkerPool("worker thread panicked".to_owned()))?;
                all.push(part);
            }
            Ok::<_, InfluenceError>(all)
        })?;

        let mut out = vec![BatchTotals::default(); batches.len()];
        for (i, totals) in collected.into_iter().flatten() {
            out[i] = totals;
        }
        Ok(out)
    }
}

/// A dedicated rayon thread pool.
#[cfg(feature = "parallel")]
pub struct PoolExecutor {
    pool: rayon::ThreadPool,
    workers: usize,
}

#[cfg(feature = "parallel")]
impl PoolExecutor {
    /// Builds a pool with `workers` threads.
    pub fn new(workers: usize) -> std::result::Result<Self, rayon::ThreadPoolBuildError> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("infmax-worker-{i}"))
            .build()?;
        Ok(Self { pool, workers })
    }
}

#[cfg(feature = "parallel")]
impl BatchExecutor for PoolExecutor {
    fn workers(&self) -> usize {
        self.workers
    }

    fn execute(&self, batches: &[TrialBatch], job: &BatchJob<'_>) -> Result<Vec<BatchTotals>> {
        use rayon::prelude::*;

        Ok(self
            .pool
            .install(|| batches.par_iter().map(|&b| job(b)).collect()))
    }
}

/// Picks the executor for `workers` workers.
///
/// One worker runs inline. Otherwise the rayon pool is used when the
/// `parallel` feature is on (falling back to inline execution if the pool
/// cannot be built), and scoped threads when it is off.
pub fn executor_for(workers: usize) -> Box<dyn BatchExecutor> {
    if workers <= 1 {
        return Box::new(SequentialExecutor);
    }
    parallel_executor(workers)
}

#[cfg(feature = "parallel")]
fn parallel_executor(workers: usize) -> Box<dyn BatchExecutor> {
    match PoolExecutor::new(workers) {
        Ok(pool) => Box::new(pool),
        Err(err) => {
            tracing::warn!(%err, workers, "thread pool unavailable; running trials sequentially");
            Box::new(SequentialExecutor)
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn parallel_executor(workers: usize) -> Box<dyn BatchExecutor> {
    Box::new(ScopedExecutor::new(workers))
}
