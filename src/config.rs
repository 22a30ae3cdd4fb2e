//! Tunables shared by the estimator, the selector and the evaluation entry point.
//!
//! [`InfluenceConfig`] is plain data with serde support so the surrounding
//! pipeline can keep it next to its other settings (JSON, TOML, ...). Every
//! field has a default, and missing fields deserialize to those defaults.

use serde::{Deserialize, Serialize};

use crate::error::{InfluenceError, Result};

/// Default activation probability for nodes without a stored `weight`.
pub const DEFAULT_ACTIVATION_PROBABILITY: f64 = 0.01;
/// Default number of Monte Carlo trials per estimate during selection.
pub const DEFAULT_SELECTION_TRIALS: usize = 100;
/// Default number of Monte Carlo trials for a final evaluation.
pub const DEFAULT_EVALUATION_TRIALS: usize = 1000;
/// Default candidate bound `M`.
pub const DEFAULT_CANDIDATE_BOUND: usize = 2000;
/// Target number of scheduled batches per worker when the batch size is automatic.
pub const BATCHES_PER_WORKER: usize = 4;

/// How each batch derives its private random stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Process id, batch offset and fresh OS entropy. Never repeats across calls.
    #[default]
    Entropy,
    /// Base seed mixed with the batch offset. Reproducible for a fixed batch plan.
    Fixed(u64),
}

/// What a single trial is scored by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpreadObjective {
    /// Number of activated nodes.
    #[default]
    ActivatedCount,
    /// Sum of the activated nodes' value attribute (missing values count as 0.0).
    NodeValue,
}

/// Parameters for spread estimation and CELF seed selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceConfig {
    /// Activation probability used for nodes with no stored probability.
    pub default_probability: f64,
    /// Monte Carlo trials per spread estimate. Zero yields estimates of 0.0.
    pub trial_count: usize,
    /// Candidate bound `M` for pruning. Must be positive.
    pub candidate_bound: usize,
    /// Worker count. `None` means available cores minus one (at least one).
    pub worker_count: Option<usize>,
    /// Trials per scheduled batch. `None` targets four batches per worker.
    pub batch_size: Option<usize>,
    /// Cap on propagation rounds per trial. `None` runs to convergence.
    pub max_steps: Option<usize>,
    /// Random stream derivation.
    pub seed_policy: SeedPolicy,
    /// Trial score.
    pub objective: SpreadObjective,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            default_probability: DEFAULT_ACTIVATION_PROBABILITY,
            trial_count: DEFAULT_SELECTION_TRIALS,
            candidate_bound: DEFAULT_CANDIDATE_BOUND,
            worker_count: None,
            batch_size: None,
            max_steps: None,
            seed_policy: SeedPolicy::Entropy,
            objective: SpreadObjective::ActivatedCount,
        }
    }
}

impl InfluenceConfig {
    /// Defaults for a final, higher-precision evaluation of a chosen seed set.
    pub fn evaluation() -> Self {
        Self {
            trial_count: DEFAULT_EVALUATION_TRIALS,
            ..Self::default()
        }
    }

    /// Checks the usage constraints that must fail fast.
    ///
    /// An out-of-range `default_probability` is accepted (caller responsibility)
    /// but logged.
    pub fn validate(&self) -> Result<()> {
        self.validate_candidate_bound()?;
        self.validate_execution()
    }

    /// Rejects a zero candidate bound.
    pub(crate) fn validate_candidate_bound(&self) -> Result<()> {
        if self.candidate_bound == 0 {
            return Err(InfluenceError::InvalidCandidateBound);
        }
        Ok(())
    }

    /// Validation for callers that never prune (estimation and evaluation).
    pub(crate) fn validate_execution(&self) -> Result<()> {
        if self.worker_count == Some(0) {
            return Err(InfluenceError::InvalidWorkerCount);
        }
        if self.batch_size == Some(0) {
            return Err(InfluenceError::InvalidBatchSize);
        }
        if !(0.0..=1.0).contains(&self.default_probability) {
            tracing::warn!(
                default_probability = self.default_probability,
                "default activation probability outside [0, 1]; used as-is"
            );
        }
        Ok(())
    }

    /// Resolved worker count.
    pub fn workers(&self) -> usize {
        self.worker_count.unwrap_or_else(default_worker_count)
    }

    /// Resolved batch size for `trials` trials over `workers` workers.
    pub fn batch_size_for(&self, trials: usize, workers: usize) -> usize {
        self.batch_size
            .unwrap_or_else(|| (trials / (BATCHES_PER_WORKER * workers.max(1))).max(1))
    }
}

/// Available cores minus one, never less than one.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}
