//! Error types for seed selection and spread estimation.

use thiserror::Error;

/// Errors surfaced by the influence-maximization engine.
///
/// Degenerate inputs (zero trials, empty seed sets, `k == 0`) are *not* errors;
/// they produce empty or zero results. Only usage errors and unrecoverable
/// resource failures end up here.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InfluenceError {
    /// The candidate bound `M` must be at least one.
    #[error("candidate bound must be > 0")]
    InvalidCandidateBound,

    /// An explicit worker count of zero was requested.
    #[error("worker count must be > 0 when given")]
    InvalidWorkerCount,

    /// An explicit batch size of zero was requested.
    #[error("batch size must be > 0 when given")]
    InvalidBatchSize,

    /// A seed referred to a node the snapshot does not contain.
    #[error("unknown node in seed set: {0}")]
    UnknownNode(String),

    /// No executor, not even the inline fallback, could run the batches.
    #[error("worker pool failure: {0}")]
    WorkerPool(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InfluenceError>;
