//! Lazy marginal-gain priority queue for CELF.
//!
//! Each entry remembers the round (number of accepted seeds) its gain was
//! computed against. Submodularity makes a stale gain an upper bound on the
//! current one, so entries are only recomputed when they reach the top.
//!
//! Ordering: larger gain first; equal gains pop the lowest node identifier
//! first; then the fresher round.

use core::cmp::Ordering;
use std::collections::BinaryHeap;

/// One not-yet-selected candidate.
#[derive(Debug, Clone)]
pub struct GainEntry<N> {
    /// Estimated marginal gain as of `round`.
    pub gain: f64,
    /// Node identifier (tie-break key).
    pub node: N,
    /// Dense snapshot index of `node`.
    pub index: usize,
    /// Number of seeds selected when `gain` was computed.
    pub round: usize,
}

impl<N: Ord> PartialEq for GainEntry<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N: Ord> Eq for GainEntry<N> {}

impl<N: Ord> PartialOrd for GainEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N: Ord> Ord for GainEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.gain
            .total_cmp(&other.gain)
            .then_with(|| other.node.cmp(&self.node))
            .then_with(|| self.round.cmp(&other.round))
    }
}

/// Max-priority queue of [`GainEntry`]s.
#[derive(Debug, Clone)]
pub struct LazyGainQueue<N> {
    heap: BinaryHeap<GainEntry<N>>,
}

impl<N: Ord> Default for LazyGainQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Ord> LazyGainQueue<N> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    /// Creates an empty queue with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Number of queued candidates.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether no candidates remain.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Inserts or re-inserts a candidate.
    pub fn push(&mut self, entry: GainEntry<N>) {
        self.heap.push(entry);
    }

    /// Removes the candidate with the largest stored gain.
    pub fn pop(&mut self) -> Option<GainEntry<N>> {
        self.heap.pop()
    }

    /// The candidate that [`pop`](Self::pop) would return.
    pub fn peek(&self) -> Option<&GainEntry<N>> {
        self.heap.peek()
    }
}
