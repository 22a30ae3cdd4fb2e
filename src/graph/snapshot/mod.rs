//! An immutable CSR (compressed sparse row) snapshot of a source graph.
//!
//! Built once from any [`SourceGraph`], the snapshot interns node identifiers
//! to dense indices and stores outgoing adjacency in row-major order, so the
//! cascade simulator touches two flat vectors per expansion instead of walking
//! hash maps.
//!
//! Memory layout:
//! - `ids`: node identifier per dense index
//! - `offsets`: `Vec<usize>` of length `n + 1` (row offsets)
//! - `targets`: contiguous neighbor indices for each row
//! - `probabilities`: optional activation probability per node
//! - `values`: optional node values (only when some node has one)
//!
//! The snapshot is never mutated after construction and is `Sync` whenever the
//! identifier type is, so simulation workers share it by reference.

use core::fmt::Debug;
use core::hash::Hash;
use std::collections::HashMap;

use crate::error::{InfluenceError, Result};
use crate::graph::source::SourceGraph;

/// Read-optimized adjacency with per-node activation probabilities.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `from_graph` | \(O(n + m)\) | One pass over nodes and out-edges |
/// | `neighbors` | \(O(1)\) | Returns a slice of dense indices |
/// | `out_degree` | \(O(1)\) | Offset difference |
/// | `index_of` | \(O(1)\) expected | Hash lookup |
/// | `reversed` | \(O(n + m)\) | Counting-sort transpose |
#[derive(Debug, Clone)]
pub struct Snapshot<N> {
    ids: Vec<N>,
    index: HashMap<N, usize>,
    offsets: Vec<usize>,
    targets: Vec<usize>,
    probabilities: Vec<Option<f64>>,
    values: Option<Vec<f64>>,
    directed: bool,
}

impl<N> Snapshot<N>
where
    N: Clone + Eq + Hash,
{
    /// Builds a snapshot from a source graph.
    ///
    /// Directed graphs keep out-edges only. A node's numeric `weight` becomes
    /// its activation probability; probabilities outside `[0, 1]` are stored
    /// as-is and only logged.
    pub fn from_graph<G>(graph: &G) -> Self
    where
        G: SourceGraph<NodeId = N>,
    {
        let mut builder = SnapshotBuilder::with_capacity(graph.is_directed(), graph.node_count());
        for node in graph.nodes() {
            let u = builder.intern(node.clone());
            builder.probabilities[u] = graph.activation_probability(&node);
            builder.values[u] = graph.node_value(&node);
            let row: Vec<usize> = graph
                .out_neighbors(&node)
                .map(|v| builder.intern(v))
                .collect();
            builder.rows[u] = row;
        }
        builder.finish()
    }

    /// Builds a snapshot from explicit rows of `(node, out-neighbors, probability)`.
    ///
    /// Neighbors that never appear as a row key are added as degree-0 nodes.
    pub fn from_adjacency<I, V>(directed: bool, rows: I) -> Self
    where
        I: IntoIterator<Item = (N, V, Option<f64>)>,
        V: IntoIterator<Item = N>,
    {
        let mut builder = SnapshotBuilder::with_capacity(directed, 0);
        for (node, nbrs, probability) in rows {
            let u = builder.intern(node);
            builder.probabilities[u] = probability;
            let row: Vec<usize> = nbrs.into_iter().map(|v| builder.intern(v)).collect();
            builder.rows[u] = row;
        }
        builder.finish()
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Number of stored adjacency entries (each undirected edge appears twice).
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    /// Whether the source graph was directed.
    #[inline]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Out-neighbors of dense node `u`.
    ///
    /// # Panics
    ///
    /// Panics if `u >= self.node_count()`.
    #[inline]
    pub fn neighbors(&self, u: usize) -> &[usize] {
        &self.targets[self.offsets[u]..self.offsets[u + 1]]
    }

    /// Out-degree of dense node `u` (degree if undirected).
    ///
    /// # Panics
    ///
    /// Panics if `u >= self.node_count()`.
    #[inline]
    pub fn out_degree(&self, u: usize) -> usize {
        self.offsets[u + 1] - self.offsets[u]
    }

    /// Stored activation probability of dense node `u`.
    ///
    /// # Panics
    ///
    /// Panics if `u >= self.node_count()`.
    #[inline]
    pub fn probability(&self, u: usize) -> Option<f64> {
        self.probabilities[u]
    }

    /// Activation probability of dense node `u`, falling back to `default_p`.
    ///
    /// # Panics
    ///
    /// Panics if `u >= self.node_count()`.
    #[inline]
    pub fn probability_or(&self, u: usize, default_p: f64) -> f64 {
        self.probabilities[u].unwrap_or(default_p)
    }

    /// Value of dense node `u`; 0.0 when the node has none.
    ///
    /// # Panics
    ///
    /// Panics if `u >= self.node_count()`.
    #[inline]
    pub fn value(&self, u: usize) -> f64 {
        self.values.as_ref().map_or(0.0, |values| values[u])
    }

    /// Whether any node carries a value.
    pub fn has_values(&self) -> bool {
        self.values.is_some()
    }

    /// Dense index of `node`.
    #[inline]
    pub fn index_of(&self, node: &N) -> Option<usize> {
        self.index.get(node).copied()
    }

    /// Identifier of dense node `u`.
    ///
    /// # Panics
    ///
    /// Panics if `u >= self.node_count()`.
    #[inline]
    pub fn node_id(&self, u: usize) -> &N {
        &self.ids[u]
    }

    /// All node identifiers, by dense index.
    pub fn node_ids(&self) -> &[N] {
        &self.ids
    }

    /// Out-neighbors of `node` by identifier.
    pub fn neighbors_of(&self, node: &N) -> Option<impl Iterator<Item = &N> + '_> {
        let u = self.index_of(node)?;
        Some(self.neighbors(u).iter().map(move |&v| &self.ids[v]))
    }

    /// Returns the transpose: every directed edge `u -> v` becomes `v -> u`.
    ///
    /// Undirected snapshots are symmetric already and are returned unchanged.
    #[must_use]
    pub fn reversed(&self) -> Self {
        if !self.directed {
            return self.clone();
        }
        let n = self.node_count();
        let mut offsets = vec![0usize; n + 1];
        for &v in &self.targets {
            offsets[v + 1] += 1;
        }
        for i in 0..n {
            offsets[i + 1] += offsets[i];
        }
        let mut cursor = offsets.clone();
        let mut targets = vec![0usize; self.targets.len()];
        for u in 0..n {
            for &v in self.neighbors(u) {
                targets[cursor[v]] = u;
                cursor[v] += 1;
            }
        }
        Self {
            offsets,
            targets,
            ..self.clone()
        }
    }
}

impl<N> Snapshot<N>
where
    N: Clone + Eq + Hash + Debug,
{
    /// Maps seed identifiers to dense indices, dropping duplicates.
    ///
    /// Fails on the first identifier the snapshot does not contain.
    pub fn resolve_seeds(&self, seeds: &[N]) -> Result<Vec<usize>> {
        let mut seen = vec![false; self.node_count()];
        let mut out = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let u = self
                .index_of(seed)
                .ok_or_else(|| InfluenceError::UnknownNode(format!("{seed:?}")))?;
            if !seen[u] {
                seen[u] = true;
                out.push(u);
            }
        }
        Ok(out)
    }
}

/// Accumulates rows while interning identifiers; see [`Snapshot::from_graph`].
struct SnapshotBuilder<N> {
    directed: bool,
    ids: Vec<N>,
    index: HashMap<N, usize>,
    rows: Vec<Vec<usize>>,
    probabilities: Vec<Option<f64>>,
    values: Vec<Option<f64>>,
}

impl<N> SnapshotBuilder<N>
where
    N: Clone + Eq + Hash,
{
    fn with_capacity(directed: bool, capacity: usize) -> Self {
        Self {
            directed,
            ids: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            rows: Vec::with_capacity(capacity),
            probabilities: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    fn intern(&mut self, node: N) -> usize {
        if let Some(&u) = self.index.get(&node) {
            return u;
        }
        let u = self.ids.len();
        self.index.insert(node.clone(), u);
        self.ids.push(node);
        self.rows.push(Vec::new());
        self.probabilities.push(None);
        self.values.push(None);
        u
    }

    fn finish(self) -> Snapshot<N> {
        let n = self.ids.len();
        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0);
        let mut total = 0usize;
        for row in &self.rows {
            total += row.len();
            offsets.push(total);
        }
        let mut targets = Vec::with_capacity(total);
        for row in self.rows {
            targets.extend(row);
        }

        let out_of_range = self
            .probabilities
            .iter()
            .flatten()
            .filter(|p| !(0.0..=1.0).contains(*p))
            .count();
        if out_of_range > 0 {
            tracing::warn!(
                nodes = out_of_range,
                "activation probabilities outside [0, 1]; used as-is"
            );
        }

        let values = if self.values.iter().any(Option::is_some) {
            Some(self.values.into_iter().map(|v| v.unwrap_or(0.0)).collect())
        } else {
            None
        };

        tracing::debug!(nodes = n, adjacency = total, directed = self.directed, "snapshot built");

        Snapshot {
            ids: self.ids,
            index: self.index,
            offsets,
            targets,
            probabilities: self.probabilities,
            values,
            directed: self.directed,
        }
    }
}

#[cfg(test)]
mod tests;
