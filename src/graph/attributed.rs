//! A dynamic adjacency-list graph whose nodes carry JSON attribute maps.
//!
//! This is the mutable side of the pipeline: graph builders insert nodes and
//! edges as they discover them, annotate nodes with attributes such as
//! `weight` (activation probability) or a score used as node value, and then
//! freeze the result into a [`Snapshot`](crate::graph::Snapshot).
//!
//! Node identifiers are arbitrary hashable, ordered values; internally they are
//! interned to dense `usize` indices so adjacency lists stay compact.

use core::fmt::Debug;
use core::hash::Hash;
use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::graph::source::{SourceGraph, VALUE_ATTRIBUTE, WEIGHT_ATTRIBUTE};

/// A mutable directed or undirected graph with per-node attributes.
///
/// Parallel edges are collapsed; inserting an edge that already exists is a no-op.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `add_node` | \(O(1)\) amortized | Interns the identifier |
/// | `add_edge` | \(O(\text{out-degree})\) | Checks for existence first |
/// | `remove_edge` | \(O(\text{out-degree})\) | Linear scan of adjacency list |
/// | `out_degree` | \(O(1)\) | returns `Vec::len` |
/// | `reverse` | \(O(n + m)\) | Builds a new graph |
#[derive(Debug, Clone)]
pub struct AttributedGraph<N> {
    directed: bool,
    ids: Vec<N>,
    index: HashMap<N, usize>,
    adjacency: Vec<Vec<usize>>,
    attributes: Vec<Map<String, Value>>,
    value_key: String,
}

impl<N> AttributedGraph<N>
where
    N: Clone + Eq + Hash,
{
    /// Creates an empty directed graph.
    pub fn directed() -> Self {
        Self::with_direction(true)
    }

    /// Creates an empty undirected graph.
    pub fn undirected() -> Self {
        Self::with_direction(false)
    }

    fn with_direction(directed: bool) -> Self {
        Self {
            directed,
            ids: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            attributes: Vec::new(),
            value_key: VALUE_ATTRIBUTE.to_owned(),
        }
    }

    /// Reads node values from `key` instead of the default `value` attribute.
    #[must_use]
    pub fn with_value_attribute(mut self, key: impl Into<String>) -> Self {
        self.value_key = key.into();
        self
    }

    /// Attribute key read for node values.
    pub fn value_attribute(&self) -> &str {
        &self.value_key
    }

    /// Inserts `node` if absent and returns its dense index.
    pub fn add_node(&mut self, node: N) -> usize {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.ids.len();
        self.index.insert(node.clone(), idx);
        self.ids.push(node);
        self.adjacency.push(Vec::new());
        self.attributes.push(Map::new());
        idx
    }

    /// Adds the edge `from -> to`, inserting missing endpoints.
    ///
    /// Undirected graphs record the edge on both endpoints.
    pub fn add_edge(&mut self, from: N, to: N) {
        let u = self.add_node(from);
        let v = self.add_node(to);
        Self::link(&mut self.adjacency[u], v);
        if !self.directed && u != v {
            Self::link(&mut self.adjacency[v], u);
        }
    }

    /// Adds every edge from `edges`.
    pub fn extend_edges<I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = (N, N)>,
    {
        for (from, to) in edges {
            self.add_edge(from, to);
        }
    }

    fn link(nbrs: &mut Vec<usize>, v: usize) {
        if !nbrs.contains(&v) {
            nbrs.push(v);
        }
    }

    /// Removes the edge `from -> to` if present.
    pub fn remove_edge(&mut self, from: &N, to: &N) -> bool {
        let (Some(&u), Some(&v)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };
        let before = self.adjacency[u].len();
        self.adjacency[u].retain(|&w| w != v);
        let removed = before != self.adjacency[u].len();
        if removed && !self.directed {
            self.adjacency[v].retain(|&w| w != u);
        }
        removed
    }

    /// Sets attribute `key` on `node`, inserting the node if needed.
    pub fn set_attribute(&mut self, node: N, key: impl Into<String>, value: impl Into<Value>) {
        let idx = self.add_node(node);
        self.attributes[idx].insert(key.into(), value.into());
    }

    /// Sets the `weight` (activation probability) attribute.
    pub fn set_weight(&mut self, node: N, weight: f64) {
        self.set_attribute(node, WEIGHT_ATTRIBUTE, weight);
    }

    /// Sets `weight` on every node currently in the graph.
    pub fn set_all_weights(&mut self, weight: f64) {
        for attrs in &mut self.attributes {
            attrs.insert(WEIGHT_ATTRIBUTE.to_owned(), Value::from(weight));
        }
    }

    /// Attribute map of `node`.
    pub fn attributes(&self, node: &N) -> Option<&Map<String, Value>> {
        self.index.get(node).map(|&idx| &self.attributes[idx])
    }

    /// Whether `node` is present.
    pub fn contains_node(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Whether the graph is directed.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Number of edges. Undirected edges are counted once.
    pub fn edge_count(&self) -> usize {
        let stored: usize = self.adjacency.iter().map(Vec::len).sum();
        if self.directed {
            stored
        } else {
            let loops = self
                .adjacency
                .iter()
                .enumerate()
                .filter(|(u, nbrs)| nbrs.contains(u))
                .count();
            (stored + loops) / 2
        }
    }

    /// Out-degree of `node` (degree if undirected).
    pub fn out_degree(&self, node: &N) -> Option<usize> {
        self.index.get(node).map(|&idx| self.adjacency[idx].len())
    }

    /// Node identifiers in insertion order.
    pub fn node_ids(&self) -> &[N] {
        &self.ids
    }

    /// Successors of `node` (all adjacent nodes if undirected), in insertion order.
    pub fn neighbors<'a>(&'a self, node: &N) -> impl Iterator<Item = &'a N> + 'a {
        let row: &'a [usize] = self
            .index
            .get(node)
            .map_or(&[][..], |&idx| self.adjacency[idx].as_slice());
        row.iter().map(move |&v| &self.ids[v])
    }

    /// Returns a copy with every directed edge flipped. Attributes are kept.
    ///
    /// Undirected graphs are returned unchanged.
    #[must_use]
    pub fn reverse(&self) -> Self {
        if !self.directed {
            return self.clone();
        }
        let mut adjacency = vec![Vec::new(); self.ids.len()];
        for (u, nbrs) in self.adjacency.iter().enumerate() {
            for &v in nbrs {
                adjacency[v].push(u);
            }
        }
        Self {
            adjacency,
            ..self.clone()
        }
    }
}

impl<N> SourceGraph for AttributedGraph<N>
where
    N: Clone + Eq + Hash + Ord + Debug,
{
    type NodeId = N;

    fn is_directed(&self) -> bool {
        self.directed
    }

    fn node_count(&self) -> usize {
        self.ids.len()
    }

    fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.ids.iter().cloned()
    }

    fn out_neighbors(&self, node: &N) -> impl Iterator<Item = N> + '_ {
        let row: &[usize] = self
            .index
            .get(node)
            .map_or(&[][..], |&idx| self.adjacency[idx].as_slice());
        row.iter().map(move |&v| self.ids[v].clone())
    }

    fn activation_probability(&self, node: &N) -> Option<f64> {
        self.attributes(node)
            .and_then(|attrs| attrs.get(WEIGHT_ATTRIBUTE))
            .and_then(Value::as_f64)
    }

    fn node_value(&self, node: &N) -> Option<f64> {
        self.attributes(node)
            .and_then(|attrs| attrs.get(self.value_key.as_str()))
            .and_then(Value::as_f64)
    }
}
