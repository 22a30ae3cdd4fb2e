//! The graph interface consumed from the graph-construction side of the pipeline.
//!
//! Anything that can enumerate its nodes, list out-neighbors and expose an
//! optional numeric `weight` per node can be turned into a [`Snapshot`].
//! Implementations are provided for [`AttributedGraph`] and for
//! [`petgraph::Graph`] whose node payload implements [`NodeWeight`].
//!
//! [`Snapshot`]: crate::graph::Snapshot
//! [`AttributedGraph`]: crate::graph::AttributedGraph

use core::fmt::Debug;
use core::hash::Hash;

use num_traits::ToPrimitive;
use petgraph::graph::{IndexType, NodeIndex};
use petgraph::EdgeType;
use serde_json::{Map, Value};

/// Attribute key holding a node's activation probability.
pub const WEIGHT_ATTRIBUTE: &str = "weight";
/// Attribute key holding a node's value for the node-value objective.
pub const VALUE_ATTRIBUTE: &str = "value";

/// A mutable graph structure that a [`Snapshot`](crate::graph::Snapshot) can be derived from.
pub trait SourceGraph {
    /// Opaque node identifier.
    type NodeId: Clone + Eq + Hash + Ord + Debug;

    /// Whether edges are directed. Undirected graphs report every adjacent node as a neighbor.
    fn is_directed(&self) -> bool;

    /// Number of nodes (capacity hint for snapshot construction).
    fn node_count(&self) -> usize;

    /// All node identifiers.
    fn nodes(&self) -> impl Iterator<Item = Self::NodeId> + '_;

    /// Successors of `node` (all adjacent nodes if undirected).
    fn out_neighbors(&self, node: &Self::NodeId) -> impl Iterator<Item = Self::NodeId> + '_;

    /// The node's `weight` attribute, when present and numeric.
    fn activation_probability(&self, node: &Self::NodeId) -> Option<f64>;

    /// The node's value attribute, when present and numeric.
    fn node_value(&self, _node: &Self::NodeId) -> Option<f64> {
        None
    }
}

/// Node payloads that may carry an activation probability.
pub trait NodeWeight {
    /// Activation probability, if this payload records one.
    fn activation_probability(&self) -> Option<f64>;

    /// Value for the node-value objective, if this payload records one.
    fn node_value(&self) -> Option<f64> {
        None
    }
}

macro_rules! numeric_node_weight {
    ($($t:ty),* $(,)?) => {
        $(
            impl NodeWeight for $t {
                #[inline]
                fn activation_probability(&self) -> Option<f64> {
                    self.to_f64()
                }
            }
        )*
    };
}

numeric_node_weight!(f64, f32, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl NodeWeight for () {
    fn activation_probability(&self) -> Option<f64> {
        None
    }
}

impl<T: NodeWeight> NodeWeight for Option<T> {
    fn activation_probability(&self) -> Option<f64> {
        self.as_ref().and_then(NodeWeight::activation_probability)
    }

    fn node_value(&self) -> Option<f64> {
        self.as_ref().and_then(NodeWeight::node_value)
    }
}

/// JSON attribute maps: `weight` and `value` keys, numeric values only.
impl NodeWeight for Map<String, Value> {
    fn activation_probability(&self) -> Option<f64> {
        self.get(WEIGHT_ATTRIBUTE).and_then(Value::as_f64)
    }

    fn node_value(&self) -> Option<f64> {
        self.get(VALUE_ATTRIBUTE).and_then(Value::as_f64)
    }
}

impl NodeWeight for Value {
    fn activation_probability(&self) -> Option<f64> {
        self.as_object().and_then(NodeWeight::activation_probability)
    }

    fn node_value(&self) -> Option<f64> {
        self.as_object().and_then(NodeWeight::node_value)
    }
}

impl<W, E, Ty, Ix> SourceGraph for petgraph::Graph<W, E, Ty, Ix>
where
    W: NodeWeight,
    Ty: EdgeType,
    Ix: IndexType,
{
    type NodeId = NodeIndex<Ix>;

    fn is_directed(&self) -> bool {
        petgraph::Graph::is_directed(self)
    }

    fn node_count(&self) -> usize {
        petgraph::Graph::node_count(self)
    }

    fn nodes(&self) -> impl Iterator<Item = Self::NodeId> + '_ {
        self.node_indices()
    }

    fn out_neighbors(&self, node: &Self::NodeId) -> impl Iterator<Item = Self::NodeId> + '_ {
        // Outgoing only for directed graphs, every incident edge otherwise.
        self.neighbors(*node)
    }

    fn activation_probability(&self, node: &Self::NodeId) -> Option<f64> {
        self.node_weight(*node).and_then(NodeWeight::activation_probability)
    }

    fn node_value(&self, node: &Self::NodeId) -> Option<f64> {
        self.node_weight(*node).and_then(NodeWeight::node_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graph::{DiGraph, UnGraph};
    use serde_json::json;

    #[test]
    fn numeric_payloads_become_probabilities() {
        assert_eq!(0.5f64.activation_probability(), Some(0.5));
        assert_eq!(1u8.activation_probability(), Some(1.0));
        assert_eq!(Some(0.25f32).activation_probability(), Some(0.25));
        assert_eq!(None::<f64>.activation_probability(), None);
        assert_eq!(().activation_probability(), None);
    }

    #[test]
    fn json_attributes_only_accept_numbers() {
        let attrs = json!({"weight": 0.3, "value": 7});
        assert_eq!(attrs.activation_probability(), Some(0.3));
        assert_eq!(attrs.node_value(), Some(7.0));

        let attrs = json!({"weight": "high"});
        assert_eq!(attrs.activation_probability(), None);
        assert_eq!(json!(null).activation_probability(), None);
    }

    #[test]
    fn petgraph_directed_uses_out_edges() {
        let mut g = DiGraph::<f64, ()>::new();
        let a = g.add_node(1.0);
        let b = g.add_node(0.5);
        g.add_edge(a, b, ());

        assert!(SourceGraph::is_directed(&g));
        assert_eq!(g.out_neighbors(&a).collect::<Vec<_>>(), vec![b]);
        assert_eq!(g.out_neighbors(&b).count(), 0);
        assert_eq!(SourceGraph::activation_probability(&g, &b), Some(0.5));
    }

    #[test]
    fn petgraph_undirected_reports_both_ends() {
        let mut g = UnGraph::<Option<f64>, ()>::new_undirected();
        let a = g.add_node(None);
        let b = g.add_node(Some(0.2));
        g.add_edge(a, b, ());

        assert!(!SourceGraph::is_directed(&g));
        assert_eq!(g.out_neighbors(&b).collect::<Vec<_>>(), vec![a]);
        assert_eq!(SourceGraph::activation_probability(&g, &a), None);
    }
}
