//! Graph inputs and the immutable snapshot the simulator runs on.
//!
//! - `source`: the interface a mutable graph exposes to the engine
//! - `attributed`: a mutable graph with JSON node attributes
//! - `snapshot`: the read-optimized CSR form shared by all workers

pub mod attributed;
pub mod snapshot;
pub mod source;

pub use attributed::AttributedGraph;
pub use snapshot::Snapshot;
pub use source::{NodeWeight, SourceGraph, VALUE_ATTRIBUTE, WEIGHT_ATTRIBUTE};
