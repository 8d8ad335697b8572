//! Call graph model and construction strategies.

pub mod builder;
mod types;

pub use builder::build_call_graph;
pub use types::{
    normalize_synthetic_name, CallEdge, CallGraph, CallResolution, FunctionCall, FunctionId,
};
