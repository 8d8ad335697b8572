//! statusmap: static call-graph analysis that maps HTTP request handlers
//! to the symbolic status-code constants they can reach.
//!
//! A front end lowers the program under analysis into the [`program`]
//! model; the engine then builds a call graph with a configurable
//! strategy, scans for constructor calls that bind constant codes to
//! package-level variables, discovers the handlers hanging off the
//! framework's dispatch boundary, and attributes to each handler the codes
//! its statically reachable call graph can emit.

pub mod analysis;
pub mod config;
pub mod errors;
pub mod graph;
pub mod program;

// Re-export commonly used types
pub use crate::analysis::{
    Analysis, AnalysisReport, Attributor, CodeBinding, CodeRegistry, HandlerRecord, Scratch,
    WalkOptions,
};
pub use crate::config::{AnalysisConfig, BoundarySpec, CallGraphAlgorithm, ConstructorTarget};
pub use crate::errors::AnalysisError;
pub use crate::graph::{CallGraph, CallResolution, FunctionCall, FunctionId};
pub use crate::program::{
    Callee, FunctionDef, GlobalId, Instruction, Operand, ProgramDb, StdlibIndex, ValueId,
};
