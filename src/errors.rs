//! Typed failures surfaced by the analysis engine.
//!
//! The engine is a pure function over immutable input, so the error surface
//! is small: configuration problems abort before analysis starts, and the
//! entry-point-sensitive call-graph algorithm refuses a program with no
//! entry points. Everything else degrades to empty results by design.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Unrecognized call-graph algorithm identifier in the configuration.
    #[error("unknown call graph algorithm: {0}")]
    UnknownAlgorithm(String),

    /// The reachability algorithm needs at least one entry point (a main
    /// package or a package initializer).
    #[error("no entry points found: the rta algorithm requires a main package or package initializers")]
    NoEntryPoints,
}
