//! Analysis configuration: call-graph strategy, constructor target,
//! dispatch boundary, and traversal options.

use crate::errors::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Call-graph construction strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallGraphAlgorithm {
    /// Exact static calls only. Fast, least complete.
    Static,
    /// Class-hierarchy analysis. Complete, imprecise for dynamic dispatch.
    Cha,
    /// Reachability analysis seeded from program entry points. Most
    /// precise; requires at least one entry point.
    #[default]
    Rta,
}

impl FromStr for CallGraphAlgorithm {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(Self::Static),
            "cha" => Ok(Self::Cha),
            "rta" => Ok(Self::Rta),
            other => Err(AnalysisError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for CallGraphAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Static => "static",
            Self::Cha => "cha",
            Self::Rta => "rta",
        };
        f.write_str(name)
    }
}

/// The constructor whose constant-argument call sites seed the code
/// registry, e.g. the framework's `NewCode(code, message)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorTarget {
    pub package: String,
    pub function: String,
}

impl ConstructorTarget {
    pub fn new(package: &str, function: &str) -> Self {
        Self {
            package: package.to_string(),
            function: function.to_string(),
        }
    }
}

/// Identifies the framework method that advances the handler pipeline:
/// owning package, receiver type, and a name fragment matched against
/// method names in that package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundarySpec {
    pub package: String,
    pub receiver: String,
    pub method: String,
}

impl BoundarySpec {
    pub fn new(package: &str, receiver: &str, method: &str) -> Self {
        Self {
            package: package.to_string(),
            receiver: receiver.to_string(),
            method: method.to_string(),
        }
    }
}

impl Default for BoundarySpec {
    /// The gin pipeline boundary: `(*Context).Next` in the gin package.
    fn default() -> Self {
        Self::new("github.com/gin-gonic/gin", "*Context", "Next")
    }
}

/// Top-level analysis options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub algorithm: CallGraphAlgorithm,
    pub constructor: ConstructorTarget,
    pub boundary: BoundarySpec,
    /// Drop call-graph edges whose call site has no static target,
    /// bounding traversals to provably-static paths.
    pub skip_dynamic_edges: bool,
    /// Log the root-to-node call chain for every newly discovered code.
    pub show_references: bool,
    /// Attribute handlers across threads. Ignored when `show_references`
    /// is set so chain output stays ordered.
    pub parallel: bool,
}

impl AnalysisConfig {
    pub fn new(constructor: ConstructorTarget) -> Self {
        Self {
            algorithm: CallGraphAlgorithm::default(),
            constructor,
            boundary: BoundarySpec::default(),
            skip_dynamic_edges: false,
            show_references: false,
            parallel: false,
        }
    }

    pub fn with_algorithm(mut self, algorithm: CallGraphAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_boundary(mut self, boundary: BoundarySpec) -> Self {
        self.boundary = boundary;
        self
    }
}
