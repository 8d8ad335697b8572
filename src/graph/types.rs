//! Call graph data model: functions as nodes, call sites as edges.
//!
//! Edges carry a resolution flag so traversals can restrict themselves to
//! provably-static paths. All orderings exposed here are stable so repeated
//! analyses over the same graph are byte-identical.

use im::{HashMap, HashSet, Vector};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identity of a declared function: owning package path, name, and
/// definition site.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionId {
    pub package: String,
    pub name: String,
    pub file: PathBuf,
    pub line: usize,
}

impl FunctionId {
    pub fn new(package: String, name: String, file: PathBuf, line: usize) -> Self {
        Self {
            package,
            name,
            file,
            line,
        }
    }

    /// Package initializer functions (`init`, `init#2`, ...) count as
    /// program entry points alongside `main`.
    pub fn is_initializer(&self) -> bool {
        self.name == "init" || self.name.starts_with("init#")
    }

    /// `package.name` with synthetic closure markers normalized, the form
    /// used for handler identity in reports.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.package, normalize_synthetic_name(&self.name))
    }
}

/// Rewrite compiler-synthesized closure markers (`Handler$1`) into the
/// stable `Handler.func1` form.
pub fn normalize_synthetic_name(name: &str) -> String {
    name.replace('$', ".func")
}

/// Whether a call site resolved to a single static target or went through
/// dynamic dispatch.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CallResolution {
    Static,
    Dynamic,
}

/// A recorded call: caller, callee, and how the call site resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub caller: FunctionId,
    pub callee: FunctionId,
    pub resolution: CallResolution,
}

/// Outgoing edge as seen from a caller.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CallEdge {
    pub callee: FunctionId,
    pub resolution: CallResolution,
}

#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    nodes: HashSet<FunctionId>,
    edges: Vector<FunctionCall>,
    out_index: HashMap<FunctionId, Vector<CallEdge>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self {
            nodes: HashSet::new(),
            edges: Vector::new(),
            out_index: HashMap::new(),
        }
    }

    pub fn add_node(&mut self, id: FunctionId) {
        self.nodes.insert(id);
    }

    pub fn add_call(&mut self, call: FunctionCall) {
        self.nodes.insert(call.caller.clone());
        self.nodes.insert(call.callee.clone());

        self.out_index
            .entry(call.caller.clone())
            .or_default()
            .push_back(CallEdge {
                callee: call.callee.clone(),
                resolution: call.resolution,
            });

        self.edges.push_back(call);
    }

    pub fn contains(&self, id: &FunctionId) -> bool {
        self.nodes.contains(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &FunctionId> {
        self.nodes.iter()
    }

    /// Outgoing edges in stable order: sorted by callee then resolution,
    /// duplicate call sites collapsed.
    pub fn sorted_out_edges(&self, id: &FunctionId) -> Vec<CallEdge> {
        let mut edges: Vec<CallEdge> = self
            .out_index
            .get(id)
            .map(|v| v.iter().cloned().collect())
            .unwrap_or_default();
        edges.sort();
        edges.dedup();
        edges
    }

    /// Direct callees of `id`, deduplicated and sorted.
    pub fn callees_of(&self, id: &FunctionId) -> Vec<FunctionId> {
        let mut callees: Vec<FunctionId> = self
            .sorted_out_edges(id)
            .into_iter()
            .map(|edge| edge.callee)
            .collect();
        callees.dedup();
        callees
    }

    /// All recorded calls, in insertion order (for tests and debugging).
    pub fn all_calls(&self) -> Vec<FunctionCall> {
        self.edges.iter().cloned().collect()
    }
}
