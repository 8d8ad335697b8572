//! Cycle-safe depth-first reachability walk with a pluggable termination
//! predicate.
//!
//! Each invocation keeps its own visited set keyed by node identity, so
//! every reachable node is processed at most once and the walk terminates
//! on any finite graph, cyclic or not. Edge order comes from
//! [`CallGraph::sorted_out_edges`], so diagnostics are reproducible
//! run-to-run.

use crate::graph::{CallGraph, CallResolution, FunctionId};
use std::collections::HashSet;

/// Options controlling one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Ignore edges whose call site did not resolve to a single static
    /// target.
    pub skip_dynamic_edges: bool,
    /// Maintain the ordered root-to-current chain for diagnostics.
    pub track_path: bool,
}

/// Depth-first walk over `graph` from `root`.
///
/// `is_end` receives the current node, its parent, and (with path tracking
/// on) the chain from the root to the current node; returning `true` stops
/// descent from that node while sibling branches continue unaffected.
///
/// `path` is a reusable scratch buffer borrowed for the duration of the
/// walk: appended on descent, truncated on backtrack, and left empty on
/// every exit path.
pub fn path_search<F>(
    graph: &CallGraph,
    root: &FunctionId,
    options: WalkOptions,
    path: &mut Vec<FunctionId>,
    mut is_end: F,
) where
    F: FnMut(&FunctionId, Option<&FunctionId>, &[FunctionId]) -> bool,
{
    path.clear();
    if options.track_path {
        path.push(root.clone());
    }
    let mut seen: HashSet<FunctionId> = HashSet::new();
    search(graph, root, None, options, path, &mut seen, &mut is_end);
    path.clear();
}

fn search<F>(
    graph: &CallGraph,
    node: &FunctionId,
    parent: Option<&FunctionId>,
    options: WalkOptions,
    path: &mut Vec<FunctionId>,
    seen: &mut HashSet<FunctionId>,
    is_end: &mut F,
) where
    F: FnMut(&FunctionId, Option<&FunctionId>, &[FunctionId]) -> bool,
{
    if !seen.insert(node.clone()) {
        return;
    }
    if is_end(node, parent, path) {
        return;
    }
    for edge in graph.sorted_out_edges(node) {
        if options.skip_dynamic_edges && edge.resolution == CallResolution::Dynamic {
            continue;
        }
        if options.track_path {
            path.push(edge.callee.clone());
            search(graph, &edge.callee, Some(node), options, path, seen, is_end);
            path.pop();
        } else {
            search(graph, &edge.callee, Some(node), options, path, seen, is_end);
        }
    }
}
