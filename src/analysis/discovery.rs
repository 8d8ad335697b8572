//! Locating the dispatch boundary and the one-hop handler set.

use crate::config::BoundarySpec;
use crate::graph::{CallGraph, FunctionId};
use crate::program::ProgramDb;

/// Find the framework method that advances the handler pipeline, matched
/// by owning package, receiver type, and method-name fragment. Absence is
/// not an error; analysis without the framework present simply finds no
/// handlers.
pub fn find_dispatch_boundary(
    program: &ProgramDb,
    graph: &CallGraph,
    spec: &BoundarySpec,
) -> Option<FunctionId> {
    let mut matches: Vec<FunctionId> = graph
        .nodes()
        .filter(|node| node.package == spec.package && node.name.contains(&spec.method))
        .filter(|node| {
            program
                .function(node)
                .and_then(|def| def.receiver.as_deref())
                == Some(spec.receiver.as_str())
        })
        .cloned()
        .collect();
    matches.sort();
    matches.into_iter().next()
}

/// Handlers are the functions called directly at the boundary's out-edges.
/// One hop only: a handler may itself re-invoke the boundary, so a full
/// reachability closure would leak across the pipeline.
pub fn discover_handlers(graph: &CallGraph, boundary: Option<&FunctionId>) -> Vec<FunctionId> {
    let Some(boundary) = boundary else {
        log::info!("dispatch boundary not present; no handlers to analyze");
        return Vec::new();
    };
    let handlers = graph.callees_of(boundary);
    log::info!("found {} handlers at the dispatch boundary", handlers.len());
    for handler in &handlers {
        log::debug!("handler: {}", handler.qualified_name());
    }
    handlers
}
