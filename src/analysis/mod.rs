//! Handler discovery and status-code attribution over a built call graph.

pub mod attribution;
pub mod discovery;
pub mod registry;
pub mod traversal;

pub use attribution::{AnalysisReport, Attributor, HandlerRecord, Scratch};
pub use discovery::{discover_handlers, find_dispatch_boundary};
pub use registry::{CodeBinding, CodeRegistry};
pub use traversal::{path_search, WalkOptions};

use crate::config::AnalysisConfig;
use crate::graph::build_call_graph;
use crate::program::ProgramDb;
use anyhow::{Context, Result};

/// End-to-end analysis: build the call graph with the configured strategy,
/// build the constant registry, locate the dispatch boundary, discover
/// handlers, and attribute each one. A pure function over immutable input;
/// repeated runs produce identical reports.
pub struct Analysis<'a> {
    program: &'a ProgramDb,
    config: AnalysisConfig,
}

impl<'a> Analysis<'a> {
    pub fn new(program: &'a ProgramDb, config: AnalysisConfig) -> Self {
        Self { program, config }
    }

    pub fn run(&self) -> Result<AnalysisReport> {
        log::info!("starting handler analysis");

        let graph = build_call_graph(self.program, self.config.algorithm)
            .context("building call graph")?;
        let registry = CodeRegistry::build(self.program, &self.config.constructor);

        let boundary = find_dispatch_boundary(self.program, &graph, &self.config.boundary);
        let handlers = discover_handlers(&graph, boundary.as_ref());

        let options = WalkOptions {
            skip_dynamic_edges: self.config.skip_dynamic_edges,
            track_path: self.config.show_references,
        };
        let attributor = Attributor::new(
            self.program,
            &graph,
            &registry,
            self.program.stdlib(),
            boundary,
            &handlers,
            options,
        );
        // Chain diagnostics interleave under parallelism, so they force the
        // sequential path.
        let report = if self.config.parallel && !self.config.show_references {
            attributor.attribute_all_parallel()
        } else {
            attributor.attribute_all()
        };

        log::info!(
            "handler analysis complete: {} handlers in {} packages",
            report.handler_count(),
            report.handlers_by_package.len()
        );
        Ok(report)
    }
}
