//! Per-handler attribution of reachable status-code constants.
//!
//! For each handler, a traversal rooted at the handler collects every
//! registry-bound global its reachable call graph references, then
//! translates the discovered code values into variable names. Alias
//! emission is keyed by code value: every name bound to a discovered code
//! is reported, not just the global actually referenced.

use crate::analysis::registry::CodeRegistry;
use crate::analysis::traversal::{path_search, WalkOptions};
use crate::graph::{CallGraph, FunctionId};
use crate::program::{Operand, ProgramDb, StdlibIndex};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One analyzed handler, ready for the downstream code-generation step.
/// Built once per handler and never mutated afterward; an empty
/// `status_codes` list is a valid result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerRecord {
    pub handler_name: String,
    pub file: String,
    pub line: usize,
    pub status_codes: Vec<String>,
}

/// Ordered mapping of package path to analyzed handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub handlers_by_package: BTreeMap<String, Vec<HandlerRecord>>,
}

impl AnalysisReport {
    pub fn handler_count(&self) -> usize {
        self.handlers_by_package.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers_by_package.is_empty()
    }

    /// Rendering consumed by the downstream code generator.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Scratch reused across node visits within one traversal, and across
/// handlers when attribution runs sequentially. Borrowed for the strict
/// duration of one `attribute` call; every exit path leaves it empty.
#[derive(Debug, Default)]
pub struct Scratch {
    path: Vec<FunctionId>,
    step_codes: HashSet<i64>,
}

/// Runs the traversal engine per handler and assembles records. Holds only
/// shared read-only state, so handlers can be attributed in parallel.
pub struct Attributor<'a> {
    program: &'a ProgramDb,
    graph: &'a CallGraph,
    registry: &'a CodeRegistry,
    stdlib: &'a StdlibIndex,
    boundary: Option<FunctionId>,
    handlers: HashSet<FunctionId>,
    options: WalkOptions,
}

impl<'a> Attributor<'a> {
    pub fn new(
        program: &'a ProgramDb,
        graph: &'a CallGraph,
        registry: &'a CodeRegistry,
        stdlib: &'a StdlibIndex,
        boundary: Option<FunctionId>,
        handlers: &[FunctionId],
        options: WalkOptions,
    ) -> Self {
        Self {
            program,
            graph,
            registry,
            stdlib,
            boundary,
            handlers: handlers.iter().cloned().collect(),
            options,
        }
    }

    /// Attribute every known handler sequentially, reusing one scratch.
    pub fn attribute_all(&self) -> AnalysisReport {
        let handlers = self.sorted_handlers();
        let mut scratch = Scratch::default();
        let records = handlers
            .iter()
            .map(|h| (h.package.clone(), self.attribute(h, &mut scratch)))
            .collect();
        Self::into_report(records)
    }

    /// Parallel variant: handlers share only the read-only graph and
    /// registry, so they fan out across threads with per-thread scratch.
    pub fn attribute_all_parallel(&self) -> AnalysisReport {
        let handlers = self.sorted_handlers();
        let records = handlers
            .par_iter()
            .map_init(Scratch::default, |scratch, h| {
                (h.package.clone(), self.attribute(h, scratch))
            })
            .collect();
        Self::into_report(records)
    }

    /// Attribute a single handler rooted at `handler`.
    pub fn attribute(&self, handler: &FunctionId, scratch: &mut Scratch) -> HandlerRecord {
        let mut codes: HashSet<i64> = HashSet::new();
        let Scratch { path, step_codes } = scratch;
        step_codes.clear();

        path_search(self.graph, handler, self.options, path, |current, _, chain| {
            // A different known handler: its codes are its own. The
            // handler's recursive self-calls are still explored.
            if current != handler && self.handlers.contains(current) {
                return true;
            }
            // The boundary itself would escape into sibling handlers.
            if self.boundary.as_ref() == Some(current) {
                return true;
            }
            // Standard-library noise.
            if self.stdlib.contains(&current.package) {
                return true;
            }

            self.scan_function(current, step_codes);
            let fresh = drain_new_codes(step_codes, &mut codes);
            if self.options.track_path && !fresh.is_empty() {
                log_chain(chain, &fresh);
            }
            false
        });

        let mut discovered: Vec<i64> = codes.into_iter().collect();
        discovered.sort_unstable();
        log::debug!(
            "handler {} references codes {:?}",
            handler.qualified_name(),
            discovered
        );

        // Ascending code order; within a code, the registry's sorted,
        // deduplicated alias names.
        let mut status_codes = Vec::new();
        for code in discovered {
            status_codes.extend_from_slice(self.registry.names_for_code(code));
        }

        HandlerRecord {
            handler_name: handler.qualified_name(),
            file: report_file(handler),
            line: handler.line,
            status_codes,
        }
    }

    /// Collect registry hits among the operand references of one function's
    /// instructions. Functions without a body contribute nothing.
    fn scan_function(&self, id: &FunctionId, found: &mut HashSet<i64>) {
        let Some(def) = self.program.function(id) else {
            return;
        };
        for ins in &def.instructions {
            for operand in ins.operands() {
                if let Operand::Global(global) = operand {
                    if let Some(binding) = self.registry.lookup(global) {
                        found.insert(binding.code);
                    }
                }
            }
        }
    }

    fn sorted_handlers(&self) -> Vec<FunctionId> {
        let mut handlers: Vec<FunctionId> = self.handlers.iter().cloned().collect();
        handlers.sort();
        handlers
    }

    fn into_report(records: Vec<(String, HandlerRecord)>) -> AnalysisReport {
        let mut handlers_by_package: BTreeMap<String, Vec<HandlerRecord>> = BTreeMap::new();
        for (package, record) in records {
            handlers_by_package.entry(package).or_default().push(record);
        }
        AnalysisReport {
            handlers_by_package,
        }
    }
}

/// Move codes not yet in the accumulator out of the per-step scratch,
/// returning them sorted. The scratch is cleared, so each step reports
/// only newly discovered codes.
fn drain_new_codes(step: &mut HashSet<i64>, acc: &mut HashSet<i64>) -> Vec<i64> {
    let mut fresh: Vec<i64> = step.iter().filter(|c| !acc.contains(c)).copied().collect();
    fresh.sort_unstable();
    for code in &fresh {
        acc.insert(*code);
    }
    step.clear();
    fresh
}

fn log_chain(chain: &[FunctionId], codes: &[i64]) {
    if chain.is_empty() {
        return;
    }
    let rendered: Vec<String> = chain.iter().map(|n| n.qualified_name()).collect();
    log::debug!(
        "codes {:?} gathered from chain {}",
        codes,
        rendered.join(" -> ")
    );
}

/// `package/<file basename>`, the form the downstream generator expects.
fn report_file(handler: &FunctionId) -> String {
    let base = handler
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}/{}", handler.package, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_drain_new_codes_reports_only_fresh() {
        let mut acc: HashSet<i64> = [404].into_iter().collect();
        let mut step: HashSet<i64> = [404, 500, 200].into_iter().collect();

        let fresh = drain_new_codes(&mut step, &mut acc);
        assert_eq!(fresh, vec![200, 500]);
        assert!(step.is_empty());
        assert_eq!(acc.len(), 3);

        // A second pass over the same codes yields nothing new.
        step.extend([200, 500]);
        assert!(drain_new_codes(&mut step, &mut acc).is_empty());
    }

    #[test]
    fn test_report_file_joins_package_and_basename() {
        let id = FunctionId::new(
            "app/controllers/user".to_string(),
            "Login".to_string(),
            std::path::PathBuf::from("/work/app/controllers/user/login.src"),
            17,
        );
        assert_eq!(report_file(&id), "app/controllers/user/login.src");
    }
}
