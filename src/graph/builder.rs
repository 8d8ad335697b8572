//! Call-graph construction strategies over the program model.
//!
//! Three interchangeable strategies, selected by configuration: exact
//! static calls only, class-hierarchy expansion of dynamic sites, and a
//! reachability-restricted variant seeded from program entry points.

use crate::config::CallGraphAlgorithm;
use crate::errors::AnalysisError;
use crate::graph::types::{CallGraph, CallResolution, FunctionCall, FunctionId};
use crate::program::{Callee, FunctionDef, Instruction, ProgramDb};
use std::collections::{HashSet, VecDeque};

/// Build the call graph with the configured strategy.
pub fn build_call_graph(
    program: &ProgramDb,
    algorithm: CallGraphAlgorithm,
) -> Result<CallGraph, AnalysisError> {
    let graph = match algorithm {
        CallGraphAlgorithm::Static => build_exact(program),
        CallGraphAlgorithm::Cha => build_class_hierarchy(program),
        CallGraphAlgorithm::Rta => build_reachable(program)?,
    };
    log::debug!(
        "call graph has {} nodes and {} edges ({} algorithm)",
        graph.node_count(),
        graph.edge_count(),
        algorithm
    );
    Ok(graph)
}

/// Call targets of one function body. Dynamic sites expand to their
/// candidate set when `include_dynamic` is set and contribute nothing
/// otherwise.
fn call_targets(def: &FunctionDef, include_dynamic: bool) -> Vec<(FunctionId, CallResolution)> {
    let mut targets = Vec::new();
    for ins in &def.instructions {
        if let Instruction::Call { callee, .. } = ins {
            match callee {
                Callee::Static(target) => {
                    targets.push((target.clone(), CallResolution::Static));
                }
                Callee::Dynamic { candidates } if include_dynamic => {
                    for candidate in candidates {
                        targets.push((candidate.clone(), CallResolution::Dynamic));
                    }
                }
                Callee::Dynamic { .. } => {}
            }
        }
    }
    targets
}

fn build_exact(program: &ProgramDb) -> CallGraph {
    build_from_functions(program, false)
}

fn build_class_hierarchy(program: &ProgramDb) -> CallGraph {
    build_from_functions(program, true)
}

fn build_from_functions(program: &ProgramDb, include_dynamic: bool) -> CallGraph {
    let mut graph = CallGraph::new();
    for def in program.functions() {
        graph.add_node(def.id.clone());
        for (callee, resolution) in call_targets(def, include_dynamic) {
            graph.add_call(FunctionCall {
                caller: def.id.clone(),
                callee,
                resolution,
            });
        }
    }
    graph
}

/// Class-hierarchy edges restricted to the closure reachable from the
/// program's entry points.
fn build_reachable(program: &ProgramDb) -> Result<CallGraph, AnalysisError> {
    let roots = program.entry_points();
    if roots.is_empty() {
        return Err(AnalysisError::NoEntryPoints);
    }

    let mut graph = CallGraph::new();
    let mut seen: HashSet<FunctionId> = roots.iter().cloned().collect();
    let mut queue: VecDeque<FunctionId> = roots.into_iter().collect();

    while let Some(current) = queue.pop_front() {
        graph.add_node(current.clone());
        let Some(def) = program.function(&current) else {
            continue;
        };
        for (callee, resolution) in call_targets(def, true) {
            graph.add_call(FunctionCall {
                caller: current.clone(),
                callee: callee.clone(),
                resolution,
            });
            if seen.insert(callee.clone()) {
                queue.push_back(callee);
            }
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ValueId;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn fid(package: &str, name: &str) -> FunctionId {
        FunctionId::new(
            package.to_string(),
            name.to_string(),
            PathBuf::from("prog.src"),
            1,
        )
    }

    fn static_call(target: &FunctionId) -> Instruction {
        Instruction::Call {
            result: ValueId(0),
            callee: Callee::Static(target.clone()),
            args: vec![],
        }
    }

    fn dynamic_call(candidates: &[FunctionId]) -> Instruction {
        Instruction::Call {
            result: ValueId(0),
            callee: Callee::Dynamic {
                candidates: candidates.to_vec(),
            },
            args: vec![],
        }
    }

    /// main -> a (static); main -> {b, c} (dynamic); a -> d (static).
    /// d is only reachable through a.
    fn sample_program() -> ProgramDb {
        let mut program = ProgramDb::new();
        let a = fid("app/web", "a");
        let b = fid("app/web", "b");
        let c = fid("app/web", "c");
        let d = fid("app/web", "d");

        program.add_function(
            FunctionDef::new(fid("app/cmd", "main")).with_instructions(vec![
                static_call(&a),
                dynamic_call(&[b.clone(), c.clone()]),
            ]),
        );
        program.add_function(FunctionDef::new(a).with_instructions(vec![static_call(&d)]));
        program.add_function(FunctionDef::new(b));
        program.add_function(FunctionDef::new(c));
        program.add_function(FunctionDef::new(d));
        program.mark_main_package("app/cmd");
        program
    }

    #[test]
    fn test_static_algorithm_drops_dynamic_sites() {
        let program = sample_program();
        let graph = build_call_graph(&program, CallGraphAlgorithm::Static).unwrap();

        let main = fid("app/cmd", "main");
        assert_eq!(graph.callees_of(&main), vec![fid("app/web", "a")]);
        assert!(graph
            .all_calls()
            .iter()
            .all(|call| call.resolution == CallResolution::Static));
    }

    #[test]
    fn test_cha_expands_dynamic_candidates() {
        let program = sample_program();
        let graph = build_call_graph(&program, CallGraphAlgorithm::Cha).unwrap();

        let main = fid("app/cmd", "main");
        let callees = graph.callees_of(&main);
        assert_eq!(callees.len(), 3);
        assert!(callees.contains(&fid("app/web", "b")));
        assert!(callees.contains(&fid("app/web", "c")));
    }

    #[test]
    fn test_rta_limits_to_entry_point_closure() {
        let mut program = sample_program();
        // An orphan function nothing reaches.
        let orphan = fid("app/web", "orphan");
        let e = fid("app/web", "e");
        program.add_function(
            FunctionDef::new(orphan.clone()).with_instructions(vec![static_call(&e)]),
        );
        program.add_function(FunctionDef::new(e.clone()));

        let graph = build_call_graph(&program, CallGraphAlgorithm::Rta).unwrap();
        assert!(graph.contains(&fid("app/web", "d")));
        assert!(!graph.contains(&orphan));
        assert!(!graph.contains(&e));
    }

    #[test]
    fn test_rta_without_entry_points_errors() {
        let mut program = ProgramDb::new();
        program.add_function(FunctionDef::new(fid("app/web", "a")));

        let err = build_call_graph(&program, CallGraphAlgorithm::Rta).unwrap_err();
        assert_eq!(err, AnalysisError::NoEntryPoints);
    }

    #[test]
    fn test_initializers_seed_rta_without_main() {
        let mut program = ProgramDb::new();
        let target = fid("app/web", "registered");
        program.add_function(
            FunctionDef::new(fid("app/web", "init")).with_instructions(vec![static_call(&target)]),
        );
        program.add_function(FunctionDef::new(target.clone()));

        let graph = build_call_graph(&program, CallGraphAlgorithm::Rta).unwrap();
        assert!(graph.contains(&target));
    }
}
