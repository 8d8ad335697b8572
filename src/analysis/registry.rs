//! Global constant registry.
//!
//! Scans the program's instruction stream for calls to the configured
//! constructor whose first argument is a literal constant and whose result
//! is stored directly into a package-level variable. The registry is built
//! exactly once, before any handler analysis, and is read-only afterward.

use crate::config::ConstructorTarget;
use crate::program::{Callee, FunctionDef, GlobalId, Instruction, Operand, ProgramDb, ValueId};
use std::collections::{BTreeMap, HashMap};

/// What a bound global holds: the constant code and the variable's
/// declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBinding {
    pub code: i64,
    pub var_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    bindings: HashMap<GlobalId, CodeBinding>,
    names_by_code: BTreeMap<i64, Vec<String>>,
}

impl CodeRegistry {
    /// Scan `program` for constructor calls with constant arguments stored
    /// into globals. A missing constructor symbol yields an empty registry,
    /// not an error.
    pub fn build(program: &ProgramDb, target: &ConstructorTarget) -> Self {
        let mut bindings = HashMap::new();
        for def in program.functions() {
            collect_bindings(def, target, &mut bindings);
        }

        let mut names_by_code: BTreeMap<i64, Vec<String>> = BTreeMap::new();
        for binding in bindings.values() {
            names_by_code
                .entry(binding.code)
                .or_default()
                .push(binding.var_name.clone());
        }
        for names in names_by_code.values_mut() {
            names.sort();
            names.dedup();
        }

        log::debug!(
            "code registry built with {} bindings for {}.{}",
            bindings.len(),
            target.package,
            target.function
        );
        Self {
            bindings,
            names_by_code,
        }
    }

    pub fn lookup(&self, global: &GlobalId) -> Option<&CodeBinding> {
        self.bindings.get(global)
    }

    /// All variable names aliasing `code`, sorted and deduplicated.
    pub fn names_for_code(&self, code: i64) -> &[String] {
        self.names_by_code
            .get(&code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Record bindings contributed by one function body. The call's result is
/// tracked by value identity, so only results that reach a direct store
/// into a global produce a binding.
fn collect_bindings(
    def: &FunctionDef,
    target: &ConstructorTarget,
    out: &mut HashMap<GlobalId, CodeBinding>,
) {
    let mut codes_by_result: HashMap<ValueId, i64> = HashMap::new();
    for ins in &def.instructions {
        if let Instruction::Call {
            result,
            callee: Callee::Static(callee),
            args,
        } = ins
        {
            if callee.package != target.package || callee.name != target.function {
                continue;
            }
            // The first argument must be a literal constant.
            if let Some(Operand::Const(code)) = args.first() {
                codes_by_result.insert(*result, *code);
            }
        }
    }
    if codes_by_result.is_empty() {
        return;
    }

    for ins in &def.instructions {
        if let Instruction::Store {
            addr: Operand::Global(global),
            value: Operand::Local(value),
        } = ins
        {
            if let Some(code) = codes_by_result.get(value) {
                out.insert(
                    global.clone(),
                    CodeBinding {
                        code: *code,
                        var_name: global.name.clone(),
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FunctionId;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    const CODES_PKG: &str = "app/codes";

    fn target() -> ConstructorTarget {
        ConstructorTarget::new("app/kit", "NewCode")
    }

    fn constructor_id() -> FunctionId {
        FunctionId::new(
            "app/kit".to_string(),
            "NewCode".to_string(),
            PathBuf::from("kit.src"),
            5,
        )
    }

    fn constructor_call(result: u32, first_arg: Operand) -> Instruction {
        Instruction::Call {
            result: ValueId(result),
            callee: Callee::Static(constructor_id()),
            args: vec![first_arg, Operand::Const(0)],
        }
    }

    fn store_global(name: &str, value: u32) -> Instruction {
        Instruction::Store {
            addr: Operand::Global(GlobalId::new(CODES_PKG.to_string(), name.to_string())),
            value: Operand::Local(ValueId(value)),
        }
    }

    fn init_with(instructions: Vec<Instruction>) -> ProgramDb {
        let mut program = ProgramDb::new();
        let init = FunctionId::new(
            CODES_PKG.to_string(),
            "init".to_string(),
            PathBuf::from("codes.src"),
            1,
        );
        program.add_function(FunctionDef::new(init).with_instructions(instructions));
        program
    }

    #[test]
    fn test_constant_call_stored_to_global_binds() {
        let program = init_with(vec![
            constructor_call(0, Operand::Const(404)),
            store_global("NotFound", 0),
        ]);
        let registry = CodeRegistry::build(&program, &target());

        let global = GlobalId::new(CODES_PKG.to_string(), "NotFound".to_string());
        assert_eq!(
            registry.lookup(&global),
            Some(&CodeBinding {
                code: 404,
                var_name: "NotFound".to_string()
            })
        );
        assert_eq!(registry.names_for_code(404), ["NotFound".to_string()]);
    }

    #[test]
    fn test_non_constant_argument_never_binds() {
        let program = init_with(vec![
            constructor_call(0, Operand::Local(ValueId(9))),
            store_global("Computed", 0),
        ]);
        let registry = CodeRegistry::build(&program, &target());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_result_not_stored_to_global_never_binds() {
        let program = init_with(vec![constructor_call(0, Operand::Const(500))]);
        let registry = CodeRegistry::build(&program, &target());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unrelated_call_never_binds() {
        let other = FunctionId::new(
            "app/kit".to_string(),
            "NewMessage".to_string(),
            PathBuf::from("kit.src"),
            9,
        );
        let program = init_with(vec![
            Instruction::Call {
                result: ValueId(0),
                callee: Callee::Static(other),
                args: vec![Operand::Const(404)],
            },
            store_global("NotFound", 0),
        ]);
        let registry = CodeRegistry::build(&program, &target());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_aliases_of_one_code_are_sorted_and_deduped() {
        let program = init_with(vec![
            constructor_call(0, Operand::Const(404)),
            store_global("NotFoundAlias", 0),
            constructor_call(1, Operand::Const(404)),
            store_global("NotFound", 1),
        ]);
        let registry = CodeRegistry::build(&program, &target());

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.names_for_code(404),
            ["NotFound".to_string(), "NotFoundAlias".to_string()]
        );
    }

    #[test]
    fn test_binding_count_bounded_by_constant_call_sites() {
        // Two constructor calls, only one with a constant first argument.
        let program = init_with(vec![
            constructor_call(0, Operand::Const(200)),
            store_global("Ok", 0),
            constructor_call(1, Operand::Local(ValueId(7))),
            store_global("Dynamic", 1),
        ]);
        let registry = CodeRegistry::build(&program, &target());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_constructor_yields_empty_registry() {
        let program = ProgramDb::new();
        let registry = CodeRegistry::build(&program, &target());
        assert!(registry.is_empty());
        assert!(registry.names_for_code(404).is_empty());
    }
}
