//! Provider-populated program model.
//!
//! The engine does not parse source itself. A front end lowers the program
//! under analysis into this instruction-level model: functions with
//! SSA-style instruction streams, operand references, and dynamic-dispatch
//! candidate sets. Everything here is built once by the provider and read
//! immutably by the analysis passes.

use crate::graph::FunctionId;
use std::collections::{HashMap, HashSet};

/// Per-function value identity, used to connect a call's result to the
/// instructions that consume it.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValueId(pub u32);

/// A unique package-level storage location.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlobalId {
    pub package: String,
    pub name: String,
}

impl GlobalId {
    pub fn new(package: String, name: String) -> Self {
        Self { package, name }
    }
}

/// A value referenced by an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Compile-time integer constant.
    Const(i64),
    /// Reference to a package-level variable.
    Global(GlobalId),
    /// Reference to a function-local value.
    Local(ValueId),
}

/// Call target as resolved by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    /// Exactly one statically known target.
    Static(FunctionId),
    /// Dynamic or reflective dispatch; `candidates` is the provider's
    /// class-hierarchy resolution set (possibly empty).
    Dynamic { candidates: Vec<FunctionId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Call {
        result: ValueId,
        callee: Callee,
        args: Vec<Operand>,
    },
    Store {
        addr: Operand,
        value: Operand,
    },
    /// Any other instruction; only its operand references matter here.
    Op { operands: Vec<Operand> },
}

impl Instruction {
    /// Operand references of this instruction, in operand order.
    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Instruction::Call { args, .. } => args.iter().collect(),
            Instruction::Store { addr, value } => vec![addr, value],
            Instruction::Op { operands } => operands.iter().collect(),
        }
    }
}

/// A declared function with its lowered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub id: FunctionId,
    /// Receiver type for methods (`*Context`), `None` for plain functions.
    pub receiver: Option<String>,
    pub instructions: Vec<Instruction>,
}

impl FunctionDef {
    pub fn new(id: FunctionId) -> Self {
        Self {
            id,
            receiver: None,
            instructions: Vec::new(),
        }
    }

    pub fn with_receiver(mut self, receiver: &str) -> Self {
        self.receiver = Some(receiver.to_string());
        self
    }

    pub fn with_instructions(mut self, instructions: Vec<Instruction>) -> Self {
        self.instructions = instructions;
        self
    }
}

/// Immutable membership set for standard-library package paths, built once
/// at initialization and passed by reference wherever noise pruning needs
/// it.
#[derive(Debug, Clone, Default)]
pub struct StdlibIndex {
    packages: HashSet<String>,
}

impl StdlibIndex {
    pub fn new(packages: impl IntoIterator<Item = String>) -> Self {
        Self {
            packages: packages.into_iter().collect(),
        }
    }

    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains(package)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// The analyzable program: function table, symbol resolution, and entry
/// points.
#[derive(Debug, Clone, Default)]
pub struct ProgramDb {
    functions: HashMap<FunctionId, FunctionDef>,
    by_symbol: HashMap<(String, String), FunctionId>,
    main_packages: HashSet<String>,
    stdlib: StdlibIndex,
}

impl ProgramDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, def: FunctionDef) {
        self.by_symbol.insert(
            (def.id.package.clone(), def.id.name.clone()),
            def.id.clone(),
        );
        self.functions.insert(def.id.clone(), def);
    }

    /// Mark a package as a binary root; its `main` becomes an entry point.
    pub fn mark_main_package(&mut self, package: &str) {
        self.main_packages.insert(package.to_string());
    }

    pub fn set_stdlib(&mut self, stdlib: StdlibIndex) {
        self.stdlib = stdlib;
    }

    pub fn stdlib(&self) -> &StdlibIndex {
        &self.stdlib
    }

    pub fn function(&self, id: &FunctionId) -> Option<&FunctionDef> {
        self.functions.get(id)
    }

    /// Resolve a (package path, symbol name) pair to its declaration.
    pub fn resolve(&self, package: &str, name: &str) -> Option<&FunctionDef> {
        let key = (package.to_string(), name.to_string());
        self.by_symbol.get(&key).and_then(|id| self.functions.get(id))
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.values()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Program entry points: `main` of every main package plus all package
    /// initializers, in stable order.
    pub fn entry_points(&self) -> Vec<FunctionId> {
        let mut roots: Vec<FunctionId> = Vec::new();
        for package in &self.main_packages {
            if let Some(def) = self.resolve(package, "main") {
                roots.push(def.id.clone());
            }
        }
        for def in self.functions.values() {
            if def.id.is_initializer() {
                roots.push(def.id.clone());
            }
        }
        roots.sort();
        roots.dedup();
        roots
    }
}
