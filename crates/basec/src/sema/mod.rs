pub mod check;
pub mod resolve;
pub mod symbols;
pub mod types;

pub use check::Checker;
pub use resolve::Resolver;
pub use symbols::{Sym, SymTable, SymTableError, Symbols};
pub use types::Type;

use crate::ast::{Program, TypeSpec};
use crate::diag::{Diag, Diagnostics};

/// Everything the analyzer hands to downstream passes: the symbol arena the
/// AST links into, and the outermost scope, left open.
pub struct Analysis {
    pub symbols: Symbols,
    pub globals: SymTable,
}

/// Run name resolution over the whole program, then type checking. The walks
/// are sequential: resolution finishes before checking begins, so every
/// resolution diagnostic precedes every type diagnostic, and an unresolved
/// identifier simply types as `Error` in the second walk.
pub fn analyze_program(program: &mut Program) -> (Analysis, Vec<Diag>) {
    let mut diags = Diagnostics::default();
    let mut symbols = Symbols::new();
    let globals = Resolver::new(&mut symbols, &mut diags).resolve_program(program);
    Checker::new(&symbols, &mut diags).check_program(program);
    (Analysis { symbols, globals }, diags.into_vec())
}

pub(crate) fn declared_type(spec: &TypeSpec) -> Type {
    match spec {
        TypeSpec::Integer => Type::Integer,
        TypeSpec::Logical => Type::Logical,
        TypeSpec::Void => Type::Void,
        TypeSpec::Tuple(id) => Type::Tuple(id.name.clone()),
    }
}
