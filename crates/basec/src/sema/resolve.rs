use crate::ast::{
    Body, CallExp, Decl, Expr, ExprKind, FctnDecl, FormalDecl, Ident, Program, Stmt, SymId,
    TupleAccess, TupleDecl, TypeSpec, VarDecl,
};
use crate::diag::{internal, Diagnostics};

use super::declared_type;
use super::symbols::{Sym, SymTable, SymTableError, Symbols};
use super::types::Type;

/// Outcome of resolving one colon-access step. `Bad` abandons the rest of
/// the chain without further diagnostics; `Field` carries the tuple
/// definition to look the next field up in, if the resolved field has a
/// tuple type.
enum Access {
    Bad,
    Field(Option<SymId>),
}

/// The name-resolution walk. Opens and closes scopes on the main table,
/// binds declarations, and links every identifier use to its symbol. Tuple
/// field scopes are independent tables owned by the tuple definition symbol;
/// resolving a chain never touches the main scope stack.
pub struct Resolver<'a> {
    symbols: &'a mut Symbols,
    diags: &'a mut Diagnostics,
}

impl<'a> Resolver<'a> {
    pub fn new(symbols: &'a mut Symbols, diags: &'a mut Diagnostics) -> Self {
        Self { symbols, diags }
    }

    /// Resolve the whole program and return the outermost scope, still open,
    /// for downstream passes to inspect.
    pub fn resolve_program(mut self, program: &mut Program) -> SymTable {
        let mut table = SymTable::new();
        for decl in &mut program.decls {
            match decl {
                Decl::Var(d) => self.resolve_var_decl(d, &mut table, None),
                Decl::Fctn(d) => self.resolve_fctn_decl(d, &mut table),
                Decl::Tuple(d) => self.resolve_tuple_decl(d, &mut table),
            }
        }
        table
    }

    /// `global` is the enclosing scope stack when `table` is a tuple's field
    /// scope; tuple type names always resolve against the enclosing stack.
    fn resolve_var_decl(
        &mut self,
        d: &mut VarDecl,
        table: &mut SymTable,
        global: Option<&SymTable>,
    ) {
        let mut bad = false;
        let mut tuple_def = None;

        match &mut d.ty {
            TypeSpec::Void => {
                self.diags.error(d.name.pos, "Non-function declared void");
                bad = true;
            }
            TypeSpec::Tuple(type_name) => {
                let looked = {
                    let scope = global.unwrap_or(&*table);
                    or_die(scope.lookup_global(&type_name.name), "variable declaration")
                };
                match looked {
                    Some(id) if matches!(self.symbols.get(id), Sym::TupleDef { .. }) => {
                        type_name.sym = Some(id);
                        tuple_def = Some(id);
                    }
                    _ => {
                        self.diags.error(type_name.pos, "Invalid name of tuple type");
                        bad = true;
                    }
                }
            }
            _ => {}
        }

        if or_die(table.lookup_local(&d.name.name), "variable declaration").is_some() {
            self.diags.error(d.name.pos, "Multiply-declared identifier");
            bad = true;
        }

        if !bad {
            let sym = match (&d.ty, tuple_def) {
                (TypeSpec::Tuple(type_name), Some(def)) => Sym::TupleVar {
                    tuple_name: type_name.name.clone(),
                    def,
                },
                _ => Sym::Var {
                    ty: declared_type(&d.ty),
                },
            };
            let id = self.symbols.alloc(sym);
            or_die(table.declare(&d.name.name, id), "variable declaration");
            d.name.sym = Some(id);
        }
    }

    /// A duplicate function name suppresses the binding but the formals and
    /// body are still walked in a fresh scope, so inner diagnostics surface.
    fn resolve_fctn_decl(&mut self, d: &mut FctnDecl, table: &mut SymTable) {
        let mut fctn_sym = None;
        if or_die(table.lookup_local(&d.name.name), "function declaration").is_some() {
            self.diags.error(d.name.pos, "Multiply-declared identifier");
        } else {
            let id = self.symbols.alloc(Sym::Fctn {
                params: Vec::new(),
                ret: declared_type(&d.ret),
            });
            or_die(table.declare(&d.name.name, id), "function declaration");
            d.name.sym = Some(id);
            fctn_sym = Some(id);
        }

        table.open_scope();

        let mut param_types = Vec::new();
        for formal in &mut d.formals {
            if let Some(ty) = self.resolve_formal_decl(formal, table) {
                param_types.push(ty);
            }
        }
        if let Some(id) = fctn_sym {
            if let Sym::Fctn { params, .. } = self.symbols.get_mut(id) {
                *params = param_types;
            }
        }

        self.resolve_body(&mut d.body, table);
        or_die(table.close_scope(), "function declaration");
    }

    fn resolve_formal_decl(&mut self, d: &mut FormalDecl, table: &mut SymTable) -> Option<Type> {
        let mut bad = false;
        if matches!(d.ty, TypeSpec::Void) {
            self.diags.error(d.name.pos, "Non-function declared void");
            bad = true;
        }
        if or_die(table.lookup_local(&d.name.name), "formal declaration").is_some() {
            self.diags.error(d.name.pos, "Multiply-declared identifier");
            bad = true;
        }
        if bad {
            return None;
        }
        let ty = declared_type(&d.ty);
        let id = self.symbols.alloc(Sym::Var { ty: ty.clone() });
        or_die(table.declare(&d.name.name, id), "formal declaration");
        d.name.sym = Some(id);
        Some(ty)
    }

    /// Like functions, a duplicate tuple name still gets its fields resolved
    /// in a fresh, independent table; only the binding is suppressed.
    fn resolve_tuple_decl(&mut self, d: &mut TupleDecl, table: &mut SymTable) {
        let mut bad = false;
        if or_die(table.lookup_local(&d.name.name), "tuple definition").is_some() {
            self.diags.error(d.name.pos, "Multiply-declared identifier");
            bad = true;
        }

        let mut field_scope = SymTable::new();
        for field in &mut d.fields {
            self.resolve_var_decl(field, &mut field_scope, Some(&*table));
        }

        if !bad {
            let id = self.symbols.alloc(Sym::TupleDef {
                fields: field_scope,
            });
            or_die(table.declare(&d.name.name, id), "tuple definition");
            d.name.sym = Some(id);
        }
    }

    fn resolve_body(&mut self, body: &mut Body, table: &mut SymTable) {
        for decl in &mut body.decls {
            self.resolve_var_decl(decl, table, None);
        }
        for stmt in &mut body.stmts {
            self.resolve_stmt(stmt, table);
        }
    }

    fn resolve_stmt(&mut self, stmt: &mut Stmt, table: &mut SymTable) {
        match stmt {
            Stmt::Assign(a) => {
                self.resolve_expr(&mut a.lhs, table);
                self.resolve_expr(&mut a.rhs, table);
            }
            Stmt::PostInc(e) | Stmt::PostDec(e) | Stmt::Read(e) | Stmt::Write(e) => {
                self.resolve_expr(e, table);
            }
            Stmt::If { cond, body } => {
                self.resolve_expr(cond, table);
                table.open_scope();
                self.resolve_body(body, table);
                or_die(table.close_scope(), "if statement");
            }
            Stmt::IfElse {
                cond,
                then_body,
                else_body,
            } => {
                self.resolve_expr(cond, table);
                table.open_scope();
                self.resolve_body(then_body, table);
                or_die(table.close_scope(), "if statement");
                table.open_scope();
                self.resolve_body(else_body, table);
                or_die(table.close_scope(), "else branch");
            }
            Stmt::While { cond, body } => {
                self.resolve_expr(cond, table);
                table.open_scope();
                self.resolve_body(body, table);
                or_die(table.close_scope(), "while statement");
            }
            Stmt::Call(c) => self.resolve_call(c, table),
            Stmt::Return(value) => {
                if let Some(e) = value {
                    self.resolve_expr(e, table);
                }
            }
        }
    }

    fn resolve_expr(&mut self, e: &mut Expr, table: &mut SymTable) {
        match &mut e.kind {
            ExprKind::Ident(id) => self.resolve_ident_use(id, table),
            ExprKind::TupleAccess(acc) => {
                self.resolve_access(acc, table);
            }
            ExprKind::Assign(a) => {
                self.resolve_expr(&mut a.lhs, table);
                self.resolve_expr(&mut a.rhs, table);
            }
            ExprKind::Call(c) => self.resolve_call(c, table),
            ExprKind::Unary { operand, .. } => self.resolve_expr(operand, table),
            ExprKind::Binary { lhs, rhs, .. } => {
                self.resolve_expr(lhs, table);
                self.resolve_expr(rhs, table);
            }
            ExprKind::True | ExprKind::False | ExprKind::IntLit(_) | ExprKind::StrLit(_) => {}
        }
    }

    fn resolve_ident_use(&mut self, id: &mut Ident, table: &SymTable) {
        match or_die(table.lookup_global(&id.name), "identifier use") {
            Some(sym) => id.sym = Some(sym),
            None => self.diags.error(id.pos, "Undeclared identifier"),
        }
    }

    fn resolve_call(&mut self, call: &mut CallExp, table: &mut SymTable) {
        self.resolve_ident_use(&mut call.callee, table);
        for arg in &mut call.args {
            self.resolve_expr(arg, table);
        }
    }

    /// Resolve one step of a colon-access chain, left to right. The leftmost
    /// operand must be an identifier declared as a tuple variable; every
    /// later step looks its field up in the field scope reached so far.
    fn resolve_access(&mut self, acc: &mut TupleAccess, table: &mut SymTable) -> Access {
        let def = match &mut acc.loc.kind {
            ExprKind::Ident(id) => {
                self.resolve_ident_use(id, table);
                let Some(sym) = id.sym else {
                    // undeclared: already reported, abandon the chain
                    return Access::Bad;
                };
                match self.symbols.get(sym) {
                    Sym::TupleVar { def, .. } => *def,
                    _ => {
                        self.diags.error(id.pos, "Colon-access of non-tuple type");
                        return Access::Bad;
                    }
                }
            }
            ExprKind::TupleAccess(inner) => {
                let inner_pos = inner.field.pos;
                match self.resolve_access(inner, table) {
                    Access::Bad => return Access::Bad,
                    Access::Field(None) => {
                        self.diags.error(inner_pos, "Colon-access of non-tuple type");
                        return Access::Bad;
                    }
                    Access::Field(Some(def)) => def,
                }
            }
            _ => internal("unexpected expression on the left of a colon-access"),
        };

        let field_sym = {
            let Sym::TupleDef { fields } = self.symbols.get(def) else {
                internal("tuple variable does not link to a tuple definition")
            };
            or_die(fields.lookup_global(&acc.field.name), "colon-access")
        };

        match field_sym {
            None => {
                self.diags.error(acc.field.pos, "Invalid tuple field name");
                Access::Bad
            }
            Some(id) => {
                acc.field.sym = Some(id);
                match self.symbols.get(id) {
                    Sym::TupleVar { def, .. } => Access::Field(Some(*def)),
                    _ => Access::Field(None),
                }
            }
        }
    }
}

/// Symbol-table misuse cannot happen on a well-formed walk; treat it as a
/// fatal internal fault rather than a user diagnostic.
fn or_die<T>(result: Result<T, SymTableError>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => internal(&format!("{err:?} in {what}")),
    }
}
