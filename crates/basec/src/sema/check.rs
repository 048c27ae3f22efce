use crate::ast::{
    AssignExp, BinaryOp, Body, CallExp, Decl, Expr, ExprKind, FctnDecl, Ident, Program, Stmt,
    UnaryOp,
};
use crate::diag::Diagnostics;
use crate::span::Pos;

use super::declared_type;
use super::symbols::Symbols;
use super::types::Type;

/// The type-checking walk. Runs after name resolution: identifiers read
/// their type through their symbol link, and an unresolved identifier types
/// as `Error`, which every rule absorbs silently.
pub struct Checker<'a> {
    symbols: &'a Symbols,
    diags: &'a mut Diagnostics,
    current_ret: Type,
}

impl<'a> Checker<'a> {
    pub fn new(symbols: &'a Symbols, diags: &'a mut Diagnostics) -> Self {
        Self {
            symbols,
            diags,
            current_ret: Type::Void,
        }
    }

    /// Returns `Error` iff any construct failed; the diagnostics themselves
    /// are the observable output.
    pub fn check_program(mut self, program: &Program) -> Type {
        let mut status = Type::Void;
        for decl in &program.decls {
            if let Decl::Fctn(d) = decl {
                let t = self.check_fctn_decl(d);
                if !status.is_error() {
                    status = t;
                }
            }
        }
        status
    }

    fn check_fctn_decl(&mut self, d: &FctnDecl) -> Type {
        // the declared return type comes from the AST, so a multiply-declared
        // function still gets its body checked against its own signature
        let prev = std::mem::replace(&mut self.current_ret, declared_type(&d.ret));
        let status = self.check_body(&d.body);
        self.current_ret = prev;
        status
    }

    fn check_body(&mut self, body: &Body) -> Type {
        let mut status = Type::Void;
        for stmt in &body.stmts {
            let t = self.check_stmt(stmt);
            if !status.is_error() {
                status = t;
            }
        }
        status
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Type {
        match stmt {
            Stmt::Assign(a) => self.check_assign(a),
            // post-increment and post-decrement carry no typing rule
            Stmt::PostInc(_) | Stmt::PostDec(_) => Type::Void,
            Stmt::If { cond, body } => {
                self.check_cond(cond, "Non-logical expression used in if condition");
                self.check_body(body)
            }
            Stmt::IfElse {
                cond,
                then_body,
                else_body,
            } => {
                self.check_cond(cond, "Non-logical expression used in if condition");
                let then_ty = self.check_body(then_body);
                let else_ty = self.check_body(else_body);
                if then_ty.is_error() || else_ty.is_error() {
                    Type::Error
                } else {
                    then_ty
                }
            }
            Stmt::While { cond, body } => {
                self.check_cond(cond, "Non-logical expression used in while condition");
                self.check_body(body)
            }
            Stmt::Read(e) => self.check_read(e),
            Stmt::Write(e) => self.check_write(e),
            Stmt::Call(c) => self.check_call(c),
            Stmt::Return(value) => self.check_return(value.as_ref()),
        }
    }

    /// An `Error` condition suppresses the check; the body is walked either
    /// way.
    fn check_cond(&mut self, cond: &Expr, message: &str) {
        let ty = self.check_expr(cond);
        if !ty.is_error() && ty != Type::Logical {
            self.diags.error(cond.pos, message);
        }
    }

    fn check_read(&mut self, e: &Expr) -> Type {
        let ty = self.check_expr(e);
        if ty.is_error() {
            return Type::Error;
        }
        match ty {
            Type::Integer | Type::Logical => ty,
            Type::Fctn { .. } => {
                self.diags.error(e.pos, "Read attempt of function name");
                Type::Error
            }
            Type::Tuple(_) => {
                self.diags.error(e.pos, "Read attempt of tuple variable");
                Type::Error
            }
            Type::TupleDef => {
                self.diags.error(e.pos, "Read attempt of tuple name");
                Type::Error
            }
            // string and void operands fail without a dedicated message
            _ => Type::Error,
        }
    }

    fn check_write(&mut self, e: &Expr) -> Type {
        let ty = self.check_expr(e);
        if ty.is_error() {
            return Type::Error;
        }
        match ty {
            Type::Integer | Type::Logical | Type::Str => ty,
            Type::Fctn { .. } => {
                self.diags.error(e.pos, "Write attempt of function name");
                Type::Error
            }
            Type::Tuple(_) => {
                self.diags.error(e.pos, "Write attempt of tuple variable");
                Type::Error
            }
            Type::TupleDef => {
                self.diags.error(e.pos, "Write attempt of tuple name");
                Type::Error
            }
            Type::Void => {
                self.diags.error(e.pos, "Write attempt of void");
                Type::Error
            }
            Type::Error => Type::Error,
        }
    }

    fn check_return(&mut self, value: Option<&Expr>) -> Type {
        let expected = self.current_ret.clone();
        match value {
            None => {
                if expected == Type::Void {
                    Type::Void
                } else {
                    // no expression to anchor on
                    self.diags.error(Pos::none(), "Return value missing");
                    Type::Error
                }
            }
            Some(e) => {
                let actual = self.check_expr(e);
                if expected == Type::Void {
                    self.diags.error(e.pos, "Return with value in void function");
                    Type::Error
                } else if actual.is_error() {
                    Type::Error
                } else if actual != expected {
                    self.diags.error(e.pos, "Return value wrong type");
                    Type::Error
                } else {
                    expected
                }
            }
        }
    }

    fn check_expr(&mut self, e: &Expr) -> Type {
        match &e.kind {
            ExprKind::True | ExprKind::False => Type::Logical,
            ExprKind::IntLit(_) => Type::Integer,
            ExprKind::StrLit(_) => Type::Str,
            ExprKind::Ident(id) => self.ident_ty(id),
            // a resolved chain types as its rightmost field
            ExprKind::TupleAccess(acc) => self.ident_ty(&acc.field),
            ExprKind::Assign(a) => self.check_assign(a),
            ExprKind::Call(c) => self.check_call(c),
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand),
            ExprKind::Binary { op, lhs, rhs } => self.check_binary(*op, lhs, rhs),
        }
    }

    fn ident_ty(&self, id: &Ident) -> Type {
        id.sym.map_or(Type::Error, |sym| self.symbols.get(sym).ty())
    }

    fn check_assign(&mut self, a: &AssignExp) -> Type {
        let lhs_ty = self.check_expr(&a.lhs);
        let rhs_ty = self.check_expr(&a.rhs);
        if lhs_ty.is_error() || rhs_ty.is_error() {
            return Type::Error;
        }
        if lhs_ty != rhs_ty {
            self.diags.error(a.lhs.pos, "Mismatched type");
            return Type::Error;
        }
        match lhs_ty {
            Type::Integer | Type::Logical => lhs_ty,
            Type::Fctn { .. } => {
                self.diags.error(a.lhs.pos, "Assignment to function name");
                Type::Error
            }
            Type::Tuple(_) => {
                self.diags.error(a.lhs.pos, "Assignment to tuple variable");
                Type::Error
            }
            Type::TupleDef => {
                self.diags.error(a.lhs.pos, "Assignment to tuple name");
                Type::Error
            }
            _ => Type::Error,
        }
    }

    fn check_call(&mut self, call: &CallExp) -> Type {
        let callee_ty = self.ident_ty(&call.callee);
        if callee_ty.is_error() {
            return Type::Error;
        }
        let Type::Fctn { params, ret } = callee_ty else {
            self.diags
                .error(call.callee.pos, "Call attempt on non-function");
            return Type::Error;
        };
        if params.len() != call.args.len() {
            self.diags
                .error(call.callee.pos, "Function call with wrong # of args");
            return *ret;
        }
        for (arg, param) in call.args.iter().zip(params.iter()) {
            let arg_ty = self.check_expr(arg);
            if !arg_ty.is_error() && !param.is_error() && arg_ty != *param {
                self.diags
                    .error(arg.pos, "Actual type does not match formal type");
            }
        }
        *ret
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Expr) -> Type {
        let ty = self.check_expr(operand);
        if ty.is_error() {
            return Type::Error;
        }
        match op {
            UnaryOp::Neg => {
                if ty == Type::Integer {
                    Type::Integer
                } else {
                    self.diags.error(
                        operand.pos,
                        "Arithmetic operator used with non-integer operand",
                    );
                    Type::Error
                }
            }
            UnaryOp::Not => {
                if ty == Type::Logical {
                    Type::Logical
                } else {
                    self.diags.error(
                        operand.pos,
                        "Logical operator used with non-logical operand",
                    );
                    Type::Error
                }
            }
        }
    }

    fn check_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Type {
        match op {
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Times | BinaryOp::Divide => self
                .check_int_operands(
                    lhs,
                    rhs,
                    "Arithmetic operator used with non-integer operand",
                    Type::Integer,
                ),
            BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => self
                .check_int_operands(
                    lhs,
                    rhs,
                    "Relational operator used with non-integer operand",
                    Type::Logical,
                ),
            BinaryOp::And | BinaryOp::Or => self.check_logical_operands(lhs, rhs),
            BinaryOp::Eq | BinaryOp::NotEq => self.check_equality(lhs, rhs),
        }
    }

    /// Both operands must be integers; each offender gets one diagnostic at
    /// its own position.
    fn check_int_operands(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        message: &str,
        result: Type,
    ) -> Type {
        let t1 = self.check_expr(lhs);
        let t2 = self.check_expr(rhs);
        if t1.is_error() || t2.is_error() {
            return Type::Error;
        }
        let mut failed = false;
        if t1 != Type::Integer {
            self.diags.error(lhs.pos, message);
            failed = true;
        }
        if t2 != Type::Integer {
            self.diags.error(rhs.pos, message);
            failed = true;
        }
        if failed {
            Type::Error
        } else {
            result
        }
    }

    fn check_logical_operands(&mut self, lhs: &Expr, rhs: &Expr) -> Type {
        let t1 = self.check_expr(lhs);
        let t2 = self.check_expr(rhs);
        if t1.is_error() || t2.is_error() {
            return Type::Error;
        }
        let mut failed = false;
        if t1 != Type::Logical {
            self.diags
                .error(lhs.pos, "Logical operator used with non-logical operand");
            failed = true;
        }
        if t2 != Type::Logical {
            self.diags
                .error(rhs.pos, "Logical operator used with non-logical operand");
            failed = true;
        }
        if failed {
            Type::Error
        } else {
            Type::Logical
        }
    }

    fn check_equality(&mut self, lhs: &Expr, rhs: &Expr) -> Type {
        let t1 = self.check_expr(lhs);
        let t2 = self.check_expr(rhs);
        if t1.is_error() || t2.is_error() {
            return Type::Error;
        }
        if t1 != t2 {
            self.diags.error(lhs.pos, "Mismatched type");
            return Type::Error;
        }
        match t1 {
            Type::Void => {
                self.diags
                    .error(lhs.pos, "Equality operator used with void function calls");
                Type::Error
            }
            Type::Fctn { .. } => {
                self.diags
                    .error(lhs.pos, "Equality operator used with function names");
                Type::Error
            }
            Type::TupleDef => {
                self.diags
                    .error(lhs.pos, "Equality operator used with tuple names");
                Type::Error
            }
            Type::Tuple(_) => {
                self.diags
                    .error(lhs.pos, "Equality operator used with tuple variables");
                Type::Error
            }
            _ => Type::Logical,
        }
    }
}
