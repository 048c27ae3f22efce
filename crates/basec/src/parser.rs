use crate::ast::*;
use crate::diag::Diagnostics;
use crate::span::Pos;
use crate::token::{Keyword, Punct, Token, TokenKind};

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    diags: &'a mut Diagnostics,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], diags: &'a mut Diagnostics) -> Self {
        Self {
            tokens,
            pos: 0,
            diags,
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut decls = Vec::new();
        while !self.at_eof() {
            match self.parse_decl() {
                Some(decl) => decls.push(decl),
                None => self.sync_to_next_decl(),
            }
        }
        Program { decls }
    }

    /// decl ::= type id `.` | type id `{`...`}` `[`...`]`
    ///        | `tuple` id id `.` | `tuple` id `{`...`}` `.`
    fn parse_decl(&mut self) -> Option<Decl> {
        if self.eat_keyword(Keyword::Tuple) {
            let type_name = self.expect_ident()?;
            if self.at_punct(Punct::LBrace) {
                return self.parse_tuple_decl(type_name).map(Decl::Tuple);
            }
            let name = self.expect_ident()?;
            self.expect_punct(Punct::Dot)?;
            return Some(Decl::Var(VarDecl {
                ty: TypeSpec::Tuple(type_name),
                name,
            }));
        }

        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        if self.eat_punct(Punct::Dot) {
            return Some(Decl::Var(VarDecl { ty, name }));
        }
        if self.at_punct(Punct::LBrace) {
            return self.parse_fctn_decl(ty, name).map(Decl::Fctn);
        }
        self.error_here("expected '.' or a formals list after the declared name");
        None
    }

    fn parse_tuple_decl(&mut self, name: Ident) -> Option<TupleDecl> {
        self.expect_punct(Punct::LBrace)?;
        let mut fields = Vec::new();
        while !self.at_punct(Punct::RBrace) && !self.at_eof() {
            let before = self.pos;
            match self.parse_var_decl() {
                Some(field) => fields.push(field),
                None => {
                    self.sync_past(Punct::Dot);
                    if self.pos == before {
                        self.bump();
                    }
                }
            }
        }
        self.expect_punct(Punct::RBrace)?;
        self.expect_punct(Punct::Dot)?;
        Some(TupleDecl { name, fields })
    }

    /// varDecl ::= type id `.` | `tuple` id id `.`
    fn parse_var_decl(&mut self) -> Option<VarDecl> {
        let ty = if self.eat_keyword(Keyword::Tuple) {
            TypeSpec::Tuple(self.expect_ident()?)
        } else {
            self.parse_type()?
        };
        let name = self.expect_ident()?;
        self.expect_punct(Punct::Dot)?;
        Some(VarDecl { ty, name })
    }

    fn parse_fctn_decl(&mut self, ret: TypeSpec, name: Ident) -> Option<FctnDecl> {
        self.expect_punct(Punct::LBrace)?;
        let mut formals = Vec::new();
        if !self.at_punct(Punct::RBrace) {
            loop {
                let ty = self.parse_type()?;
                let formal_name = self.expect_ident()?;
                formals.push(FormalDecl {
                    ty,
                    name: formal_name,
                });
                if !self.eat_punct(Punct::Comma) {
                    break;
                }
            }
        }
        self.expect_punct(Punct::RBrace)?;
        let body = self.parse_body()?;
        Some(FctnDecl {
            ret,
            name,
            formals,
            body,
        })
    }

    fn parse_type(&mut self) -> Option<TypeSpec> {
        let spec = match self.peek_kind() {
            TokenKind::Keyword(Keyword::Integer) => TypeSpec::Integer,
            TokenKind::Keyword(Keyword::Logical) => TypeSpec::Logical,
            TokenKind::Keyword(Keyword::Void) => TypeSpec::Void,
            _ => {
                self.error_here("expected a type");
                return None;
            }
        };
        self.bump();
        Some(spec)
    }

    /// body ::= `[` varDecl* stmt* `]`
    fn parse_body(&mut self) -> Option<Body> {
        self.expect_punct(Punct::LBracket)?;
        let mut decls = Vec::new();
        while self.at_var_decl_start() {
            match self.parse_var_decl() {
                Some(decl) => decls.push(decl),
                None => self.sync_past(Punct::Dot),
            }
        }
        let mut stmts = Vec::new();
        while !self.at_punct(Punct::RBracket) && !self.at_eof() {
            let before = self.pos;
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => {
                    self.sync_past(Punct::Dot);
                    if self.pos == before {
                        self.bump();
                    }
                }
            }
        }
        self.expect_punct(Punct::RBracket)?;
        Some(Body { decls, stmts })
    }

    fn at_var_decl_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Keyword(
                Keyword::Integer | Keyword::Logical | Keyword::Void | Keyword::Tuple
            )
        )
    }

    fn parse_stmt(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::Keyword(Keyword::If) => self.parse_if_stmt(),
            TokenKind::Keyword(Keyword::While) => self.parse_while_stmt(),
            TokenKind::Keyword(Keyword::Read) => {
                self.bump();
                self.expect_punct(Punct::ReadOp)?;
                let loc = self.parse_loc()?;
                self.expect_punct(Punct::Dot)?;
                Some(Stmt::Read(loc))
            }
            TokenKind::Keyword(Keyword::Write) => {
                self.bump();
                self.expect_punct(Punct::WriteOp)?;
                let exp = self.parse_exp()?;
                self.expect_punct(Punct::Dot)?;
                Some(Stmt::Write(exp))
            }
            TokenKind::Keyword(Keyword::Return) => {
                self.bump();
                let value = if self.at_punct(Punct::Dot) {
                    None
                } else {
                    Some(self.parse_exp()?)
                };
                self.expect_punct(Punct::Dot)?;
                Some(Stmt::Return(value))
            }
            TokenKind::Ident(_) => self.parse_simple_stmt(),
            _ => {
                self.error_here("expected a statement");
                None
            }
        }
    }

    /// Statements introduced by an identifier: a call, a post-increment or
    /// post-decrement of a loc, or an assignment with a loc on the left.
    fn parse_simple_stmt(&mut self) -> Option<Stmt> {
        if matches!(self.peek_ahead(1), Some(TokenKind::Punct(Punct::LParen))) {
            let call = self.parse_call()?;
            self.expect_punct(Punct::Dot)?;
            return Some(Stmt::Call(call));
        }
        let loc = self.parse_loc()?;
        if self.eat_punct(Punct::PlusPlus) {
            self.expect_punct(Punct::Dot)?;
            return Some(Stmt::PostInc(loc));
        }
        if self.eat_punct(Punct::MinusMinus) {
            self.expect_punct(Punct::Dot)?;
            return Some(Stmt::PostDec(loc));
        }
        self.expect_punct(Punct::Assign)?;
        let rhs = self.parse_exp()?;
        self.expect_punct(Punct::Dot)?;
        Some(Stmt::Assign(AssignExp { lhs: loc, rhs }))
    }

    fn parse_if_stmt(&mut self) -> Option<Stmt> {
        self.bump();
        let cond = self.parse_exp()?;
        let body = self.parse_body()?;
        if self.eat_keyword(Keyword::Else) {
            let else_body = self.parse_body()?;
            return Some(Stmt::IfElse {
                cond,
                then_body: body,
                else_body,
            });
        }
        Some(Stmt::If { cond, body })
    }

    fn parse_while_stmt(&mut self) -> Option<Stmt> {
        self.bump();
        let cond = self.parse_exp()?;
        let body = self.parse_body()?;
        Some(Stmt::While { cond, body })
    }

    /// loc ::= id (`:` id)*
    fn parse_loc(&mut self) -> Option<Expr> {
        let id = self.expect_ident()?;
        let pos = id.pos;
        let mut expr = Expr {
            kind: ExprKind::Ident(id),
            pos,
        };
        while self.eat_punct(Punct::Colon) {
            let field = self.expect_ident()?;
            let pos = field.pos;
            expr = Expr {
                kind: ExprKind::TupleAccess(TupleAccess {
                    loc: Box::new(expr),
                    field,
                }),
                pos,
            };
        }
        Some(expr)
    }

    // expressions, loosest binding first

    fn parse_exp(&mut self) -> Option<Expr> {
        self.parse_assign_exp()
    }

    fn parse_assign_exp(&mut self) -> Option<Expr> {
        let lhs = self.parse_or_exp()?;
        if self.eat_punct(Punct::Assign) {
            if !matches!(lhs.kind, ExprKind::Ident(_) | ExprKind::TupleAccess(_)) {
                self.error_at(lhs.pos, "left-hand side of '=' is not a variable");
            }
            let rhs = self.parse_assign_exp()?;
            let pos = lhs.pos;
            return Some(Expr {
                kind: ExprKind::Assign(Box::new(AssignExp { lhs, rhs })),
                pos,
            });
        }
        Some(lhs)
    }

    fn parse_or_exp(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_and_exp()?;
        while self.eat_punct(Punct::Or) {
            let rhs = self.parse_and_exp()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_and_exp(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_rel_exp()?;
        while self.eat_punct(Punct::And) {
            let rhs = self.parse_rel_exp()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Some(lhs)
    }

    /// Relational and equality operators do not associate.
    fn parse_rel_exp(&mut self) -> Option<Expr> {
        let lhs = self.parse_add_exp()?;
        let op = match self.peek_kind() {
            TokenKind::Punct(Punct::EqEq) => BinaryOp::Eq,
            TokenKind::Punct(Punct::NotEq) => BinaryOp::NotEq,
            TokenKind::Punct(Punct::Lt) => BinaryOp::Less,
            TokenKind::Punct(Punct::LtEq) => BinaryOp::LessEq,
            TokenKind::Punct(Punct::Gt) => BinaryOp::Greater,
            TokenKind::Punct(Punct::GtEq) => BinaryOp::GreaterEq,
            _ => return Some(lhs),
        };
        self.bump();
        let rhs = self.parse_add_exp()?;
        Some(binary(op, lhs, rhs))
    }

    fn parse_add_exp(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_mul_exp()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Punct(Punct::Plus) => BinaryOp::Plus,
                TokenKind::Punct(Punct::Minus) => BinaryOp::Minus,
                _ => return Some(lhs),
            };
            self.bump();
            let rhs = self.parse_mul_exp()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_mul_exp(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_unary_exp()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Punct(Punct::Star) => BinaryOp::Times,
                TokenKind::Punct(Punct::Slash) => BinaryOp::Divide,
                _ => return Some(lhs),
            };
            self.bump();
            let rhs = self.parse_unary_exp()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_unary_exp(&mut self) -> Option<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Punct(Punct::Minus) => UnaryOp::Neg,
            TokenKind::Punct(Punct::Not) => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        self.bump();
        let operand = self.parse_unary_exp()?;
        let pos = operand.pos;
        Some(Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            pos,
        })
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let pos = self.peek_pos();
        match self.peek_kind() {
            TokenKind::Int(value) => {
                let value = *value;
                self.bump();
                Some(Expr {
                    kind: ExprKind::IntLit(value),
                    pos,
                })
            }
            TokenKind::Str(value) => {
                let value = value.clone();
                self.bump();
                Some(Expr {
                    kind: ExprKind::StrLit(value),
                    pos,
                })
            }
            TokenKind::Bool(value) => {
                let kind = if *value {
                    ExprKind::True
                } else {
                    ExprKind::False
                };
                self.bump();
                Some(Expr { kind, pos })
            }
            TokenKind::Ident(_) => {
                if matches!(self.peek_ahead(1), Some(TokenKind::Punct(Punct::LParen))) {
                    let call = self.parse_call()?;
                    return Some(Expr {
                        kind: ExprKind::Call(call),
                        pos,
                    });
                }
                self.parse_loc()
            }
            TokenKind::Punct(Punct::LParen) => {
                self.bump();
                let exp = self.parse_exp()?;
                self.expect_punct(Punct::RParen)?;
                Some(exp)
            }
            _ => {
                self.error_here("expected an expression");
                None
            }
        }
    }

    fn parse_call(&mut self) -> Option<CallExp> {
        let callee = self.expect_ident()?;
        self.expect_punct(Punct::LParen)?;
        let mut args = Vec::new();
        if !self.at_punct(Punct::RParen) {
            loop {
                args.push(self.parse_exp()?);
                if !self.eat_punct(Punct::Comma) {
                    break;
                }
            }
        }
        self.expect_punct(Punct::RParen)?;
        Some(CallExp { callee, args })
    }

    // token helpers

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_pos(&self) -> Pos {
        self.peek().pos
    }

    fn peek_ahead(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn at_punct(&self, punct: Punct) -> bool {
        matches!(self.peek_kind(), TokenKind::Punct(p) if *p == punct)
    }

    fn eat_punct(&mut self, punct: Punct) -> bool {
        if self.at_punct(punct) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: Punct) -> Option<()> {
        if self.eat_punct(punct) {
            Some(())
        } else {
            self.error_here(&format!("expected '{}'", punct_text(punct)));
            None
        }
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if matches!(self.peek_kind(), TokenKind::Keyword(k) if *k == kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self) -> Option<Ident> {
        let pos = self.peek_pos();
        if let TokenKind::Ident(name) = self.peek_kind() {
            let ident = Ident::new(name.clone(), pos);
            self.bump();
            Some(ident)
        } else {
            self.error_here("expected an identifier");
            None
        }
    }

    fn error_here(&mut self, message: &str) {
        let pos = self.peek_pos();
        self.diags.error(pos, message);
    }

    fn error_at(&mut self, pos: Pos, message: &str) {
        self.diags.error(pos, message);
    }

    /// Skip past the next `stop` token, also giving up at a closing bracket
    /// or end of input so recovery cannot run away.
    fn sync_past(&mut self, stop: Punct) {
        while !self.at_eof() {
            if self.eat_punct(stop) {
                return;
            }
            if self.at_punct(Punct::RBracket) || self.at_punct(Punct::RBrace) {
                return;
            }
            self.bump();
        }
    }

    /// After a failed declaration, resume at the next plausible declaration
    /// start.
    fn sync_to_next_decl(&mut self) {
        while !self.at_eof() {
            if self.at_var_decl_start() {
                return;
            }
            self.bump();
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    let pos = lhs.pos;
    Expr {
        kind: ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        pos,
    }
}

fn punct_text(punct: Punct) -> &'static str {
    match punct {
        Punct::LBrace => "{",
        Punct::RBrace => "}",
        Punct::LParen => "(",
        Punct::RParen => ")",
        Punct::LBracket => "[",
        Punct::RBracket => "]",
        Punct::Colon => ":",
        Punct::Comma => ",",
        Punct::Dot => ".",
        Punct::ReadOp => ">>",
        Punct::WriteOp => "<<",
        Punct::PlusPlus => "++",
        Punct::MinusMinus => "--",
        Punct::Plus => "+",
        Punct::Minus => "-",
        Punct::Star => "*",
        Punct::Slash => "/",
        Punct::Not => "~",
        Punct::And => "&",
        Punct::Or => "|",
        Punct::EqEq => "==",
        Punct::NotEq => "~=",
        Punct::Lt => "<",
        Punct::Gt => ">",
        Punct::LtEq => "<=",
        Punct::GtEq => ">=",
        Punct::Assign => "=",
    }
}
