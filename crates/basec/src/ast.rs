use crate::span::Pos;
use serde::{Deserialize, Serialize};

/// Index of a symbol in the analysis arena. Name resolution writes one into
/// every identifier it binds; downstream passes read type information through
/// it after the scopes that declared the symbol are gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymId(pub u32);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Program {
    pub decls: Vec<Decl>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Decl {
    Var(VarDecl),
    Fctn(FctnDecl),
    Tuple(TupleDecl),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
    /// Set exactly once, by name resolution. `None` after analysis means the
    /// use was undeclared (or part of an abandoned colon-access chain).
    pub sym: Option<SymId>,
}

impl Ident {
    pub fn new(name: impl Into<String>, pos: Pos) -> Self {
        Self {
            name: name.into(),
            pos,
            sym: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VarDecl {
    pub ty: TypeSpec,
    pub name: Ident,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FctnDecl {
    pub ret: TypeSpec,
    pub name: Ident,
    pub formals: Vec<FormalDecl>,
    pub body: Body,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormalDecl {
    pub ty: TypeSpec,
    pub name: Ident,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TupleDecl {
    pub name: Ident,
    pub fields: Vec<VarDecl>,
}

/// A declared type as written in the source. `Tuple` carries the type name
/// identifier so resolution can link it to the tuple definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TypeSpec {
    Integer,
    Logical,
    Void,
    Tuple(Ident),
}

/// Local declarations come before statements in every bracketed body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Body {
    pub decls: Vec<VarDecl>,
    pub stmts: Vec<Stmt>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Stmt {
    Assign(AssignExp),
    PostInc(Expr),
    PostDec(Expr),
    If {
        cond: Expr,
        body: Body,
    },
    IfElse {
        cond: Expr,
        then_body: Body,
        else_body: Body,
    },
    While {
        cond: Expr,
        body: Body,
    },
    Read(Expr),
    Write(Expr),
    Call(CallExp),
    Return(Option<Expr>),
}

/// Every expression carries its position anchor, fixed at parse time:
/// literals and identifiers anchor on their own token, a colon-access on its
/// rightmost field, an assignment on its left-hand side, a call on the callee,
/// and unary/binary operators on their (left) operand.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Pos,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ExprKind {
    True,
    False,
    IntLit(i32),
    StrLit(String),
    Ident(Ident),
    TupleAccess(TupleAccess),
    Assign(Box<AssignExp>),
    Call(CallExp),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// One step of a left-associative colon-access chain `a:b:c`. `loc` is an
/// identifier or another colon-access; the parser admits nothing else.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TupleAccess {
    pub loc: Box<Expr>,
    pub field: Ident,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssignExp {
    pub lhs: Expr,
    pub rhs: Expr,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallExp {
    pub callee: Ident,
    pub args: Vec<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
}
