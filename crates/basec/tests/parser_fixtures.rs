use basec::ast::{BinaryOp, Decl, ExprKind, Stmt, TypeSpec};
use basec::parse_source;
use basec::span::Pos;

#[test]
fn parses_every_declaration_form() {
    let src = concat!(
        "integer x.\n",
        "logical flag.\n",
        "tuple T { integer a. logical b. }.\n",
        "tuple T t.\n",
        "integer add { integer a, integer b } [\n",
        "  return a + b.\n",
        "]",
    );
    let (program, diags) = parse_source(src);
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    assert_eq!(program.decls.len(), 5);

    assert!(matches!(&program.decls[0], Decl::Var(d) if matches!(d.ty, TypeSpec::Integer)));
    assert!(matches!(&program.decls[2], Decl::Tuple(d) if d.fields.len() == 2));
    assert!(
        matches!(&program.decls[3], Decl::Var(d) if matches!(&d.ty, TypeSpec::Tuple(id) if id.name == "T"))
    );
    let Decl::Fctn(f) = &program.decls[4] else {
        panic!("expected a function");
    };
    assert_eq!(f.formals.len(), 2);
    assert_eq!(f.body.stmts.len(), 1);
}

#[test]
fn parses_every_statement_form() {
    let src = concat!(
        "void main {} [\n",
        "  integer n.\n",
        "  logical b.\n",
        "  n = 1.\n",
        "  n++.\n",
        "  n--.\n",
        "  if b [\n",
        "    n = 2.\n",
        "  ]\n",
        "  if b [\n",
        "  ]\n",
        "  else [\n",
        "    n = 3.\n",
        "  ]\n",
        "  while b [\n",
        "    read >> n.\n",
        "  ]\n",
        "  write << n.\n",
        "  main().\n",
        "  return.\n",
        "]",
    );
    let (program, diags) = parse_source(src);
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    let Decl::Fctn(main) = &program.decls[0] else {
        panic!("expected a function");
    };
    assert_eq!(main.body.decls.len(), 2);
    assert_eq!(main.body.stmts.len(), 9);
    assert!(matches!(main.body.stmts[1], Stmt::PostInc(_)));
    assert!(matches!(main.body.stmts[2], Stmt::PostDec(_)));
    assert!(matches!(main.body.stmts[4], Stmt::IfElse { .. }));
    assert!(matches!(main.body.stmts[8], Stmt::Return(None)));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let (program, diags) = parse_source("void f {} [\n  x = a + b * c.\n]");
    assert!(diags.is_empty());
    let Decl::Fctn(f) = &program.decls[0] else {
        panic!("expected a function");
    };
    let Stmt::Assign(assign) = &f.body.stmts[0] else {
        panic!("expected an assignment");
    };
    let ExprKind::Binary { op, rhs, .. } = &assign.rhs.kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(*op, BinaryOp::Plus);
    assert!(matches!(
        rhs.kind,
        ExprKind::Binary {
            op: BinaryOp::Times,
            ..
        }
    ));
}

#[test]
fn colon_chains_associate_left() {
    let (program, diags) = parse_source("void f {} [\n  a:b:c = 1.\n]");
    assert!(diags.is_empty());
    let Decl::Fctn(f) = &program.decls[0] else {
        panic!("expected a function");
    };
    let Stmt::Assign(assign) = &f.body.stmts[0] else {
        panic!("expected an assignment");
    };
    let ExprKind::TupleAccess(outer) = &assign.lhs.kind else {
        panic!("expected a colon-access");
    };
    assert_eq!(outer.field.name, "c");
    let ExprKind::TupleAccess(inner) = &outer.loc.kind else {
        panic!("expected a nested colon-access");
    };
    assert_eq!(inner.field.name, "b");
    assert!(matches!(&inner.loc.kind, ExprKind::Ident(id) if id.name == "a"));
}

#[test]
fn binary_expressions_anchor_on_their_left_operand() {
    let (program, diags) = parse_source("void f {} [\n  x = a + b.\n]");
    assert!(diags.is_empty());
    let Decl::Fctn(f) = &program.decls[0] else {
        panic!("expected a function");
    };
    let Stmt::Assign(assign) = &f.body.stmts[0] else {
        panic!("expected an assignment");
    };
    // `a` sits at column 7 of line 2
    assert_eq!(assign.rhs.pos, Pos::new(2, 7));
    assert_eq!(assign.lhs.pos, Pos::new(2, 3));
}

#[test]
fn missing_dot_is_reported_and_recovered() {
    let src = "void f {} [\n  x = 1\n  y = 2.\n]";
    let (program, diags) = parse_source(src);
    assert!(!diags.is_empty());
    // the surrounding program shape survives
    assert_eq!(program.decls.len(), 1);
}

#[test]
fn assignment_lhs_must_be_a_variable() {
    let (_, diags) = parse_source("void f {} [\n  x = 1 + (2 = 3).\n]");
    assert!(
        diags
            .iter()
            .any(|d| d.message.contains("left-hand side")),
        "expected an lhs diagnostic, got: {diags:?}"
    );
}

#[test]
fn stray_tokens_do_not_loop_recovery() {
    // garbage between declarations must not hang the parser
    let (_, diags) = parse_source("integer x. ) ] } integer y.");
    assert!(!diags.is_empty());
}
