use super::*;
use incant_ir::{BinOp, Expr, ExprKind, UnaryOp};
use pretty_assertions::assert_eq;

fn parse_source(source: &str) -> Result<Program, ParseError> {
    let tokens = incant_lexer::tokenize(source).unwrap();
    parse(source, &tokens)
}

fn parse_ok(source: &str) -> Program {
    match parse_source(source) {
        Ok(program) => program,
        Err(e) => panic!("parsing {source:?} failed: {e}"),
    }
}

/// The expression of the only PRINT statement in `source`.
fn print_expr(source: &str) -> Expr {
    let program = parse_ok(source);
    match program.body.into_iter().next().map(|s| s.kind) {
        Some(StmtKind::Print { value }) => value,
        other => panic!("expected a PRINT statement, got {other:?}"),
    }
}

#[test]
fn program_sections_in_order() {
    let program = parse_ok(
        "STORE count = 0;\n\
         STORE greeting = 'hi';\n\
         PARAMS who, times;\n\
         PRINT greeting;",
    );
    assert_eq!(program.stores.len(), 2);
    assert_eq!(program.stores[0].name, "count");
    assert_eq!(program.stores[1].name, "greeting");
    assert_eq!(program.params.len(), 2);
    assert_eq!(program.params[1].name, "times");
    assert_eq!(program.body.len(), 1);
}

#[test]
fn params_tolerate_trailing_comma() {
    let program = parse_ok("PARAMS a, b,; PRINT a;");
    assert_eq!(program.params.len(), 2);
}

#[test]
fn store_after_params_is_rejected() {
    let err = parse_source("PARAMS a; STORE n = 0; PRINT a;").unwrap_err();
    assert!(matches!(err, ParseError::MisplacedStore { .. }));
}

#[test]
fn params_after_statement_is_rejected() {
    let err = parse_source("PRINT 1; PARAMS a;").unwrap_err();
    assert!(matches!(err, ParseError::MisplacedParams { .. }));
}

#[test]
fn empty_script_is_rejected() {
    let err = parse_source("STORE n = 0;").unwrap_err();
    match err {
        ParseError::Expected { expected, .. } => {
            assert_eq!(expected, "at least one statement");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_semicolon_names_expected_and_found() {
    let err = parse_source("PRINT 1 PRINT 2;").unwrap_err();
    match err {
        ParseError::Expected {
            expected, found, ..
        } => {
            assert_eq!(expected, "';' after statement");
            assert_eq!(found, "'PRINT'");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn product_binds_tighter_than_sum() {
    let expr = print_expr("PRINT 1 + 2 * 3;");
    let ExprKind::Binary { op, rhs, .. } = expr.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinOp::Add);
    assert!(matches!(
        rhs.kind,
        ExprKind::Binary { op: BinOp::Mul, .. }
    ));
}

#[test]
fn subtraction_is_left_associative() {
    let expr = print_expr("PRINT 10 - 4 - 3;");
    let ExprKind::Binary { op, lhs, .. } = expr.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinOp::Sub);
    assert!(matches!(
        lhs.kind,
        ExprKind::Binary { op: BinOp::Sub, .. }
    ));
}

#[test]
fn not_binds_looser_than_comparison() {
    let expr = print_expr("PRINT not 1 == 2;");
    let ExprKind::Unary { op, operand } = expr.kind else {
        panic!("expected unary expression");
    };
    assert_eq!(op, UnaryOp::Not);
    assert!(matches!(
        operand.kind,
        ExprKind::Binary { op: BinOp::Eq, .. }
    ));
}

#[test]
fn range_binds_looser_than_sum() {
    let expr = print_expr("PRINT 1..=2+3;");
    let ExprKind::Binary { op, rhs, .. } = expr.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinOp::RangeInclusive);
    assert!(matches!(
        rhs.kind,
        ExprKind::Binary { op: BinOp::Add, .. }
    ));
}

#[test]
fn ternary_is_right_associative() {
    let expr = print_expr("PRINT true ? 1 : false ? 2 : 3;");
    let ExprKind::Ternary { cond, otherwise, .. } = expr.kind else {
        panic!("expected ternary expression");
    };
    assert!(matches!(cond.kind, ExprKind::Bool(true)));
    assert!(matches!(otherwise.kind, ExprKind::Ternary { .. }));
}

#[test]
fn question_prefix_is_bool_conversion() {
    let expr = print_expr("PRINT ?x == y;");
    let ExprKind::Binary { op, lhs, .. } = expr.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinOp::Eq);
    assert!(matches!(
        lhs.kind,
        ExprKind::Unary {
            op: UnaryOp::ToBool,
            ..
        }
    ));
}

#[test]
fn unary_minus_on_subscript() {
    let expr = print_expr("PRINT -xs[0];");
    let ExprKind::Unary { op, operand } = expr.kind else {
        panic!("expected unary expression");
    };
    assert_eq!(op, UnaryOp::Neg);
    assert!(matches!(operand.kind, ExprKind::Subscript { .. }));
}

#[test]
fn call_requires_string_literal_callee() {
    let expr = print_expr("PRINT 'length'('abc');");
    let ExprKind::Call { name, args, .. } = expr.kind else {
        panic!("expected call expression");
    };
    assert_eq!(name, "length");
    assert_eq!(args.len(), 1);

    let err = parse_source("PRINT x('abc');").unwrap_err();
    assert!(matches!(err, ParseError::CalleeNotLiteral { .. }));
}

#[test]
fn sort_with_comparator() {
    let expr = print_expr("PRINT 'sort'(xs; a, b yeet a < b);");
    let ExprKind::Sort { cmp, .. } = expr.kind else {
        panic!("expected sort expression");
    };
    let cmp = cmp.unwrap();
    assert_eq!(cmp.lhs, "a");
    assert_eq!(cmp.rhs, "b");
    assert!(matches!(
        cmp.body.kind,
        ExprKind::Binary { op: BinOp::Lt, .. }
    ));
}

#[test]
fn sort_without_comparator() {
    let expr = print_expr("PRINT 'sort'([3, 1, 2]);");
    assert!(matches!(expr.kind, ExprKind::Sort { cmp: None, .. }));
}

#[test]
fn comprehension_with_filter() {
    let expr = print_expr("PRINT for 1..=5 as n if n > 2 yeet n * 10;");
    let ExprKind::Comprehension { var, cond, .. } = expr.kind else {
        panic!("expected comprehension");
    };
    assert_eq!(var, "n");
    assert!(cond.is_some());
}

#[test]
fn nested_comprehension_requires_parentheses() {
    let err = parse_source("PRINT for xs as x yeet for x as y yeet y;").unwrap_err();
    assert!(matches!(err, ParseError::NestedComprehension { .. }));

    // Parenthesized nesting is fine.
    parse_ok("PRINT for xs as x yeet (for x as y yeet y);");
}

#[test]
fn collect_expression_shape() {
    let expr = print_expr("PRINT collect 1..=5 as acc, n with acc + n;");
    let ExprKind::Collect { acc, elem, .. } = expr.kind else {
        panic!("expected collect expression");
    };
    assert_eq!(acc, "acc");
    assert_eq!(elem, "n");
}

#[test]
fn let_with_list_type_annotation() {
    let program = parse_ok("LET xs: list<list<string>> = [[]]; PRINT xs;");
    let StmtKind::Let { annotation, .. } = &program.body[0].kind else {
        panic!("expected let statement");
    };
    assert_eq!(
        annotation.clone().unwrap(),
        Ty::list(Ty::list(Ty::String))
    );
}

#[test]
fn list_literal_tolerates_trailing_comma() {
    let expr = print_expr("PRINT [1, 2, 3,];");
    let ExprKind::List { elems, .. } = expr.kind else {
        panic!("expected list literal");
    };
    assert_eq!(elems.len(), 3);
}

#[test]
fn grouped_expression_overrides_precedence() {
    let expr = print_expr("PRINT (1 + 2) * 3;");
    let ExprKind::Binary { op, lhs, .. } = expr.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinOp::Mul);
    assert!(matches!(
        lhs.kind,
        ExprKind::Binary { op: BinOp::Add, .. }
    ));
}
