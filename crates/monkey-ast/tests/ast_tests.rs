//! Tests for the AST node protocol: source rendering and JSON interchange.

use monkey_ast::ast::*;
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn block(statements: Vec<Statement>) -> BlockStatement {
    BlockStatement::new(statements)
}

fn e(expr: Expression) -> Statement {
    Statement::expr(expr)
}

// ══════════════════════════════════════════════════════════════════════════════
// Display
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn display_let_statement() {
    let program = Program::new(vec![Statement::let_(
        "myVar",
        Expression::ident("anotherVar"),
    )]);
    assert_eq!(program.to_string(), "let myVar = anotherVar;");
}

#[test]
fn display_return_statement() {
    assert_eq!(Statement::return_(Expression::int(5)).to_string(), "return 5;");
}

#[test]
fn display_nested_infix_is_fully_parenthesised() {
    let expr = Expression::infix(
        Expression::int(5),
        "+",
        Expression::infix(Expression::int(2), "*", Expression::int(3)),
    );
    assert_eq!(expr.to_string(), "(5 + (2 * 3))");
}

#[test]
fn display_prefix() {
    let expr = Expression::prefix("-", Expression::ident("a"));
    assert_eq!(expr.to_string(), "(-a)");
    let expr = Expression::prefix("!", Expression::boolean(true));
    assert_eq!(expr.to_string(), "(!true)");
}

#[test]
fn display_literals() {
    assert_eq!(Expression::string("hi").to_string(), "\"hi\"");
    assert_eq!(
        Expression::array(vec![Expression::int(1), Expression::int(2)]).to_string(),
        "[1, 2]"
    );
    assert_eq!(Expression::array(vec![]).to_string(), "[]");
}

#[test]
fn display_call_and_index() {
    let call = Expression::call(
        Expression::ident("add"),
        vec![
            Expression::int(1),
            Expression::infix(Expression::int(2), "*", Expression::int(3)),
        ],
    );
    assert_eq!(call.to_string(), "add(1, (2 * 3))");

    let index = Expression::index(Expression::ident("arr"), Expression::int(0));
    assert_eq!(index.to_string(), "(arr[0])");
}

#[test]
fn display_function_literal() {
    let func = Expression::function(
        &["x", "y"],
        block(vec![e(Expression::infix(
            Expression::ident("x"),
            "+",
            Expression::ident("y"),
        ))]),
    );
    assert_eq!(func.to_string(), "fn(x, y) { (x + y) }");
}

#[test]
fn display_if_else() {
    let expr = Expression::if_(
        Expression::infix(Expression::ident("x"), "<", Expression::ident("y")),
        block(vec![e(Expression::ident("x"))]),
        Some(block(vec![e(Expression::ident("y"))])),
    );
    assert_eq!(expr.to_string(), "if (x < y) { x } else { y }");

    let expr = Expression::if_(
        Expression::ident("x"),
        block(vec![e(Expression::int(1))]),
        None,
    );
    assert_eq!(expr.to_string(), "if (x) { 1 }");

    let expr = Expression::if_(
        Expression::call(Expression::ident("ok"), vec![]),
        block(vec![e(Expression::int(1))]),
        Some(block(vec![e(Expression::int(2))])),
    );
    assert_eq!(expr.to_string(), "if (ok()) { 1 } else { 2 }");
}

#[test]
fn expression_converts_into_statement() {
    let stmt: Statement = Expression::int(7).into();
    assert_eq!(stmt, Statement::expr(Expression::int(7)));
}

// ══════════════════════════════════════════════════════════════════════════════
// JSON interchange
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn json_decodes_hand_written_tree() {
    let json = r#"{"statements":[{"expression":{"expr":{"integer":5}}}]}"#;
    let program = Program::from_json(json).unwrap();
    assert_eq!(program, Program::new(vec![e(Expression::int(5))]));
}

#[test]
fn json_round_trip_preserves_closures() {
    let program = Program::new(vec![
        Statement::let_(
            "adder",
            Expression::function(
                &["x"],
                block(vec![e(Expression::function(
                    &["y"],
                    block(vec![e(Expression::infix(
                        Expression::ident("x"),
                        "+",
                        Expression::ident("y"),
                    ))]),
                ))]),
            ),
        ),
        e(Expression::call(
            Expression::call(Expression::ident("adder"), vec![Expression::int(2)]),
            vec![Expression::int(3)],
        )),
    ]);
    let json = program.to_json().unwrap();
    let decoded = Program::from_json(&json).unwrap();
    assert_eq!(decoded, program);
    assert_eq!(decoded.to_string(), program.to_string());
}

#[test]
fn json_rejects_unknown_node_kind() {
    let json = r#"{"statements":[{"expression":{"expr":{"hash":[]}}}]}"#;
    let err = Program::from_json(json).unwrap_err();
    assert!(err.to_string().starts_with("invalid AST JSON"), "{err}");
}
