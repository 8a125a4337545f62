//! Shared helpers for the evaluator integration tests.
//!
//! Parsing is someone else's job, so tests build trees by hand with the
//! short constructors below.

#![allow(dead_code)]

use monkey_ast::ast::*;
use monkey_eval::{EvalResult, Interpreter, Object, Output};

pub fn int(n: i64) -> Expression {
    Expression::int(n)
}

pub fn boolean(b: bool) -> Expression {
    Expression::boolean(b)
}

pub fn s(text: &str) -> Expression {
    Expression::string(text)
}

pub fn id(name: &str) -> Expression {
    Expression::ident(name)
}

pub fn arr(elements: Vec<Expression>) -> Expression {
    Expression::array(elements)
}

pub fn infix(left: Expression, op: &str, right: Expression) -> Expression {
    Expression::infix(left, op, right)
}

pub fn prefix(op: &str, operand: Expression) -> Expression {
    Expression::prefix(op, operand)
}

pub fn call(function: Expression, args: Vec<Expression>) -> Expression {
    Expression::call(function, args)
}

pub fn index(left: Expression, idx: Expression) -> Expression {
    Expression::index(left, idx)
}

pub fn func(params: &[&str], body: Vec<Statement>) -> Expression {
    Expression::function(params, BlockStatement::new(body))
}

pub fn if_(cond: Expression, cons: Vec<Statement>, alt: Option<Vec<Statement>>) -> Expression {
    Expression::if_(cond, BlockStatement::new(cons), alt.map(BlockStatement::new))
}

pub fn let_(name: &str, value: Expression) -> Statement {
    Statement::let_(name, value)
}

pub fn ret(value: Expression) -> Statement {
    Statement::return_(value)
}

pub fn e(expr: Expression) -> Statement {
    Statement::expr(expr)
}

pub fn ints(values: &[i64]) -> Object {
    Object::array(values.iter().map(|v| Object::Integer(*v)).collect())
}

/// Route evaluator traces to the test writer (`RUST_LOG=monkey_eval=trace`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Interpreter capturing `puts` output.
pub fn interpreter() -> Interpreter {
    init_tracing();
    Interpreter::with_output(Output::buffer())
}

pub fn run(stmts: Vec<Statement>) -> EvalResult<Option<Object>> {
    interpreter().eval_program(&Program::new(stmts))
}

/// Evaluate and return the program's value (panics on error or no value).
pub fn value(stmts: Vec<Statement>) -> Object {
    match run(stmts) {
        Ok(Some(obj)) => obj,
        Ok(None) => panic!("program produced no value"),
        Err(err) => panic!("eval error: {err}"),
    }
}

/// Evaluate a single expression program.
pub fn eval(expr: Expression) -> Object {
    value(vec![e(expr)])
}

/// Evaluate and return the error message (panics on success).
pub fn error(stmts: Vec<Statement>) -> String {
    match run(stmts) {
        Ok(v) => panic!("expected an error, got {v:?}"),
        Err(err) => {
            assert!(!err.is_return(), "return signal escaped the program");
            err.to_string()
        }
    }
}

pub fn expr_error(expr: Expression) -> String {
    error(vec![e(expr)])
}
