//! Core expression and statement evaluator.

use crate::builtins::Builtins;
use crate::env::{Environment, ScopeRef};
use crate::error::{EvalError, EvalResult};
use crate::object::{Function, Object, ObjectType};
use crate::output::Output;
use monkey_ast::ast::*;
use std::rc::Rc;

/// Any node the evaluator can be pointed at.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Statement(&'a Statement),
    Block(&'a BlockStatement),
    Expression(&'a Expression),
}

/// The evaluation context: scopes, builtins and the output sink.
///
/// One interpreter holds the root scope for its whole lifetime, so
/// successive programs evaluated on it see each other's `let` bindings.
pub struct Interpreter {
    env: Environment,
    builtins: Builtins,
    output: Output,
}

impl Interpreter {
    /// Create an interpreter whose `puts` writes to stdout.
    pub fn new() -> Self {
        Self::with_output(Output::Stdout)
    }

    /// Create an interpreter with the given output sink.
    pub fn with_output(output: Output) -> Self {
        Self {
            env: Environment::new(),
            builtins: Builtins::new(),
            output,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut Output {
        &mut self.output
    }

    /// Look up a binding in the root scope.
    pub fn global(&self, name: &str) -> Option<Object> {
        self.env.get(&self.env.root(), name)
    }

    /// Evaluate a program in the root scope.
    ///
    /// Returns `Ok(None)` when the program is empty or ends in a `let`.
    /// Scopes left unreachable by the program are collected before returning.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn eval_program(&mut self, program: &Program) -> EvalResult<Option<Object>> {
        let root = self.env.root();
        let result = self.eval(Node::Program(program), &root);
        self.env.collect();
        result
    }

    /// Evaluate any node in `scope`.
    ///
    /// Only a program unwraps a `return`; evaluating a bare statement or block
    /// hands the [`EvalError::Return`] signal back to the caller.
    pub fn eval(&mut self, node: Node<'_>, scope: &ScopeRef) -> EvalResult<Option<Object>> {
        self.env.check(scope)?;
        match node {
            Node::Program(program) => match self.eval_statements(&program.statements, scope) {
                Err(EvalError::Return(value)) => Ok(Some(value)),
                other => other,
            },
            Node::Block(block) => self.eval_block(block, scope),
            Node::Statement(stmt) => self.eval_stmt(stmt, scope),
            Node::Expression(expr) => self.eval_expr(expr, scope).map(Some),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Block & Statement execution
    // ══════════════════════════════════════════════════════════════════════

    /// Execute statements in order, keeping the last result. An error or
    /// `return` stops the walk via `?`.
    fn eval_statements(
        &mut self,
        stmts: &[Statement],
        scope: &ScopeRef,
    ) -> EvalResult<Option<Object>> {
        let mut last = None;
        for stmt in stmts {
            last = self.eval_stmt(stmt, scope)?;
        }
        Ok(last)
    }

    fn eval_block(
        &mut self,
        block: &BlockStatement,
        scope: &ScopeRef,
    ) -> EvalResult<Option<Object>> {
        self.eval_statements(&block.statements, scope)
    }

    /// Execute a single statement. `let` yields no value.
    fn eval_stmt(&mut self, stmt: &Statement, scope: &ScopeRef) -> EvalResult<Option<Object>> {
        match stmt {
            Statement::Let(binding) => {
                let value = self.eval_expr(&binding.value, scope)?;
                self.env.set(scope, &binding.name.name, value)?;
                Ok(None)
            }
            Statement::Return(ret) => {
                let value = self.eval_expr(&ret.value, scope)?;
                Err(EvalError::Return(value))
            }
            Statement::Expression(stmt) => self.eval_expr(&stmt.expr, scope).map(Some),
        }
    }

    /// A block in expression position: no value becomes null.
    fn eval_block_value(&mut self, block: &BlockStatement, scope: &ScopeRef) -> EvalResult<Object> {
        Ok(self.eval_block(block, scope)?.unwrap_or(Object::NULL))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression to an Object.
    fn eval_expr(&mut self, expr: &Expression, scope: &ScopeRef) -> EvalResult<Object> {
        match expr {
            Expression::Integer(n) => Ok(Object::Integer(*n)),
            Expression::Boolean(b) => Ok(Object::from_bool(*b)),
            Expression::String(s) => Ok(Object::string(s.as_str())),
            Expression::Array(elements) => {
                let values = self.eval_expressions(elements, scope)?;
                Ok(Object::array(values))
            }
            Expression::Function(lit) => Ok(self.eval_function_literal(lit, scope)),

            Expression::Identifier(ident) => self.eval_identifier(&ident.name, scope),
            Expression::Call {
                function,
                arguments,
            } => {
                let callee = self.eval_expr(function, scope)?;
                let args = self.eval_expressions(arguments, scope)?;
                self.apply_function(callee, args)
            }
            Expression::Index { left, index } => {
                let left = self.eval_expr(left, scope)?;
                let index = self.eval_expr(index, scope)?;
                eval_index(&left, &index)
            }

            Expression::Prefix { operator, operand } => {
                let operand = self.eval_expr(operand, scope)?;
                eval_prefix(operator, &operand)
            }
            Expression::Infix {
                operator,
                left,
                right,
            } => {
                let left = self.eval_expr(left, scope)?;
                let right = self.eval_expr(right, scope)?;
                eval_infix(operator, &left, &right)
            }

            Expression::If(if_expr) => self.eval_if_expr(if_expr, scope),
        }
    }

    /// Evaluate left to right; the first error abandons the rest.
    fn eval_expressions(
        &mut self,
        exprs: &[Expression],
        scope: &ScopeRef,
    ) -> EvalResult<Vec<Object>> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            values.push(self.eval_expr(expr, scope)?);
        }
        Ok(values)
    }

    /// Environment first, then builtins. A `let` of a builtin's name hides it.
    fn eval_identifier(&self, name: &str, scope: &ScopeRef) -> EvalResult<Object> {
        if let Some(value) = self.env.get(scope, name) {
            return Ok(value);
        }
        self.builtins
            .get(name)
            .map(Object::Builtin)
            .ok_or_else(|| EvalError::IdentifierNotFound(name.to_string()))
    }

    fn eval_if_expr(&mut self, if_expr: &IfExpression, scope: &ScopeRef) -> EvalResult<Object> {
        let cond = self.eval_expr(&if_expr.condition, scope)?;
        if cond.is_truthy() {
            self.eval_block_value(&if_expr.consequence, scope)
        } else if let Some(alternative) = &if_expr.alternative {
            self.eval_block_value(alternative, scope)
        } else {
            Ok(Object::NULL)
        }
    }

    fn eval_function_literal(&self, lit: &FunctionLiteral, scope: &ScopeRef) -> Object {
        Object::Function(Rc::new(Function {
            parameters: lit.parameters.clone(),
            body: Rc::clone(&lit.body),
            scope: scope.clone(),
        }))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Calls
    // ══════════════════════════════════════════════════════════════════════

    /// Apply an evaluated callee to evaluated arguments.
    ///
    /// User functions bind parameters positionally: extra arguments are
    /// ignored and missing ones stay unbound. A closure made by another
    /// interpreter fails with [`EvalError::ForeignScope`].
    #[tracing::instrument(level = "trace", skip_all, fields(callee = %callee.object_type(), argc = args.len()))]
    pub fn apply_function(&mut self, callee: Object, args: Vec<Object>) -> EvalResult<Object> {
        match callee {
            Object::Function(func) => {
                let call_scope = self.env.new_enclosed(&func.scope)?;
                for (param, arg) in func.parameters.iter().zip(args) {
                    self.env.set(&call_scope, &param.name, arg)?;
                }
                let result = match self.eval_block(&func.body, &call_scope) {
                    Ok(value) => Ok(value.unwrap_or(Object::NULL)),
                    Err(EvalError::Return(value)) => Ok(value),
                    Err(err) => Err(err),
                };
                self.env.release(call_scope);
                result
            }
            Object::Builtin(builtin) => {
                tracing::trace!(name = builtin.name, "builtin call");
                builtin.call(&args, &mut self.output)
            }
            other => Err(EvalError::NotAFunction(other.object_type())),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════

fn eval_prefix(operator: &str, operand: &Object) -> EvalResult<Object> {
    match (operator, operand) {
        ("!", _) => Ok(Object::from_bool(!operand.is_truthy())),
        ("-", Object::Integer(n)) => Ok(Object::Integer(n.wrapping_neg())),
        _ => Err(EvalError::UnknownPrefixOperator {
            operator: operator.to_string(),
            operand: operand.object_type(),
        }),
    }
}

/// Binary operators. The order of the arms is the language's dispatch order:
/// integers first, then identity `==`/`!=`, then kind mismatch, then strings.
fn eval_infix(operator: &str, left: &Object, right: &Object) -> EvalResult<Object> {
    match (left, right) {
        (Object::Integer(a), Object::Integer(b)) => eval_integer_infix(operator, *a, *b),
        _ if operator == "==" => Ok(Object::from_bool(left.same_object(right))),
        _ if operator == "!=" => Ok(Object::from_bool(!left.same_object(right))),
        _ if left.object_type() != right.object_type() => Err(EvalError::TypeMismatch {
            left: left.object_type(),
            operator: operator.to_string(),
            right: right.object_type(),
        }),
        (Object::String(a), Object::String(b)) if operator == "+" => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Object::string(joined))
        }
        _ => Err(unknown_infix(operator, left.object_type(), right.object_type())),
    }
}

fn eval_integer_infix(operator: &str, a: i64, b: i64) -> EvalResult<Object> {
    match operator {
        "+" => Ok(Object::Integer(a.wrapping_add(b))),
        "-" => Ok(Object::Integer(a.wrapping_sub(b))),
        "*" => Ok(Object::Integer(a.wrapping_mul(b))),
        "/" => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Object::Integer(a.wrapping_div(b)))
        }
        "<" => Ok(Object::from_bool(a < b)),
        ">" => Ok(Object::from_bool(a > b)),
        "==" => Ok(Object::from_bool(a == b)),
        "!=" => Ok(Object::from_bool(a != b)),
        _ => Err(unknown_infix(operator, ObjectType::Integer, ObjectType::Integer)),
    }
}

fn unknown_infix(operator: &str, left: ObjectType, right: ObjectType) -> EvalError {
    EvalError::UnknownInfixOperator {
        left,
        operator: operator.to_string(),
        right,
    }
}

fn eval_index(left: &Object, index: &Object) -> EvalResult<Object> {
    match (left, index) {
        (Object::Array(elements), Object::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .unwrap_or(Object::NULL)),
        _ => Err(EvalError::IndexNotSupported(left.object_type())),
    }
}
