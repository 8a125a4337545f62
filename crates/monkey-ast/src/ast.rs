//! AST node types for the Monkey language.
//!
//! The tree is produced by an external parser and consumed by the evaluator.
//! Nodes carry no source positions and are never validated here: a malformed
//! tree is the producer's problem. Large recursive types are boxed to keep
//! enum sizes reasonable.
//!
//! Every node renders back to canonical source through [`fmt::Display`] and
//! round-trips through JSON via serde.

use crate::error::AstError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete program: an ordered list of top-level statements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Decode a program handed over as JSON by an out-of-process parser.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(AstError::from)
    }

    /// Encode the program as JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(AstError::from)
    }
}

/// `{ statements... }`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl BlockStatement {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A statement in a program or block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    /// `let name = expr;`
    Let(LetStatement),
    /// `return expr;`
    Return(ReturnStatement),
    /// A bare expression (its value is the statement's value).
    Expression(ExpressionStatement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetStatement {
    pub name: Identifier,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub expr: Expression,
}

impl Statement {
    pub fn let_(name: impl Into<String>, value: Expression) -> Self {
        Self::Let(LetStatement {
            name: Identifier::new(name),
            value,
        })
    }

    pub fn return_(value: Expression) -> Self {
        Self::Return(ReturnStatement { value })
    }

    pub fn expr(expr: Expression) -> Self {
        Self::Expression(ExpressionStatement { expr })
    }
}

impl From<Expression> for Statement {
    fn from(expr: Expression) -> Self {
        Self::expr(expr)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node.
///
/// Operators stay as the text the parser saw (`"+"`, `"!"`, ...); the
/// evaluator decides which ones it understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    // ── Literals ──
    /// `42`
    Integer(i64),
    /// `true` / `false`
    Boolean(bool),
    /// `"hello"`
    String(String),
    /// `[expr, ...]`
    Array(Vec<Expression>),
    /// `fn(params) { body }`
    Function(FunctionLiteral),

    // ── Names & Calls ──
    /// `my_var`
    Identifier(Identifier),
    /// `callee(args...)`
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// `left[index]`
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },

    // ── Operators ──
    /// `-x`, `!x`
    Prefix {
        operator: String,
        operand: Box<Expression>,
    },
    /// `a + b`, `a == b`, etc.
    Infix {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    // ── Control Flow ──
    /// `if (cond) { ... } [else { ... }]`
    If(Box<IfExpression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfExpression {
    pub condition: Expression,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
}

/// A function literal. The body is shared so closures built from it
/// do not copy the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionLiteral {
    pub parameters: Vec<Identifier>,
    pub body: Rc<BlockStatement>,
}

impl Expression {
    pub fn int(value: i64) -> Self {
        Self::Integer(value)
    }

    pub fn boolean(value: bool) -> Self {
        Self::Boolean(value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::Identifier(Identifier::new(name))
    }

    pub fn array(elements: Vec<Expression>) -> Self {
        Self::Array(elements)
    }

    pub fn prefix(operator: impl Into<String>, operand: Expression) -> Self {
        Self::Prefix {
            operator: operator.into(),
            operand: Box::new(operand),
        }
    }

    pub fn infix(left: Expression, operator: impl Into<String>, right: Expression) -> Self {
        Self::Infix {
            operator: operator.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(function: Expression, arguments: Vec<Expression>) -> Self {
        Self::Call {
            function: Box::new(function),
            arguments,
        }
    }

    pub fn index(left: Expression, index: Expression) -> Self {
        Self::Index {
            left: Box::new(left),
            index: Box::new(index),
        }
    }

    pub fn function(parameters: &[&str], body: BlockStatement) -> Self {
        Self::Function(FunctionLiteral {
            parameters: parameters.iter().map(|p| Identifier::new(*p)).collect(),
            body: Rc::new(body),
        })
    }

    pub fn if_(
        condition: Expression,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    ) -> Self {
        Self::If(Box::new(IfExpression {
            condition,
            consequence,
            alternative,
        }))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Source rendering
// ══════════════════════════════════════════════════════════════════════════════

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Let(s) => write!(f, "let {} = {};", s.name, s.value),
            Self::Return(s) => write!(f, "return {};", s.value),
            Self::Expression(s) => write!(f, "{}", s.expr),
        }
    }
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        write_joined(f, &self.parameters)?;
        write!(f, ") {{ {} }}", self.body)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Array(elements) => {
                f.write_str("[")?;
                write_joined(f, elements)?;
                f.write_str("]")
            }
            Self::Function(lit) => write!(f, "{lit}"),
            Self::Identifier(ident) => write!(f, "{ident}"),
            Self::Call {
                function,
                arguments,
            } => {
                write!(f, "{function}(")?;
                write_joined(f, arguments)?;
                f.write_str(")")
            }
            Self::Index { left, index } => write!(f, "({left}[{index}])"),
            Self::Prefix { operator, operand } => write!(f, "({operator}{operand})"),
            Self::Infix {
                operator,
                left,
                right,
            } => write!(f, "({left} {operator} {right})"),
            Self::If(if_expr) => {
                // Operator and index nodes already render inside parentheses.
                match &if_expr.condition {
                    Self::Prefix { .. } | Self::Infix { .. } | Self::Index { .. } => {
                        write!(f, "if {}", if_expr.condition)?
                    }
                    cond => write!(f, "if ({cond})")?,
                }
                write!(f, " {{ {} }}", if_expr.consequence)?;
                if let Some(alt) = &if_expr.alternative {
                    write!(f, " else {{ {alt} }}")?;
                }
                Ok(())
            }
        }
    }
}
