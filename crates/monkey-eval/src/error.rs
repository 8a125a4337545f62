//! Runtime error types for the Monkey evaluator.

use crate::object::{Object, ObjectType};
use thiserror::Error;

/// Evaluation failure, plus the `return` signal that shares its channel.
///
/// Every variant except [`EvalError::Return`] is a user-visible error whose
/// `Display` output is the exact message the language reports.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Builtin called with the wrong number of arguments.
    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongArgumentCount { got: usize, want: usize },
    /// Builtin argument of a kind it cannot handle at all.
    #[error("argument to `{builtin}` not supported, got {got}")]
    UnsupportedArgument { builtin: &'static str, got: ObjectType },
    /// Builtin argument of the wrong kind where exactly one kind is accepted.
    #[error("argument to `{builtin}` must be {expected}, got {got}")]
    ArgumentMustBe {
        builtin: &'static str,
        expected: ObjectType,
        got: ObjectType,
    },
    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator { operator: String, operand: ObjectType },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operator: String,
        right: ObjectType,
    },
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectType,
        operator: String,
        right: ObjectType,
    },
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("not a function: {0}")]
    NotAFunction(ObjectType),
    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),
    #[error("division by zero")]
    DivisionByZero,
    /// A scope handle, usually inside a closure, from another interpreter.
    #[error("scope belongs to another interpreter")]
    ForeignScope,
    /// `return` statement (used internally for control flow)
    #[error("return")]
    Return(Object),
}

impl EvalError {
    /// True for the `return` signal, false for real errors.
    pub fn is_return(&self) -> bool {
        matches!(self, Self::Return(_))
    }

    /// Type tag of the signal: `RETURN_VALUE` or `ERROR`.
    pub fn object_type(&self) -> ObjectType {
        if self.is_return() {
            ObjectType::ReturnValue
        } else {
            ObjectType::Error
        }
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
