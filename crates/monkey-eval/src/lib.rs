//! Monkey tree-walking evaluator.
//!
//! Executes Monkey programs directly from the AST handed over by a parser.
//! Errors and `return` travel through the same `Result` channel as values,
//! so every composite evaluation step short-circuits with `?`.

pub mod builtins;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod object;
pub mod output;

pub use builtins::Builtins;
pub use env::{Environment, ScopeRef};
pub use error::{EvalError, EvalResult};
pub use evaluator::{Interpreter, Node};
pub use object::{Builtin, BuiltinFn, Function, Object, ObjectType};
pub use output::Output;
