//! AST node protocol for the Monkey language.
//!
//! This crate defines the tree a parser hands to the evaluator, its
//! canonical source rendering, and its JSON interchange form.

mod error;
pub mod ast;

pub use error::AstError;

/// Result type used for AST interchange.
pub type Result<T> = std::result::Result<T, AstError>;
