//! Errors raised while exchanging ASTs with an external parser.

use thiserror::Error;

/// Failure to decode or encode a program tree.
#[derive(Debug, Error)]
pub enum AstError {
    #[error("invalid AST JSON: {0}")]
    Json(#[from] serde_json::Error),
}
