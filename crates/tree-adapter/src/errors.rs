//! Error types for tree access and expression evaluation

use thiserror::Error;

/// Oracle error enumeration
#[derive(Debug, Error, Clone)]
pub enum OracleError {
    /// Expression could not be parsed; local to the one candidate
    #[error("Syntax error in expression '{expression}': {reason}")]
    Syntax { expression: String, reason: String },

    /// Node handle does not exist in the tree
    #[error("Unknown node: {0}")]
    UnknownNode(u32),

    /// Internal evaluator error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OracleError {
    pub fn syntax(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Syntax {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// True when the error is scoped to a single candidate expression
    pub fn is_local(&self) -> bool {
        matches!(self, OracleError::Syntax { .. })
    }
}
