//! Error types for the synthesis engine

use thiserror::Error;
use tree_adapter::OracleError;

/// Synthesis error enumeration
///
/// Per-candidate and per-strategy failures are contained at the strategy
/// manager boundary; only `InvalidElement` and `FallbackFailed` ever reach
/// the returned result, and even there as a structured failure, never a
/// propagated error.
#[derive(Debug, Error, Clone)]
pub enum SynthError {
    /// Target node has no tag; terminal
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// Candidate expression was malformed; local to one candidate
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Candidate resolved to zero, several, or a different node
    #[error("Validation failed: expression matched {matches} node(s)")]
    ValidationFailure { matches: usize },

    /// No strategy's applicability predicate matched
    #[error("No applicable strategy")]
    NoApplicableStrategy,

    /// Every applicable strategy ran and produced no valid candidate
    #[error("All strategies failed")]
    AllStrategiesFailed,

    /// Even the position-indexed fallback produced nothing; terminal
    #[error("Fallback failed: {0}")]
    FallbackFailed(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SynthError {
    /// True when the error stays inside the strategy manager and the
    /// synthesis pass continues
    pub fn is_contained(&self) -> bool {
        matches!(
            self,
            SynthError::Oracle(_)
                | SynthError::ValidationFailure { .. }
                | SynthError::NoApplicableStrategy
                | SynthError::AllStrategiesFailed
        )
    }
}
