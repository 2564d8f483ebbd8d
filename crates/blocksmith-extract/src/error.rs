//! Extraction errors
//!
//! These never escape the cascade: each one is logged against the strategy
//! that produced it and the cascade moves on.

/// Why a single strategy could not recover a payload
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Candidate text is not valid JSON
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// No fenced code block in the input
    #[error("no fenced code block found")]
    NoFence,

    /// No `{` in the input
    #[error("no opening brace found")]
    NoOpeningBrace,

    /// No `}` after the first `{`
    #[error("no closing brace after byte {start}")]
    NoClosingBrace { start: usize },

    /// The first `{` is never balanced
    #[error("unbalanced braces starting at byte {start}")]
    Unbalanced { start: usize },
}

/// A strategy failure recorded by the cascade
#[derive(Debug)]
pub struct StrategyFailure {
    /// Strategy name
    pub strategy: &'static str,
    /// What went wrong
    pub error: ExtractError,
}

impl std::fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.strategy, self.error)
    }
}
