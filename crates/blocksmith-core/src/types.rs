//! Core types for blocksmith generation

use blocksmith_repair::RepairEvent;
use blocksmith_schema::{ContentBlock, ValidationWarning};
use serde::{Deserialize, Serialize};

/// Token counters reported by the provider, passed through unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens
    pub prompt: u64,
    /// Completion tokens
    pub completion: u64,
    /// Total tokens
    pub total: u64,
}

impl TokenUsage {
    /// Create usage with total = prompt + completion
    #[inline]
    #[must_use]
    pub fn new(prompt: u64, completion: u64) -> Self {
        Self {
            prompt,
            completion,
            total: prompt.saturating_add(completion),
        }
    }
}

/// Raw provider reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Untrusted reply text
    pub text: String,
    /// Token counters
    pub usage: TokenUsage,
}

impl Completion {
    /// Create completion
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}

/// Where the blocks of a successful result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationOrigin {
    /// Repaired model output that passed validation
    Generated,
    /// Synthesized fallback document
    Fallback,
}

/// Compliant result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSuccess {
    /// Non-empty, compliant blocks
    pub blocks: Vec<ContentBlock>,
    /// Provider token counters
    pub usage: TokenUsage,
    /// Generated or fallback
    pub origin: GenerationOrigin,
    /// Repairs applied to the model output
    pub repairs: Vec<RepairEvent>,
    /// Warnings that forced the fallback; empty for generated output
    pub warnings: Vec<ValidationWarning>,
}

/// Typed failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationFailure {
    /// Human-readable reason
    pub reason: String,
    /// Outstanding validation warnings
    pub warnings: Vec<ValidationWarning>,
    /// Repairs applied before giving up
    pub repairs: Vec<RepairEvent>,
}

/// Outcome of one generation request
///
/// Either a non-empty compliant block list or an explicit failure, never an
/// empty success.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerationResult {
    /// Compliant blocks
    Success(GenerationSuccess),
    /// Explicit failure
    Failure(GenerationFailure),
}

impl GenerationResult {
    /// Whether the result carries blocks
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Blocks, for a success
    #[must_use]
    pub fn blocks(&self) -> Option<&[ContentBlock]> {
        match self {
            Self::Success(success) => Some(&success.blocks),
            Self::Failure(_) => None,
        }
    }

    /// Metric label: `compliant`, `fallback` or `failed`
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Success(GenerationSuccess {
                origin: GenerationOrigin::Generated,
                ..
            }) => "compliant",
            Self::Success(_) => "fallback",
            Self::Failure(_) => "failed",
        }
    }

    /// Convert into a standard result
    ///
    /// # Errors
    /// Returns the failure case
    pub fn into_result(self) -> Result<GenerationSuccess, GenerationFailure> {
        match self {
            Self::Success(success) => Ok(success),
            Self::Failure(failure) => Err(failure),
        }
    }
}
