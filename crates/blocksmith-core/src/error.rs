//! Error types for the blocksmith orchestrator
//!
//! Only request preconditions, provider failures and configuration problems
//! surface as errors. Everything downstream of extraction is recovered
//! locally and reported inside [`crate::GenerationResult`].

use std::path::PathBuf;

use blocksmith_schema::FieldTypeTag;

/// One violated request precondition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionViolation {
    /// No manifest attached to the request
    #[error("no schema manifest supplied")]
    MissingManifest,

    /// Attached manifest fails structural validation
    #[error("schema manifest is invalid: {0}")]
    InvalidManifest(String),

    /// Topic is empty or whitespace
    #[error("topic is empty")]
    EmptyTopic,

    /// No non-blank keyword
    #[error("keyword list is empty")]
    EmptyKeywords,

    /// Selected block type is not in the manifest
    #[error("selected block type '{0}' is not in the manifest")]
    UnknownBlockType(String),
}

/// Request rejected before any provider or pipeline work
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Every violated precondition, in check order
    #[error("request rejected: {}", join_violations(.0))]
    Preconditions(Vec<PreconditionViolation>),
}

impl RequestError {
    /// Violated preconditions
    #[must_use]
    pub fn violations(&self) -> &[PreconditionViolation] {
        match self {
            Self::Preconditions(violations) => violations,
        }
    }
}

fn join_violations(violations: &[PreconditionViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure of the generation provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Connection or protocol failure
    #[error("transport error: {0}")]
    Transport(String),

    /// No reply within the configured time
    #[error("provider timed out after {seconds}s")]
    Timeout {
        /// Configured timeout
        seconds: u64,
    },

    /// Non-success HTTP status
    #[error("provider returned http {status}: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },
}

/// Errors from [`crate::Generator::generate`]
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Preconditions failed
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Provider call failed
    #[error("provider failed: {0}")]
    Provider(#[from] ProviderError),

    /// Prompt could not be built
    #[error("prompt construction failed: {0}")]
    Prompt(String),
}

/// The fallback document could not be produced
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackError {
    /// Manifest has no mandatory block type to fall back to
    #[error("manifest declares no mandatory block type")]
    NoMandatoryType,

    /// A required field has a type no placeholder can satisfy
    #[error("cannot synthesize required field '{field}' of type {tag}")]
    Unsynthesizable {
        /// Field name
        field: String,
        /// Declared type
        tag: FieldTypeTag,
    },

    /// Synthesized block failed validation
    #[error("fallback block is not compliant: {0}")]
    NonCompliant(String),
}

/// Pipeline configuration could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid TOML for the config
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    /// Create I/O error with path context
    #[must_use]
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
