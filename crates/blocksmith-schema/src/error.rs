//! Error types for manifest loading
//!
//! The manifest is operator-supplied configuration, so loading reports every
//! structural problem at once instead of stopping at the first one.

use std::path::PathBuf;

/// Errors while loading or checking a [`SchemaManifest`](crate::SchemaManifest)
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid JSON
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Manifest is not valid YAML
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// No loader for file extension
    #[error("unsupported manifest extension: '{0}'")]
    UnsupportedExtension(String),

    /// Manifest parsed but violates structural invariants
    #[error("invalid manifest: {}", .problems.join("; "))]
    Invalid { problems: Vec<String> },
}

impl ManifestError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Structural problems, if this is an `Invalid` error
    #[must_use]
    pub fn problems(&self) -> &[String] {
        match self {
            Self::Invalid { problems } => problems,
            _ => &[],
        }
    }
}

/// Result type alias for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;
