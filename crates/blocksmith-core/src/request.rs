//! Generation requests and their preconditions

use std::sync::Arc;

use blocksmith_schema::SchemaManifest;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{PreconditionViolation, RequestError};

/// Target length of the generated copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthBucket {
    /// A few sentences per block
    Short,
    /// A paragraph or two per block
    #[default]
    Medium,
    /// Several paragraphs per block
    Long,
}

impl LengthBucket {
    /// Lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl std::fmt::Display for LengthBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one generation
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Request id, used as the logging span field
    pub id: Ulid,
    /// Page topic
    pub topic: String,
    /// Keywords to work into the copy
    pub keywords: Vec<String>,
    /// Voice of the copy
    pub tone: String,
    /// Length bucket
    pub length: LengthBucket,
    /// Optional block types to include
    pub selected_blocks: Vec<String>,
    /// Manifest snapshot for this request
    pub manifest: Option<Arc<SchemaManifest>>,
}

impl GenerationRequest {
    /// Create request for a topic
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            id: Ulid::new(),
            topic: topic.into(),
            keywords: Vec::new(),
            tone: "neutral".to_string(),
            length: LengthBucket::default(),
            selected_blocks: Vec::new(),
            manifest: None,
        }
    }

    /// With keywords
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// With tone
    #[must_use]
    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    /// With length bucket
    #[inline]
    #[must_use]
    pub fn with_length(mut self, length: LengthBucket) -> Self {
        self.length = length;
        self
    }

    /// With selected optional block types
    #[must_use]
    pub fn with_selected_blocks<I, S>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_blocks = blocks.into_iter().map(Into::into).collect();
        self
    }

    /// With manifest snapshot
    #[must_use]
    pub fn with_manifest(mut self, manifest: Arc<SchemaManifest>) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Check every precondition and return the manifest to use
    ///
    /// # Errors
    /// Returns [`RequestError::Preconditions`] listing every violation
    pub fn check(&self) -> Result<Arc<SchemaManifest>, RequestError> {
        let mut violations = Vec::new();

        let manifest = match &self.manifest {
            None => {
                violations.push(PreconditionViolation::MissingManifest);
                None
            }
            Some(manifest) => match manifest.problems() {
                problems if problems.is_empty() => Some(manifest),
                problems => {
                    violations.push(PreconditionViolation::InvalidManifest(problems.join("; ")));
                    None
                }
            },
        };

        if self.topic.trim().is_empty() {
            violations.push(PreconditionViolation::EmptyTopic);
        }
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            violations.push(PreconditionViolation::EmptyKeywords);
        }
        if let Some(manifest) = manifest {
            for selected in &self.selected_blocks {
                if !manifest.contains(selected) {
                    violations.push(PreconditionViolation::UnknownBlockType(selected.clone()));
                }
            }
        }

        match manifest {
            Some(manifest) if violations.is_empty() => Ok(Arc::clone(manifest)),
            _ => {
                tracing::warn!(request_id = %self.id, violations = violations.len(), "request rejected");
                Err(RequestError::Preconditions(violations))
            }
        }
    }
}
