//! Pipeline configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What to do when repaired output is still not compliant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonCompliancePolicy {
    /// Return a typed failure carrying the warnings
    #[default]
    Fail,
    /// Return a synthesized single-block fallback document
    Fallback,
}

/// In-band text of the fallback document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackText {
    /// Used for the first text field of the fallback block
    pub headline: String,
    /// Used for every further text field
    pub body: String,
}

impl Default for FallbackText {
    fn default() -> Self {
        Self {
            headline: "We couldn't prepare this page".to_string(),
            body: "Something went wrong while generating this content. Please try again shortly."
                .to_string(),
        }
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Policy for post-repair non-compliance
    pub non_compliance_policy: NonCompliancePolicy,
    /// Fallback document text
    pub fallback: FallbackText,
    /// Timeout around the provider call, in seconds
    pub provider_timeout_secs: u64,
    /// Max characters of a value rendered into a repair log line
    pub log_value_limit: usize,
    /// Drop optional blocks the request did not select
    pub drop_unselected_blocks: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            non_compliance_policy: NonCompliancePolicy::Fail,
            fallback: FallbackText::default(),
            provider_timeout_secs: 120,
            log_value_limit: blocksmith_repair::DEFAULT_VALUE_LIMIT,
            drop_unselected_blocks: true,
        }
    }
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With non-compliance policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: NonCompliancePolicy) -> Self {
        self.non_compliance_policy = policy;
        self
    }

    /// With fallback text
    #[must_use]
    pub fn with_fallback_text(mut self, headline: impl Into<String>, body: impl Into<String>) -> Self {
        self.fallback = FallbackText {
            headline: headline.into(),
            body: body.into(),
        };
        self
    }

    /// With provider timeout
    #[inline]
    #[must_use]
    pub fn with_provider_timeout(mut self, seconds: u64) -> Self {
        self.provider_timeout_secs = seconds;
        self
    }

    /// With unselected-block dropping on or off
    #[inline]
    #[must_use]
    pub fn with_drop_unselected_blocks(mut self, drop: bool) -> Self {
        self.drop_unselected_blocks = drop;
        self
    }

    /// Provider timeout as a duration
    #[inline]
    #[must_use]
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// Parse TOML; missing keys take their defaults
    ///
    /// # Errors
    /// Returns error on malformed TOML or mistyped values
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load TOML config file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(
            path = %path.display(),
            policy = ?config.non_compliance_policy,
            "loaded pipeline config"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(PipelineConfig::from_toml_str("").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn toml_overrides() {
        let config = PipelineConfig::from_toml_str(
            r#"
            non_compliance_policy = "fallback"
            provider_timeout_secs = 30

            [fallback]
            headline = "Temporarily unavailable"
            "#,
        )
        .unwrap();
        assert_eq!(config.non_compliance_policy, NonCompliancePolicy::Fallback);
        assert_eq!(config.provider_timeout(), Duration::from_secs(30));
        assert_eq!(config.fallback.headline, "Temporarily unavailable");
        assert_eq!(config.fallback.body, FallbackText::default().body);
        assert!(config.drop_unselected_blocks);
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(PipelineConfig::from_toml_str("non_compliance_policy = \"retry\"").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let error = PipelineConfig::load("/nonexistent/pipeline.toml").unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }
}
