//! Pipeline orchestrator
//!
//! One forward pass per reply:
//!
//! ```text
//! Extracting ─→ Repairing ─→ Validating ─┬─→ Done(compliant)
//!                                        ├─→ Done(fallback)   policy = fallback
//!                                        └─→ Done(failed)     policy = fail
//! ```
//!
//! No state is re-entered and nothing is retried. Every input, including an
//! empty string, ends in a compliant non-empty document or a typed failure.

use std::collections::BTreeSet;
use std::fmt;

use blocksmith_extract::{extract_blocks, StrategyCascade};
use blocksmith_repair::{DocumentRepairer, RepairEvent};
use blocksmith_schema::{ComplianceValidator, KeyMint, SchemaManifest, ValidationWarning};
use rand::RngCore;

use crate::config::{NonCompliancePolicy, PipelineConfig};
use crate::fallback::FallbackBuilder;
use crate::types::{GenerationFailure, GenerationOrigin, GenerationResult, GenerationSuccess, TokenUsage};

/// Failure reason when nothing survives extraction and repair
pub const NOTHING_RECOVERED: &str = "no content blocks could be recovered";

/// Orchestrator states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Recovering a payload from the raw reply
    Extracting,
    /// Coercing and repairing blocks
    Repairing,
    /// Checking the repaired document
    Validating,
    /// Compliant output
    Compliant,
    /// Fallback document emitted
    Fallback,
    /// Typed failure
    Failed,
}

impl PipelineState {
    /// Whether the pass has finished
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Compliant | Self::Fallback | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Extracting => "extracting",
            Self::Repairing => "repairing",
            Self::Validating => "validating",
            Self::Compliant => "done(compliant)",
            Self::Fallback => "done(fallback)",
            Self::Failed => "done(failed)",
        };
        f.write_str(name)
    }
}

/// Single-pass orchestrator over one manifest snapshot
#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    manifest: &'a SchemaManifest,
    config: &'a PipelineConfig,
    cascade: Option<&'a StrategyCascade>,
    selected: Option<BTreeSet<String>>,
}

impl<'a> Pipeline<'a> {
    /// Create pipeline
    #[must_use]
    pub fn new(manifest: &'a SchemaManifest, config: &'a PipelineConfig) -> Self {
        Self {
            manifest,
            config,
            cascade: None,
            selected: None,
        }
    }

    /// Optional block types the request asked for
    #[must_use]
    pub fn with_selected_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Use a custom extraction cascade instead of the built-in one
    #[must_use]
    pub fn with_cascade(mut self, cascade: &'a StrategyCascade) -> Self {
        self.cascade = Some(cascade);
        self
    }

    /// Run extraction, repair and validation over a raw reply
    ///
    /// `usage` is passed through into a successful result. Keys and
    /// vocabulary selections are drawn from `rng`.
    pub fn run(&self, raw_text: &str, usage: TokenUsage, rng: &mut dyn RngCore) -> GenerationResult {
        let mut state = PipelineState::Extracting;
        tracing::info!(state = %state, chars = raw_text.len(), "pipeline started");

        let extraction = match self.cascade {
            Some(cascade) => cascade.extract(raw_text),
            None => extract_blocks(raw_text),
        };
        state = self.advance(state, PipelineState::Repairing);

        let mut repairer = DocumentRepairer::new(self.manifest).with_value_limit(self.config.log_value_limit);
        if let Some(selected) = self.selected.as_ref().filter(|_| self.config.drop_unselected_blocks) {
            repairer = repairer.with_selected_types(selected.iter().cloned());
        }
        let outcome = repairer.repair(&extraction.blocks, rng);
        let repairs = outcome.log.into_events();
        state = self.advance(state, PipelineState::Validating);

        let report = ComplianceValidator::new(self.manifest).validate_blocks(&outcome.blocks);
        let result = if !outcome.blocks.is_empty() && report.compliant {
            GenerationResult::Success(GenerationSuccess {
                blocks: outcome.blocks,
                usage,
                origin: GenerationOrigin::Generated,
                repairs,
                warnings: Vec::new(),
            })
        } else {
            let reason = if outcome.blocks.is_empty() {
                NOTHING_RECOVERED.to_string()
            } else {
                report.summary()
            };
            self.non_compliant(reason, report.warnings, repairs, usage, rng)
        };

        let done = match &result {
            GenerationResult::Success(GenerationSuccess {
                origin: GenerationOrigin::Generated,
                ..
            }) => PipelineState::Compliant,
            GenerationResult::Success(_) => PipelineState::Fallback,
            GenerationResult::Failure(_) => PipelineState::Failed,
        };
        self.advance(state, done);
        metrics::counter!("blocksmith_generation_total", "outcome" => result.outcome()).increment(1);
        result
    }

    fn non_compliant(
        &self,
        reason: String,
        warnings: Vec<ValidationWarning>,
        repairs: Vec<RepairEvent>,
        usage: TokenUsage,
        rng: &mut dyn RngCore,
    ) -> GenerationResult {
        tracing::warn!(warnings = warnings.len(), %reason, "output is not compliant");
        if self.config.non_compliance_policy == NonCompliancePolicy::Fail {
            return GenerationResult::Failure(GenerationFailure {
                reason,
                warnings,
                repairs,
            });
        }

        let mut keys = KeyMint::new(rng);
        match FallbackBuilder::new(self.manifest, &self.config.fallback).build(&mut keys) {
            Ok(block) => GenerationResult::Success(GenerationSuccess {
                blocks: vec![block],
                usage,
                origin: GenerationOrigin::Fallback,
                repairs,
                warnings,
            }),
            Err(e) => GenerationResult::Failure(GenerationFailure {
                reason: format!("{reason}; fallback unavailable: {e}"),
                warnings,
                repairs,
            }),
        }
    }

    fn advance(&self, from: PipelineState, to: PipelineState) -> PipelineState {
        debug_assert!(!from.is_terminal());
        tracing::info!(from = %from, to = %to, manifest = %self.manifest.version, "pipeline transition");
        to
    }
}
