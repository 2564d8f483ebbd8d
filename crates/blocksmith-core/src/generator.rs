//! Async generation entry point
//!
//! ```text
//! request ─→ preconditions ─→ prompt ─→ provider (timeout) ─→ pipeline ─→ result
//! ```
//!
//! Precondition, prompt and provider failures are returned as
//! [`GenerateError`] before any extraction work. Everything after the
//! provider reply resolves to a [`GenerationResult`].

use std::sync::Arc;

use rand::RngCore;
use tracing::Instrument;

use crate::config::PipelineConfig;
use crate::error::{GenerateError, ProviderError};
use crate::pipeline::Pipeline;
use crate::prompt::{ManifestPromptBuilder, PromptBuilder};
use crate::provider::CompletionProvider;
use crate::request::GenerationRequest;
use crate::types::GenerationResult;

/// Drives one request from preconditions to a typed result
#[derive(Clone)]
pub struct Generator {
    provider: Arc<dyn CompletionProvider>,
    prompts: Arc<dyn PromptBuilder>,
    config: PipelineConfig,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Generator {
    /// Create generator with the manifest-driven prompt builder
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>, config: PipelineConfig) -> Self {
        Self {
            provider,
            prompts: Arc::new(ManifestPromptBuilder),
            config,
        }
    }

    /// Replace the prompt builder
    #[must_use]
    pub fn with_prompt_builder(mut self, prompts: Arc<dyn PromptBuilder>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Pipeline configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generate content blocks for a request
    ///
    /// # Errors
    /// Returns [`GenerateError`] if preconditions fail, the prompt cannot be
    /// built, or the provider fails or times out
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<GenerationResult, GenerateError> {
        let span = tracing::info_span!("generation", request_id = %request.id);
        self.run(request, rng).instrument(span).await
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<GenerationResult, GenerateError> {
        let manifest = request.check()?;
        let prompt = self.prompts.build(request, &manifest)?;

        let timeout = self.config.provider_timeout();
        tracing::info!(provider = self.provider.name(), timeout_secs = timeout.as_secs(), "calling provider");
        let completion = match tokio::time::timeout(timeout, self.provider.complete(&prompt)).await {
            Ok(reply) => reply?,
            Err(_) => {
                return Err(ProviderError::Timeout {
                    seconds: self.config.provider_timeout_secs,
                }
                .into())
            }
        };

        let mut pipeline = Pipeline::new(&manifest, &self.config);
        // An empty selection means the caller did not restrict block types.
        if !request.selected_blocks.is_empty() {
            pipeline = pipeline.with_selected_types(request.selected_blocks.iter().cloned());
        }
        let result = pipeline.run(&completion.text, completion.usage, rng);
        tracing::info!(outcome = result.outcome(), "generation finished");
        Ok(result)
    }
}
