//! Completion providers
//!
//! The network client lives outside this crate. [`StaticProvider`] replays
//! a fixed reply for tests and offline repair.

use std::time::Duration;

use crate::error::ProviderError;
use crate::types::{Completion, TokenUsage};

/// Source of model replies
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Send a prompt and wait for the reply
    ///
    /// # Errors
    /// Returns [`ProviderError`] on transport, timeout or HTTP failure
    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError>;
}

/// Provider that always returns the same reply
#[derive(Debug, Clone)]
pub struct StaticProvider {
    reply: Result<Completion, ProviderError>,
    delay: Option<Duration>,
}

impl StaticProvider {
    /// Reply with `text`
    #[must_use]
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            reply: Ok(Completion::new(text, usage)),
            delay: None,
        }
    }

    /// Always fail with `error`
    #[must_use]
    pub fn failing(error: ProviderError) -> Self {
        Self {
            reply: Err(error),
            delay: None,
        }
    }

    /// Wait before replying
    #[inline]
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait::async_trait]
impl CompletionProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        tracing::debug!(provider = self.name(), prompt_chars = prompt.len(), "completion requested");
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}
