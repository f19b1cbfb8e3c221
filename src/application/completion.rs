//! CompletionClient - single-turn prompt in, text out.
//!
//! Every model-calling step goes through this adapter so the call contract is
//! identical across workflows: one user message, trimmed text back, empty
//! string when the provider produced no content, `AIError` on failure.

use std::sync::Arc;
use std::time::Instant;

use crate::ports::{AIError, AIProvider, CompletionRequest, MessageRole, RequestMetadata};

/// Uniform completion contract over an `AIProvider`.
pub struct CompletionClient {
    provider: Arc<dyn AIProvider>,
    default_model: String,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn AIProvider>, default_model: impl Into<String>) -> Self {
        Self {
            provider,
            default_model: default_model.into(),
        }
    }

    /// Uses the provider's own default model.
    pub fn with_provider_default(provider: Arc<dyn AIProvider>) -> Self {
        let model = provider.provider_info().model;
        Self::new(provider, model)
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Sends `prompt` to `model` and returns the trimmed reply.
    pub async fn complete(&self, model: &str, prompt: &str) -> Result<String, AIError> {
        let metadata = RequestMetadata::new(uuid::Uuid::new_v4().to_string());
        self.send(model, prompt, metadata).await
    }

    /// Sends `prompt` to the default model, tagging the request with the
    /// calling workflow step.
    pub async fn complete_for(
        &self,
        prompt: &str,
        metadata: RequestMetadata,
    ) -> Result<String, AIError> {
        self.send(&self.default_model, prompt, metadata).await
    }

    async fn send(
        &self,
        model: &str,
        prompt: &str,
        metadata: RequestMetadata,
    ) -> Result<String, AIError> {
        let trace_id = metadata.trace_id.clone();
        let step = metadata.step.clone().unwrap_or_default();
        let request = CompletionRequest::new(metadata)
            .with_model(model)
            .with_message(MessageRole::User, prompt);

        let started = Instant::now();
        match self.provider.complete(request).await {
            Ok(response) => {
                let content = response
                    .content
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string();
                tracing::debug!(
                    trace_id = %trace_id,
                    step = %step,
                    model = %response.model,
                    total_tokens = response.usage.total_tokens,
                    latency_ms = started.elapsed().as_millis() as u64,
                    empty = content.is_empty(),
                    "Completion received"
                );
                Ok(content)
            }
            Err(error) => {
                tracing::error!(
                    trace_id = %trace_id,
                    step = %step,
                    model = %model,
                    latency_ms = started.elapsed().as_millis() as u64,
                    error = %error,
                    "Completion failed"
                );
                Err(error)
            }
        }
    }
}
