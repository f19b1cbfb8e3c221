//! Mock AI Provider for testing.
//!
//! Scripted implementation of the AIProvider port so workflows can run
//! without calling a hosted model.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in call order
//! - Empty-content responses
//! - Error injection for resilience testing
//! - Simulated delays
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response(r#"{"emotionalState": "calm", "riskLevel": 1}"#)
//!     .with_error(MockError::Unavailable { message: "down".into() });
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a completion; `None` content models a provider that returned
    /// no choices.
    Success {
        content: Option<String>,
        finish_reason: FinishReason,
    },
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<MockResponse>> {
        self.responses.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn call_log(&self) -> MutexGuard<'_, Vec<CompletionRequest>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.queue().push_back(MockResponse::Success {
            content: Some(content.into()),
            finish_reason: FinishReason::Stop,
        });
        self
    }

    /// Adds a response without content.
    pub fn with_empty_response(self) -> Self {
        self.queue().push_back(MockResponse::Success {
            content: None,
            finish_reason: FinishReason::Stop,
        });
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.queue().push_back(MockResponse::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.call_log().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.call_log().clone()
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining_responses(&self) -> usize {
        self.queue().len()
    }

    fn next_response(&self) -> MockResponse {
        self.queue()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: Some("Mock response".to_string()),
                finish_reason: FinishReason::Stop,
            })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.info.model.clone());
        self.call_log().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success {
                content,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage: TokenUsage::new(10, 20),
                model,
                finish_reason,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MessageRole, RequestMetadata};

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new("trace-1")).with_message(MessageRole::User, prompt)
    }

    #[tokio::test]
    async fn returns_responses_in_order() {
        let provider = MockAIProvider::new().with_response("one").with_response("two");

        let first = provider.complete(request("a")).await.unwrap();
        let second = provider.complete(request("b")).await.unwrap();

        assert_eq!(first.content.as_deref(), Some("one"));
        assert_eq!(second.content.as_deref(), Some("two"));
        assert_eq!(provider.remaining_responses(), 0);
    }

    #[tokio::test]
    async fn falls_back_to_default_response() {
        let provider = MockAIProvider::new();
        let response = provider.complete(request("a")).await.unwrap();
        assert_eq!(response.content.as_deref(), Some("Mock response"));
    }

    #[tokio::test]
    async fn empty_response_has_no_content() {
        let provider = MockAIProvider::new().with_empty_response();
        let response = provider.complete(request("a")).await.unwrap();
        assert!(response.content.is_none());
    }

    #[tokio::test]
    async fn injected_errors_are_returned() {
        let provider = MockAIProvider::new().with_error(MockError::AuthenticationFailed);
        let err = provider.complete(request("a")).await.unwrap_err();
        assert!(matches!(err, AIError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn records_calls_and_echoes_requested_model() {
        let provider = MockAIProvider::new().with_response("ok");
        let response = provider
            .complete(request("hello").with_model("llama3-70b-8192"))
            .await
            .unwrap();

        assert_eq!(response.model, "llama3-70b-8192");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.get_calls()[0].last_user_message(), Some("hello"));
    }

    #[tokio::test]
    async fn clones_share_script_and_history() {
        let provider = MockAIProvider::new().with_response("shared");
        let clone = provider.clone();

        clone.complete(request("a")).await.unwrap();

        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.remaining_responses(), 0);
    }
}
