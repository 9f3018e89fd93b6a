use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

/// Provider with canned replies, for tests of code built on `LlmProvider`.
///
/// Queued replies are returned first, in order; after that every call gets
/// the fallback reply. Records every prompt it receives.
pub struct MockProvider {
    queued: Mutex<VecDeque<Result<String>>>,
    fallback: Result<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    fn with_fallback(fallback: Result<String>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `content`
    pub fn always_succeeds(content: &str) -> Self {
        Self::with_fallback(Ok(content.to_string()))
    }

    /// Fail every call with `error`
    pub fn always_fails(error: LlmError) -> Self {
        Self::with_fallback(Err(error))
    }

    /// Fail the first `times` calls with `error`, then answer with `content`
    pub fn fails_then_succeeds(error: LlmError, times: usize, content: &str) -> Self {
        let provider = Self::always_succeeds(content);
        if let Ok(mut queued) = provider.queued.lock() {
            queued.extend(std::iter::repeat_n(Err(error), times));
        }
        provider
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn next_reply(&self) -> Result<String> {
        self.queued
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }

        self.next_reply().map(|content| LlmResponse {
            content,
            model: "mock".to_string(),
            usage: None,
        })
    }

    fn name(&self) -> &'static str {
        "Mock"
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}
