//! Provider trait and request/response types

use async_trait::async_trait;

use crate::error::Result;

/// A single completion request
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// Request with only a user prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// Token accounting reported by the provider, when available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Free-form text answer from a provider
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Generative text capability - all providers implement this
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a prompt and await the complete text reply
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse>;

    /// Human-readable provider name
    fn name(&self) -> &'static str;

    /// Check that the provider can be used (credentials present, etc.)
    fn is_available(&self) -> Result<()>;
}
