//! Provider trait and request types

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::Result;
use crate::format::AudioFormat;

/// Live audio bytes from a streaming synthesis call
pub type AudioStream = BoxStream<'static, Result<Vec<u8>>>;

/// One synthesis request: text (plain or speech markup) spoken by one voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub input: String,
    pub voice_id: String,
    pub format: AudioFormat,
}

impl SpeechRequest {
    pub fn new(input: impl Into<String>, voice_id: impl Into<String>, format: AudioFormat) -> Self {
        Self {
            input: input.into(),
            voice_id: voice_id.into(),
            format,
        }
    }
}

/// Speech synthesis capability - all TTS services implement this
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize the whole request and return the encoded audio
    async fn generate(&self, request: &SpeechRequest) -> Result<Vec<u8>>;

    /// Open a streaming synthesis call; bytes arrive as the service produces them
    async fn stream(&self, request: &SpeechRequest) -> Result<AudioStream>;

    /// Provider name
    fn name(&self) -> &'static str;

    /// Check that the provider can be used (credentials present, etc.)
    fn is_available(&self) -> Result<()>;
}
