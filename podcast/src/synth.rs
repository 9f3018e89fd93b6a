//! Speech synthesis client: chunked request/response and live streaming.

use futures_util::StreamExt;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tts_client::{AudioFormat, SpeechProvider, SpeechRequest};

use crate::chunk::{CHAR_LIMIT, chunk_text};
use crate::error::{PodcastError, Result};

/// Converts text or speech markup into audio through a `SpeechProvider`
#[derive(Clone)]
pub struct SynthesisClient {
    provider: Arc<dyn SpeechProvider>,
    char_limit: usize,
}

impl SynthesisClient {
    pub fn new(provider: Arc<dyn SpeechProvider>) -> Self {
        Self {
            provider,
            char_limit: CHAR_LIMIT,
        }
    }

    /// Override the per-request character ceiling
    pub fn with_char_limit(mut self, char_limit: usize) -> Self {
        self.char_limit = char_limit.max(1);
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Synthesize `text` into one audio buffer.
    ///
    /// The text is split into chunks under the provider's ceiling and each
    /// chunk is synthesized in order; the buffers are joined in chunk order.
    /// Any failing chunk fails the whole call and earlier audio is dropped.
    ///
    /// The split is fixed-width and knows nothing about markup. Speech markup
    /// longer than the ceiling is cut into fragments that may open a tag or an
    /// entity in one request and close it in the next, so keep each turn's
    /// markup under `CHAR_LIMIT` to have it read as markup.
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        format: AudioFormat,
    ) -> Result<Vec<u8>> {
        let chunks = chunk_text(text, self.char_limit);
        let mut buffers = Vec::with_capacity(chunks.len());

        for (i, chunk) in chunks.iter().enumerate() {
            log::debug!(
                "Synthesizing chunk {}/{} ({} chars) with voice {}",
                i + 1,
                chunks.len(),
                chunk.chars().count(),
                voice_id
            );

            let request = SpeechRequest::new(*chunk, voice_id, format);
            let audio = self.provider.generate(&request).await.map_err(|e| {
                PodcastError::synthesis(format!("chunk {} of {}", i + 1, chunks.len()), e)
            })?;
            buffers.push(audio);
        }

        Ok(buffers.concat())
    }

    /// Stream synthesized audio for the whole text into `sink` as it arrives.
    ///
    /// No chunking is applied and the audio is never held in memory as a
    /// whole. Returns the number of bytes written.
    pub async fn stream_to<W>(
        &self,
        text: &str,
        voice_id: &str,
        format: AudioFormat,
        sink: &mut W,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if !format.supports_streaming() {
            return Err(PodcastError::Validation(format!(
                "streaming supports mp3, ogg and aac, not {}",
                format
            )));
        }
        if text.trim().is_empty() {
            return Err(PodcastError::Validation("text must not be empty".to_string()));
        }

        let request = SpeechRequest::new(text, voice_id, format);
        let mut stream = self
            .provider
            .stream(&request)
            .await
            .map_err(|e| PodcastError::synthesis("stream", e))?;

        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| PodcastError::synthesis("stream", e))?;
            sink.write_all(&bytes).await?;
            written += bytes.len() as u64;
        }
        sink.flush().await?;

        log::debug!("Streamed {} bytes with voice {}", written, voice_id);
        Ok(written)
    }
}
