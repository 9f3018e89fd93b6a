//! Speechify text-to-speech provider
//!
//! The `/v1/audio/speech` endpoint returns base64 audio in a JSON envelope
//! and accepts at most 2,000 characters per request (markup included).
//! `/v1/audio/stream` returns raw audio bytes as they are produced.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TtsError};
use crate::format::AudioFormat;
use crate::provider::{AudioStream, SpeechProvider, SpeechRequest};

const DEFAULT_BASE_URL: &str = "https://api.sws.speechify.com";

/// Provider for the Speechify API
pub struct SpeechifyProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl SpeechifyProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self> {
        let client = Client::builder().build().map_err(|e| TtsError::ApiError {
            message: format!("Failed to build HTTP client: {}", e),
            status_code: None,
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        accept: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", accept)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| TtsError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ApiError {
                message: error_message(&error_text),
                status_code: Some(status.as_u16()),
            });
        }

        Ok(response)
    }
}

// Speechify API request/response types

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    input: &'a str,
    voice_id: &'a str,
    audio_format: AudioFormat,
}

#[derive(Debug, Serialize)]
struct StreamBody<'a> {
    input: &'a str,
    voice_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct SpeechResponse {
    audio_data: String,
    #[serde(default)]
    audio_format: Option<String>,
    #[serde(default)]
    billable_characters_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(alias = "error")]
    message: String,
}

/// Pull the human-readable message out of an error body, if it is JSON
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string())
}

fn decode_audio(response: SpeechResponse) -> Result<Vec<u8>> {
    if let Some(chars) = response.billable_characters_count {
        log::debug!(
            "Speechify returned {} audio, {} billable characters",
            response.audio_format.as_deref().unwrap_or("unknown"),
            chars
        );
    }

    let audio = BASE64
        .decode(response.audio_data.trim())
        .map_err(|e| TtsError::InvalidAudio(format!("audio_data is not base64: {}", e)))?;

    if audio.is_empty() {
        return Err(TtsError::InvalidAudio("empty audio_data".to_string()));
    }

    Ok(audio)
}

#[async_trait]
impl SpeechProvider for SpeechifyProvider {
    async fn generate(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let body = SpeechBody {
            input: &request.input,
            voice_id: &request.voice_id,
            audio_format: request.format,
        };

        let response = self.post("/v1/audio/speech", "application/json", &body).await?;

        let parsed: SpeechResponse = response.json().await.map_err(|e| {
            TtsError::InvalidAudio(format!("Failed to parse speech response: {}", e))
        })?;

        decode_audio(parsed)
    }

    async fn stream(&self, request: &SpeechRequest) -> Result<AudioStream> {
        if !request.format.supports_streaming() {
            return Err(TtsError::StreamingUnsupported(request.format));
        }

        let body = StreamBody {
            input: &request.input,
            voice_id: &request.voice_id,
        };

        let response = self
            .post("/v1/audio/stream", request.format.mime_type(), &body)
            .await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| TtsError::Stream(e.to_string()))
            })
            .boxed())
    }

    fn name(&self) -> &'static str {
        "Speechify"
    }

    fn is_available(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(TtsError::MissingApiKey {
                provider: "Speechify".to_string(),
                env_var: "SPEECHIFY_API_KEY".to_string(),
            });
        }
        Ok(())
    }
}
