use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use std::sync::Mutex;

use crate::error::{Result, TtsError};
use crate::provider::{AudioStream, SpeechProvider, SpeechRequest};

/// Deterministic in-memory speech provider for tests.
///
/// Each request yields the bytes of `[voice_id:input]`, so concatenated
/// output shows exactly which requests were made and in what order.
pub struct MockSpeechProvider {
    requests: Mutex<Vec<SpeechRequest>>,
    fail_on_call: Option<usize>,
    break_stream_after: Option<usize>,
}

impl MockSpeechProvider {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_on_call: None,
            break_stream_after: None,
        }
    }

    /// Fail the `call`-th request (1-based) with an API error
    pub fn failing_on_call(call: usize) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_on_call: Some(call),
            break_stream_after: None,
        }
    }

    /// Streams yield `chunks` chunks of audio, then a stream error
    pub fn breaking_stream_after(chunks: usize) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_on_call: None,
            break_stream_after: Some(chunks),
        }
    }

    /// Audio bytes the mock produces for a request
    pub fn audio_for(request: &SpeechRequest) -> Vec<u8> {
        format!("[{}:{}]", request.voice_id, request.input).into_bytes()
    }

    /// Requests received so far, in call order
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, request: &SpeechRequest) -> Result<()> {
        let call = match self.requests.lock() {
            Ok(mut requests) => {
                requests.push(request.clone());
                requests.len()
            }
            Err(_) => 0,
        };

        if self.fail_on_call == Some(call) {
            return Err(TtsError::ApiError {
                message: format!("mock failure on call {}", call),
                status_code: Some(500),
            });
        }
        Ok(())
    }
}

impl Default for MockSpeechProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    async fn generate(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        self.record(request)?;
        Ok(Self::audio_for(request))
    }

    async fn stream(&self, request: &SpeechRequest) -> Result<AudioStream> {
        if !request.format.supports_streaming() {
            return Err(TtsError::StreamingUnsupported(request.format));
        }
        self.record(request)?;

        let mut chunks: Vec<Result<Vec<u8>>> = Self::audio_for(request)
            .chunks(4)
            .map(|c| Ok(c.to_vec()))
            .collect();
        if let Some(after) = self.break_stream_after {
            chunks.truncate(after);
            chunks.push(Err(TtsError::Stream("mock connection reset".to_string())));
        }
        Ok(stream::iter(chunks).boxed())
    }

    fn name(&self) -> &'static str {
        "Mock"
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}
