use thiserror::Error;

use crate::format::AudioFormat;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Errors produced by speech providers
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Speech API error{}: {message}", status_suffix(.status_code))]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Missing API key for {provider}: set the {env_var} environment variable")]
    MissingApiKey { provider: String, env_var: String },

    #[error("Unknown speech provider: {0}")]
    InvalidProvider(String),

    #[error("Invalid audio data: {0}")]
    InvalidAudio(String),

    #[error("Streaming is not supported for {0} output")]
    StreamingUnsupported(AudioFormat),

    #[error("Audio stream interrupted: {0}")]
    Stream(String),
}

fn status_suffix(status_code: &Option<u16>) -> String {
    status_code.map(|c| format!(" ({})", c)).unwrap_or_default()
}
