//! Error types for the podcast pipeline.

use llm_client::LlmError;
use thiserror::Error;
use tts_client::TtsError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, PodcastError>;

/// Errors surfaced by the conversation-to-audio pipeline.
#[derive(Error, Debug)]
pub enum PodcastError {
    /// Malformed or missing input (empty conversation, empty turn text, too few files)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The speech service failed or returned unusable audio
    #[error("Speech synthesis failed for {context}: {source}")]
    Synthesis {
        context: String,
        #[source]
        source: TtsError,
    },

    /// The external concatenation tool exited abnormally
    #[error("Audio concatenation failed: {0}")]
    Concatenation(String),

    /// The generative text provider answered with something that is not a turn array
    #[error("Could not parse generated conversation: {0}")]
    GenerationParse(String),

    /// The generative text provider could not be reached or refused the request
    #[error("Conversation generation failed: {0}")]
    Generation(#[from] LlmError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PodcastError {
    /// HTTP status code a service boundary should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            PodcastError::Validation(_) => 400,
            PodcastError::GenerationParse(_) => 502,
            PodcastError::Generation(LlmError::MissingApiKey { .. }) => 503,
            _ => 500,
        }
    }

    pub(crate) fn synthesis(context: impl Into<String>, source: TtsError) -> Self {
        PodcastError::Synthesis {
            context: context.into(),
            source,
        }
    }
}
