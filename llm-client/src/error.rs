use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors produced by generative text providers
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("API error{}: {message}", status_suffix(.status_code))]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Server overloaded: {message}")]
    ServerOverloaded { message: String },

    #[error("Missing API key for {provider}: set the {env_var} environment variable")]
    MissingApiKey { provider: String, env_var: String },

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Unknown provider: {0}")]
    InvalidProvider(String),

    #[error("Failed to parse provider response: {0}")]
    ParseError(String),
}

fn status_suffix(status_code: &Option<u16>) -> String {
    status_code.map(|c| format!(" ({})", c)).unwrap_or_default()
}

impl LlmError {
    /// Whether retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::ServerOverloaded { .. } => true,
            LlmError::ApiError {
                status_code: Some(code),
                ..
            } => *code == 429 || *code >= 500,
            LlmError::ApiError {
                status_code: None, ..
            } => true,
            _ => false,
        }
    }
}
