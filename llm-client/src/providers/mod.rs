//! Concrete generative text providers

mod gemini;
mod mock;

pub use gemini::GeminiProvider;
pub use mock::MockProvider;

use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;

/// Create a provider by name, reading its API key from `api_key_env`.
///
/// Returns `LlmError::MissingApiKey` when the variable is unset or empty so
/// callers can tell "not configured" apart from other failures.
pub fn get_provider(
    provider: &str,
    model: &str,
    api_key_env: &str,
    base_url: Option<&str>,
) -> Result<Box<dyn LlmProvider>> {
    match provider {
        "gemini" => {
            let api_key = read_api_key("Gemini", api_key_env)?;
            let provider = match base_url {
                Some(url) => GeminiProvider::with_base_url(model, api_key, url)?,
                None => GeminiProvider::new(model, api_key)?,
            };
            Ok(Box::new(provider))
        }
        _ => Err(LlmError::InvalidProvider(format!(
            "{}. Available: gemini",
            provider
        ))),
    }
}

fn read_api_key(provider: &str, env_var: &str) -> Result<String> {
    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(LlmError::MissingApiKey {
            provider: provider.to_string(),
            env_var: env_var.to_string(),
        }),
    }
}
