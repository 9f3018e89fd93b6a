//! Concrete speech providers

mod mock;
mod speechify;

pub use mock::MockSpeechProvider;
pub use speechify::SpeechifyProvider;

use crate::error::{Result, TtsError};
use crate::provider::SpeechProvider;

/// Create a speech provider by name, reading its API key from `api_key_env`
pub fn get_provider(
    provider: &str,
    api_key_env: &str,
    base_url: Option<&str>,
) -> Result<Box<dyn SpeechProvider>> {
    match provider {
        "speechify" => {
            let api_key = match std::env::var(api_key_env) {
                Ok(key) if !key.trim().is_empty() => key,
                _ => {
                    return Err(TtsError::MissingApiKey {
                        provider: "Speechify".to_string(),
                        env_var: api_key_env.to_string(),
                    });
                }
            };
            let provider = match base_url {
                Some(url) => SpeechifyProvider::with_base_url(api_key, url)?,
                None => SpeechifyProvider::new(api_key)?,
            };
            Ok(Box::new(provider))
        }
        _ => Err(TtsError::InvalidProvider(format!(
            "{}. Available: speechify",
            provider
        ))),
    }
}
