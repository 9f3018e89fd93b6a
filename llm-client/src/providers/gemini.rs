//! Google Gemini provider
//!
//! Talks to the `generateContent` REST endpoint directly.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Provider for the Gemini API
pub struct GeminiProvider {
    model: String,
    base_url: String,
    api_key: String,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider against the public endpoint
    pub fn new(model: &str, api_key: String) -> Result<Self> {
        Self::with_base_url(model, api_key, DEFAULT_BASE_URL)
    }

    /// Create a provider against a custom endpoint (proxies, test servers)
    pub fn with_base_url(model: &str, api_key: String, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::ProviderUnavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

// Gemini API request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn text_content(role: Option<&str>, text: &str) -> Content {
    Content {
        role: role.map(String::from),
        parts: vec![Part {
            text: Some(text.to_string()),
        }],
    }
}

fn build_request(request: &LlmRequest) -> GenerateContentRequest {
    let generation_config = if request.max_tokens.is_some() || request.temperature.is_some() {
        Some(GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
        })
    } else {
        None
    };

    GenerateContentRequest {
        contents: vec![text_content(Some("user"), &request.prompt)],
        system_instruction: request
            .system_prompt
            .as_deref()
            .map(|system| text_content(None, system)),
        generation_config,
    }
}

/// Join the text parts of the first candidate
fn first_candidate_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let body = build_request(&request);

        log::debug!("Gemini request to model {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error.message
                } else {
                    error_text
                };

            if status.as_u16() == 503 {
                return Err(LlmError::ServerOverloaded { message });
            }

            return Err(LlmError::ApiError {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let usage = parsed.usage_metadata.as_ref().map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        });

        Ok(LlmResponse {
            content: first_candidate_text(&parsed),
            model: self.model.clone(),
            usage,
        })
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn is_available(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::ProviderUnavailable(
                "Gemini API key is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider =
            GeminiProvider::with_base_url("gemini-1.5-flash", "key".into(), "http://localhost:9/")
                .unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_build_request_shape() {
        let request = LlmRequest {
            prompt: "Talk about bees".to_string(),
            system_prompt: Some("You write podcasts".to_string()),
            max_tokens: None,
            temperature: Some(0.7),
        };
        let json = serde_json::to_value(build_request(&request)).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Talk about bees");
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "You write podcasts"
        );
        assert!(json["systemInstruction"].get("role").is_none());
        assert!(json["generationConfig"].get("maxOutputTokens").is_none());
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_build_request_without_options() {
        let json = serde_json::to_value(build_request(&LlmRequest::new("hi"))).unwrap();
        assert!(json.get("systemInstruction").is_none());
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_first_candidate_text_joins_parts() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "[{\"speaker\":"}, {"text": "\"Lisa\"}]"}]}},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 34}
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_candidate_text(&parsed), r#"[{"speaker":"Lisa"}]"#);
        let usage = parsed.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, 12);
        assert_eq!(usage.candidates_token_count, 34);
    }

    #[test]
    fn test_first_candidate_text_empty() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(first_candidate_text(&parsed), "");
    }

    #[test]
    fn test_is_available_requires_a_key() {
        let provider = GeminiProvider::new("gemini-1.5-flash", "key".to_string()).unwrap();
        assert!(provider.is_available().is_ok());
        let blank = GeminiProvider::new("gemini-1.5-flash", String::new()).unwrap();
        assert!(matches!(
            blank.is_available(),
            Err(LlmError::ProviderUnavailable(_))
        ));
    }
}
