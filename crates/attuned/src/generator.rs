//! Text generation backend.
//!
//! `TextGenerator` is a single attempt against the external generation
//! service. Retries live in `retry::GenerationClient`, not here.

use crate::config::GeneratorConfig;
use async_trait::async_trait;
use attune_shared::GenerationRequest;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Generation errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerateError {
    #[error("Generator is not configured: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Generator returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Generator returned empty response")]
    EmptyResponse,
}

/// External text-generation capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One attempt at generating a reply to `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<ContentIn<'a>>,
}

#[derive(Debug, Serialize)]
struct ContentIn<'a> {
    parts: Vec<PartIn<'a>>,
}

#[derive(Debug, Serialize)]
struct PartIn<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ContentOut>,
}

#[derive(Debug, Deserialize)]
struct ContentOut {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
struct PartOut {
    #[serde(default)]
    text: Option<String>,
}

/// Google Generative Language (Gemini) client.
pub struct GeminiClient {
    http_client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerateError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GenerateError::Config("missing API key".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerateError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            url: format!(
                "{}/v1beta/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        let body = GenerateContentRequest {
            contents: vec![ContentIn {
                parts: vec![PartIn {
                    text: request.as_str(),
                }],
            }],
        };

        debug!("[>]  LLM CALL [{}] ({} chars)", self.model, request.as_str().len());

        let response = self
            .http_client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerateError::Timeout(self.timeout_secs)
                } else {
                    // Strip the URL so the key never reaches the logs
                    GenerateError::Http(format!("Request failed: {}", e.without_url()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::InvalidJson(format!("Failed to parse response: {}", e.without_url())))?;

        let text = extract_text(parsed).ok_or(GenerateError::EmptyResponse)?;
        debug!("[<]  LLM RESPONSE ({} chars)", text.len());
        Ok(text)
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response = parse(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "Congratulations"}, {"text": " on the promotion!"}]}
            }]
        }));
        assert_eq!(
            extract_text(response).as_deref(),
            Some("Congratulations on the promotion!")
        );
    }

    #[test]
    fn test_extract_text_uses_first_candidate() {
        let response = parse(serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}]}},
                {"content": {"parts": [{"text": "second"}]}}
            ]
        }));
        assert_eq!(extract_text(response).as_deref(), Some("first"));
    }

    #[test]
    fn test_extract_text_empty_cases() {
        assert!(extract_text(parse(serde_json::json!({}))).is_none());
        assert!(extract_text(parse(serde_json::json!({"candidates": []}))).is_none());
        assert!(extract_text(parse(serde_json::json!({"candidates": [{}]}))).is_none());
        assert!(extract_text(parse(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "  "}]}}]
        })))
        .is_none());
    }

    #[test]
    fn test_request_shape() {
        let request = attune_shared::compose("hi", "Be kind.");
        let body = GenerateContentRequest {
            contents: vec![ContentIn {
                parts: vec![PartIn {
                    text: request.as_str(),
                }],
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], request.as_str());
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = GeneratorConfig::default();
        assert!(matches!(GeminiClient::new(&config), Err(GenerateError::Config(_))));

        let mut config = GeneratorConfig::default();
        config.api_key = Some("key".to_string());
        let client = GeminiClient::new(&config).unwrap();
        assert!(client.url.ends_with("/v1beta/models/gemini-1.5-flash-latest:generateContent"));
    }
}
