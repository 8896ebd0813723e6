//! Emotion classification.
//!
//! `EmotionClassifier` is the narrow seam over the external classification
//! service. `ClassifierAdapter` sits on top of it and turns every failure
//! into `Neutral`: classification is advisory and never stops a request.

use crate::config::ClassifierConfig;
use async_trait::async_trait;
use attune_shared::EmotionLabel;
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One ranked label from the classification service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: &str, score: f32) -> Self {
        Self {
            label: label.to_string(),
            score,
        }
    }
}

/// Classification errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClassifyError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed classifier output: {0}")]
    Malformed(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Classifier returned no labels")]
    Empty,
}

/// External text-classification capability.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Ranked labels for `text`, in any order.
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifyError>;
}

/// Highest-scoring label, resolved into the closed label set.
pub fn top_label(scores: &[LabelScore]) -> Option<EmotionLabel> {
    scores
        .iter()
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Less))
        .map(|best| EmotionLabel::from_label(&best.label))
}

/// Wraps a classifier and applies the neutral fallback.
#[derive(Clone)]
pub struct ClassifierAdapter {
    inner: Arc<dyn EmotionClassifier>,
}

impl ClassifierAdapter {
    pub fn new(inner: Arc<dyn EmotionClassifier>) -> Self {
        Self { inner }
    }

    /// Label for `text`. Never fails.
    pub async fn classify(&self, text: &str) -> EmotionLabel {
        match self.inner.classify(text).await {
            Ok(scores) => match top_label(&scores) {
                Some(label) => {
                    debug!("Classified emotion: {}", label);
                    label
                }
                None => {
                    warn!("Could not classify emotion: {}", ClassifyError::Empty);
                    EmotionLabel::Neutral
                }
            },
            Err(e) => {
                warn!("Could not classify emotion: {}", e);
                EmotionLabel::Neutral
            }
        }
    }
}

/// Hugging Face Inference API classifier.
pub struct HuggingFaceClassifier {
    http_client: reqwest::Client,
    url: String,
    api_token: Option<String>,
    timeout_secs: u64,
}

impl HuggingFaceClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifyError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassifyError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            url: format!(
                "{}/models/{}",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_token: config.api_token.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl EmotionClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifyError> {
        let mut request = self
            .http_client
            .post(&self.url)
            .json(&serde_json::json!({ "inputs": text }));

        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClassifyError::Timeout(self.timeout_secs)
            } else {
                ClassifyError::Http(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClassifyError::Malformed(format!("Failed to parse response: {}", e)))?;

        parse_scores(body)
    }
}

/// Accepts both `[[{label, score}, ...]]` and `[{label, score}, ...]`.
pub fn parse_scores(body: Value) -> Result<Vec<LabelScore>, ClassifyError> {
    let rows = match body {
        Value::Array(mut outer) => {
            if matches!(outer.first(), Some(Value::Array(_))) {
                outer.swap_remove(0)
            } else {
                Value::Array(outer)
            }
        }
        Value::Object(map) => {
            let detail = map
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unexpected object");
            return Err(ClassifyError::Malformed(detail.to_string()));
        }
        other => return Err(ClassifyError::Malformed(format!("unexpected value: {}", other))),
    };

    let scores: Vec<LabelScore> =
        serde_json::from_value(rows).map_err(|e| ClassifyError::Malformed(e.to_string()))?;

    if scores.is_empty() {
        return Err(ClassifyError::Empty);
    }
    Ok(scores)
}
