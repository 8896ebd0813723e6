//! Fake collaborators for testing.
//!
//! Deterministic stand-ins for the classifier, the generator and the
//! backoff timer. No network, no real sleeping.

use crate::classifier::{ClassifyError, EmotionClassifier, LabelScore};
use crate::generator::{GenerateError, TextGenerator};
use crate::retry::Sleeper;
use async_trait::async_trait;
use attune_shared::GenerationRequest;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Fake Classifier
// ============================================================================

/// Classifier with pre-defined responses.
///
/// A single response is returned forever; several are returned in order.
pub struct FakeClassifier {
    responses: Mutex<Vec<Result<Vec<LabelScore>, ClassifyError>>>,
    call_count: Mutex<usize>,
}

impl FakeClassifier {
    pub fn new(responses: Vec<Result<Vec<LabelScore>, ClassifyError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
        }
    }

    /// Always report `label` with high confidence
    pub fn label(label: &str) -> Self {
        Self::new(vec![Ok(vec![
            LabelScore::new(label, 0.97),
            LabelScore::new("neutral", 0.02),
        ])])
    }

    pub fn always_error(error: ClassifyError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl EmotionClassifier for FakeClassifier {
    async fn classify(&self, _text: &str) -> Result<Vec<LabelScore>, ClassifyError> {
        *self.call_count.lock().unwrap() += 1;

        let mut responses = self.responses.lock().unwrap();
        match responses.len() {
            0 => Err(ClassifyError::Empty),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

// ============================================================================
// Fake Generator
// ============================================================================

/// Generator with pre-defined responses that records every prompt it sees.
pub struct FakeGenerator {
    responses: Mutex<Vec<Result<String, GenerateError>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new(responses: Vec<Result<String, GenerateError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn always_error(error: GenerateError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Fail `failures` times, then succeed with `text`
    pub fn fail_then(failures: usize, text: &str) -> Self {
        let mut responses: Vec<Result<String, GenerateError>> = (0..failures)
            .map(|_| Err(GenerateError::Http("connection reset".to_string())))
            .collect();
        responses.push(Ok(text.to_string()));
        Self::new(responses)
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        self.prompts.lock().unwrap().push(request.as_str().to_string());

        let mut responses = self.responses.lock().unwrap();
        match responses.len() {
            0 => Err(GenerateError::EmptyResponse),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

// ============================================================================
// Recording Sleeper
// ============================================================================

/// Records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}
