//! Emotion-adaptive response pipeline.
//!
//! Flow:
//! 1. Classify the user's text (failure → neutral)
//! 2. Look up the tone instruction for the label
//! 3. Compose the prompt
//! 4. Generate with retry/backoff (exhaustion → fixed apology)
//!
//! `rewrite` skips steps 1-3 and sends the reading-level prompt straight to
//! the same retrying generator.
//!
//! Invariants:
//! - `respond` never fails; every error becomes a value in `PipelineResult`
//! - No state survives between calls
//! - Each run is bounded by `PipelineConfig::request_timeout`

use crate::classifier::{ClassifierAdapter, EmotionClassifier};
use crate::generator::TextGenerator;
use crate::retry::{GenerationClient, GenerationOutcome, RetryPolicy, Sleeper};
use attune_shared::{
    compose, compose_rewrite, tone_for, EmotionLabel, RespondResponse, FALLBACK_APOLOGY,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Immutable pipeline settings, built once from `Config`.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub retry: RetryPolicy,
    /// Deadline for a whole `respond` call; remaining retries are abandoned
    pub request_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(180),
        }
    }
}

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Classifying,
    Composing,
    Generating,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Classifying => write!(f, "classifying"),
            Self::Composing => write!(f, "composing"),
            Self::Generating => write!(f, "generating"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// The reply and the emotion it was tuned for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    pub response: String,
    pub emotion: EmotionLabel,
}

impl PipelineResult {
    /// Result used when no generated text could be obtained.
    pub fn fallback() -> Self {
        Self {
            response: FALLBACK_APOLOGY.to_string(),
            emotion: EmotionLabel::Neutral,
        }
    }
}

impl From<PipelineResult> for RespondResponse {
    fn from(result: PipelineResult) -> Self {
        Self {
            response: result.response,
            emotion: result.emotion,
        }
    }
}

/// Sequences classifier → tone → composer → generator.
///
/// Shared across request handlers behind an `Arc`; holds no mutable state.
pub struct Orchestrator {
    classifier: ClassifierAdapter,
    generation: GenerationClient,
    request_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        classifier: Arc<dyn EmotionClassifier>,
        generator: Arc<dyn TextGenerator>,
        sleeper: Arc<dyn Sleeper>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            classifier: ClassifierAdapter::new(classifier),
            generation: GenerationClient::new(generator, sleeper, config.retry),
            request_timeout: config.request_timeout,
        }
    }

    /// Respond to `user_text`. Never fails.
    ///
    /// Callers reject empty input before getting here.
    pub async fn respond(&self, user_text: &str) -> PipelineResult {
        match tokio::time::timeout(self.request_timeout, self.run(user_text)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Pipeline deadline of {:?} elapsed, returning fallback",
                    self.request_timeout
                );
                PipelineResult::fallback()
            }
        }
    }

    /// Rewrite `text` at a 6th-grade reading level.
    ///
    /// An elapsed deadline is reported as exhaustion.
    pub async fn rewrite(&self, text: &str) -> GenerationOutcome {
        let request = compose_rewrite(text);
        match tokio::time::timeout(self.request_timeout, self.generation.generate(&request)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("Rewrite deadline of {:?} elapsed", self.request_timeout);
                GenerationOutcome::exhausted(self.generation.policy().max_attempts)
            }
        }
    }

    async fn run(&self, user_text: &str) -> PipelineResult {
        let mut stage = PipelineStage::Idle;

        stage = advance(stage, PipelineStage::Classifying);
        let emotion = self.classifier.classify(user_text).await;

        stage = advance(stage, PipelineStage::Composing);
        let tone = tone_for(emotion);
        let request = compose(user_text, tone);

        stage = advance(stage, PipelineStage::Generating);
        let outcome = self.generation.generate(&request).await;

        advance(stage, PipelineStage::Done);
        match outcome {
            GenerationOutcome::Response(text) => {
                info!("Responded with {} tone ({} chars)", emotion, text.len());
                PipelineResult {
                    response: text,
                    emotion,
                }
            }
            GenerationOutcome::Exhausted { attempts, .. } => {
                warn!("Generation exhausted after {} attempts, returning fallback", attempts);
                PipelineResult::fallback()
            }
        }
    }
}

fn advance(from: PipelineStage, to: PipelineStage) -> PipelineStage {
    debug!("Pipeline {} -> {}", from, to);
    to
}
