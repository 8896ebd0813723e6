//! attuned library - exposes modules for testing.

pub mod classifier;
pub mod config;
pub mod fakes;
pub mod generator;
pub mod pipeline;
pub mod retry;
pub mod routes;
pub mod server;

pub use classifier::{ClassifierAdapter, ClassifyError, EmotionClassifier, HuggingFaceClassifier, LabelScore};
pub use config::Config;
pub use generator::{GeminiClient, GenerateError, TextGenerator};
pub use pipeline::{Orchestrator, PipelineConfig, PipelineResult, PipelineStage};
pub use retry::{GenerationClient, GenerationOutcome, RetryPolicy, Sleeper, TokioSleeper};
