//! attune daemon - emotion-adaptive response service
//!
//! Classifies the affect of each message, picks a matching tone and asks the
//! generation service for a reply.

use anyhow::{Context, Result};
use attuned::server::{self, AppState};
use attuned::{Config, GeminiClient, HuggingFaceClassifier, Orchestrator, TokioSleeper};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("attuned v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    config.validate()?;

    let classifier = HuggingFaceClassifier::new(&config.classifier)
        .context("Failed to set up emotion classifier")?;
    let generator =
        GeminiClient::new(&config.generator).context("Failed to set up generation client")?;
    info!(
        "  Classifier: {}  Generator: {}",
        config.classifier.model, config.generator.model
    );

    let orchestrator = Orchestrator::new(
        Arc::new(classifier),
        Arc::new(generator),
        Arc::new(TokioSleeper),
        config.pipeline_config(),
    );

    let state = AppState::new(orchestrator, &config);
    server::run(&config.server, state).await
}
