//! HTTP server for attuned

use crate::config::{Config, ServerConfig};
use crate::pipeline::Orchestrator;
use crate::routes;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub start_time: Instant,
    pub classifier_model: String,
    pub generator_model: String,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, config: &Config) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            start_time: Instant::now(),
            classifier_model: config.classifier.model.clone(),
            generator_model: config.generator.model.clone(),
        }
    }
}

/// Build the router with all routes and layers
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .merge(routes::response_routes())
        .merge(routes::rewrite_routes())
        .merge(routes::health_routes())
        .with_state(Arc::new(state))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until ctrl-c
pub async fn run(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = router(state, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    info!("  Listening on http://{}", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gracefully");
        })
        .await?;
    Ok(())
}
