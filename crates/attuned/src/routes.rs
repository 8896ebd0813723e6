//! API routes for attuned

use crate::server::AppState;
use attune_shared::{
    ErrorResponse, HealthResponse, RespondRequest, RespondResponse, RewriteRequest,
    RewriteResponse,
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

type AppStateArc = Arc<AppState>;

// ============================================================================
// Response Routes
// ============================================================================

pub fn response_routes() -> Router<AppStateArc> {
    Router::new().route("/get_response", post(get_response))
}

async fn get_response(
    State(state): State<AppStateArc>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<RespondResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(message) = req.text() else {
        warn!("Rejected request without a message");
        return Err(error_response(StatusCode::BAD_REQUEST, "No message provided"));
    };

    let request_id = Uuid::new_v4();
    let span = info_span!("respond", %request_id);
    let result = state.orchestrator.respond(message).instrument(span).await;

    info!("  [{}] emotion={}", request_id, result.emotion);
    Ok(Json(result.into()))
}

// ============================================================================
// Rewrite Routes
// ============================================================================

pub fn rewrite_routes() -> Router<AppStateArc> {
    Router::new().route("/rewrite", post(rewrite_text))
}

async fn rewrite_text(
    State(state): State<AppStateArc>,
    Json(req): Json<RewriteRequest>,
) -> Result<Json<RewriteResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(text) = req.passage() else {
        warn!("Rejected rewrite without text");
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "No text provided in the request body.",
        ));
    };

    let request_id = Uuid::new_v4();
    let span = info_span!("rewrite", %request_id);
    let outcome = state.orchestrator.rewrite(text).instrument(span).await;

    if outcome.is_fallback() {
        error!("  [{}] rewrite failed", request_id);
        return Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Max retries exceeded",
        ));
    }

    info!("  [{}] rewrote {} chars", request_id, text.len());
    Ok(Json(RewriteResponse {
        rewritten_text: outcome.into_text(),
    }))
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        classifier_model: state.classifier_model.clone(),
        generator_model: state.generator_model.clone(),
    })
}
