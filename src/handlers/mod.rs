//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod health;
pub mod report;
pub mod rewrite;

use crate::config::Settings;
use crate::core::{ModeThresholds, RewriteOrchestrator, SemanticValidator};
use crate::middleware::logging::request_logging_middleware;
use crate::services::OpenAIClient;
use anyhow::Result;
use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Application state
pub struct AppState {
    pub settings: Settings,
    pub orchestrator: Arc<RewriteOrchestrator>,
}

/// Create the application router with the OpenAI-backed orchestrator
pub async fn create_router(settings: Settings) -> Result<Router> {
    let client = OpenAIClient::new(&settings)?;

    // One immutable client handle serves both collaborator seams
    let semantic = SemanticValidator::new(
        Some(Arc::new(client.clone())),
        settings.rewrite.semantic_fail_open,
    );
    let orchestrator = RewriteOrchestrator::new(Arc::new(client), semantic).with_thresholds(
        ModeThresholds {
            strict: settings.rewrite.strict_threshold,
            balanced: settings.rewrite.balanced_threshold,
        },
    );

    let state = Arc::new(AppState { settings, orchestrator: Arc::new(orchestrator) });

    Ok(router_with_state(state))
}

/// Assemble routes and middleware over a prepared state.
///
/// Split out of `create_router` so tests can inject an orchestrator with
/// scripted providers.
pub fn router_with_state(state: Arc<AppState>) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(state.settings.limits.max_request_size))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    Router::new()
        .route("/api/rewrite", post(rewrite::handle_rewrite))
        .route("/api/download", post(rewrite::handle_download))
        .route("/api/models", get(rewrite::list_models))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .layer(middleware::from_fn_with_state(state.clone(), request_logging_middleware))
        .with_state(state)
        .layer(middleware_stack)
}
