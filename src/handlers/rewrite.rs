//! Rewrite API handlers
//!
//! Validates incoming requests, hands them to the orchestrator, and shapes
//! the outcome as JSON or as a downloadable plain-text report

use crate::config::pricing;
use crate::handlers::report::{render_report, WebResult};
use crate::handlers::AppState;
use crate::models::rewrite::{Mode, RewriteRequest};
use crate::utils::error::{AppError, AppResult};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Body of POST /api/rewrite and POST /api/download
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRewriteRequest {
    /// Text to rewrite
    pub input_text: String,
    /// Lower bound of the accepted word range
    pub min_words: u32,
    /// Upper bound of the accepted word range
    pub max_words: u32,
    /// "strict" or "balanced" (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Attempt budget (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Chat model id (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Entry of GET /api/models
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    pub display_name: String,
}

/// Handle a rewrite request
///
/// POST /api/rewrite
///
/// The orchestrator itself never fails the transport: semantically invalid
/// runs come back as `status: ERROR` inside a 200, exactly like a run that
/// exhausted its attempts. Only malformed API input yields a 4xx.
pub async fn handle_rewrite(
    State(state): State<Arc<AppState>>,
    Json(api_request): Json<ApiRewriteRequest>,
) -> AppResult<Json<WebResult>> {
    let request = build_request(&state, &api_request)?;
    let session = request.session_id.clone().unwrap_or_default();
    info!(session = %session, "Rewrite request received");

    let result = state.orchestrator.orchestrate(&request).await;
    info!(session = %session, "Rewrite completed: {}", result.status);

    Ok(Json(WebResult::from_result(&result)))
}

/// Handle a download request
///
/// POST /api/download
///
/// Same pipeline as /api/rewrite, answered as a plain-text report attachment
pub async fn handle_download(
    State(state): State<Arc<AppState>>,
    Json(api_request): Json<ApiRewriteRequest>,
) -> AppResult<Response> {
    let request = build_request(&state, &api_request)?;
    let session = request.session_id.clone().unwrap_or_default();
    info!(session = %session, "Download request received");

    let result = state.orchestrator.orchestrate(&request).await;
    let report = render_report(&result);

    let filename = format!("rewrite_{}.txt", chrono::Utc::now().format("%Y%m%d_%H%M%S"));
    let response = (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        report,
    )
        .into_response();

    Ok(response)
}

/// List the selectable chat models
///
/// GET /api/models
pub async fn list_models(State(_state): State<Arc<AppState>>) -> Json<Vec<ModelEntry>> {
    let models = pricing::available_models()
        .into_iter()
        .filter_map(|id| {
            pricing::model_profile(id).map(|profile| ModelEntry {
                id: id.to_string(),
                display_name: profile.display_name.to_string(),
            })
        })
        .collect();

    Json(models)
}

/// Validate the API request and build the orchestrator request from it,
/// filling defaults from Settings
fn build_request(state: &AppState, api: &ApiRewriteRequest) -> AppResult<RewriteRequest> {
    if api.input_text.trim().is_empty() {
        return Err(AppError::Validation("input_text is required".to_string()));
    }

    let max_chars = state.settings.rewrite.max_input_chars;
    if api.input_text.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "input_text exceeds the maximum length of {max_chars} characters"
        )));
    }

    if api.min_words < 1 {
        return Err(AppError::Validation("min_words must be at least 1".to_string()));
    }

    if api.max_words < api.min_words {
        return Err(AppError::Validation(
            "max_words must be greater than or equal to min_words".to_string(),
        ));
    }

    let words_limit = state.settings.rewrite.max_words_limit;
    if api.max_words > words_limit {
        return Err(AppError::Validation(format!(
            "max_words exceeds the service limit of {words_limit}"
        )));
    }

    if let Some(attempts) = api.max_attempts {
        if attempts < 1 {
            return Err(AppError::Validation("max_attempts must be at least 1".to_string()));
        }
    }

    let mode = match api.mode.as_deref() {
        Some(value) if value.eq_ignore_ascii_case("strict") => Mode::Strict,
        Some(_) => Mode::Balanced,
        None => state.settings.rewrite.default_mode,
    };

    let model = api
        .model
        .clone()
        .unwrap_or_else(|| state.settings.rewrite.default_model.clone());
    if pricing::model_profile(&model).is_none() {
        return Err(AppError::Validation(format!("unknown model: {model}")));
    }

    let session_id = short_session_id();
    debug!(session = %session_id, "Request validated");

    Ok(RewriteRequest {
        input_text: api.input_text.clone(),
        min_words: api.min_words,
        max_words: api.max_words,
        mode,
        max_attempts: api.max_attempts.unwrap_or(state.settings.rewrite.default_max_attempts),
        model,
        session_id: Some(session_id),
    })
}

/// Short correlation id for logs, 8 hex chars
fn short_session_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_session_id_length() {
        let id = short_session_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_api_request_deserialization() {
        let body = r#"{
            "input_text": "some text",
            "min_words": 10,
            "max_words": 50,
            "mode": "strict",
            "max_attempts": 3
        }"#;

        let request: ApiRewriteRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.min_words, 10);
        assert_eq!(request.mode.as_deref(), Some("strict"));
        assert!(request.model.is_none());
    }

    #[test]
    fn test_api_request_requires_range_fields() {
        let body = r#"{"input_text": "some text"}"#;
        assert!(serde_json::from_str::<ApiRewriteRequest>(body).is_err());
    }
}
