//! Logging middleware
//!
//! Records HTTP request and response information

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

/// Request logging middleware
///
/// Records detailed information for each HTTP request
pub async fn request_logging_middleware(
    State(_state): State<Arc<crate::handlers::AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_agent = extract_user_agent(request.headers());

    // Create request span
    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
    );

    async move {
        info!("Request started: {} {} - User-Agent: {}", method, uri, user_agent);

        // Execute request
        let response = next.run(request).await;

        // Calculate processing time
        let duration = start_time.elapsed();
        let status = response.status();

        if status.is_success() {
            info!(
                "Request completed: {} - Duration: {:.2}ms",
                status,
                duration.as_secs_f64() * 1000.0
            );
        } else if status.is_client_error() {
            warn!("Client error: {} - Duration: {:.2}ms", status, duration.as_secs_f64() * 1000.0);
        } else {
            warn!("Server error: {} - Duration: {:.2}ms", status, duration.as_secs_f64() * 1000.0);
        }

        // Orchestrations stack several provider round trips, so warn late
        if duration.as_secs() > 60 {
            warn!(
                "Slow request detected: {} {} - Duration: {:.2}s",
                method,
                uri,
                duration.as_secs_f64()
            );
        }

        response
    }
    .instrument(span)
    .await
}

fn extract_user_agent(headers: &HeaderMap) -> String {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_user_agent() {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", "wordfit-test/1.0".parse().unwrap());
        assert_eq!(extract_user_agent(&headers), "wordfit-test/1.0");

        headers.clear();
        assert_eq!(extract_user_agent(&headers), "unknown");
    }
}
