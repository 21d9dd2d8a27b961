use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use crate::AppState;
use crate::error::ApiError;

/// Logs every request once it completes and feeds the HTTP metrics.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_owned(), |path| path.as_str().to_owned());
    let started = Instant::now();

    let response = next.run(request).await;

    let latency = started.elapsed();
    let status = response.status().as_u16();

    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.clone(),
        "path" => path.clone()
    )
    .record(latency.as_secs_f64());

    info!(
        %method,
        %path,
        status,
        latency_ms = latency.as_millis() as u64,
        "request completed"
    );

    response
}

/// Process-wide budget for the unauthenticated owner endpoints.
pub async fn limit_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.auth_limiter.check().is_err() {
        metrics::counter!("auth_rate_limited_total").increment(1);
        return Err(ApiError::RateLimited);
    }
    Ok(next.run(request).await)
}
