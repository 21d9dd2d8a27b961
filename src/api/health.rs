use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: Status,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub message: HealthStatus,
}

/// Liveness check. Touches no state, so it keeps answering while the database
/// is down.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Process is serving HTTP", body = HealthResponse,
            example = json!({"message": {"status": "OK"}}))
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: HealthStatus { status: Status::Ok },
    })
}
