use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::owners;

/// The owner behind the `Authorization: <session_id>` header.
#[derive(Debug, Clone, Copy)]
pub struct CurrentOwner {
    pub owner_id: Uuid,
    pub session_id: Uuid,
}

impl FromRequestParts<AppState> for CurrentOwner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(ApiError::Unauthorized("Missing session ID in headers"))?;

        let session_id = header
            .to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or(ApiError::Unauthorized("Invalid session ID"))?;

        let owner_id = owners::session_owner(&state.db, session_id)
            .await?
            .ok_or(ApiError::Unauthorized("Invalid session ID"))?;

        Ok(Self {
            owner_id,
            session_id,
        })
    }
}
