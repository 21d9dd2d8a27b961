use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::session::CurrentOwner;
use crate::AppState;
use crate::error::{ApiError, MessageBody};
use crate::owners::{self, LoginRequest, OwnerProfile, RegisterRequest, UpdateProfileRequest};

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub session_id: Uuid,
}

fn message(text: &str) -> Json<MessageBody> {
    Json(MessageBody {
        message: text.to_owned(),
    })
}

#[utoipa::path(
    post,
    path = "/owner/register",
    tag = "owner",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Owner and details created", body = MessageBody),
        (status = 400, description = "Malformed body", body = MessageBody),
        (status = 409, description = "Email or phone already registered", body = MessageBody),
        (status = 422, description = "Field validation failed", body = MessageBody),
        (status = 429, description = "Rate limited", body = MessageBody),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageBody>), ApiError> {
    let Json(request) = payload?;
    owners::register(&state.db, request).await?;
    Ok((StatusCode::CREATED, message("Registered Successfully")))
}

#[utoipa::path(
    post,
    path = "/owner/login",
    tag = "owner",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Unknown identity or wrong password", body = MessageBody),
        (status = 422, description = "Field validation failed", body = MessageBody),
        (status = 429, description = "Rate limited", body = MessageBody),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    let session_id = owners::login(&state.db, request).await?;
    Ok(Json(LoginResponse {
        message: "Logged in successfully".to_owned(),
        session_id,
    }))
}

#[utoipa::path(
    post,
    path = "/owner/logout",
    tag = "owner",
    responses(
        (status = 200, description = "Session closed", body = MessageBody),
        (status = 401, description = "Missing or invalid session", body = MessageBody),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentOwner,
) -> Result<Json<MessageBody>, ApiError> {
    owners::logout(&state.db, current.session_id).await?;
    Ok(message("Logged out successfully"))
}

#[utoipa::path(
    get,
    path = "/owner/profile",
    tag = "owner",
    responses(
        (status = 200, description = "Owner with details", body = OwnerProfile),
        (status = 401, description = "Missing or invalid session", body = MessageBody),
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    current: CurrentOwner,
) -> Result<Json<OwnerProfile>, ApiError> {
    Ok(Json(owners::profile(&state.db, current.owner_id).await?))
}

#[utoipa::path(
    patch,
    path = "/owner/profile",
    tag = "owner",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated owner with details", body = OwnerProfile),
        (status = 401, description = "Missing or invalid session", body = MessageBody),
        (status = 409, description = "Email or phone already registered", body = MessageBody),
        (status = 422, description = "Field validation failed", body = MessageBody),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentOwner,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<OwnerProfile>, ApiError> {
    let Json(request) = payload?;
    let profile = owners::update_profile(&state.db, current.owner_id, request).await?;
    Ok(Json(profile))
}
