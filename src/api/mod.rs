pub mod health;
pub mod middleware;
pub mod owners;
pub mod session;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    info(title = "CineBookAPI", description = "Cinema booking API"),
    paths(
        health::health,
        owners::register,
        owners::login,
        owners::logout,
        owners::profile,
        owners::update_profile,
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "owner", description = "Theatre-owner onboarding"),
    )
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/register", post(owners::register))
        .route("/login", post(owners::login))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::limit_auth,
        ));

    let owner = Router::new()
        .route("/logout", post(owners::logout))
        .route("/profile", get(owners::profile).patch(owners::update_profile))
        .merge(public);

    Router::new()
        .route("/", get(health::health))
        .route("/doc/openapi.json", get(openapi))
        .route("/metrics", get(metrics))
        .nest("/owner", owner)
        .layer(axum::middleware::from_fn(middleware::track_requests))
        .with_state(state)
}
