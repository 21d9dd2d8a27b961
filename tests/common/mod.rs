#![allow(dead_code)]

use std::num::NonZeroU32;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use cinebook::AppState;
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use migration::{Migrator, MigratorTrait};
use nonzero_ext::nonzero;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{Value, json};
use tower::ServiceExt;

pub async fn memory_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    Database::connect(options).await.unwrap()
}

pub async fn migrated_db() -> DatabaseConnection {
    let db = memory_db().await;
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn state_with_limit(db: DatabaseConnection, per_second: NonZeroU32) -> AppState {
    let metrics = PrometheusBuilder::new().build_recorder().handle();
    AppState::new(db, metrics, per_second)
}

pub async fn app() -> (Router, DatabaseConnection) {
    let db = migrated_db().await;
    let app = cinebook::router(state_with_limit(db.clone(), nonzero!(10_000u32)));
    (app, db)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, session: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(session) = session {
        builder = builder.header(header::AUTHORIZATION, session);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(session) = session {
        builder = builder.header(header::AUTHORIZATION, session);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn registration(email: &str, phone: i64) -> Value {
    json!({
        "owner": {
            "email": email,
            "phone": phone,
            "password": "hunter22"
        },
        "owner_detail": {
            "name": "Asha Rao",
            "dob": "1990-04-12T00:00:00Z",
            "gender": "Female",
            "address": {
                "address_line_1": "12 Projector Lane",
                "address_line_2": "Near Screen Three",
                "city": "Pune",
                "state": "Maharashtra",
                "country": "India",
                "pincode": 411001
            }
        }
    })
}

/// Registers an owner and returns a fresh session id.
pub async fn register_and_login(app: &Router, email: &str, phone: i64) -> String {
    let (status, _) = send(
        app,
        json_request("POST", "/owner/register", None, registration(email, phone)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/owner/login",
            None,
            json!({"email": email, "password": "hunter22"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["session_id"].as_str().unwrap().to_owned()
}
