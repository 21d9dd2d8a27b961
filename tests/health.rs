mod common;

use axum::http::{StatusCode, header};
use http_body_util::BodyExt;
use nonzero_ext::nonzero;
use sea_orm::{ConnectOptions, Database};
use tower::ServiceExt;

#[tokio::test]
async fn health_returns_ok_message() {
    let (app, _db) = common::app().await;

    let response = app.oneshot(common::get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], br#"{"message":{"status":"OK"}}"#);
}

#[tokio::test]
async fn health_ignores_an_unreachable_database() {
    // Nothing listens on the discard port; the pool is lazy so building it succeeds.
    let mut options = ConnectOptions::new("postgres://cinebook@127.0.0.1:9/cinebook");
    options.connect_lazy(true);
    let db = Database::connect(options).await.unwrap();
    let app = cinebook::router(common::state_with_limit(db, nonzero!(5u32)));

    let (status, body) = common::send(&app, common::get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"message": {"status": "OK"}}));
}

#[tokio::test]
async fn openapi_document_lists_health_and_owner_paths() {
    let (app, _db) = common::app().await;

    let (status, body) = common::send(&app, common::get("/doc/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "CineBookAPI");
    for path in ["/", "/owner/register", "/owner/login", "/owner/logout", "/owner/profile"] {
        assert!(body["paths"].get(path).is_some(), "missing {path}");
    }
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (app, _db) = common::app().await;
    let (status, _) = common::send(&app, common::get("/showtimes", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
