//! Integration tests for the HTTP surface.
//!
//! The router runs against in-memory SQLite without Redis.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use icad_dispatch::api::{create_router, AppState};

async fn app() -> Router {
    let db = common::setup_database().await;
    create_router(AppState::new(
        db,
        concat!(env!("CARGO_MANIFEST_DIR"), "/static"),
    ))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_root_endpoint_returns_banner() {
    let (status, body) = get(app().await, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "iCAD Dispatch");
}

#[tokio::test]
async fn test_health_without_redis() {
    let (status, body) = get(app().await, "/health").await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["services"]["database"]["status"], "healthy");
    assert_eq!(json["services"]["redis"]["status"], "disabled");
    assert!(json["services"]["database"].get("error").is_none());
}

#[tokio::test]
async fn test_unknown_path_returns_json_404() {
    let (status, body) = get(app().await, "/dispatch/units").await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(json["error"]["message"], "Resource not found");
}

#[tokio::test]
async fn test_static_files_served() {
    let (status, body) = get(app().await, "/static/robots.txt").await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("User-agent"));
}
