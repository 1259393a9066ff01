//! Health endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_app_with_mailer, build_test_app};

#[tokio::test]
async fn health_reports_storage_and_mail() {
    let app = build_test_app();
    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["services"]["storage"], "ok");
    assert_eq!(json["services"]["mail"], "configured");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn health_without_mailer_reports_disabled() {
    let app = build_app_with_mailer(false);
    let json = body_json(app.get("/health", None).await).await;
    assert_eq!(json["services"]["mail"], "disabled");
}

#[tokio::test]
async fn response_carries_request_id() {
    let app = build_test_app();
    let response = app.get("/health", None).await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app();
    let response = app.get("/does-not-exist", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
