//! Cross-entity search.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, TestApp};
use crm_backend::domain::users::UserRole;
use serde_json::{json, Value};

async fn seed(app: &TestApp, token: &str) {
    app.post(
        "/contractors",
        Some(token),
        json!({ "name": "Acme Budowa", "email": "biuro@acme.pl", "phone": "500600700" }),
    )
    .await;
    app.post(
        "/tasks",
        Some(token),
        json!({ "title": "Call Acme about invoice", "date": "2024-03-01", "time": "09:30:00" }),
    )
    .await;
    app.post(
        "/support",
        Some(token),
        json!({ "user": "Jan", "issue": "Acme portal shows blank page" }),
    )
    .await;
}

async fn search(app: &TestApp, token: &str, query: &str) -> (StatusCode, Value) {
    let response = app.get(&format!("/search?{query}"), Some(token)).await;
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn finds_matches_across_types_in_scan_order() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;
    seed(&app, &token).await;

    let (status, json) = search(&app, &token, "q=ACME").await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["contractor", "task", "support"]);
    assert_eq!(json["data"][0]["title"], "Acme Budowa");
    assert_eq!(json["data"][0]["subtitle"], "biuro@acme.pl");
}

#[tokio::test]
async fn short_query_returns_nothing() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;
    seed(&app, &token).await;

    let (status, json) = search(&app, &token, "q=a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn type_filter_limits_results() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;
    seed(&app, &token).await;

    let (_, json) = search(&app, &token, "q=acme&types=task,support").await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["type"], "task");
}

#[tokio::test]
async fn unknown_type_is_rejected() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;

    let (status, json) = search(&app, &token, "q=acme&types=invoice").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["fields"]["types"].is_array());
}

#[tokio::test]
async fn other_users_tasks_are_not_searched() {
    let app = build_test_app();
    let anna = app.login_as("anna", UserRole::User).await;
    let marek = app.login_as("marek", UserRole::User).await;
    seed(&app, &anna).await;

    let (_, json) = search(&app, &marek, "q=acme&types=task").await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn search_requires_auth() {
    let app = build_test_app();
    let response = app.get("/search?q=acme", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
