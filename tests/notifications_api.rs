//! Notification inbox and dashboard statistics.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, TestApp};
use crm_backend::domain::users::UserRole;
use serde_json::json;

async fn add_contractor(app: &TestApp, token: &str, name: &str, status: &str) {
    let response = app
        .post(
            "/contractors",
            Some(token),
            json!({ "name": name, "email": "biuro@example.com", "phone": "500600700", "status": status }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn unread(app: &TestApp, token: &str) -> u64 {
    let json = body_json(app.get("/notifications/unread-count", Some(token)).await).await;
    json["data"]["count"].as_u64().unwrap()
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn events_land_in_the_actors_inbox() {
    let app = build_test_app();
    let anna = app.login_as("anna", UserRole::User).await;
    let marek = app.login_as("marek", UserRole::User).await;

    add_contractor(&app, &anna, "Acme", "active").await;
    add_contractor(&app, &anna, "Beta", "active").await;

    assert_eq!(unread(&app, &anna).await, 2);
    assert_eq!(unread(&app, &marek).await, 0);

    let json = body_json(app.get("/notifications", Some(&anna)).await).await;
    assert_eq!(json["data"][0]["message"], "New contractor added: Beta");
    assert_eq!(json["data"][0]["type"], "info");
    assert_eq!(json["data"][0]["read"], false);
}

#[tokio::test]
async fn mark_one_then_filter_unread() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;
    add_contractor(&app, &token, "Acme", "active").await;
    add_contractor(&app, &token, "Beta", "active").await;

    let json = body_json(app.get("/notifications", Some(&token)).await).await;
    let id = json["data"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .post_empty(&format!("/notifications/{id}/read"), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["read"], true);

    let json = body_json(app.get("/notifications?unreadOnly=true", Some(&token)).await).await;
    assert_eq!(json["pagination"]["totalItems"], 1);
    assert_eq!(json["data"][0]["message"], "New contractor added: Acme");
}

#[tokio::test]
async fn cannot_mark_someone_elses_notification() {
    let app = build_test_app();
    let anna = app.login_as("anna", UserRole::User).await;
    let marek = app.login_as("marek", UserRole::User).await;
    add_contractor(&app, &anna, "Acme", "active").await;

    let json = body_json(app.get("/notifications", Some(&anna)).await).await;
    let id = json["data"][0]["id"].as_str().unwrap();

    let response = app
        .post_empty(&format!("/notifications/{id}/read"), Some(&marek))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(unread(&app, &anna).await, 1);
}

#[tokio::test]
async fn read_all_only_touches_caller() {
    let app = build_test_app();
    let anna = app.login_as("anna", UserRole::User).await;
    let marek = app.login_as("marek", UserRole::User).await;
    add_contractor(&app, &anna, "Acme", "active").await;
    add_contractor(&app, &anna, "Beta", "active").await;
    add_contractor(&app, &marek, "Gamma", "active").await;

    let json = body_json(app.post_empty("/notifications/read-all", Some(&anna)).await).await;
    assert_eq!(json["data"]["updated"], 2);

    assert_eq!(unread(&app, &anna).await, 0);
    assert_eq!(unread(&app, &marek).await, 1);

    let json = body_json(app.post_empty("/notifications/read-all", Some(&anna)).await).await;
    assert_eq!(json["data"]["updated"], 0);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dashboard_counts_by_status() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;

    add_contractor(&app, &token, "Acme", "active").await;
    add_contractor(&app, &token, "Beta", "inactive").await;
    app.post(
        "/tasks",
        Some(&token),
        json!({ "title": "Call Acme", "date": "2024-03-01", "time": "09:30:00" }),
    )
    .await;
    app.post(
        "/support",
        Some(&token),
        json!({ "user": "Jan", "issue": "Broken invoice" }),
    )
    .await;

    let response = app.get("/dashboard/stats", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let stats = &json["data"];
    assert_eq!(stats["contractors"]["total"], 2);
    assert_eq!(stats["contractors"]["active"], 1);
    assert_eq!(stats["contractors"]["inactive"], 1);
    assert_eq!(stats["tasks"]["pending"], 1);
    assert_eq!(stats["tasks"]["completed"], 0);
    assert_eq!(stats["offers"]["total"], 0);
    assert_eq!(stats["support"]["open"], 1);
    assert_eq!(stats["support"]["inProgress"], 0);
    assert_eq!(stats["unreadNotifications"], 4);
}
