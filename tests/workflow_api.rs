//! Support ticket and task status workflows.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, TestApp};
use crm_backend::domain::users::UserRole;
use serde_json::json;

async fn open_ticket(app: &TestApp, token: &str) -> String {
    let response = app
        .post(
            "/support",
            Some(token),
            json!({ "user": "Jan Kowalski", "email": "jan@example.com", "issue": "Cannot log in", "priority": "high" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "open");
    json["data"]["id"].as_str().unwrap().to_string()
}

async fn set_ticket_status(app: &TestApp, token: &str, id: &str, status: &str) -> StatusCode {
    app.post(
        &format!("/support/{id}/status"),
        Some(token),
        json!({ "status": status }),
    )
    .await
    .status()
}

// ---------------------------------------------------------------------------
// Support tickets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ticket_moves_forward_to_resolved() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;
    let id = open_ticket(&app, &token).await;

    assert_eq!(set_ticket_status(&app, &token, &id, "in_progress").await, StatusCode::OK);
    assert_eq!(set_ticket_status(&app, &token, &id, "open").await, StatusCode::CONFLICT);
    assert_eq!(set_ticket_status(&app, &token, &id, "resolved").await, StatusCode::OK);

    let json = body_json(app.get(&format!("/support/{id}"), Some(&token)).await).await;
    assert_eq!(json["data"]["status"], "resolved");
    assert!(json["data"]["resolvedAt"].is_string());
}

#[tokio::test]
async fn resolved_ticket_is_terminal() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;
    let id = open_ticket(&app, &token).await;

    assert_eq!(set_ticket_status(&app, &token, &id, "resolved").await, StatusCode::OK);
    for status in ["open", "in_progress", "resolved"] {
        assert_eq!(
            set_ticket_status(&app, &token, &id, status).await,
            StatusCode::CONFLICT,
            "resolved -> {status}"
        );
    }
}

#[tokio::test]
async fn generic_update_cannot_change_status() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;
    let id = open_ticket(&app, &token).await;

    let response = app
        .put(
            &format!("/support/{id}"),
            Some(&token),
            json!({ "issue": "Cannot log in on mobile", "status": "resolved" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["issue"], "Cannot log in on mobile");
    assert_eq!(json["data"]["status"], "open");
}

#[tokio::test]
async fn resolving_notifies() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;
    let id = open_ticket(&app, &token).await;
    set_ticket_status(&app, &token, &id, "resolved").await;

    let json = body_json(app.get("/notifications", Some(&token)).await).await;
    assert_eq!(json["data"][0]["type"], "success");
    assert_eq!(json["data"][0]["message"], "Support ticket from Jan Kowalski resolved");
}

#[tokio::test]
async fn tickets_filter_by_priority() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;
    open_ticket(&app, &token).await;
    app.post(
        "/support",
        Some(&token),
        json!({ "user": "Ola", "issue": "Typo on invoice", "priority": "low" }),
    )
    .await;

    let json = body_json(app.get("/support?priority=low", Some(&token)).await).await;
    assert_eq!(json["pagination"]["totalItems"], 1);
    assert_eq!(json["data"][0]["user"], "Ola");
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn task_toggles_and_notifies_on_completion() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;

    let response = app
        .post(
            "/tasks",
            Some(&token),
            json!({ "title": "Call Acme", "date": "2024-03-01", "time": "09:30:00", "priority": "high" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let json = body_json(app.post_empty(&format!("/tasks/{id}/toggle"), Some(&token)).await).await;
    assert_eq!(json["data"]["status"], "completed");

    let notifications = body_json(app.get("/notifications", Some(&token)).await).await;
    assert_eq!(notifications["data"][0]["message"], "Task completed: Call Acme");

    let json = body_json(app.post_empty(&format!("/tasks/{id}/toggle"), Some(&token)).await).await;
    assert_eq!(json["data"]["status"], "pending");
}

#[tokio::test]
async fn tasks_are_private() {
    let app = build_test_app();
    let anna = app.login_as("anna", UserRole::User).await;
    let marek = app.login_as("marek", UserRole::User).await;

    let json = body_json(
        app.post(
            "/tasks",
            Some(&anna),
            json!({ "title": "Call Acme", "date": "2024-03-01", "time": "09:30:00" }),
        )
        .await,
    )
    .await;
    let id = json["data"]["id"].as_str().unwrap();

    let response = app.post_empty(&format!("/tasks/{id}/toggle"), Some(&marek)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.delete(&format!("/tasks/{id}"), Some(&marek)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Contractors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn contractor_crud() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;

    let response = app
        .post(
            "/contractors",
            Some(&token),
            json!({ "name": "Acme", "email": "biuro@acme.pl", "phone": "500600700", "nip": "5250001009" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .put(
            &format!("/contractors/{id}"),
            Some(&token),
            json!({ "status": "inactive" }),
        )
        .await;
    assert_eq!(body_json(response).await["data"]["status"], "inactive");

    let json = body_json(app.get("/contractors?status=active", Some(&token)).await).await;
    assert_eq!(json["pagination"]["totalItems"], 0);

    let response = app.delete(&format!("/contractors/{id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.get(&format!("/contractors/{id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.delete(&format!("/contractors/{id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
