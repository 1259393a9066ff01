//! Email composition, delivery and inbox handling.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_app_with_mailer, build_test_app};
use crm_backend::domain::users::UserRole;
use serde_json::json;

#[tokio::test]
async fn compose_delivers_immediately() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;

    let response = app
        .post(
            "/emails",
            Some(&token),
            json!({ "to": "client@example.com", "subject": "Hello", "content": "Hi there" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "sent");
    assert!(json["data"]["sentAt"].is_string());
    assert_eq!(json["delivery"]["status"], "delivered");
    assert_eq!(app.mailer.sent_count(), 1);
}

#[tokio::test]
async fn failed_delivery_is_recorded_and_retryable() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;

    app.mailer.set_failing(true);
    let json = body_json(
        app.post(
            "/emails",
            Some(&token),
            json!({ "to": "client@example.com", "subject": "Hello" }),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["status"], "failed");
    assert_eq!(json["data"]["error"], "relay unavailable");
    let id = json["data"]["id"].as_str().unwrap().to_string();

    // Retry while the relay is still down
    let response = app.post_empty(&format!("/emails/{id}/send"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "DELIVERY_FAILED");

    app.mailer.set_failing(false);
    let response = app.post_empty(&format!("/emails/{id}/send"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "sent");

    // Sent is final
    let response = app.post_empty(&format!("/emails/{id}/send"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let notifications = body_json(app.get("/notifications", Some(&token)).await).await;
    let errors = notifications["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["type"] == "error")
        .count();
    assert_eq!(errors, 2);
}

#[tokio::test]
async fn without_transport_email_stays_draft() {
    let app = build_app_with_mailer(false);
    let token = app.login_as("anna", UserRole::User).await;

    let json = body_json(
        app.post(
            "/emails",
            Some(&token),
            json!({ "to": "client@example.com", "subject": "Hello" }),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["status"], "draft");
    assert_eq!(json["delivery"]["status"], "not_configured");
}

#[tokio::test]
async fn explicit_draft_is_not_delivered() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;

    let json = body_json(
        app.post(
            "/emails",
            Some(&token),
            json!({ "to": "client@example.com", "subject": "Later", "draft": true }),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["status"], "draft");
    assert!(json["delivery"].is_null());
    assert_eq!(app.mailer.sent_count(), 0);
}

#[tokio::test]
async fn received_email_can_be_marked_read() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;

    let json = body_json(
        app.post(
            "/emails",
            Some(&token),
            json!({
                "to": "anna@example.com",
                "from": "client@example.com",
                "subject": "Question",
                "type": "received"
            }),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["read"], false);
    assert_eq!(app.mailer.sent_count(), 0);
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let response = app.post_empty(&format!("/emails/{id}/read"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["read"], true);
    assert!(json["data"]["readAt"].is_string());

    let response = app.post_empty(&format!("/emails/{id}/send"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn emails_are_private() {
    let app = build_test_app();
    let anna = app.login_as("anna", UserRole::User).await;
    let marek = app.login_as("marek", UserRole::User).await;

    let json = body_json(
        app.post(
            "/emails",
            Some(&anna),
            json!({ "to": "client@example.com", "subject": "Hello", "draft": true }),
        )
        .await,
    )
    .await;
    let id = json["data"]["id"].as_str().unwrap();

    let response = app.get(&format!("/emails/{id}"), Some(&marek)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let list = body_json(app.get("/emails", Some(&marek)).await).await;
    assert_eq!(list["pagination"]["totalItems"], 0);
}

#[tokio::test]
async fn invalid_recipient_is_rejected() {
    let app = build_test_app();
    let token = app.login_as("anna", UserRole::User).await;

    let response = app
        .post("/emails", Some(&token), json!({ "to": "nope", "subject": "Hello" }))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["fields"]["to"].is_array());
}
