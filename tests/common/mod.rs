#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::ServiceExt;

use crm_backend::app::{create_app, AppState};
use crm_backend::auth::password::hash_password;
use crm_backend::auth::{CaptchaError, CaptchaVerifier};
use crm_backend::config::Settings;
use crm_backend::domain::users::{User, UserRole};
use crm_backend::services::mailer::{DeliveryError, MailTransport, OutgoingMail};
use crm_backend::store::{MemoryStore, Store};

pub const CAPTCHA_OK: &str = "captcha-ok";
pub const PASSWORD: &str = "s3cret-pass";

// ---------------------------------------------------------------------------
// Collaborator stubs
// ---------------------------------------------------------------------------

/// Accepts exactly one token value.
pub struct StubCaptcha;

#[async_trait]
impl CaptchaVerifier for StubCaptcha {
    async fn verify(&self, token: &str) -> Result<(), CaptchaError> {
        if token == CAPTCHA_OK {
            Ok(())
        } else {
            Err(CaptchaError::Rejected(vec!["invalid-input-response".into()]))
        }
    }
}

/// Records every message; fails on demand.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub fail: AtomicBool,
}

impl RecordingMailer {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Rejected("relay unavailable".into()));
        }
        self.sent.lock().push(mail.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Test application
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn Store>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_settings() -> Settings {
    Settings {
        jwt_secret: "integration-test-secret".into(),
        notification_retention_limit: 50,
        ..Settings::default()
    }
}

/// Full router over an in-memory store with a working mail transport.
pub fn build_test_app() -> TestApp {
    build_app_with_mailer(true)
}

pub fn build_app_with_mailer(with_mailer: bool) -> TestApp {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let transport: Option<Arc<dyn MailTransport>> = if with_mailer {
        Some(mailer.clone())
    } else {
        None
    };

    let state = AppState::new(test_settings(), store.clone(), Arc::new(StubCaptcha), transport);

    TestApp {
        router: create_app(state),
        store,
        mailer,
    }
}

impl TestApp {
    pub async fn create_user(&self, username: &str, role: UserRole) -> User {
        let hash = hash_password(PASSWORD).expect("hashing should succeed");
        self.store
            .insert_user(User::new(
                username.to_string(),
                hash,
                role,
                format!("{username}@example.com"),
            ))
            .await
            .expect("user insert should succeed")
    }

    /// Create a user and log in through the API, returning the bearer token.
    pub async fn login_as(&self, username: &str, role: UserRole) -> String {
        self.create_user(username, role).await;
        let response = self
            .post(
                "/auth/login",
                None,
                json!({ "username": username, "password": PASSWORD, "captchaToken": CAPTCHA_OK }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        json["data"]["accessToken"]
            .as_str()
            .expect("access token")
            .to_string()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("request should build"))
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn post_empty(&self, uri: &str, token: Option<&str>) -> Response {
        self.request(Method::POST, uri, token, None).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        self.request(Method::DELETE, uri, token, None).await
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
