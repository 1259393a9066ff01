use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub storage: String,
    pub mail: String,
}

/// Health check endpoint - public
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let storage = state.store.health_check().await;
    if let Err(e) = &storage {
        tracing::error!(error = %e, "Storage health check failed");
    }

    // Mail is optional; storage is critical
    let (status, status_code) = if storage.is_ok() {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    let mail = if state.mailer.is_some() {
        "configured"
    } else {
        "disabled"
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealth {
                storage: if storage.is_ok() { "ok" } else { "error" }.to_string(),
                mail: mail.to_string(),
            },
        }),
    )
}
