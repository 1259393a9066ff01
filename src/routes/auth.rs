//! Authentication routes
//!
//! Login checks the CAPTCHA first, then the password. Every failure produces
//! the same response; the failing factor only shows up in the logs.

use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::auth::password::{verify_password, verify_unknown_user};
use crate::domain::users::{LoginRequest, LoginResponse};
use crate::error::{ApiError, ApiResult};

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".into())
}

/// POST /auth/login
///
/// Exchange username, password and CAPTCHA token for a session token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<DataResponse<LoginResponse>> {
    req.validate()?;
    let username = req.username.trim();

    if let Err(e) = state.captcha.verify(&req.captcha_token).await {
        tracing::warn!(username = %username, error = %e, "Login rejected: CAPTCHA");
        return Err(invalid_credentials());
    }

    let Some(user) = state.store.find_user_by_username(username).await? else {
        verify_unknown_user(&req.password);
        tracing::warn!(username = %username, "Login rejected: unknown user");
        return Err(invalid_credentials());
    };

    match verify_password(&req.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(invalid_credentials());
        }
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
            return Err(invalid_credentials());
        }
    }

    let issued = state.sessions.issue(&user)?;
    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(DataResponse::new(LoginResponse {
        access_token: issued.token,
        token_type: "Bearer",
        expires_at: issued.expires_at,
        user: user.into(),
    }))
}
