use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use super::AuthContext;
use crate::app::AppState;
use crate::error::ErrorResponse;

/// Extractor that requires a valid session token
///
/// Example:
/// ```ignore
/// async fn protected_route(auth: RequireAuth) -> impl IntoResponse {
///     format!("Hello, user {}", auth.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthContext);

impl std::ops::Deref for RequireAuth {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extractor that requires a valid session token with the admin role
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthContext);

impl std::ops::Deref for RequireAdmin {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidFormat,
    InvalidToken,
    NotAdmin,
    Internal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing authorization token",
            ),
            AuthError::InvalidFormat => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid authorization format",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or expired token",
            ),
            AuthError::NotAdmin => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Administrator role required",
            ),
            AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred",
            ),
        };

        let body = ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            fields: None,
        };

        (status, Json(body)).into_response()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    if e.is_missing() {
                        AuthError::MissingToken
                    } else {
                        AuthError::InvalidFormat
                    }
                })?;

        let token = bearer.token();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let claims = state.sessions.verify(token).map_err(|e| {
            tracing::warn!(error = %e, "Session token verification failed");
            AuthError::InvalidToken
        })?;

        let mut context = AuthContext::from_claims(&claims).map_err(|e| {
            tracing::warn!(error = %e, "Failed to build auth context");
            AuthError::InvalidToken
        })?;

        // Tokens outlive role changes and deletions; the stored user wins.
        let user = state
            .store
            .get_user(context.user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to load session user");
                AuthError::Internal
            })?
            .ok_or_else(|| {
                tracing::warn!(user_id = %context.user_id, "Session user no longer exists");
                AuthError::InvalidToken
            })?;
        context.username = user.username;
        context.role = user.role;

        Ok(RequireAuth(context))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(context) = RequireAuth::from_request_parts(parts, state).await?;

        if !context.is_admin() {
            tracing::warn!(user_id = %context.user_id, "Admin route denied");
            return Err(AuthError::NotAdmin);
        }

        Ok(RequireAdmin(context))
    }
}
