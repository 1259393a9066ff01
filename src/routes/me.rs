use axum::extract::State;
use std::sync::Arc;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::users::UserResponse;
use crate::error::{ApiError, ApiResult};

/// GET /me
///
/// Current authenticated user.
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> ApiResult<DataResponse<UserResponse>> {
    let user = state
        .store
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".into()))?;

    Ok(DataResponse::new(user.into()))
}
