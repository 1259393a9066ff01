//! User management routes (administrators only)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::api::{Created, DataResponse, NoContent, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::password::hash_password;
use crate::auth::RequireAdmin;
use crate::domain::users::{CreateUserRequest, UpdateUserRequest, User, UserResponse};
use crate::error::{ApiError, ApiResult};

fn hash(password: &str) -> ApiResult<String> {
    hash_password(password).map_err(|e| ApiError::internal(format!("Password hashing failed: {e}")))
}

async fn load(state: &AppState, id: Uuid) -> ApiResult<User> {
    state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Paginated<UserResponse>> {
    let users = state
        .store
        .list_users()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Paginated::from_vec(users, &pagination))
}

/// POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    admin: RequireAdmin,
    Json(mut req): Json<CreateUserRequest>,
) -> ApiResult<Created<DataResponse<UserResponse>>> {
    // Length rules apply to the stored (trimmed) name
    req.username = req.username.trim().to_string();
    req.validate()?;

    let user = User::new(
        req.username,
        hash(&req.password)?,
        req.role,
        req.email.trim().to_string(),
    );
    let user = state.store.insert_user(user).await?;

    tracing::info!(
        admin_id = %admin.user_id,
        user_id = %user.id,
        role = %user.role,
        "User created"
    );

    Ok(Created(DataResponse::new(user.into())))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<DataResponse<UserResponse>> {
    Ok(DataResponse::new(load(&state, id).await?.into()))
}

/// PUT /users/:id
///
/// A new password is re-hashed before it is stored.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(mut req): Json<UpdateUserRequest>,
) -> ApiResult<DataResponse<UserResponse>> {
    req.username = req.username.map(|u| u.trim().to_string());
    req.validate()?;
    let mut user = load(&state, id).await?;

    if admin.user_id == id && req.role.is_some_and(|r| r != user.role) {
        return Err(ApiError::bad_request("You cannot change your own role"));
    }

    if let Some(username) = req.username {
        user.username = username;
    }
    if let Some(password) = req.password {
        user.password_hash = hash(&password)?;
    }
    if let Some(role) = req.role {
        user.role = role;
    }
    if let Some(email) = req.email {
        user.email = email.trim().to_string();
    }
    user.updated_at = Utc::now();

    let user = state.store.update_user(user).await?;
    tracing::info!(admin_id = %admin.user_id, user_id = %user.id, "User updated");

    Ok(DataResponse::new(user.into()))
}

/// DELETE /users/:id
///
/// Records owned by the user are kept.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<NoContent> {
    if admin.user_id == id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    state.store.delete_user(id).await?;
    tracing::info!(admin_id = %admin.user_id, user_id = %id, "User deleted");

    Ok(NoContent)
}
