//! Notification routes
//!
//! Every endpoint is scoped to the caller's own notifications.

use axum::extract::{Path, Query, State};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{DataResponse, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::notifications::{
    MarkAllReadResponse, Notification, NotificationQuery, UnreadCountResponse,
};
use crate::error::ApiResult;

/// GET /notifications
///
/// Newest first.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<NotificationQuery>,
) -> ApiResult<Paginated<Notification>> {
    let unread_only = filter.unread_only.unwrap_or(false);
    let notifications = state
        .store
        .list_notifications(auth.user_id)
        .await?
        .into_iter()
        .filter(|n| !unread_only || !n.read)
        .collect();

    Ok(Paginated::from_vec(notifications, &pagination))
}

/// GET /notifications/unread-count
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> ApiResult<DataResponse<UnreadCountResponse>> {
    let count = state
        .store
        .list_notifications(auth.user_id)
        .await?
        .iter()
        .filter(|n| !n.read)
        .count() as u64;

    Ok(DataResponse::new(UnreadCountResponse { count }))
}

/// POST /notifications/:id/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<DataResponse<Notification>> {
    let notification = state.store.mark_notification_read(auth.user_id, id).await?;
    Ok(DataResponse::new(notification))
}

/// POST /notifications/read-all
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> ApiResult<DataResponse<MarkAllReadResponse>> {
    let updated = state.store.mark_all_notifications_read(auth.user_id).await?;
    tracing::debug!(user_id = %auth.user_id, updated, "Notifications marked read");
    Ok(DataResponse::new(MarkAllReadResponse { updated }))
}
