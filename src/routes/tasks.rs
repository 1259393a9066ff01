//! Task routes
//!
//! Tasks are private to the user who created them; other users' tasks read
//! as not found.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::api::{Created, DataResponse, NoContent, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::tasks::{CreateTaskRequest, Task, TaskQuery, TaskStatus, UpdateTaskRequest};
use crate::error::{ApiError, ApiResult};
use crate::services::workflow::ensure_transition;

async fn load_owned(state: &AppState, user_id: Uuid, id: Uuid) -> ApiResult<Task> {
    state
        .store
        .get_task(id)
        .await?
        .filter(|t| t.user_id == user_id)
        .ok_or_else(|| ApiError::not_found(format!("Task {} not found", id)))
}

/// Persist a guarded status change and emit the completion notification.
async fn save_with_status(state: &AppState, mut task: Task, to: TaskStatus) -> ApiResult<Task> {
    ensure_transition(task.status, to)?;
    task.status = to;
    task.updated_at = chrono::Utc::now();
    let task = state.store.update_task(task).await?;

    tracing::info!(task_id = %task.id, status = %task.status, "Task status changed");
    if task.status == TaskStatus::Completed {
        state.notifier.task_completed(task.user_id, &task.title).await;
    }
    Ok(task)
}

/// GET /tasks
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<TaskQuery>,
) -> ApiResult<Paginated<Task>> {
    let mut tasks: Vec<Task> = state
        .store
        .list_tasks(auth.user_id)
        .await?
        .into_iter()
        .filter(|t| filter.status.map_or(true, |s| t.status == s))
        .filter(|t| filter.date.map_or(true, |d| t.date == d))
        .collect();
    tasks.sort_by_key(|t| (t.date, t.time));

    Ok(Paginated::from_vec(tasks, &pagination))
}

/// POST /tasks
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Created<DataResponse<Task>>> {
    req.validate()?;

    let task = state.store.insert_task(Task::new(auth.user_id, req)).await?;

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task created");
    state.notifier.task_created(auth.user_id, &task.title).await;

    Ok(Created(DataResponse::new(task)))
}

/// GET /tasks/:id
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<DataResponse<Task>> {
    Ok(DataResponse::new(load_owned(&state, auth.user_id, id).await?))
}

/// PUT /tasks/:id
///
/// A `status` in the body goes through the same guard as the toggle endpoint.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<DataResponse<Task>> {
    req.validate()?;

    let mut task = load_owned(&state, auth.user_id, id).await?;
    task.apply(&req);

    let task = match req.status {
        Some(to) if to != task.status => save_with_status(&state, task, to).await?,
        _ => state.store.update_task(task).await?,
    };

    tracing::info!(user_id = %auth.user_id, task_id = %id, "Task updated");
    Ok(DataResponse::new(task))
}

/// POST /tasks/:id/toggle
///
/// Flip between pending and completed.
pub async fn toggle_task(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<DataResponse<Task>> {
    let task = load_owned(&state, auth.user_id, id).await?;
    let to = task.status.toggled();
    Ok(DataResponse::new(save_with_status(&state, task, to).await?))
}

/// DELETE /tasks/:id
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<NoContent> {
    load_owned(&state, auth.user_id, id).await?;
    state.store.delete_task(id).await?;
    tracing::info!(user_id = %auth.user_id, task_id = %id, "Task deleted");
    Ok(NoContent)
}
