//! Contractor routes

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
use crate::domain::contractors::{
    Contractor, ContractorQuery, CreateContractorRequest, UpdateContractorRequest,
};
use crate::error::{ApiError, ApiResult};

async fn load(state: &AppState, id: Uuid) -> ApiResult<Contractor> {
    state
        .store
        .get_contractor(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Contractor {} not found", id)))
}

/// GET /contractors
pub async fn list_contractors(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ContractorQuery>,
) -> ApiResult<Paginated<Contractor>> {
    let contractors = state
        .store
        .list_contractors()
        .await?
        .into_iter()
        .filter(|c| filter.status.map_or(true, |s| c.status == s))
        .collect();

    Ok(Paginated::from_vec(contractors, &pagination))
}

/// POST /contractors
pub async fn create_contractor(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(req): Json<CreateContractorRequest>,
) -> ApiResult<Created<DataResponse<Contractor>>> {
    req.validate()?;

    let contractor = state.store.insert_contractor(Contractor::new(req)).await?;

    tracing::info!(
        user_id = %auth.user_id,
        contractor_id = %contractor.id,
        name = %contractor.name,
        "Contractor created"
    );
    state
        .notifier
        .contractor_created(auth.user_id, &contractor.name)
        .await;

    Ok(Created(DataResponse::new(contractor)))
}

/// GET /contractors/:id
pub async fn get_contractor(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<DataResponse<Contractor>> {
    Ok(DataResponse::new(load(&state, id).await?))
}

/// PUT /contractors/:id
pub async fn update_contractor(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateContractorRequest>,
) -> ApiResult<DataResponse<Contractor>> {
    req.validate()?;

    let mut contractor = load(&state, id).await?;
    contractor.apply(req);
    let contractor = state.store.update_contractor(contractor).await?;

    tracing::info!(user_id = %auth.user_id, contractor_id = %id, "Contractor updated");
    Ok(DataResponse::new(contractor))
}

/// DELETE /contractors/:id
pub async fn delete_contractor(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<NoContent> {
    state.store.delete_contractor(id).await?;
    tracing::info!(user_id = %auth.user_id, contractor_id = %id, "Contractor deleted");
    Ok(NoContent)
}
