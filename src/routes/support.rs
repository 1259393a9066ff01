//! Support ticket routes

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
use crate::auth::RequireAuth;
use crate::domain::support::{
    CreateTicketRequest, SupportTicket, TicketQuery, TicketStatus, TicketStatusRequest,
    UpdateTicketRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::services::workflow::ensure_transition;

async fn load(state: &AppState, id: Uuid) -> ApiResult<SupportTicket> {
    state
        .store
        .get_ticket(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Support ticket {} not found", id)))
}

/// GET /support
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<TicketQuery>,
) -> ApiResult<Paginated<SupportTicket>> {
    let tickets = state
        .store
        .list_tickets()
        .await?
        .into_iter()
        .filter(|t| filter.status.map_or(true, |s| t.status == s))
        .filter(|t| filter.priority.map_or(true, |p| t.priority == p))
        .collect();

    Ok(Paginated::from_vec(tickets, &pagination))
}

/// POST /support
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(req): Json<CreateTicketRequest>,
) -> ApiResult<Created<DataResponse<SupportTicket>>> {
    req.validate()?;

    let ticket = state.store.insert_ticket(SupportTicket::new(req)).await?;

    tracing::info!(
        user_id = %auth.user_id,
        ticket_id = %ticket.id,
        priority = %ticket.priority,
        "Support ticket opened"
    );
    state.notifier.ticket_opened(auth.user_id, &ticket.user).await;

    Ok(Created(DataResponse::new(ticket)))
}

/// GET /support/:id
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<DataResponse<SupportTicket>> {
    Ok(DataResponse::new(load(&state, id).await?))
}

/// PUT /support/:id
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTicketRequest>,
) -> ApiResult<DataResponse<SupportTicket>> {
    req.validate()?;

    let mut ticket = load(&state, id).await?;
    ticket.apply(req);
    let ticket = state.store.update_ticket(ticket).await?;

    tracing::info!(user_id = %auth.user_id, ticket_id = %id, "Support ticket updated");
    Ok(DataResponse::new(ticket))
}

/// POST /support/:id/status
///
/// Tickets only move forward; resolved is final.
pub async fn change_ticket_status(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<TicketStatusRequest>,
) -> ApiResult<DataResponse<SupportTicket>> {
    let mut ticket = load(&state, id).await?;
    ensure_transition(ticket.status, req.status)?;

    let now = Utc::now();
    ticket.status = req.status;
    if req.status == TicketStatus::Resolved {
        ticket.resolved_at = Some(now);
    }
    ticket.updated_at = now;
    let ticket = state.store.update_ticket(ticket).await?;

    tracing::info!(
        user_id = %auth.user_id,
        ticket_id = %id,
        status = %ticket.status,
        "Support ticket status changed"
    );
    if ticket.status == TicketStatus::Resolved {
        state.notifier.ticket_resolved(auth.user_id, &ticket.user).await;
    }

    Ok(DataResponse::new(ticket))
}

/// DELETE /support/:id
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<NoContent> {
    state.store.delete_ticket(id).await?;
    tracing::info!(user_id = %auth.user_id, ticket_id = %id, "Support ticket deleted");
    Ok(NoContent)
}
