//! Email routes
//!
//! Outgoing mail is stored first and delivered afterwards, so a delivery
//! failure leaves a `failed` record behind instead of losing the message.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::api::{Created, DataResponse, NoContent, OutcomeResponse, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::emails::{CreateEmailRequest, Email, EmailQuery, EmailStatus, EmailType};
use crate::error::{ApiError, ApiResult};
use crate::services::mailer::{deliver, DeliveryOutcome, OutgoingMail};
use crate::services::workflow::{ensure_transition, TransitionError};

async fn load_owned(state: &AppState, user_id: Uuid, id: Uuid) -> ApiResult<Email> {
    state
        .store
        .get_email(id)
        .await?
        .filter(|e| e.user_id == user_id)
        .ok_or_else(|| ApiError::not_found(format!("Email {} not found", id)))
}

fn outgoing(email: &Email) -> OutgoingMail {
    OutgoingMail {
        to: email.to.clone(),
        subject: email.subject.clone(),
        content: email.content.clone().unwrap_or_default(),
    }
}

/// Record a delivery attempt on the email. `NotConfigured` and `Skipped`
/// leave the status untouched.
fn record_delivery(email: &mut Email, outcome: &DeliveryOutcome) -> Result<(), TransitionError> {
    let now = Utc::now();
    match outcome {
        DeliveryOutcome::Delivered => {
            ensure_transition(email.status, EmailStatus::Sent)?;
            email.status = EmailStatus::Sent;
            email.sent_at = Some(now);
            email.error = None;
        }
        DeliveryOutcome::Failed { reason } => {
            ensure_transition(email.status, EmailStatus::Failed)?;
            email.status = EmailStatus::Failed;
            email.error = Some(reason.clone());
        }
        DeliveryOutcome::NotConfigured | DeliveryOutcome::Skipped { .. } => return Ok(()),
    }
    email.updated_at = now;
    Ok(())
}

/// Deliver a stored outgoing email and persist the result.
async fn attempt_delivery(state: &AppState, mut email: Email) -> ApiResult<(Email, DeliveryOutcome)> {
    let outcome = deliver(state.mail_transport(), &outgoing(&email)).await;
    record_delivery(&mut email, &outcome)?;

    let email = if matches!(outcome, DeliveryOutcome::Delivered | DeliveryOutcome::Failed { .. }) {
        state.store.update_email(email).await?
    } else {
        email
    };

    if let Some(reason) = outcome.failure_reason() {
        state
            .notifier
            .email_failed(email.user_id, &email.to, reason)
            .await;
    }

    Ok((email, outcome))
}

/// GET /emails
///
/// Newest first.
pub async fn list_emails(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<EmailQuery>,
) -> ApiResult<Paginated<Email>> {
    let mut emails: Vec<Email> = state
        .store
        .list_emails(auth.user_id)
        .await?
        .into_iter()
        .filter(|e| filter.email_type.map_or(true, |t| e.email_type == t))
        .filter(|e| filter.status.map_or(true, |s| e.status == s))
        .collect();
    emails.reverse();

    Ok(Paginated::from_vec(emails, &pagination))
}

/// POST /emails
///
/// Compose an outgoing email (delivered immediately unless `draft` is set)
/// or record a received one.
pub async fn create_email(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(req): Json<CreateEmailRequest>,
) -> ApiResult<Created<OutcomeResponse<Email, Option<DeliveryOutcome>>>> {
    req.validate()?;
    let keep_draft = req.draft;

    let email = state.store.insert_email(Email::new(auth.user_id, req)).await?;
    tracing::info!(
        user_id = %auth.user_id,
        email_id = %email.id,
        email_type = %email.email_type,
        "Email stored"
    );

    if !email.is_outgoing() || keep_draft {
        return Ok(Created(OutcomeResponse {
            data: email,
            delivery: None,
        }));
    }

    let (email, outcome) = attempt_delivery(&state, email).await?;
    Ok(Created(OutcomeResponse {
        data: email,
        delivery: Some(outcome),
    }))
}

/// GET /emails/:id
pub async fn get_email(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<DataResponse<Email>> {
    Ok(DataResponse::new(load_owned(&state, auth.user_id, id).await?))
}

/// POST /emails/:id/send
///
/// Deliver a draft or retry a failed email.
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<DataResponse<Email>> {
    let email = load_owned(&state, auth.user_id, id).await?;
    if !email.is_outgoing() {
        return Err(ApiError::bad_request("Received emails cannot be sent"));
    }
    ensure_transition(email.status, EmailStatus::Sent)?;

    let (email, outcome) = attempt_delivery(&state, email).await?;
    match outcome {
        DeliveryOutcome::Delivered => Ok(DataResponse::new(email)),
        DeliveryOutcome::Failed { reason } => Err(ApiError::Delivery(reason)),
        DeliveryOutcome::NotConfigured => Err(ApiError::Delivery(
            "Outgoing mail is not configured".into(),
        )),
        DeliveryOutcome::Skipped { reason } => Err(ApiError::Delivery(reason)),
    }
}

/// POST /emails/:id/read
pub async fn mark_email_read(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<DataResponse<Email>> {
    let mut email = load_owned(&state, auth.user_id, id).await?;
    if email.email_type != EmailType::Received {
        return Err(ApiError::bad_request("Only received emails have a read state"));
    }
    if email.read {
        return Ok(DataResponse::new(email));
    }

    let now = Utc::now();
    email.read = true;
    email.read_at = Some(now);
    email.updated_at = now;

    Ok(DataResponse::new(state.store.update_email(email).await?))
}

/// DELETE /emails/:id
pub async fn delete_email(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<NoContent> {
    load_owned(&state, auth.user_id, id).await?;
    state.store.delete_email(id).await?;
    tracing::info!(user_id = %auth.user_id, email_id = %id, "Email deleted");
    Ok(NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> Email {
        Email::new(
            Uuid::new_v4(),
            CreateEmailRequest {
                to: "client@example.com".into(),
                from: None,
                subject: "Hello".into(),
                content: None,
                email_type: EmailType::Sent,
                draft: false,
            },
        )
    }

    #[test]
    fn delivered_sets_sent_at() {
        let mut email = draft();
        record_delivery(&mut email, &DeliveryOutcome::Delivered).unwrap();
        assert_eq!(email.status, EmailStatus::Sent);
        assert!(email.sent_at.is_some());
    }

    #[test]
    fn failure_keeps_reason() {
        let mut email = draft();
        let outcome = DeliveryOutcome::Failed {
            reason: "relay down".into(),
        };
        record_delivery(&mut email, &outcome).unwrap();
        assert_eq!(email.status, EmailStatus::Failed);
        assert_eq!(email.error.as_deref(), Some("relay down"));
    }

    #[test]
    fn unconfigured_transport_leaves_draft() {
        let mut email = draft();
        record_delivery(&mut email, &DeliveryOutcome::NotConfigured).unwrap();
        assert_eq!(email.status, EmailStatus::Draft);
    }

    #[test]
    fn sent_email_cannot_be_delivered_again() {
        let mut email = draft();
        record_delivery(&mut email, &DeliveryOutcome::Delivered).unwrap();
        assert!(record_delivery(&mut email, &DeliveryOutcome::Delivered).is_err());
    }
}
