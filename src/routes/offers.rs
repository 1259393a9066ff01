//! Offer routes
//!
//! The gross amount is always derived server-side. Open offers whose
//! `validUntil` has passed are moved to expired when they are read.

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
use crate::domain::offers::{
    CalculateOfferRequest, CreateOfferRequest, Offer, OfferQuery, OfferStatus, OfferStatusRequest,
    UpdateOfferRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::services::mailer::{deliver, DeliveryOutcome, OutgoingMail};
use crate::services::pricing::{breakdown, calculate_final_amount, PricingBreakdown};
use crate::services::workflow::ensure_transition;

/// Persist the expiry of an open offer past its validity date.
async fn expire_if_due(state: &AppState, user_id: Uuid, mut offer: Offer) -> ApiResult<Offer> {
    if !offer.is_past_validity(Utc::now().date_naive()) {
        return Ok(offer);
    }

    ensure_transition(offer.status, OfferStatus::Expired)?;
    offer.status = OfferStatus::Expired;
    offer.updated_at = Utc::now();
    let offer = state.store.update_offer(offer).await?;

    tracing::info!(offer_id = %offer.id, valid_until = ?offer.valid_until, "Offer expired");
    state.notifier.offer_decided(user_id, &offer).await;
    Ok(offer)
}

async fn load(state: &AppState, user_id: Uuid, id: Uuid) -> ApiResult<Offer> {
    let offer = state
        .store
        .get_offer(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Offer {} not found", id)))?;
    expire_if_due(state, user_id, offer).await
}

fn offer_mail(to: String, offer: &Offer) -> OutgoingMail {
    let mut content = format!(
        "Dear {},\n\nplease find our offer \"{}\" below.\n\n",
        offer.contractor_name, offer.title
    );
    if let Some(description) = &offer.description {
        content.push_str(description);
        content.push_str("\n\n");
    }
    content.push_str(&format!(
        "Net amount: {} {}\nDiscount: {}%\nVAT: {}%\nTotal: {} {}\nPayment terms: {}\n",
        offer.amount,
        offer.currency,
        offer.discount_percent,
        offer.vat_rate,
        offer.final_amount,
        offer.currency,
        offer.payment_terms
    ));
    if let Some(valid_until) = offer.valid_until {
        content.push_str(&format!("Valid until: {}\n", valid_until));
    }

    OutgoingMail {
        to,
        subject: format!("Offer: {}", offer.title),
        content,
    }
}

/// GET /offers
pub async fn list_offers(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<OfferQuery>,
) -> ApiResult<Paginated<Offer>> {
    let mut offers = Vec::new();
    for offer in state.store.list_offers().await? {
        let offer = expire_if_due(&state, auth.user_id, offer).await?;
        if filter.status.map_or(true, |s| offer.status == s) {
            offers.push(offer);
        }
    }

    Ok(Paginated::from_vec(offers, &pagination))
}

/// POST /offers
pub async fn create_offer(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(req): Json<CreateOfferRequest>,
) -> ApiResult<Created<DataResponse<Offer>>> {
    req.validate()?;

    let final_amount = calculate_final_amount(req.amount, req.discount_percent, req.vat_rate)?;
    let offer = state.store.insert_offer(Offer::new(req, final_amount)).await?;

    tracing::info!(
        user_id = %auth.user_id,
        offer_id = %offer.id,
        final_amount = offer.final_amount,
        "Offer created"
    );
    state.notifier.offer_created(auth.user_id, &offer).await;

    Ok(Created(DataResponse::new(offer)))
}

/// POST /offers/calculate
///
/// Pricing preview without storing anything.
pub async fn calculate_offer(
    _auth: RequireAuth,
    Json(req): Json<CalculateOfferRequest>,
) -> ApiResult<DataResponse<PricingBreakdown>> {
    Ok(DataResponse::new(breakdown(
        req.amount,
        req.discount_percent,
        req.vat_rate,
    )?))
}

/// GET /offers/:id
pub async fn get_offer(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<DataResponse<Offer>> {
    Ok(DataResponse::new(load(&state, auth.user_id, id).await?))
}

/// PUT /offers/:id
///
/// The gross amount is re-derived from the updated pricing inputs.
pub async fn update_offer(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOfferRequest>,
) -> ApiResult<DataResponse<Offer>> {
    req.validate()?;

    let mut offer = load(&state, auth.user_id, id).await?;
    offer.apply(req);
    offer.final_amount =
        calculate_final_amount(offer.amount, offer.discount_percent, offer.vat_rate)?;
    let offer = state.store.update_offer(offer).await?;

    tracing::info!(user_id = %auth.user_id, offer_id = %id, "Offer updated");
    Ok(DataResponse::new(offer))
}

/// POST /offers/:id/status
///
/// Accept, reject or expire an offer. Sending has its own endpoint.
pub async fn change_offer_status(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<OfferStatusRequest>,
) -> ApiResult<DataResponse<Offer>> {
    if req.status == OfferStatus::Sent {
        return Err(ApiError::bad_request(
            "Use POST /offers/:id/send to send an offer",
        ));
    }

    let mut offer = load(&state, auth.user_id, id).await?;
    ensure_transition(offer.status, req.status)?;

    let from = offer.status;
    offer.status = req.status;
    offer.updated_at = Utc::now();
    let offer = state.store.update_offer(offer).await?;

    tracing::info!(
        user_id = %auth.user_id,
        offer_id = %id,
        from = %from,
        to = %offer.status,
        "Offer status changed"
    );
    state.notifier.offer_decided(auth.user_id, &offer).await;

    Ok(DataResponse::new(offer))
}

/// POST /offers/:id/send
///
/// Marks the offer as sent, then emails it to the contractor with the same
/// name. The delivery outcome is reported next to the offer; a failed
/// delivery does not undo the status change.
pub async fn send_offer(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<OutcomeResponse<Offer, DeliveryOutcome>> {
    let mut offer = load(&state, auth.user_id, id).await?;
    let from = offer.status;
    ensure_transition(from, OfferStatus::Sent)?;

    let now = Utc::now();
    offer.status = OfferStatus::Sent;
    offer.sent_at = Some(now);
    offer.updated_at = now;
    // Only the request that moves the offer out of `from` gets to email it.
    let offer = state
        .store
        .update_offer_if_status(offer, from)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict(format!("Offer {} was changed by another request", id))
        })?;

    tracing::info!(user_id = %auth.user_id, offer_id = %id, "Offer marked as sent");

    let recipient = state
        .store
        .list_contractors()
        .await?
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(&offer.contractor_name))
        .map(|c| c.email)
        .filter(|email| !email.trim().is_empty());

    let delivery = match recipient {
        Some(to) => deliver(state.mail_transport(), &offer_mail(to, &offer)).await,
        None => DeliveryOutcome::Skipped {
            reason: format!("No contractor email found for {}", offer.contractor_name),
        },
    };

    state.notifier.offer_sent(auth.user_id, &offer, &delivery).await;

    Ok(OutcomeResponse {
        data: offer,
        delivery,
    })
}

/// DELETE /offers/:id
pub async fn delete_offer(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<NoContent> {
    state.store.delete_offer(id).await?;
    tracing::info!(user_id = %auth.user_id, offer_id = %id, "Offer deleted");
    Ok(NoContent)
}
