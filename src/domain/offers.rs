//! Offer domain types
//!
//! Sales offers addressed to a contractor. `final_amount` is derived from the
//! net amount, discount and VAT by the pricing calculator and stored with the
//! record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{patch, patch_opt, text_enum};

pub const DEFAULT_VAT_RATE: i64 = 23;
pub const DEFAULT_CURRENCY: &str = "PLN";
pub const DEFAULT_PAYMENT_TERMS: &str = "14 days";
pub const DEFAULT_CATEGORY: &str = "services";

/// Offer status enum
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

text_enum!(OfferStatus {
    Draft => "draft",
    Sent => "sent",
    Accepted => "accepted",
    Rejected => "rejected",
    Expired => "expired",
});

impl OfferStatus {
    pub const ALL: [OfferStatus; 5] = [
        Self::Draft,
        Self::Sent,
        Self::Accepted,
        Self::Rejected,
        Self::Expired,
    ];

    /// Draft and sent offers are still in the sales pipeline.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Draft | Self::Sent)
    }
}

/// Offer entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    pub contractor_name: String,
    pub title: String,
    pub description: Option<String>,
    pub amount: i64,
    pub vat_rate: i64,
    pub discount_percent: i64,
    pub final_amount: i64,
    pub currency: String,
    pub valid_until: Option<NaiveDate>,
    pub payment_terms: String,
    pub category: String,
    pub notes: Option<String>,
    pub status: OfferStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Builds a draft offer. The caller supplies the computed gross amount.
    pub fn new(req: CreateOfferRequest, final_amount: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            contractor_name: req.contractor_name.trim().to_string(),
            title: req.title.trim().to_string(),
            description: req.description.filter(|s| !s.trim().is_empty()),
            amount: req.amount,
            vat_rate: req.vat_rate,
            discount_percent: req.discount_percent,
            final_amount,
            currency: req.currency.to_uppercase(),
            valid_until: req.valid_until,
            payment_terms: req.payment_terms,
            category: req.category,
            notes: req.notes.filter(|s| !s.trim().is_empty()),
            status: OfferStatus::Draft,
            sent_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies editable fields. Pricing inputs are applied here but the gross
    /// amount must be re-derived by the caller afterwards.
    pub fn apply(&mut self, req: UpdateOfferRequest) {
        patch(&mut self.contractor_name, req.contractor_name);
        patch(&mut self.title, req.title);
        patch_opt(&mut self.description, req.description);
        patch(&mut self.amount, req.amount);
        patch(&mut self.vat_rate, req.vat_rate);
        patch(&mut self.discount_percent, req.discount_percent);
        patch(&mut self.currency, req.currency.map(|c| c.to_uppercase()));
        if req.valid_until.is_some() {
            self.valid_until = req.valid_until;
        }
        patch(&mut self.payment_terms, req.payment_terms);
        patch(&mut self.category, req.category);
        patch_opt(&mut self.notes, req.notes);
        self.updated_at = Utc::now();
    }

    /// An open offer whose validity date lies before `today`.
    pub fn is_past_validity(&self, today: NaiveDate) -> bool {
        self.status.is_open() && self.valid_until.is_some_and(|d| d < today)
    }
}

fn default_vat_rate() -> i64 {
    DEFAULT_VAT_RATE
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_payment_terms() -> String {
    DEFAULT_PAYMENT_TERMS.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Request DTO for creating an offer
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequest {
    #[validate(length(min = 1, max = 200, message = "Contractor is required"))]
    pub contractor_name: String,
    #[validate(length(min = 1, max = 300, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Amount cannot be negative"))]
    pub amount: i64,
    #[serde(default = "default_vat_rate")]
    #[validate(range(min = 0, max = 100, message = "VAT rate must be between 0 and 100"))]
    pub vat_rate: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "Discount must be between 0 and 100"))]
    pub discount_percent: i64,
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default = "default_payment_terms")]
    pub payment_terms: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request DTO for updating an offer
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfferRequest {
    #[validate(length(min = 1, max = 200, message = "Contractor cannot be empty"))]
    pub contractor_name: Option<String>,
    #[validate(length(min = 1, max = 300, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Amount cannot be negative"))]
    pub amount: Option<i64>,
    #[validate(range(min = 0, max = 100, message = "VAT rate must be between 0 and 100"))]
    pub vat_rate: Option<i64>,
    #[validate(range(min = 0, max = 100, message = "Discount must be between 0 and 100"))]
    pub discount_percent: Option<i64>,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,
    pub valid_until: Option<NaiveDate>,
    pub payment_terms: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Request DTO for a status change
#[derive(Debug, Clone, Deserialize)]
pub struct OfferStatusRequest {
    pub status: OfferStatus,
}

/// Request DTO for a pricing preview
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateOfferRequest {
    pub amount: i64,
    #[serde(default)]
    pub discount_percent: i64,
    #[serde(default = "default_vat_rate")]
    pub vat_rate: i64,
}

/// Query params for listing offers
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OfferQuery {
    #[serde(default)]
    pub status: Option<OfferStatus>,
}
