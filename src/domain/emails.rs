//! Email domain types
//!
//! Outgoing correspondence composed in the CRM and received messages
//! recorded into the owner's inbox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::text_enum;

/// Email delivery status enum
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    #[default]
    Draft,
    Sent,
    Failed,
}

text_enum!(EmailStatus {
    Draft => "draft",
    Sent => "sent",
    Failed => "failed",
});

/// Direction of an email
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmailType {
    #[default]
    Sent,
    Received,
}

text_enum!(EmailType {
    Sent => "sent",
    Received => "received",
});

/// Email entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub id: Uuid,
    pub user_id: Uuid,
    pub to: String,
    pub from: Option<String>,
    pub subject: String,
    pub content: Option<String>,
    pub status: EmailStatus,
    #[serde(rename = "type")]
    pub email_type: EmailType,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    /// Last delivery failure reason
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Email {
    pub fn new(user_id: Uuid, req: CreateEmailRequest) -> Self {
        let now = Utc::now();
        let received = req.email_type == EmailType::Received;
        Self {
            id: Uuid::new_v4(),
            user_id,
            to: req.to.trim().to_string(),
            from: req.from.filter(|s| !s.trim().is_empty()),
            subject: req.subject.trim().to_string(),
            content: req.content.filter(|s| !s.trim().is_empty()),
            // Received mail has already been delivered to us.
            status: if received {
                EmailStatus::Sent
            } else {
                EmailStatus::Draft
            },
            email_type: req.email_type,
            read: !received,
            read_at: None,
            sent_at: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_outgoing(&self) -> bool {
        self.email_type == EmailType::Sent
    }
}

/// Request DTO for composing or recording an email
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmailRequest {
    #[validate(email(message = "Recipient address is invalid"))]
    pub to: String,
    #[serde(default)]
    pub from: Option<String>,
    #[validate(length(min = 1, max = 500, message = "Subject is required"))]
    pub subject: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "type")]
    pub email_type: EmailType,
    /// Keep an outgoing email as a draft instead of delivering it now.
    #[serde(default)]
    pub draft: bool,
}

/// Query params for listing emails
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EmailQuery {
    #[serde(default, rename = "type")]
    pub email_type: Option<EmailType>,
    #[serde(default)]
    pub status: Option<EmailStatus>,
}
