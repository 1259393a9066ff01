//! Support ticket domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{patch, patch_opt, text_enum, Priority};

/// Ticket status enum
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
}

text_enum!(TicketStatus {
    Open => "open",
    InProgress => "in_progress",
    Resolved => "resolved",
});

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] = [Self::Open, Self::InProgress, Self::Resolved];
}

/// Support ticket entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: Uuid,
    /// Name of the person reporting the issue
    pub user: String,
    pub email: Option<String>,
    pub issue: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupportTicket {
    pub fn new(req: CreateTicketRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user: req.user.trim().to_string(),
            email: req.email.filter(|s| !s.trim().is_empty()),
            issue: req.issue.trim().to_string(),
            priority: req.priority,
            status: TicketStatus::Open,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, req: UpdateTicketRequest) {
        patch(&mut self.user, req.user);
        patch_opt(&mut self.email, req.email);
        patch(&mut self.issue, req.issue);
        patch(&mut self.priority, req.priority);
        self.updated_at = Utc::now();
    }
}

/// Request DTO for opening a ticket
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, max = 200, message = "Reporter name is required"))]
    pub user: String,
    #[serde(default)]
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Issue description is required"))]
    pub issue: String,
    #[serde(default)]
    pub priority: Priority,
}

/// Request DTO for editing a ticket. Status is changed through the status endpoint.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    #[validate(length(min = 1, max = 200, message = "Reporter name cannot be empty"))]
    pub user: Option<String>,
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Issue cannot be empty"))]
    pub issue: Option<String>,
    pub priority: Option<Priority>,
}

/// Request DTO for a status change
#[derive(Debug, Clone, Deserialize)]
pub struct TicketStatusRequest {
    pub status: TicketStatus,
}

/// Query params for listing tickets
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TicketQuery {
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
}
