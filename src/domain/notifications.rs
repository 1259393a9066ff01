//! Notification domain types
//!
//! In-app notifications appended as a side effect of other records'
//! lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum;

/// Notification type enum
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

text_enum!(NotificationType {
    Info => "info",
    Success => "success",
    Warning => "warning",
    Error => "error",
});

/// Notification entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: Uuid, notification_type: NotificationType, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            message,
            notification_type,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// Query params for listing notifications
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: Option<bool>,
}

/// Unread count response
#[derive(Debug, Clone, Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Mark-all-read response
#[derive(Debug, Clone, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
