//! Task domain types
//!
//! Personal to-do items scheduled on a calendar date, owned by the user who
//! created them.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{patch, text_enum, Priority};

/// Task status enum
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

text_enum!(TaskStatus {
    Pending => "pending",
    Completed => "completed",
});

impl TaskStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

/// Task entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub priority: Priority,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(user_id: Uuid, req: CreateTaskRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: req.title.trim().to_string(),
            date: req.date,
            time: req.time,
            priority: req.priority,
            status: req.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies non-status fields. Status changes go through the workflow guard.
    pub fn apply(&mut self, req: &UpdateTaskRequest) {
        patch(&mut self.title, req.title.clone());
        patch(&mut self.date, req.date);
        patch(&mut self.time, req.time);
        patch(&mut self.priority, req.priority);
        self.updated_at = Utc::now();
    }
}

/// Request DTO for creating a task
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 300, message = "Title is required"))]
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
}

/// Request DTO for updating a task
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 300, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
}

/// Query params for listing tasks
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskQuery {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}
