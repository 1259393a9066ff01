//! Dashboard analytics types

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ContractorStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TaskStats {
    pub total: u64,
    pub pending: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OfferStats {
    pub total: u64,
    pub draft: u64,
    pub sent: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub expired: u64,
    /// Gross value of accepted offers
    pub accepted_value: i64,
    /// Gross value of draft and sent offers
    pub pipeline_value: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
}

/// Response for `GET /dashboard/stats`
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub contractors: ContractorStats,
    pub tasks: TaskStats,
    pub offers: OfferStats,
    pub support: TicketStats,
    pub unread_notifications: u64,
}
