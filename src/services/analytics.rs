//! Dashboard statistics

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::analytics::{ContractorStats, DashboardStats, OfferStats, TaskStats, TicketStats};
use crate::domain::contractors::{Contractor, ContractorStatus};
use crate::domain::offers::{Offer, OfferStatus};
use crate::domain::support::{SupportTicket, TicketStatus};
use crate::domain::tasks::{Task, TaskStatus};
use crate::store::{Store, StoreResult};

pub fn contractor_stats(contractors: &[Contractor]) -> ContractorStats {
    let active = contractors
        .iter()
        .filter(|c| c.status == ContractorStatus::Active)
        .count() as u64;
    ContractorStats {
        total: contractors.len() as u64,
        active,
        inactive: contractors.len() as u64 - active,
    }
}

pub fn task_stats(tasks: &[Task]) -> TaskStats {
    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count() as u64;
    TaskStats {
        total: tasks.len() as u64,
        pending: tasks.len() as u64 - completed,
        completed,
    }
}

/// Offers past their validity date count as expired even before a read has
/// persisted the transition.
pub fn offer_stats(offers: &[Offer], today: NaiveDate) -> OfferStats {
    let mut stats = OfferStats {
        total: offers.len() as u64,
        ..Default::default()
    };

    for offer in offers {
        let status = if offer.is_past_validity(today) {
            OfferStatus::Expired
        } else {
            offer.status
        };
        match status {
            OfferStatus::Draft => stats.draft += 1,
            OfferStatus::Sent => stats.sent += 1,
            OfferStatus::Accepted => stats.accepted += 1,
            OfferStatus::Rejected => stats.rejected += 1,
            OfferStatus::Expired => stats.expired += 1,
        }
        if status == OfferStatus::Accepted {
            stats.accepted_value = stats.accepted_value.saturating_add(offer.final_amount);
        } else if status.is_open() {
            stats.pipeline_value = stats.pipeline_value.saturating_add(offer.final_amount);
        }
    }

    stats
}

pub fn ticket_stats(tickets: &[SupportTicket]) -> TicketStats {
    let mut stats = TicketStats {
        total: tickets.len() as u64,
        ..Default::default()
    };
    for ticket in tickets {
        match ticket.status {
            TicketStatus::Open => stats.open += 1,
            TicketStatus::InProgress => stats.in_progress += 1,
            TicketStatus::Resolved => stats.resolved += 1,
        }
    }
    stats
}

/// Aggregate the dashboard summary for `user_id`.
pub async fn dashboard(store: &dyn Store, user_id: Uuid, today: NaiveDate) -> StoreResult<DashboardStats> {
    let (contractors, tasks, offers, tickets, notifications) = futures::try_join!(
        store.list_contractors(),
        store.list_tasks(user_id),
        store.list_offers(),
        store.list_tickets(),
        store.list_notifications(user_id),
    )?;

    Ok(DashboardStats {
        contractors: contractor_stats(&contractors),
        tasks: task_stats(&tasks),
        offers: offer_stats(&offers, today),
        support: ticket_stats(&tickets),
        unread_notifications: notifications.iter().filter(|n| !n.read).count() as u64,
    })
}
