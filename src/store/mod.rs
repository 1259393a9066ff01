//! Entity store
//!
//! Persistence seam for every record type. Two backends implement [`Store`]:
//! an in-process [`MemoryStore`] and the PostgreSQL-backed [`PgStore`].

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::contractors::Contractor;
use crate::domain::emails::Email;
use crate::domain::notifications::Notification;
use crate::domain::offers::{Offer, OfferStatus};
use crate::domain::support::SupportTicket;
use crate::domain::tasks::Task;
use crate::domain::users::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{0}")]
    Conflict(String),

    #[error("corrupt {entity} row: {reason}")]
    Corrupt {
        entity: &'static str,
        reason: String,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A record addressable by its identifier.
pub trait Record: Clone + Send + Sync + 'static {
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;
}

macro_rules! record {
    ($ty:ty, $entity:literal) => {
        impl Record for $ty {
            const ENTITY: &'static str = $entity;

            fn id(&self) -> Uuid {
                self.id
            }
        }
    };
}

record!(User, "user");
record!(Contractor, "contractor");
record!(Task, "task");
record!(Offer, "offer");
record!(Email, "email");
record!(SupportTicket, "support ticket");
record!(Notification, "notification");

/// Storage collaborator.
///
/// `get_*` return `Ok(None)` for unknown ids; `update_*` and `delete_*`
/// return [`StoreError::NotFound`]. Lists come back in insertion order,
/// except notifications which are newest first.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> StoreResult<()>;

    // Users
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&self, user: User) -> StoreResult<User>;
    async fn update_user(&self, user: User) -> StoreResult<User>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;

    // Contractors
    async fn list_contractors(&self) -> StoreResult<Vec<Contractor>>;
    async fn get_contractor(&self, id: Uuid) -> StoreResult<Option<Contractor>>;
    async fn insert_contractor(&self, contractor: Contractor) -> StoreResult<Contractor>;
    async fn update_contractor(&self, contractor: Contractor) -> StoreResult<Contractor>;
    async fn delete_contractor(&self, id: Uuid) -> StoreResult<()>;

    // Tasks
    async fn list_tasks(&self, user_id: Uuid) -> StoreResult<Vec<Task>>;
    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>>;
    async fn insert_task(&self, task: Task) -> StoreResult<Task>;
    async fn update_task(&self, task: Task) -> StoreResult<Task>;
    async fn delete_task(&self, id: Uuid) -> StoreResult<()>;

    // Offers
    async fn list_offers(&self) -> StoreResult<Vec<Offer>>;
    async fn get_offer(&self, id: Uuid) -> StoreResult<Option<Offer>>;
    async fn insert_offer(&self, offer: Offer) -> StoreResult<Offer>;
    async fn update_offer(&self, offer: Offer) -> StoreResult<Offer>;
    /// Writes `offer` only while the stored status is still `expected`.
    /// `None` when another writer changed the status (or removed the offer) first.
    async fn update_offer_if_status(
        &self,
        offer: Offer,
        expected: OfferStatus,
    ) -> StoreResult<Option<Offer>>;
    async fn delete_offer(&self, id: Uuid) -> StoreResult<()>;

    // Emails
    async fn list_emails(&self, user_id: Uuid) -> StoreResult<Vec<Email>>;
    async fn get_email(&self, id: Uuid) -> StoreResult<Option<Email>>;
    async fn insert_email(&self, email: Email) -> StoreResult<Email>;
    async fn update_email(&self, email: Email) -> StoreResult<Email>;
    async fn delete_email(&self, id: Uuid) -> StoreResult<()>;

    // Support tickets
    async fn list_tickets(&self) -> StoreResult<Vec<SupportTicket>>;
    async fn get_ticket(&self, id: Uuid) -> StoreResult<Option<SupportTicket>>;
    async fn insert_ticket(&self, ticket: SupportTicket) -> StoreResult<SupportTicket>;
    async fn update_ticket(&self, ticket: SupportTicket) -> StoreResult<SupportTicket>;
    async fn delete_ticket(&self, id: Uuid) -> StoreResult<()>;

    // Notifications
    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>>;
    async fn insert_notification(&self, notification: Notification) -> StoreResult<Notification>;
    async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> StoreResult<Notification>;
    /// Returns the number of notifications that changed from unread to read.
    async fn mark_all_notifications_read(&self, user_id: Uuid) -> StoreResult<u64>;
    /// Keeps the newest `keep` notifications of a user; returns how many were dropped.
    async fn prune_notifications(&self, user_id: Uuid, keep: usize) -> StoreResult<u64>;
}
