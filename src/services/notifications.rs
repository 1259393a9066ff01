//! Notification emitter
//!
//! Appends notifications for lifecycle events raised by the route handlers.
//! Appending is best-effort: a storage failure is logged and swallowed so the
//! triggering operation still succeeds.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::notifications::{Notification, NotificationType};
use crate::domain::offers::{Offer, OfferStatus};
use crate::services::mailer::DeliveryOutcome;
use crate::store::Store;

#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn Store>,
    retention_limit: usize,
}

impl Notifier {
    pub fn new(store: Arc<dyn Store>, retention_limit: usize) -> Self {
        Self {
            store,
            retention_limit,
        }
    }

    /// Append a notification for a user. Returns its id when it was stored.
    pub async fn notify(
        &self,
        user_id: Uuid,
        notification_type: NotificationType,
        message: impl Into<String>,
    ) -> Option<Uuid> {
        let notification = Notification::new(user_id, notification_type, message.into());

        let id = match self.store.insert_notification(notification).await {
            Ok(n) => n.id,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to store notification");
                return None;
            }
        };

        tracing::debug!(
            user_id = %user_id,
            notification_type = %notification_type,
            notification_id = %id,
            "Notification created"
        );

        match self
            .store
            .prune_notifications(user_id, self.retention_limit)
            .await
        {
            Ok(0) => {}
            Ok(dropped) => tracing::debug!(user_id = %user_id, dropped, "Old notifications pruned"),
            Err(e) => tracing::warn!(user_id = %user_id, error = %e, "Failed to prune notifications"),
        }

        Some(id)
    }

    pub async fn contractor_created(&self, user_id: Uuid, name: &str) {
        self.notify(
            user_id,
            NotificationType::Info,
            format!("New contractor added: {}", name),
        )
        .await;
    }

    pub async fn task_created(&self, user_id: Uuid, title: &str) {
        self.notify(
            user_id,
            NotificationType::Info,
            format!("New task scheduled: {}", title),
        )
        .await;
    }

    pub async fn task_completed(&self, user_id: Uuid, title: &str) {
        self.notify(
            user_id,
            NotificationType::Success,
            format!("Task completed: {}", title),
        )
        .await;
    }

    pub async fn offer_created(&self, user_id: Uuid, offer: &Offer) {
        self.notify(
            user_id,
            NotificationType::Info,
            format!(
                "New offer \"{}\" for {} ({} {})",
                offer.title, offer.contractor_name, offer.final_amount, offer.currency
            ),
        )
        .await;
    }

    pub async fn offer_sent(&self, user_id: Uuid, offer: &Offer, delivery: &DeliveryOutcome) {
        let (notification_type, message) = match delivery {
            DeliveryOutcome::Failed { reason } => (
                NotificationType::Warning,
                format!(
                    "Offer \"{}\" marked as sent, but the email to {} failed: {}",
                    offer.title, offer.contractor_name, reason
                ),
            ),
            _ => (
                NotificationType::Success,
                format!(
                    "Offer \"{}\" sent to {}",
                    offer.title, offer.contractor_name
                ),
            ),
        };
        self.notify(user_id, notification_type, message).await;
    }

    pub async fn offer_decided(&self, user_id: Uuid, offer: &Offer) {
        let (notification_type, verb) = match offer.status {
            OfferStatus::Accepted => (NotificationType::Success, "accepted"),
            OfferStatus::Rejected => (NotificationType::Warning, "rejected"),
            OfferStatus::Expired => (NotificationType::Warning, "expired"),
            OfferStatus::Draft | OfferStatus::Sent => return,
        };
        self.notify(
            user_id,
            notification_type,
            format!(
                "Offer \"{}\" for {} was {}",
                offer.title, offer.contractor_name, verb
            ),
        )
        .await;
    }

    pub async fn ticket_opened(&self, user_id: Uuid, reporter: &str) {
        self.notify(
            user_id,
            NotificationType::Info,
            format!("New support ticket from {}", reporter),
        )
        .await;
    }

    pub async fn ticket_resolved(&self, user_id: Uuid, reporter: &str) {
        self.notify(
            user_id,
            NotificationType::Success,
            format!("Support ticket from {} resolved", reporter),
        )
        .await;
    }

    pub async fn email_failed(&self, user_id: Uuid, to: &str, reason: &str) {
        self.notify(
            user_id,
            NotificationType::Error,
            format!("Email to {} could not be delivered: {}", to, reason),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn notify_enforces_retention() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let notifier = Notifier::new(store.clone(), 3);
        let user = Uuid::new_v4();

        for i in 0..5 {
            notifier
                .notify(user, NotificationType::Info, format!("event {i}"))
                .await
                .expect("stored");
        }

        let kept = store.list_notifications(user).await.unwrap();
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].message, "event 4");
        assert!(kept.iter().all(|n| !n.read));
    }

    #[tokio::test]
    async fn helpers_pick_notification_type() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let notifier = Notifier::new(store.clone(), 10);
        let user = Uuid::new_v4();

        notifier.ticket_resolved(user, "Jan Kowalski").await;
        notifier.email_failed(user, "a@b.pl", "timeout").await;

        let kinds: Vec<_> = store
            .list_notifications(user)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.notification_type)
            .collect();
        assert_eq!(kinds, vec![NotificationType::Error, NotificationType::Success]);
    }
}
