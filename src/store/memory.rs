//! In-process store backed by one locked vector per collection.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{Record, Store, StoreError, StoreResult};
use crate::domain::contractors::Contractor;
use crate::domain::emails::Email;
use crate::domain::notifications::Notification;
use crate::domain::offers::{Offer, OfferStatus};
use crate::domain::support::SupportTicket;
use crate::domain::tasks::Task;
use crate::domain::users::User;

struct Table<T> {
    rows: RwLock<Vec<T>>,
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Record> Table<T> {
    fn all(&self) -> Vec<T> {
        self.rows.read().clone()
    }

    fn filter(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.read().iter().filter(|r| keep(r)).cloned().collect()
    }

    fn get(&self, id: Uuid) -> Option<T> {
        self.rows.read().iter().find(|r| r.id() == id).cloned()
    }

    fn insert(&self, row: T) -> StoreResult<T> {
        let mut rows = self.rows.write();
        if rows.iter().any(|r| r.id() == row.id()) {
            return Err(StoreError::Conflict(format!(
                "{} {} already exists",
                T::ENTITY,
                row.id()
            )));
        }
        rows.push(row.clone());
        Ok(row)
    }

    fn update(&self, row: T) -> StoreResult<T> {
        let mut rows = self.rows.write();
        let slot = rows
            .iter_mut()
            .find(|r| r.id() == row.id())
            .ok_or(StoreError::NotFound {
                entity: T::ENTITY,
                id: row.id(),
            })?;
        *slot = row.clone();
        Ok(row)
    }

    fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        if rows.len() == before {
            return Err(StoreError::NotFound {
                entity: T::ENTITY,
                id,
            });
        }
        Ok(())
    }
}

/// Store kept entirely in memory. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    users: Table<User>,
    contractors: Table<Contractor>,
    tasks: Table<Task>,
    offers: Table<Offer>,
    emails: Table<Email>,
    tickets: Table<SupportTicket>,
    notifications: Table<Notification>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_unique_username(&self, user: &User) -> StoreResult<()> {
        let taken = self
            .users
            .rows
            .read()
            .iter()
            .any(|u| u.username == user.username && u.id != user.id);
        if taken {
            return Err(StoreError::Conflict(format!(
                "username {} is already taken",
                user.username
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.all())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.get(id))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .rows
            .read()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        self.ensure_unique_username(&user)?;
        self.users.insert(user)
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        self.ensure_unique_username(&user)?;
        self.users.update(user)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        self.users.delete(id)
    }

    async fn list_contractors(&self) -> StoreResult<Vec<Contractor>> {
        Ok(self.contractors.all())
    }

    async fn get_contractor(&self, id: Uuid) -> StoreResult<Option<Contractor>> {
        Ok(self.contractors.get(id))
    }

    async fn insert_contractor(&self, contractor: Contractor) -> StoreResult<Contractor> {
        self.contractors.insert(contractor)
    }

    async fn update_contractor(&self, contractor: Contractor) -> StoreResult<Contractor> {
        self.contractors.update(contractor)
    }

    async fn delete_contractor(&self, id: Uuid) -> StoreResult<()> {
        self.contractors.delete(id)
    }

    async fn list_tasks(&self, user_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(self.tasks.filter(|t| t.user_id == user_id))
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.tasks.get(id))
    }

    async fn insert_task(&self, task: Task) -> StoreResult<Task> {
        self.tasks.insert(task)
    }

    async fn update_task(&self, task: Task) -> StoreResult<Task> {
        self.tasks.update(task)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<()> {
        self.tasks.delete(id)
    }

    async fn list_offers(&self) -> StoreResult<Vec<Offer>> {
        Ok(self.offers.all())
    }

    async fn get_offer(&self, id: Uuid) -> StoreResult<Option<Offer>> {
        Ok(self.offers.get(id))
    }

    async fn insert_offer(&self, offer: Offer) -> StoreResult<Offer> {
        self.offers.insert(offer)
    }

    async fn update_offer(&self, offer: Offer) -> StoreResult<Offer> {
        self.offers.update(offer)
    }

    async fn update_offer_if_status(
        &self,
        offer: Offer,
        expected: OfferStatus,
    ) -> StoreResult<Option<Offer>> {
        let mut rows = self.offers.rows.write();
        match rows.iter_mut().find(|o| o.id == offer.id) {
            Some(slot) if slot.status == expected => {
                *slot = offer.clone();
                Ok(Some(offer))
            }
            _ => Ok(None),
        }
    }

    async fn delete_offer(&self, id: Uuid) -> StoreResult<()> {
        self.offers.delete(id)
    }

    async fn list_emails(&self, user_id: Uuid) -> StoreResult<Vec<Email>> {
        Ok(self.emails.filter(|e| e.user_id == user_id))
    }

    async fn get_email(&self, id: Uuid) -> StoreResult<Option<Email>> {
        Ok(self.emails.get(id))
    }

    async fn insert_email(&self, email: Email) -> StoreResult<Email> {
        self.emails.insert(email)
    }

    async fn update_email(&self, email: Email) -> StoreResult<Email> {
        self.emails.update(email)
    }

    async fn delete_email(&self, id: Uuid) -> StoreResult<()> {
        self.emails.delete(id)
    }

    async fn list_tickets(&self) -> StoreResult<Vec<SupportTicket>> {
        Ok(self.tickets.all())
    }

    async fn get_ticket(&self, id: Uuid) -> StoreResult<Option<SupportTicket>> {
        Ok(self.tickets.get(id))
    }

    async fn insert_ticket(&self, ticket: SupportTicket) -> StoreResult<SupportTicket> {
        self.tickets.insert(ticket)
    }

    async fn update_ticket(&self, ticket: SupportTicket) -> StoreResult<SupportTicket> {
        self.tickets.update(ticket)
    }

    async fn delete_ticket(&self, id: Uuid) -> StoreResult<()> {
        self.tickets.delete(id)
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let mut rows = self.notifications.filter(|n| n.user_id == user_id);
        rows.reverse();
        Ok(rows)
    }

    async fn insert_notification(&self, notification: Notification) -> StoreResult<Notification> {
        self.notifications.insert(notification)
    }

    async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> StoreResult<Notification> {
        let mut rows = self.notifications.rows.write();
        let row = rows
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or(StoreError::NotFound {
                entity: Notification::ENTITY,
                id,
            })?;
        row.read = true;
        Ok(row.clone())
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut updated = 0;
        for row in self.notifications.rows.write().iter_mut() {
            if row.user_id == user_id && !row.read {
                row.read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn prune_notifications(&self, user_id: Uuid, keep: usize) -> StoreResult<u64> {
        let mut rows = self.notifications.rows.write();
        let owned = rows.iter().filter(|n| n.user_id == user_id).count();
        if owned <= keep {
            return Ok(0);
        }
        // Rows are in insertion order, so the first ones owned by the user are the oldest.
        let mut excess = owned - keep;
        let dropped = excess as u64;
        rows.retain(|n| {
            if excess > 0 && n.user_id == user_id {
                excess -= 1;
                false
            } else {
                true
            }
        });
        Ok(dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notifications::NotificationType;
    use crate::domain::offers::CreateOfferRequest;
    use crate::domain::users::UserRole;

    fn user(name: &str) -> User {
        User::new(
            name.to_string(),
            "$argon2id$stub".to_string(),
            UserRole::User,
            format!("{name}@example.com"),
        )
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update_user(user("ghost")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "user", .. }));

        let err = store.delete_offer(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "offer", .. }));
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = MemoryStore::new();
        store.insert_user(user("anna")).await.unwrap();
        let err = store.insert_user(user("anna")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn mark_all_read_only_touches_owner() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        for owner in [alice, alice, bob] {
            store
                .insert_notification(Notification::new(owner, NotificationType::Info, "hi".into()))
                .await
                .unwrap();
        }
        let first = store.list_notifications(alice).await.unwrap()[0].id;
        store.mark_notification_read(alice, first).await.unwrap();

        assert_eq!(store.mark_all_notifications_read(alice).await.unwrap(), 1);
        assert!(store
            .list_notifications(alice)
            .await
            .unwrap()
            .iter()
            .all(|n| n.read));
        assert!(store
            .list_notifications(bob)
            .await
            .unwrap()
            .iter()
            .all(|n| !n.read));
    }

    #[tokio::test]
    async fn prune_drops_oldest_first() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        for i in 0..5 {
            store
                .insert_notification(Notification::new(
                    owner,
                    NotificationType::Info,
                    format!("n{i}"),
                ))
                .await
                .unwrap();
        }

        assert_eq!(store.prune_notifications(owner, 3).await.unwrap(), 2);
        let messages: Vec<_> = store
            .list_notifications(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert_eq!(messages, vec!["n4", "n3", "n2"]);
    }

    #[tokio::test]
    async fn conditional_offer_update_lets_one_writer_through() {
        let store = MemoryStore::new();
        let req = CreateOfferRequest {
            contractor_name: "Acme".into(),
            title: "Audit".into(),
            description: None,
            amount: 1000,
            vat_rate: 23,
            discount_percent: 0,
            currency: "PLN".into(),
            valid_until: None,
            payment_terms: "14 days".into(),
            category: "services".into(),
            notes: None,
        };
        let draft = store.insert_offer(Offer::new(req, 1230)).await.unwrap();

        let mut sent = draft.clone();
        sent.status = OfferStatus::Sent;
        let first = store
            .update_offer_if_status(sent.clone(), OfferStatus::Draft)
            .await
            .unwrap();
        let second = store
            .update_offer_if_status(sent, OfferStatus::Draft)
            .await
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        let stored = store.get_offer(draft.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OfferStatus::Sent);
    }
}
