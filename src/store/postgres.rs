//! PostgreSQL store
//!
//! Runtime-checked queries against the schema in `migrations/`. Enum columns
//! are stored as text and parsed back into domain enums on read.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use super::{Record, Store, StoreError, StoreResult};
use crate::domain::contractors::Contractor;
use crate::domain::emails::Email;
use crate::domain::notifications::Notification;
use crate::domain::offers::{Offer, OfferStatus};
use crate::domain::support::SupportTicket;
use crate::domain::tasks::Task;
use crate::domain::users::User;
use crate::domain::UnknownVariant;

/// Store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse<T, E>(value: &str) -> StoreResult<T>
where
    T: FromStr<Err = UnknownVariant>,
    E: Record,
{
    value.parse().map_err(|e: UnknownVariant| StoreError::Corrupt {
        entity: E::ENTITY,
        reason: e.to_string(),
    })
}

/// Maps unique violations to [`StoreError::Conflict`].
fn write_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        _ => StoreError::Database(e),
    }
}

fn expect_affected<T: Record>(rows: u64, id: Uuid) -> StoreResult<()> {
    if rows == 0 {
        return Err(StoreError::NotFound {
            entity: T::ENTITY,
            id,
        });
    }
    Ok(())
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role: parse::<_, User>(&row.role)?,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContractorRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    nip: Option<String>,
    regon: Option<String>,
    krs: Option<String>,
    street: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContractorRow> for Contractor {
    type Error = StoreError;

    fn try_from(row: ContractorRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            nip: row.nip,
            regon: row.regon,
            krs: row.krs,
            street: row.street,
            city: row.city,
            postal_code: row.postal_code,
            country: row.country,
            status: parse::<_, Contractor>(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    date: NaiveDate,
    time: NaiveTime,
    priority: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            date: row.date,
            time: row.time,
            priority: parse::<_, Task>(&row.priority)?,
            status: parse::<_, Task>(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OfferRow {
    id: Uuid,
    contractor_name: String,
    title: String,
    description: Option<String>,
    amount: i64,
    vat_rate: i64,
    discount_percent: i64,
    final_amount: i64,
    currency: String,
    valid_until: Option<NaiveDate>,
    payment_terms: String,
    category: String,
    notes: Option<String>,
    status: String,
    sent_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OfferRow> for Offer {
    type Error = StoreError;

    fn try_from(row: OfferRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            contractor_name: row.contractor_name,
            title: row.title,
            description: row.description,
            amount: row.amount,
            vat_rate: row.vat_rate,
            discount_percent: row.discount_percent,
            final_amount: row.final_amount,
            currency: row.currency,
            valid_until: row.valid_until,
            payment_terms: row.payment_terms,
            category: row.category,
            notes: row.notes,
            status: parse::<_, Offer>(&row.status)?,
            sent_at: row.sent_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EmailRow {
    id: Uuid,
    user_id: Uuid,
    recipient: String,
    sender: Option<String>,
    subject: String,
    content: Option<String>,
    status: String,
    email_type: String,
    read: bool,
    read_at: Option<DateTime<Utc>>,
    sent_at: Option<DateTime<Utc>>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EmailRow> for Email {
    type Error = StoreError;

    fn try_from(row: EmailRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            to: row.recipient,
            from: row.sender,
            subject: row.subject,
            content: row.content,
            status: parse::<_, Email>(&row.status)?,
            email_type: parse::<_, Email>(&row.email_type)?,
            read: row.read,
            read_at: row.read_at,
            sent_at: row.sent_at,
            error: row.error,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    reporter: String,
    email: Option<String>,
    issue: String,
    priority: String,
    status: String,
    resolved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for SupportTicket {
    type Error = StoreError;

    fn try_from(row: TicketRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            user: row.reporter,
            email: row.email,
            issue: row.issue,
            priority: parse::<_, SupportTicket>(&row.priority)?,
            status: parse::<_, SupportTicket>(&row.status)?,
            resolved_at: row.resolved_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    message: String,
    #[sqlx(rename = "type")]
    notification_type: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = StoreError;

    fn try_from(row: NotificationRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            message: row.message,
            notification_type: parse::<_, Notification>(&row.notification_type)?,
            read: row.read,
            created_at: row.created_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const USER_COLUMNS: &str = "id, username, password_hash, role, email, created_at, updated_at";
const CONTRACTOR_COLUMNS: &str = "id, name, email, phone, nip, regon, krs, street, city, \
     postal_code, country, status, created_at, updated_at";
const TASK_COLUMNS: &str = "id, user_id, title, date, time, priority, status, created_at, updated_at";
const OFFER_COLUMNS: &str = "id, contractor_name, title, description, amount, vat_rate, \
     discount_percent, final_amount, currency, valid_until, payment_terms, category, notes, \
     status, sent_at, created_at, updated_at";
const EMAIL_COLUMNS: &str = "id, user_id, recipient, sender, subject, content, status, \
     email_type, read, read_at, sent_at, error, created_at, updated_at";
const TICKET_COLUMNS: &str =
    "id, reporter, email, issue, priority, status, resolved_at, created_at, updated_at";
const NOTIFICATION_COLUMNS: &str = "id, user_id, message, type, read, created_at";

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.email)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(user)
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = $2,
                password_hash = $3,
                role = $4,
                email = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.email)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        expect_affected::<User>(result.rows_affected(), user.id)?;
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected::<User>(result.rows_affected(), id)
    }

    // ------------------------------------------------------------------------
    // Contractors
    // ------------------------------------------------------------------------

    async fn list_contractors(&self) -> StoreResult<Vec<Contractor>> {
        let rows = sqlx::query_as::<_, ContractorRow>(&format!(
            "SELECT {CONTRACTOR_COLUMNS} FROM contractors ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_contractor(&self, id: Uuid) -> StoreResult<Option<Contractor>> {
        sqlx::query_as::<_, ContractorRow>(&format!(
            "SELECT {CONTRACTOR_COLUMNS} FROM contractors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Contractor::try_from)
        .transpose()
    }

    async fn insert_contractor(&self, c: Contractor) -> StoreResult<Contractor> {
        sqlx::query(
            r#"
            INSERT INTO contractors (id, name, email, phone, nip, regon, krs, street, city,
                                     postal_code, country, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(c.id)
        .bind(&c.name)
        .bind(&c.email)
        .bind(&c.phone)
        .bind(&c.nip)
        .bind(&c.regon)
        .bind(&c.krs)
        .bind(&c.street)
        .bind(&c.city)
        .bind(&c.postal_code)
        .bind(&c.country)
        .bind(c.status.as_str())
        .bind(c.created_at)
        .bind(c.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(c)
    }

    async fn update_contractor(&self, c: Contractor) -> StoreResult<Contractor> {
        let result = sqlx::query(
            r#"
            UPDATE contractors SET
                name = $2, email = $3, phone = $4, nip = $5, regon = $6, krs = $7,
                street = $8, city = $9, postal_code = $10, country = $11, status = $12,
                updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(c.id)
        .bind(&c.name)
        .bind(&c.email)
        .bind(&c.phone)
        .bind(&c.nip)
        .bind(&c.regon)
        .bind(&c.krs)
        .bind(&c.street)
        .bind(&c.city)
        .bind(&c.postal_code)
        .bind(&c.country)
        .bind(c.status.as_str())
        .bind(c.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        expect_affected::<Contractor>(result.rows_affected(), c.id)?;
        Ok(c)
    }

    async fn delete_contractor(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM contractors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected::<Contractor>(result.rows_affected(), id)
    }

    // ------------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------------

    async fn list_tasks(&self, user_id: Uuid) -> StoreResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        sqlx::query_as::<_, TaskRow>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Task::try_from)
            .transpose()
    }

    async fn insert_task(&self, t: Task) -> StoreResult<Task> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, user_id, title, date, time, priority, status,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(t.id)
        .bind(t.user_id)
        .bind(&t.title)
        .bind(t.date)
        .bind(t.time)
        .bind(t.priority.as_str())
        .bind(t.status.as_str())
        .bind(t.created_at)
        .bind(t.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(t)
    }

    async fn update_task(&self, t: Task) -> StoreResult<Task> {
        let result = sqlx::query(
            r#"
            UPDATE tasks SET
                title = $2, date = $3, time = $4, priority = $5, status = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(t.id)
        .bind(&t.title)
        .bind(t.date)
        .bind(t.time)
        .bind(t.priority.as_str())
        .bind(t.status.as_str())
        .bind(t.updated_at)
        .execute(&self.pool)
        .await?;
        expect_affected::<Task>(result.rows_affected(), t.id)?;
        Ok(t)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected::<Task>(result.rows_affected(), id)
    }

    // ------------------------------------------------------------------------
    // Offers
    // ------------------------------------------------------------------------

    async fn list_offers(&self) -> StoreResult<Vec<Offer>> {
        let rows = sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_offer(&self, id: Uuid) -> StoreResult<Option<Offer>> {
        sqlx::query_as::<_, OfferRow>(&format!("SELECT {OFFER_COLUMNS} FROM offers WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Offer::try_from)
            .transpose()
    }

    async fn insert_offer(&self, o: Offer) -> StoreResult<Offer> {
        sqlx::query(
            r#"
            INSERT INTO offers (id, contractor_name, title, description, amount, vat_rate,
                                discount_percent, final_amount, currency, valid_until,
                                payment_terms, category, notes, status, sent_at,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(o.id)
        .bind(&o.contractor_name)
        .bind(&o.title)
        .bind(&o.description)
        .bind(o.amount)
        .bind(o.vat_rate)
        .bind(o.discount_percent)
        .bind(o.final_amount)
        .bind(&o.currency)
        .bind(o.valid_until)
        .bind(&o.payment_terms)
        .bind(&o.category)
        .bind(&o.notes)
        .bind(o.status.as_str())
        .bind(o.sent_at)
        .bind(o.created_at)
        .bind(o.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(o)
    }

    async fn update_offer(&self, o: Offer) -> StoreResult<Offer> {
        let result = sqlx::query(
            r#"
            UPDATE offers SET
                contractor_name = $2, title = $3, description = $4, amount = $5,
                vat_rate = $6, discount_percent = $7, final_amount = $8, currency = $9,
                valid_until = $10, payment_terms = $11, category = $12, notes = $13,
                status = $14, sent_at = $15, updated_at = $16
            WHERE id = $1
            "#,
        )
        .bind(o.id)
        .bind(&o.contractor_name)
        .bind(&o.title)
        .bind(&o.description)
        .bind(o.amount)
        .bind(o.vat_rate)
        .bind(o.discount_percent)
        .bind(o.final_amount)
        .bind(&o.currency)
        .bind(o.valid_until)
        .bind(&o.payment_terms)
        .bind(&o.category)
        .bind(&o.notes)
        .bind(o.status.as_str())
        .bind(o.sent_at)
        .bind(o.updated_at)
        .execute(&self.pool)
        .await?;
        expect_affected::<Offer>(result.rows_affected(), o.id)?;
        Ok(o)
    }

    async fn update_offer_if_status(
        &self,
        o: Offer,
        expected: OfferStatus,
    ) -> StoreResult<Option<Offer>> {
        let result = sqlx::query(
            r#"
            UPDATE offers SET
                contractor_name = $2, title = $3, description = $4, amount = $5,
                vat_rate = $6, discount_percent = $7, final_amount = $8, currency = $9,
                valid_until = $10, payment_terms = $11, category = $12, notes = $13,
                status = $14, sent_at = $15, updated_at = $16
            WHERE id = $1 AND status = $17
            "#,
        )
        .bind(o.id)
        .bind(&o.contractor_name)
        .bind(&o.title)
        .bind(&o.description)
        .bind(o.amount)
        .bind(o.vat_rate)
        .bind(o.discount_percent)
        .bind(o.final_amount)
        .bind(&o.currency)
        .bind(o.valid_until)
        .bind(&o.payment_terms)
        .bind(&o.category)
        .bind(&o.notes)
        .bind(o.status.as_str())
        .bind(o.sent_at)
        .bind(o.updated_at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;
        Ok((result.rows_affected() == 1).then_some(o))
    }

    async fn delete_offer(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected::<Offer>(result.rows_affected(), id)
    }

    // ------------------------------------------------------------------------
    // Emails
    // ------------------------------------------------------------------------

    async fn list_emails(&self, user_id: Uuid) -> StoreResult<Vec<Email>> {
        let rows = sqlx::query_as::<_, EmailRow>(&format!(
            "SELECT {EMAIL_COLUMNS} FROM emails WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_email(&self, id: Uuid) -> StoreResult<Option<Email>> {
        sqlx::query_as::<_, EmailRow>(&format!("SELECT {EMAIL_COLUMNS} FROM emails WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Email::try_from)
            .transpose()
    }

    async fn insert_email(&self, e: Email) -> StoreResult<Email> {
        sqlx::query(
            r#"
            INSERT INTO emails (id, user_id, recipient, sender, subject, content, status,
                                email_type, read, read_at, sent_at, error,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(e.id)
        .bind(e.user_id)
        .bind(&e.to)
        .bind(&e.from)
        .bind(&e.subject)
        .bind(&e.content)
        .bind(e.status.as_str())
        .bind(e.email_type.as_str())
        .bind(e.read)
        .bind(e.read_at)
        .bind(e.sent_at)
        .bind(&e.error)
        .bind(e.created_at)
        .bind(e.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(e)
    }

    async fn update_email(&self, e: Email) -> StoreResult<Email> {
        let result = sqlx::query(
            r#"
            UPDATE emails SET
                recipient = $2, sender = $3, subject = $4, content = $5, status = $6,
                email_type = $7, read = $8, read_at = $9, sent_at = $10, error = $11,
                updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(e.id)
        .bind(&e.to)
        .bind(&e.from)
        .bind(&e.subject)
        .bind(&e.content)
        .bind(e.status.as_str())
        .bind(e.email_type.as_str())
        .bind(e.read)
        .bind(e.read_at)
        .bind(e.sent_at)
        .bind(&e.error)
        .bind(e.updated_at)
        .execute(&self.pool)
        .await?;
        expect_affected::<Email>(result.rows_affected(), e.id)?;
        Ok(e)
    }

    async fn delete_email(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM emails WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected::<Email>(result.rows_affected(), id)
    }

    // ------------------------------------------------------------------------
    // Support tickets
    // ------------------------------------------------------------------------

    async fn list_tickets(&self) -> StoreResult<Vec<SupportTicket>> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_ticket(&self, id: Uuid) -> StoreResult<Option<SupportTicket>> {
        sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(SupportTicket::try_from)
        .transpose()
    }

    async fn insert_ticket(&self, t: SupportTicket) -> StoreResult<SupportTicket> {
        sqlx::query(
            r#"
            INSERT INTO support_tickets (id, reporter, email, issue, priority, status,
                                         resolved_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(t.id)
        .bind(&t.user)
        .bind(&t.email)
        .bind(&t.issue)
        .bind(t.priority.as_str())
        .bind(t.status.as_str())
        .bind(t.resolved_at)
        .bind(t.created_at)
        .bind(t.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(t)
    }

    async fn update_ticket(&self, t: SupportTicket) -> StoreResult<SupportTicket> {
        let result = sqlx::query(
            r#"
            UPDATE support_tickets SET
                reporter = $2, email = $3, issue = $4, priority = $5, status = $6,
                resolved_at = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(t.id)
        .bind(&t.user)
        .bind(&t.email)
        .bind(&t.issue)
        .bind(t.priority.as_str())
        .bind(t.status.as_str())
        .bind(t.resolved_at)
        .bind(t.updated_at)
        .execute(&self.pool)
        .await?;
        expect_affected::<SupportTicket>(result.rows_affected(), t.id)?;
        Ok(t)
    }

    async fn delete_ticket(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM support_tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected::<SupportTicket>(result.rows_affected(), id)
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn insert_notification(&self, n: Notification) -> StoreResult<Notification> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, message, type, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(n.id)
        .bind(n.user_id)
        .bind(&n.message)
        .bind(n.notification_type.as_str())
        .bind(n.read)
        .bind(n.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(n)
    }

    async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> StoreResult<Notification> {
        sqlx::query_as::<_, NotificationRow>(&format!(
            "UPDATE notifications SET read = TRUE \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound {
            entity: Notification::ENTITY,
            id,
        })
        .and_then(Notification::try_from)
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn prune_notifications(&self, user_id: Uuid, keep: usize) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE user_id = $1
              AND id NOT IN (
                  SELECT id FROM notifications
                  WHERE user_id = $1
                  ORDER BY created_at DESC
                  LIMIT $2
              )
            "#,
        )
        .bind(user_id)
        .bind(keep as i64)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
