//! Cross-entity search
//!
//! Case-insensitive substring match over a fixed field list per entity type.
//! Collections are scanned linearly in a fixed order and the merged result
//! list is capped at [`MAX_RESULTS`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::contractors::Contractor;
use crate::domain::emails::{Email, EmailType};
use crate::domain::offers::Offer;
use crate::domain::support::SupportTicket;
use crate::domain::tasks::Task;
use crate::domain::{text_enum, UnknownVariant};
use crate::store::{Store, StoreResult};

pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_RESULTS: usize = 20;
const DETAILS_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Contractor,
    Task,
    Offer,
    Email,
    Support,
}

text_enum!(SearchKind {
    Contractor => "contractor",
    Task => "task",
    Offer => "offer",
    Email => "email",
    Support => "support",
});

impl SearchKind {
    /// Scan order.
    pub const ALL: [SearchKind; 5] = [
        Self::Contractor,
        Self::Task,
        Self::Offer,
        Self::Email,
        Self::Support,
    ];
}

/// Parse a comma separated type filter. Empty or absent means every type.
pub fn parse_kinds(raw: Option<&str>) -> Result<Vec<SearchKind>, UnknownVariant> {
    let mut kinds = Vec::new();
    for part in raw.unwrap_or_default().split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let kind = SearchKind::from_str(&part.to_lowercase())?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        kinds.extend(SearchKind::ALL);
    }
    Ok(kinds)
}

/// Uniform result shape returned to clients.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchResult {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub title: String,
    pub subtitle: String,
    pub details: String,
    pub status: String,
}

/// A matched record of any searchable type.
#[derive(Debug, Clone)]
pub enum SearchHit {
    Contractor(Contractor),
    Task(Task),
    Offer(Offer),
    Email(Email),
    Support(SupportTicket),
}

impl SearchHit {
    pub fn into_result(self) -> SearchResult {
        match self {
            Self::Contractor(c) => project_contractor(c),
            Self::Task(t) => project_task(t),
            Self::Offer(o) => project_offer(o),
            Self::Email(e) => project_email(e),
            Self::Support(s) => project_ticket(s),
        }
    }
}

fn project_contractor(c: Contractor) -> SearchResult {
    let details = match &c.nip {
        Some(nip) => format!("{} | NIP: {}", c.phone, nip),
        None => c.phone.clone(),
    };
    SearchResult {
        id: c.id,
        kind: SearchKind::Contractor,
        title: c.name,
        subtitle: c.email,
        details,
        status: c.status.to_string(),
    }
}

fn project_task(t: Task) -> SearchResult {
    SearchResult {
        id: t.id,
        kind: SearchKind::Task,
        subtitle: format!("{} {}", t.date, t.time.format("%H:%M")),
        details: format!("Priority: {}", t.priority),
        title: t.title,
        status: t.status.to_string(),
    }
}

fn project_offer(o: Offer) -> SearchResult {
    SearchResult {
        id: o.id,
        kind: SearchKind::Offer,
        details: format!("{} {}", o.final_amount, o.currency),
        title: o.title,
        subtitle: o.contractor_name,
        status: o.status.to_string(),
    }
}

fn project_email(e: Email) -> SearchResult {
    let subtitle = match (e.email_type, &e.from) {
        (EmailType::Received, Some(from)) => format!("From: {}", from),
        _ => format!("To: {}", e.to),
    };
    SearchResult {
        id: e.id,
        kind: SearchKind::Email,
        subtitle,
        details: truncate(e.content.as_deref().unwrap_or_default(), DETAILS_CHARS),
        title: e.subject,
        status: e.status.to_string(),
    }
}

fn project_ticket(s: SupportTicket) -> SearchResult {
    SearchResult {
        id: s.id,
        kind: SearchKind::Support,
        title: truncate(&s.issue, DETAILS_CHARS),
        subtitle: s.user,
        details: format!("Priority: {}", s.priority),
        status: s.status.to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

fn contains(field: &str, needle: &str) -> bool {
    field.to_lowercase().contains(needle)
}

fn contains_opt(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|f| contains(f, needle))
}

/// Whether a record's searchable fields contain the lowercased needle.
fn matches(hit: &SearchHit, needle: &str) -> bool {
    match hit {
        SearchHit::Contractor(c) => {
            contains(&c.name, needle)
                || contains(&c.email, needle)
                || contains(&c.phone, needle)
                || contains_opt(c.nip.as_deref(), needle)
        }
        SearchHit::Task(t) => contains(&t.title, needle),
        SearchHit::Offer(o) => {
            contains(&o.title, needle)
                || contains(&o.contractor_name, needle)
                || contains_opt(o.description.as_deref(), needle)
        }
        SearchHit::Email(e) => {
            contains(&e.subject, needle)
                || contains(&e.to, needle)
                || contains_opt(e.content.as_deref(), needle)
        }
        SearchHit::Support(s) => {
            contains(&s.user, needle)
                || contains(&s.issue, needle)
                || contains_opt(s.email.as_deref(), needle)
        }
    }
}

async fn load(store: &dyn Store, user_id: Uuid, kind: SearchKind) -> StoreResult<Vec<SearchHit>> {
    Ok(match kind {
        SearchKind::Contractor => store
            .list_contractors()
            .await?
            .into_iter()
            .map(SearchHit::Contractor)
            .collect(),
        SearchKind::Task => store
            .list_tasks(user_id)
            .await?
            .into_iter()
            .map(SearchHit::Task)
            .collect(),
        SearchKind::Offer => store
            .list_offers()
            .await?
            .into_iter()
            .map(SearchHit::Offer)
            .collect(),
        SearchKind::Email => store
            .list_emails(user_id)
            .await?
            .into_iter()
            .map(SearchHit::Email)
            .collect(),
        SearchKind::Support => store
            .list_tickets()
            .await?
            .into_iter()
            .map(SearchHit::Support)
            .collect(),
    })
}

/// Search the requested collections on behalf of `user_id`.
///
/// Queries shorter than [`MIN_QUERY_CHARS`] return nothing without touching
/// the store.
pub async fn search(
    store: &dyn Store,
    user_id: Uuid,
    query: &str,
    kinds: &[SearchKind],
) -> StoreResult<Vec<SearchResult>> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Ok(Vec::new());
    }
    let needle = query.to_lowercase();

    let mut results = Vec::new();
    for kind in SearchKind::ALL.into_iter().filter(|k| kinds.contains(k)) {
        for hit in load(store, user_id, kind).await? {
            if matches(&hit, &needle) {
                results.push(hit.into_result());
                if results.len() == MAX_RESULTS {
                    return Ok(results);
                }
            }
        }
    }

    tracing::debug!(query = %query, results = results.len(), "Search completed");
    Ok(results)
}
