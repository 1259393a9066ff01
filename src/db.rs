//! Storage backend construction

use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::password::hash_password;
use crate::config::Settings;
use crate::domain::users::{User, UserRole};
use crate::store::{MemoryStore, PgStore, Store};

/// Create a PostgreSQL connection pool and apply pending migrations
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(database_url)
        .context("Invalid DATABASE_URL")?
        .application_name("crm-backend");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect_with(connect_options)
        .await
        .context("Failed to connect to PostgreSQL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!(max_connections, "Database connection pool established");

    Ok(pool)
}

/// Pick the storage backend: PostgreSQL when `DATABASE_URL` is set, memory otherwise
pub async fn create_store(settings: &Settings) -> Result<Arc<dyn Store>> {
    match &settings.database_url {
        Some(url) => {
            let pool = create_pool(url, settings.database_max_connections).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set - using in-memory store, data will not persist");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Create the first administrator when the user table is empty and
/// `ADMIN_USERNAME`/`ADMIN_PASSWORD` are configured.
pub async fn seed_admin(store: &dyn Store, settings: &Settings) -> Result<()> {
    let (Some(username), Some(password)) = (&settings.admin_username, &settings.admin_password)
    else {
        return Ok(());
    };

    if !store.list_users().await?.is_empty() {
        return Ok(());
    }

    let hash = hash_password(password).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;
    let admin = store
        .insert_user(User::new(
            username.clone(),
            hash,
            UserRole::Admin,
            settings.admin_email.clone(),
        ))
        .await?;

    tracing::info!(user_id = %admin.id, username = %admin.username, "Bootstrap admin created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_admin() -> Settings {
        Settings {
            admin_username: Some("admin".into()),
            admin_password: Some("change-me-now".into()),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn seeds_admin_once() {
        let store = MemoryStore::new();
        seed_admin(&store, &settings_with_admin()).await.unwrap();
        seed_admin(&store, &settings_with_admin()).await.unwrap();

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_admin());
        assert_ne!(users[0].password_hash, "change-me-now");
    }

    #[tokio::test]
    async fn skipped_without_credentials() {
        let store = MemoryStore::new();
        seed_admin(&store, &Settings::default()).await.unwrap();
        assert!(store.list_users().await.unwrap().is_empty());
    }
}
