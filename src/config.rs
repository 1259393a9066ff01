use anyhow::{bail, Context, Result};
use std::env;
use url::Url;

pub const DEFAULT_CAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";
const DEV_JWT_SECRET: &str = "dev-only-insecure-jwt-secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

/// SMTP relay settings. Absent when `SMTP_HOST` is not set.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub from_address: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Database (in-memory store when unset)
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Sessions
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,

    // CAPTCHA
    pub captcha_secret: Option<String>,
    pub captcha_verify_url: String,
    pub captcha_timeout_seconds: u64,

    // Outbound mail
    pub smtp: Option<SmtpSettings>,

    // Notifications kept per user
    pub notification_retention_limit: usize,

    // First admin account, created when the user table is empty
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_email: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Environment::Dev,
            server_addr: "0.0.0.0:8080".to_string(),
            database_url: None,
            database_max_connections: 10,
            cors_allow_origins: vec!["http://localhost:3000".to_string()],
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl_seconds: 8 * 3600,
            captcha_secret: None,
            captcha_verify_url: DEFAULT_CAPTCHA_VERIFY_URL.to_string(),
            captcha_timeout_seconds: 10,
            smtp: None,
            notification_retention_limit: 200,
            admin_username: None,
            admin_password: None,
            admin_email: "admin@localhost".to_string(),
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or(defaults.server_addr);

        // Database
        let database_url = non_empty("DATABASE_URL");
        let database_max_connections =
            parsed("DATABASE_MAX_CONNECTIONS").unwrap_or(defaults.database_max_connections);

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Sessions
        let jwt_secret = match non_empty("JWT_SECRET") {
            Some(secret) => secret,
            None if env.is_dev() => defaults.jwt_secret,
            None => bail!("JWT_SECRET must be set outside dev"),
        };
        let jwt_ttl_seconds = parsed("JWT_TTL_SECONDS").unwrap_or(defaults.jwt_ttl_seconds);

        // CAPTCHA
        let captcha_secret = non_empty("CAPTCHA_SECRET");
        if captcha_secret.is_none() && !env.is_dev() {
            bail!("CAPTCHA_SECRET must be set outside dev");
        }
        let captcha_verify_url =
            env::var("CAPTCHA_VERIFY_URL").unwrap_or(defaults.captcha_verify_url);
        Url::parse(&captcha_verify_url).context("CAPTCHA_VERIFY_URL is not a valid URL")?;
        let captcha_timeout_seconds =
            parsed("CAPTCHA_TIMEOUT_SECONDS").unwrap_or(defaults.captcha_timeout_seconds);

        // Outbound mail
        let smtp = non_empty("SMTP_HOST").map(|host| SmtpSettings {
            host,
            port: parsed("SMTP_PORT").unwrap_or(587),
            from_address: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "noreply@crm.local".to_string()),
            user: non_empty("SMTP_USER"),
            password: non_empty("SMTP_PASSWORD"),
        });

        let notification_retention_limit = parsed("NOTIFICATION_RETENTION_LIMIT")
            .filter(|n: &usize| *n > 0)
            .unwrap_or(defaults.notification_retention_limit);

        Ok(Settings {
            env,
            server_addr,
            database_url,
            database_max_connections,
            cors_allow_origins,
            jwt_secret,
            jwt_ttl_seconds,
            captcha_secret,
            captcha_verify_url,
            captcha_timeout_seconds,
            smtp,
            notification_retention_limit,
            admin_username: non_empty("ADMIN_USERNAME"),
            admin_password: non_empty("ADMIN_PASSWORD"),
            admin_email: env::var("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
        })
    }
}
