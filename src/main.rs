use anyhow::{Context, Result};
use std::sync::Arc;

use crm_backend::auth::{CaptchaVerifier, PermissiveCaptcha, RecaptchaVerifier};
use crm_backend::services::{MailTransport, SmtpMailer};
use crm_backend::{app, config, db, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;

    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting CRM backend"
    );

    let store = db::create_store(&settings).await?;
    db::seed_admin(store.as_ref(), &settings).await?;

    let captcha: Arc<dyn CaptchaVerifier> = match &settings.captcha_secret {
        Some(secret) => Arc::new(RecaptchaVerifier::new(
            secret.clone(),
            settings.captcha_verify_url.clone(),
            settings.captcha_timeout_seconds,
        )?),
        None => {
            tracing::warn!("CAPTCHA_SECRET not set - accepting every CAPTCHA token (dev only)");
            Arc::new(PermissiveCaptcha)
        }
    };

    let mailer: Option<Arc<dyn MailTransport>> = match &settings.smtp {
        Some(smtp) => Some(Arc::new(
            SmtpMailer::new(smtp).context("Invalid SMTP configuration")?,
        )),
        None => {
            tracing::warn!("SMTP_HOST not set - outgoing email stays in draft");
            None
        }
    };

    let state = app::AppState::new(settings.clone(), store, captcha, mailer);
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
