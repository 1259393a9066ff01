//! Outbound email delivery
//!
//! [`SmtpMailer`] wraps the `lettre` async SMTP transport. When `SMTP_HOST`
//! is not configured no transport exists and callers receive
//! [`DeliveryOutcome::NotConfigured`] instead of an error.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Serialize;

use crate::config::SmtpSettings;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// Failure reported by a non-SMTP transport.
    #[error("{0}")]
    Rejected(String),
}

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// Message handed to the delivery collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub content: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError>;
}

/// Result of a delivery attempt, reported next to the business state change
/// that triggered it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    NotConfigured,
    Skipped { reason: String },
    Failed { reason: String },
}

impl DeliveryOutcome {
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Attempt delivery through the configured transport, if any.
pub async fn deliver(transport: Option<&dyn MailTransport>, mail: &OutgoingMail) -> DeliveryOutcome {
    let Some(transport) = transport else {
        tracing::debug!(to = %mail.to, "Mail transport not configured - delivery skipped");
        return DeliveryOutcome::NotConfigured;
    };

    match transport.send(mail).await {
        Ok(()) => {
            tracing::info!(to = %mail.to, subject = %mail.subject, "Email delivered");
            DeliveryOutcome::Delivered
        }
        Err(e) => {
            tracing::warn!(to = %mail.to, error = %e, "Email delivery failed");
            DeliveryOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// Sends plain-text mail through an SMTP relay (STARTTLS).
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpSettings) -> Result<Self, DeliveryError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port);

        if let (Some(user), Some(pass)) = (&config.user, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        tracing::info!(host = %config.host, port = config.port, "SMTP mailer initialized");

        Ok(Self {
            from: config.from_address.parse()?,
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(mail.to.parse()?)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.content.clone())
            .map_err(|e| DeliveryError::Build(e.to_string()))?;

        self.transport.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Refusing;

    #[async_trait]
    impl MailTransport for Refusing {
        async fn send(&self, _mail: &OutgoingMail) -> Result<(), DeliveryError> {
            Err(DeliveryError::Rejected("mailbox full".into()))
        }
    }

    fn mail() -> OutgoingMail {
        OutgoingMail {
            to: "client@example.com".into(),
            subject: "Offer".into(),
            content: "Hello".into(),
        }
    }

    #[tokio::test]
    async fn missing_transport_is_not_an_error() {
        assert_eq!(deliver(None, &mail()).await, DeliveryOutcome::NotConfigured);
    }

    #[tokio::test]
    async fn transport_failure_carries_reason() {
        let outcome = deliver(Some(&Refusing as &dyn MailTransport), &mail()).await;
        assert_eq!(outcome.failure_reason(), Some("mailbox full"));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(DeliveryOutcome::Failed {
            reason: "x".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "x");
    }

    #[test]
    fn address_errors_display() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = DeliveryError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("Email address parse error"));
    }
}
