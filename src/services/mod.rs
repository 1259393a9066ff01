//! Service layer
//!
//! Business logic shared by the route handlers: pricing, status workflow,
//! search, analytics, and the notification and mail collaborators.

pub mod analytics;
pub mod mailer;
pub mod notifications;
pub mod pricing;
pub mod search;
pub mod workflow;

pub use mailer::{DeliveryOutcome, MailTransport, SmtpMailer};
pub use notifications::Notifier;
