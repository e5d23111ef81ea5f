//! Outbound e-mail for token delivery.
//!
//! Callers describe a message as a [`TemplatedMail`] (template name, subject
//! and a JSON context) and hand it to a [`Mailer`]. [`SmtpMailer`] renders
//! the template and sends it over SMTP; [`LogMailer`] only logs.

pub mod log;
pub mod smtp;
pub mod templates;

use serde::Serialize;

pub use self::log::LogMailer;
pub use smtp::{EmailConfig, SmtpMailer};
pub use templates::TemplateRegistry;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// A template failed to load or render.
    #[error("Email template error: {0}")]
    Template(String),
}

// ---------------------------------------------------------------------------
// Message + Mailer
// ---------------------------------------------------------------------------

/// A message to render and send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplatedMail {
    pub to: String,
    /// Name the template was registered under.
    pub template: String,
    pub subject: String,
    /// Render context.
    pub data: serde_json::Value,
}

/// Anything that can deliver a [`TemplatedMail`].
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &TemplatedMail) -> Result<(), MailError>;
}
