//! A mailer that records sends in the log instead of delivering them.

use crate::{MailError, Mailer, TemplatedMail};

/// Logs each message at INFO. Used in development when no SMTP relay is configured.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &TemplatedMail) -> Result<(), MailError> {
        tracing::info!(
            to = %mail.to,
            template = %mail.template,
            subject = %mail.subject,
            "Email not sent (log-only mailer)"
        );
        Ok(())
    }
}
