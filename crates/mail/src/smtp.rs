//! SMTP delivery of rendered templates.
//!
//! [`SmtpMailer`] wraps the `lettre` async SMTP transport. Configuration is
//! loaded from environment variables; if `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and no SMTP mailer should be
//! constructed.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::templates::TemplateRegistry;
use crate::{MailError, Mailer, TemplatedMail};

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@gatehouse.local";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    /// Defaults to 587.
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable         | Required | Default                    |
    /// |------------------|----------|----------------------------|
    /// | `SMTP_HOST`      | yes      | --                         |
    /// | `SMTP_PORT`      | no       | `587`                      |
    /// | `SMTP_FROM`      | no       | `noreply@gatehouse.local`  |
    /// | `SMTP_USER`      | no       | --                         |
    /// | `SMTP_PASSWORD`  | no       | --                         |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// Renders templates and sends them through one pooled SMTP transport.
pub struct SmtpMailer {
    from_address: String,
    templates: TemplateRegistry,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig, templates: TemplateRegistry) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from_address: config.from_address,
            templates,
            transport: builder.build(),
        })
    }
}

/// Render `mail` and assemble the MIME message.
fn compose(
    from_address: &str,
    templates: &TemplateRegistry,
    mail: &TemplatedMail,
) -> Result<Message, MailError> {
    let body = templates.render(&mail.template, &mail.data)?;
    Message::builder()
        .from(from_address.parse()?)
        .to(mail.to.parse()?)
        .subject(mail.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(body)
        .map_err(|e| MailError::Build(e.to_string()))
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &TemplatedMail) -> Result<(), MailError> {
        let message = compose(&self.from_address, &self.templates, mail)?;
        self.transport.send(message).await?;
        tracing::info!(to = %mail.to, template = %mail.template, "Email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn templates() -> TemplateRegistry {
        let mut templates = TemplateRegistry::new();
        templates.register("activation", "<p>{{token}}</p>").unwrap();
        templates
    }

    fn mail(to: &str) -> TemplatedMail {
        TemplatedMail {
            to: to.into(),
            template: "activation".into(),
            subject: "Activate your account".into(),
            data: json!({"token": "abc"}),
        }
    }

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn message_is_built_from_the_rendered_template() {
        let message = compose(DEFAULT_FROM_ADDRESS, &templates(), &mail("a@b.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Activate your account"));
        assert!(raw.contains("<p>abc</p>"));
    }

    #[test]
    fn bad_recipient_is_an_address_error() {
        assert_matches!(
            compose(DEFAULT_FROM_ADDRESS, &templates(), &mail("not-an-email")),
            Err(MailError::Address(_))
        );
    }
}
