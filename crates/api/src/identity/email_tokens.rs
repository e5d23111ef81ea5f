//! Issuing, checking and consuming single-use e-mail tokens.
//!
//! The protocol is issue, then check, then perform the action, then consume.
//! Consuming only after the action succeeds leaves the token usable for a
//! retry if the action fails. One-time login is the exception: the token is
//! claimed before a session is minted, so only one request gets a session.

use std::sync::Arc;

use chrono::Utc;
use gatehouse_core::email_token::{self, TokenKind};
use gatehouse_core::error::CoreError;
use gatehouse_core::types::DbId;
use gatehouse_core::user::User;
use gatehouse_db::repositories::EmailTokenRepo;
use gatehouse_db::DbError;
use gatehouse_mail::{Mailer, TemplatedMail};
use serde_json::json;

use crate::auth::token::random_token;
use crate::config::IdentityConfig;
use crate::error::AppResult;

pub struct EmailTokens {
    repo: EmailTokenRepo,
    mailer: Arc<dyn Mailer>,
    config: IdentityConfig,
    life_span: chrono::Duration,
}

impl EmailTokens {
    pub fn new(repo: EmailTokenRepo, mailer: Arc<dyn Mailer>, config: IdentityConfig) -> Self {
        let life_span = config.life_span();
        Self {
            repo,
            mailer,
            config,
            life_span,
        }
    }

    /// Persist a new token for `user` and mail it.
    ///
    /// The user's expired tokens of the same kind are deleted first. The row
    /// is kept even when sending fails; the caller sees the mail error and the
    /// user can ask for another token.
    pub async fn issue(&self, kind: TokenKind, user: &User) -> AppResult<String> {
        let now = Utc::now();

        let purged = self
            .repo
            .delete_expired_for(kind, user.id, now - self.life_span)
            .await?;
        if purged > 0 {
            tracing::debug!(
                user_id = user.id,
                kind = kind.label(),
                purged,
                "Purged expired tokens"
            );
        }

        let token = random_token();
        self.repo
            .insert(kind, user.id, &user.email, &token, now)
            .await?;

        let template = self.config.template_for(kind);
        let mail = TemplatedMail {
            to: user.email.clone(),
            template: template.template.clone(),
            subject: template.subject.clone(),
            data: json!({
                "email": user.email,
                "token": token,
                "kind": kind.label(),
            }),
        };
        self.mailer.send(&mail).await?;

        tracing::info!(user_id = user.id, kind = kind.label(), "Email token issued");
        Ok(token)
    }

    /// Validate a presented token and return the row id to consume.
    ///
    /// Lookup failures are reported as the kind-specific rejection.
    pub async fn check(
        &self,
        kind: TokenKind,
        user_id: DbId,
        token: &str,
    ) -> Result<DbId, CoreError> {
        let row = match self.repo.find(kind, user_id, token).await {
            Ok(row) => row,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    user_id,
                    kind = kind.label(),
                    "Email token lookup failed"
                );
                return Err(kind.forbidden());
            }
        };
        email_token::verify(kind, row.as_ref(), user_id, token, Utc::now(), self.life_span)
    }

    /// Delete a checked token after its action has been performed.
    ///
    /// A row that is already gone means a concurrent request passed `check`
    /// with the same token and consumed it first. Both requests performed
    /// the same change, so this one still succeeds.
    pub async fn consume(&self, kind: TokenKind, id: DbId) -> AppResult<()> {
        if !self.repo.delete(id).await? {
            tracing::debug!(token_id = id, kind = kind.label(), "Email token already consumed");
        }
        Ok(())
    }

    /// Delete a checked token before its action, failing with the kind's
    /// rejection if another request consumed it first.
    pub async fn claim(&self, kind: TokenKind, id: DbId) -> AppResult<()> {
        if !self.repo.delete(id).await? {
            return Err(kind.forbidden().into());
        }
        Ok(())
    }

    /// Delete every token whose life span has elapsed.
    pub async fn purge_expired(&self) -> Result<u64, DbError> {
        self.repo
            .purge_issued_before(Utc::now() - self.life_span)
            .await
    }
}
