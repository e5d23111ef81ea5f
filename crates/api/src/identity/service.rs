//! The identity service: composes the user store, e-mail tokens and the
//! credential primitives into the account operations the HTTP surface calls.

use gatehouse_core::email_token::TokenKind;
use gatehouse_core::error::CoreError;
use gatehouse_core::types::DbId;
use gatehouse_core::user::{
    normalize_organizations, validate_email, Extensions, NewUser, User,
};
use gatehouse_db::models::user::UserResponse;
use gatehouse_db::repositories::UserRepo;

use super::EmailTokens;
use crate::auth::jwt::{sign_session, JwtConfig};
use crate::auth::password::{hash_password, validate_password_policy, verify_password};
use crate::error::{AppError, AppResult};

/// Registration input.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub organizations: Vec<DbId>,
    pub extensions: Extensions,
}

/// A user update as submitted by the user. Only `extensions` may differ from
/// the stored user; every other present field must match it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub id: Option<DbId>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub organizations: Option<Vec<DbId>>,
    pub extensions: Option<Extensions>,
}

pub struct IdentityService {
    users: UserRepo,
    tokens: EmailTokens,
    jwt: JwtConfig,
    password_cost: u32,
}

impl IdentityService {
    pub fn new(users: UserRepo, tokens: EmailTokens, jwt: JwtConfig, password_cost: u32) -> Self {
        Self {
            users,
            tokens,
            jwt,
            password_cost,
        }
    }

    pub fn users(&self) -> &UserRepo {
        &self.users
    }

    pub fn tokens(&self) -> &EmailTokens {
        &self.tokens
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub async fn user_by_id(&self, user_id: DbId) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::UserNotFound.into())
    }

    pub async fn user_by_email(&self, email: &str) -> AppResult<User> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or_else(|| CoreError::UserNotFound.into())
    }

    // -----------------------------------------------------------------------
    // Registration and activation
    // -----------------------------------------------------------------------

    /// Register a user, join the requested organizations and mail an
    /// activation token.
    ///
    /// Steps are not transactional: a failure after the insert leaves the
    /// user in place and the client recovers by requesting a new activation
    /// token.
    pub async fn create_user(&self, account: NewAccount) -> AppResult<User> {
        validate_email(&account.email)?;
        validate_password_policy(&account.password)?;

        let password_hash = self.hash(account.password).await?;
        let user = self
            .users
            .add(&NewUser {
                email: account.email,
                password_hash,
                extensions: account.extensions,
            })
            .await?;

        for org_id in normalize_organizations(account.organizations) {
            self.users.add_to_organization(user.id, org_id).await?;
        }

        self.tokens.issue(TokenKind::Activation, &user).await?;

        tracing::info!(user_id = user.id, "User created");
        self.user_by_id(user.id).await
    }

    /// Mail a fresh activation token.
    pub async fn request_activation(&self, email: &str) -> AppResult<()> {
        validate_email(email)?;
        let user = self.user_by_email(email).await?;
        self.tokens.issue(TokenKind::Activation, &user).await?;
        Ok(())
    }

    pub async fn activate(&self, email: &str, token: &str) -> AppResult<()> {
        let user = self.user_by_email(email).await?;
        let row_id = self
            .tokens
            .check(TokenKind::Activation, user.id, token)
            .await?;

        self.users.activate(user.id).await?;
        self.tokens.consume(TokenKind::Activation, row_id).await?;

        tracing::info!(user_id = user.id, "User activated");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    /// Password login into `organization_id`.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        organization_id: DbId,
    ) -> AppResult<UserResponse> {
        let user = self.user_by_email(email).await?;

        if !user.password_login() {
            return Err(CoreError::PasswordLoginForbidden.into());
        }
        if !user.activated() {
            return Err(CoreError::NotActivated.into());
        }
        if !user.is_member_of(organization_id) {
            return Err(CoreError::NotInOrganization.into());
        }
        validate_password_policy(password)?;
        if !self.verify(password.to_string(), user.password_hash.clone()).await? {
            tracing::info!(user_id = user.id, "Login with invalid password");
            return Err(CoreError::InvalidPassword.into());
        }

        tracing::info!(user_id = user.id, org_id = organization_id, "User logged in");
        self.sign_in(user, organization_id)
    }

    /// Mail a one-time login token for `organization_id`.
    pub async fn request_one_time_login(
        &self,
        email: &str,
        organization_id: DbId,
    ) -> AppResult<()> {
        validate_email(email)?;
        let user = self.user_by_email(email).await?;
        if !user.is_member_of(organization_id) {
            return Err(CoreError::NotInOrganization.into());
        }
        self.tokens.issue(TokenKind::OneTimeLogin, &user).await?;
        Ok(())
    }

    /// Exchange a one-time login token for a session. The first successful
    /// one-time login activates the account; it never enables password login.
    pub async fn one_time_login(
        &self,
        email: &str,
        organization_id: DbId,
        token: &str,
    ) -> AppResult<UserResponse> {
        let mut user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(CoreError::Forbidden)?;

        if !user.is_member_of(organization_id) {
            return Err(CoreError::NotInOrganization.into());
        }

        let row_id = self
            .tokens
            .check(TokenKind::OneTimeLogin, user.id, token)
            .await?;
        self.tokens.claim(TokenKind::OneTimeLogin, row_id).await?;

        if !user.activated() {
            self.users.activate(user.id).await?;
            user = self.user_by_id(user.id).await?;
            tracing::info!(user_id = user.id, "User activated by one-time login");
        }

        tracing::info!(
            user_id = user.id,
            org_id = organization_id,
            "User logged in with one-time token"
        );
        self.sign_in(user, organization_id)
    }

    /// The client view of `user` with a fresh session token. The hash stays behind.
    fn sign_in(&self, user: User, organization_id: DbId) -> AppResult<UserResponse> {
        let token = sign_session(user.id, organization_id, &user.email, &self.jwt)
            .map_err(|e| AppError::InternalError(format!("Session signing failed: {e}")))?;
        Ok(UserResponse::from(&user).with_token(token))
    }

    // -----------------------------------------------------------------------
    // Profile and passwords
    // -----------------------------------------------------------------------

    /// Apply a profile update. Only extensions can change here.
    pub async fn update(&self, user_id: DbId, update: ProfileUpdate) -> AppResult<User> {
        let mut stored = self.user_by_id(user_id).await?;

        let id_changed = update.id.is_some_and(|id| id != stored.id);
        let email_changed = update.email.as_deref().is_some_and(|e| !stored.has_email(e));
        let password_changed = update.password.as_deref().is_some_and(|p| !p.is_empty());
        let organizations_changed = update
            .organizations
            .is_some_and(|orgs| normalize_organizations(orgs) != stored.organizations);

        if id_changed || email_changed || password_changed || organizations_changed {
            tracing::info!(user_id, "Rejected update of immutable user fields");
            return Err(CoreError::UpdateForbidden.into());
        }

        if let Some(extensions) = update.extensions {
            stored.extensions = extensions;
        }
        if !self.users.update(&stored).await? {
            return Err(CoreError::UserNotFound.into());
        }
        self.user_by_id(user_id).await
    }

    /// Change the password of a signed-in user who knows the current one.
    pub async fn password_change(
        &self,
        user_id: DbId,
        email: &str,
        new_password: &str,
        old_password: &str,
    ) -> AppResult<()> {
        let user = self.user_by_id(user_id).await?;
        Self::check_password_owner(&user, email)?;

        if !self
            .verify(old_password.to_string(), user.password_hash.clone())
            .await?
        {
            return Err(CoreError::InvalidPassword.into());
        }

        self.store_password(user, new_password).await
    }

    /// Change the password without the old one. Only call this after a reset
    /// token has been checked.
    pub async fn password_change_forced(
        &self,
        user_id: DbId,
        email: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.user_by_id(user_id).await?;
        Self::check_password_owner(&user, email)?;
        self.store_password(user, new_password).await
    }

    /// Mail a reset token. Unknown addresses succeed silently so the endpoint
    /// does not reveal which addresses are registered.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        validate_email(email)?;
        match self.users.find_by_email(email).await? {
            Some(user) => {
                self.tokens.issue(TokenKind::Reset, &user).await?;
            }
            None => tracing::info!("Password reset requested for unknown address"),
        }
        Ok(())
    }

    /// Set a new password with a reset token.
    ///
    /// Every token failure, expiry included, is reported as
    /// `password_change_forbidden`.
    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(CoreError::PasswordChangeForbidden)?;

        let row_id = match self.tokens.check(TokenKind::Reset, user.id, token).await {
            Ok(id) => id,
            Err(e) => {
                tracing::info!(user_id = user.id, reason = e.code(), "Reset token rejected");
                return Err(CoreError::PasswordChangeForbidden.into());
            }
        };

        self.password_change_forced(user.id, email, new_password).await?;
        self.tokens.consume(TokenKind::Reset, row_id).await?;

        tracing::info!(user_id = user.id, "Password reset");
        Ok(())
    }

    fn check_password_owner(user: &User, email: &str) -> Result<(), CoreError> {
        if !user.has_email(email) {
            return Err(CoreError::Forbidden);
        }
        if !user.password_login() {
            return Err(CoreError::PasswordLoginForbidden);
        }
        Ok(())
    }

    async fn store_password(&self, mut user: User, new_password: &str) -> AppResult<()> {
        validate_password_policy(new_password)?;
        user.password_hash = self.hash(new_password.to_string()).await?;
        self.users.update(&user).await?;
        tracing::info!(user_id = user.id, "Password changed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // bcrypt off the async executor
    // -----------------------------------------------------------------------

    async fn hash(&self, password: String) -> AppResult<String> {
        let cost = self.password_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AppError::InternalError(format!("Hashing task failed: {e}")))?
            .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
    }

    async fn verify(&self, password: String, hash: String) -> AppResult<bool> {
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::InternalError(format!("Hashing task failed: {e}")))
    }
}
