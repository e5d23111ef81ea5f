//! Business-rule failures with stable, client-visible codes.
//!
//! Every variant maps to exactly one code string via [`CoreError::code`].
//! Clients branch on these strings, so they must never change.

/// Coarse grouping used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed or policy-violating input (422).
    Validation,
    /// Authentication or authorization failure (403).
    Auth,
    /// Email-token lifecycle failure (403).
    Token,
    /// Request conflicts with stored state (422).
    Conflict,
    /// Referenced record does not exist (422).
    Missing,
    /// Structurally valid request the server refuses to store (400).
    BadInput,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("e-mail address is missing or invalid")]
    MissingEmail,

    #[error("password does not satisfy the password policy")]
    PasswordInsufficient,

    #[error("no session token supplied")]
    MissingToken,

    #[error("session token is malformed")]
    MalformedToken,

    #[error("forbidden")]
    Forbidden,

    #[error("no user logged in")]
    NoUserLoggedIn,

    #[error("invalid password")]
    InvalidPassword,

    #[error("user is not activated")]
    NotActivated,

    #[error("password login is disabled for this user")]
    PasswordLoginForbidden,

    #[error("user is not a member of the organization")]
    NotInOrganization,

    #[error("activation token rejected")]
    ActivationForbidden,

    #[error("password change token rejected")]
    PasswordChangeForbidden,

    #[error("one-time login token rejected")]
    OneTimeLoginForbidden,

    #[error("token expired")]
    TokenExpired,

    #[error("e-mail address already in use")]
    EmailInUse,

    #[error("attempted to change an immutable user field")]
    UpdateForbidden,

    #[error("user not found")]
    UserNotFound,

    #[error("user was not a member of the organization")]
    NoOrganizationsRemoved,

    #[error("invalid preference value: {0}")]
    InvalidPreferenceValue(String),

    #[error("setting not found: {0}")]
    SettingNotFound(String),
}

impl CoreError {
    /// The stable surface code sent to clients in `{"message": ...}`.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::MissingEmail => "validate_missing_email",
            CoreError::PasswordInsufficient => "validate_password_insufficient",
            CoreError::MissingToken => "auth_missing_token",
            CoreError::MalformedToken => "auth_malformed_token",
            CoreError::Forbidden => "auth_forbidden",
            CoreError::NoUserLoggedIn => "no_user_logged_in",
            CoreError::InvalidPassword => "login_invalid_password",
            CoreError::NotActivated => "user_not_activated",
            CoreError::PasswordLoginForbidden => "user_password_login_forbidden",
            CoreError::NotInOrganization => "user_not_in_organization",
            CoreError::ActivationForbidden => "activation_forbidden",
            CoreError::PasswordChangeForbidden => "password_change_forbidden",
            CoreError::OneTimeLoginForbidden => "oneTimePassword_login_forbidden",
            CoreError::TokenExpired => "token_expired",
            CoreError::EmailInUse => "user_email_in_user",
            CoreError::UpdateForbidden => "update_forbidden",
            CoreError::UserNotFound => "user_not_found",
            CoreError::NoOrganizationsRemoved => "no_organizations_removed",
            CoreError::InvalidPreferenceValue(_) => "preferences_invalid_value",
            CoreError::SettingNotFound(_) => "setting_not_found",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            CoreError::MissingEmail | CoreError::PasswordInsufficient => ErrorClass::Validation,
            CoreError::MissingToken
            | CoreError::MalformedToken
            | CoreError::Forbidden
            | CoreError::NoUserLoggedIn
            | CoreError::InvalidPassword
            | CoreError::NotActivated
            | CoreError::PasswordLoginForbidden
            | CoreError::NotInOrganization => ErrorClass::Auth,
            CoreError::ActivationForbidden
            | CoreError::PasswordChangeForbidden
            | CoreError::OneTimeLoginForbidden
            | CoreError::TokenExpired => ErrorClass::Token,
            CoreError::EmailInUse
            | CoreError::UpdateForbidden
            | CoreError::NoOrganizationsRemoved => ErrorClass::Conflict,
            CoreError::UserNotFound | CoreError::SettingNotFound(_) => ErrorClass::Missing,
            CoreError::InvalidPreferenceValue(_) => ErrorClass::BadInput,
        }
    }
}
