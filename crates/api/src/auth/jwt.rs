//! Session tokens: HS256-signed JWTs carrying `(UserId, OrganizationId, Email)`.
//!
//! Tokens are stateless; nothing is stored server-side. The signing secret
//! must be at least [`MIN_SECRET_LENGTH`] characters.

use std::fmt;

use gatehouse_core::error::CoreError;
use gatehouse_core::types::DbId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ConfigError;

/// Shortest accepted signing secret, in characters.
pub const MIN_SECRET_LENGTH: usize = 60;

/// Default session lifetime in hours.
pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24;

/// Longest accepted session lifetime in hours (one year).
pub const MAX_SESSION_EXPIRY_HOURS: i64 = 8_760;

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionClaims {
    #[serde(rename = "UserId")]
    pub user_id: DbId,
    /// The organization the session is acting in.
    #[serde(rename = "OrganizationId")]
    pub organization_id: DbId,
    #[serde(rename = "Email")]
    pub email: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

/// Signing secret and session lifetime.
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    pub session_expiry_hours: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("session_expiry_hours", &self.session_expiry_hours)
            .finish()
    }
}

impl JwtConfig {
    /// Validate the secret length and build the configuration.
    pub fn new(secret: impl Into<String>, session_expiry_hours: i64) -> Result<Self, ConfigError> {
        let secret = secret.into();
        let length = secret.chars().count();
        if length < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort(length));
        }
        if !(1..=MAX_SESSION_EXPIRY_HOURS).contains(&session_expiry_hours) {
            return Err(ConfigError::Invalid {
                key: "SESSION_EXPIRY_HOURS",
                message: format!("must be between 1 and {MAX_SESSION_EXPIRY_HOURS}"),
            });
        }
        Ok(Self {
            secret,
            session_expiry_hours,
        })
    }
}

/// Mint a session token for a user acting in `organization_id`.
pub fn sign_session(
    user_id: DbId,
    organization_id: DbId,
    email: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        user_id,
        organization_id,
        email: email.to_string(),
        iat: now,
        exp: now + config.session_expiry_hours * 3600,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a compact token and return its claims.
///
/// Undecodable input is [`CoreError::MalformedToken`]; a token that decodes
/// but fails signature, algorithm or expiry checks is [`CoreError::Forbidden`].
pub fn validate_session(token: &str, config: &JwtConfig) -> Result<SessionClaims, CoreError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
            CoreError::MalformedToken
        }
        // An unreadable header fails before the signature is checked.
        ErrorKind::Json(_) if decode_header(token).is_err() => CoreError::MalformedToken,
        _ => CoreError::Forbidden,
    })
}

/// Parse an `Authorization` header value of the form `Bearer <token>`.
pub fn parse_session(header: Option<&str>, config: &JwtConfig) -> Result<SessionClaims, CoreError> {
    let header = header.ok_or(CoreError::MissingToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(CoreError::MalformedToken)?;
    validate_session(token, config)
}
