//! Single-use e-mail tokens: kinds, expiry rule and validation.
//!
//! A token row is looked up by `(user_id, token, kind)`. Validation here is
//! pure so the storage layer only has to fetch the candidate row.

use chrono::Duration;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Purpose of an e-mail token. The discriminants are the stored `kind` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Activation = 1,
    Reset = 2,
    OneTimeLogin = 3,
}

impl TokenKind {
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(TokenKind::Activation),
            2 => Some(TokenKind::Reset),
            3 => Some(TokenKind::OneTimeLogin),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TokenKind::Activation => "activation",
            TokenKind::Reset => "reset",
            TokenKind::OneTimeLogin => "one_time_login",
        }
    }

    /// The kind-specific error a rejected token surfaces as.
    pub fn forbidden(self) -> CoreError {
        match self {
            TokenKind::Activation => CoreError::ActivationForbidden,
            TokenKind::Reset => CoreError::PasswordChangeForbidden,
            TokenKind::OneTimeLogin => CoreError::OneTimeLoginForbidden,
        }
    }
}

/// An issued token as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailToken {
    pub id: DbId,
    pub user_id: DbId,
    /// Address the token was mailed to, kept for audit.
    pub email: String,
    pub token: String,
    pub issued: Timestamp,
    pub kind: TokenKind,
}

/// Convert the configured `tokenLifeSpan` (hours, fractional allowed) to a duration.
pub fn life_span_from_hours(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// A token is expired once its full life span has elapsed; the boundary itself is expired.
pub fn is_expired(issued: Timestamp, now: Timestamp, life_span: Duration) -> bool {
    now - issued >= life_span
}

/// Validate a looked-up row against the presented token.
///
/// A missing row or a row of the wrong kind/user/token yields the
/// kind-specific rejection; an expired row yields [`CoreError::TokenExpired`]
/// so callers can prompt for a new token. Returns the row id to consume.
pub fn verify(
    kind: TokenKind,
    row: Option<&EmailToken>,
    user_id: DbId,
    token: &str,
    now: Timestamp,
    life_span: Duration,
) -> Result<DbId, CoreError> {
    let row = row.ok_or_else(|| kind.forbidden())?;

    if row.kind != kind {
        return Err(kind.forbidden());
    }

    if is_expired(row.issued, now, life_span) {
        return Err(CoreError::TokenExpired);
    }

    if row.user_id != user_id || row.token != token {
        return Err(kind.forbidden());
    }

    Ok(row.id)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::types::from_unix;

    const T0: i64 = 1_700_000_000;

    fn row(kind: TokenKind) -> EmailToken {
        EmailToken {
            id: 9,
            user_id: 4,
            email: "a@b.com".into(),
            token: "abc".into(),
            issued: from_unix(T0).unwrap(),
            kind,
        }
    }

    fn at(offset_secs: i64) -> Timestamp {
        from_unix(T0 + offset_secs).unwrap()
    }

    #[test]
    fn kind_round_trips_through_storage_value() {
        for kind in [TokenKind::Activation, TokenKind::Reset, TokenKind::OneTimeLogin] {
            assert_eq!(TokenKind::from_i64(kind.as_i64()), Some(kind));
        }
        assert_eq!(TokenKind::from_i64(0), None);
    }

    #[test]
    fn exact_life_span_boundary_is_expired() {
        let span = life_span_from_hours(1.0);
        let issued = at(0);
        assert!(!is_expired(issued, at(3599), span));
        assert!(is_expired(issued, at(3600), span));
    }

    #[test]
    fn fractional_hours_are_supported() {
        assert_eq!(life_span_from_hours(0.5), Duration::minutes(30));
    }

    #[test]
    fn valid_token_returns_row_id() {
        let r = row(TokenKind::Reset);
        let id = verify(TokenKind::Reset, Some(&r), 4, "abc", at(60), Duration::hours(1));
        assert_eq!(id, Ok(9));
    }

    #[test]
    fn missing_row_is_kind_specific() {
        assert_matches!(
            verify(TokenKind::Activation, None, 4, "abc", at(0), Duration::hours(1)),
            Err(CoreError::ActivationForbidden)
        );
        assert_matches!(
            verify(TokenKind::OneTimeLogin, None, 4, "abc", at(0), Duration::hours(1)),
            Err(CoreError::OneTimeLoginForbidden)
        );
    }

    #[test]
    fn token_of_another_kind_never_authorizes() {
        let r = row(TokenKind::Activation);
        assert_matches!(
            verify(TokenKind::Reset, Some(&r), 4, "abc", at(0), Duration::hours(1)),
            Err(CoreError::PasswordChangeForbidden)
        );
    }

    #[test]
    fn expired_token_is_reported_distinctly() {
        let r = row(TokenKind::Reset);
        assert_matches!(
            verify(TokenKind::Reset, Some(&r), 4, "abc", at(7200), Duration::hours(1)),
            Err(CoreError::TokenExpired)
        );
    }

    #[test]
    fn mismatched_user_or_token_is_rejected() {
        let r = row(TokenKind::Reset);
        assert_matches!(
            verify(TokenKind::Reset, Some(&r), 5, "abc", at(0), Duration::hours(1)),
            Err(CoreError::PasswordChangeForbidden)
        );
        assert_matches!(
            verify(TokenKind::Reset, Some(&r), 4, "abd", at(0), Duration::hours(1)),
            Err(CoreError::PasswordChangeForbidden)
        );
    }
}
