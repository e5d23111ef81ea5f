//! bcrypt password hashing, verification, and the password policy.
//!
//! Hashes are self-describing (`$2b$<cost>$<salt+hash>`), so the cost used at
//! hash time travels with the hash and verification needs no configuration.

use gatehouse_core::error::CoreError;

pub use bcrypt::DEFAULT_COST;

/// Minimum password length, counted in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash a plaintext password with a random salt at the given cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Verify a plaintext password against a stored bcrypt hash.
///
/// A hash that cannot be decoded never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be decoded");
            false
        }
    }
}

/// The only password rule: at least [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password_policy(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::PasswordInsufficient);
    }
    Ok(())
}
