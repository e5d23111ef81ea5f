//! Opaque random tokens for activation, reset and one-time-login e-mails.

use rand::Rng;

/// Number of random bytes per token.
pub const TOKEN_BYTES: usize = 32;

/// Generate a token of [`TOKEN_BYTES`] random bytes, lowercase hex encoded.
pub fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes[..]);
    hex::encode(bytes)
}
