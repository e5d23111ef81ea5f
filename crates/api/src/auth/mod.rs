//! Credential primitives: password hashing, random e-mail tokens and signed
//! session tokens. Everything here is stateless and safe to share.

pub mod jwt;
pub mod password;
pub mod token;
