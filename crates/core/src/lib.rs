//! Domain building blocks for the identity and access core.
//!
//! Everything in this crate is pure: no database, no network, no clock
//! other than values passed in by the caller.

pub mod email_token;
pub mod error;
pub mod permissions;
pub mod preferences;
pub mod types;
pub mod user;
