//! Row structs and response DTOs.
//!
//! Row structs mirror table columns exactly (`FromRow`) and are converted to
//! the domain types of `gatehouse_core` before leaving this crate.

pub mod email_token;
pub mod role;
pub mod user;
