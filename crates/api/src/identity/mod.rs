//! Account lifecycle: registration, activation, password login and change,
//! password reset, and one-time login.

pub mod email_tokens;
pub mod service;

pub use email_tokens::EmailTokens;
pub use service::{IdentityService, NewAccount, ProfileUpdate};
