//! Repository layer.
//!
//! Each repository owns a clone of the pool and renders its statements for
//! the connected [`Dialect`](crate::Dialect) once, at construction.

pub mod email_token_repo;
pub mod preference_repo;
pub mod role_repo;
pub mod user_repo;

pub use email_token_repo::EmailTokenRepo;
pub use preference_repo::PreferenceRepo;
pub use role_repo::RoleRepo;
pub use user_repo::UserRepo;
