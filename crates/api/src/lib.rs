//! Gatehouse identity and access server library.
//!
//! Exposes the building blocks (config, state, error handling, identity
//! service, routes) so integration tests and the binary entrypoint can both
//! access them.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
