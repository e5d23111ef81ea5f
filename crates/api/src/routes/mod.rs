pub mod health;
pub mod users;

use axum::http::Method;
use axum::Router;

use crate::state::AppState;

/// Routes reachable without a session token.
///
/// Everything else mounted by [`api_routes`] passes through
/// [`require_session`](crate::middleware::session::require_session).
pub const PUBLIC_ROUTES: &[(Method, &str)] = &[
    (Method::POST, "/users/new"),
    (Method::POST, "/users/login"),
    (Method::GET, "/users/activate"),
    (Method::POST, "/users/activate"),
    (Method::GET, "/users/password/reset"),
    (Method::POST, "/users/password/reset"),
    (Method::GET, "/users/onetimelogin"),
    (Method::POST, "/users/onetimelogin"),
];

/// Whether `(method, path)` is in [`PUBLIC_ROUTES`]. A trailing slash is ignored.
pub fn is_public(method: &Method, path: &str) -> bool {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    PUBLIC_ROUTES
        .iter()
        .any(|(public_method, public_path)| public_method == method && *public_path == path)
}

/// Build the identity route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users                         current user (GET), update (PUT)
/// /users/new                     register (public)
/// /users/login                   password login (public)
/// /users/activate                request token (GET), activate (POST) (public)
/// /users/password/reset          request token (GET), reset (POST) (public)
/// /users/password/change         change own password
/// /users/onetimelogin            request token (GET), log in (POST) (public)
/// /users/permissions             caller's permissions
/// /users/preferences             get, set
/// /users/list                    user ids in the caller's organization
/// /users/{id}/roles              get, replace
/// /users/{id}/organization       add (POST), remove (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    users::router()
}
