//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{organizations, preferences, roles, users};
use crate::state::AppState;

/// Routes under `/users`.
///
/// Both `/users` and `/users/` address the current user.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(users::current_user).put(users::update_current_user),
        )
        .route(
            "/users/",
            get(users::current_user).put(users::update_current_user),
        )
        .route("/users/new", post(users::create_user))
        .route("/users/login", post(users::login))
        .route(
            "/users/activate",
            get(users::request_activation).post(users::activate),
        )
        .route(
            "/users/password/reset",
            get(users::request_password_reset).post(users::reset_password),
        )
        .route("/users/password/change", post(users::change_password))
        .route(
            "/users/onetimelogin",
            get(users::request_one_time_login).post(users::one_time_login),
        )
        .route("/users/permissions", get(roles::get_permissions))
        .route(
            "/users/preferences",
            get(preferences::get_preferences).post(preferences::set_preferences),
        )
        .route("/users/list", get(organizations::list_users))
        .route(
            "/users/{id}/roles",
            get(roles::get_user_roles).put(roles::set_user_roles),
        )
        .route(
            "/users/{id}/organization",
            post(organizations::add_to_organization)
                .delete(organizations::remove_from_organization),
        )
}
