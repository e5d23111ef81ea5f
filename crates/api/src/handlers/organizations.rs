//! Handlers for listing users and managing membership in the caller's
//! active organization.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gatehouse_core::permissions::{PERMISSION_LIST_USERS, PERMISSION_MANAGE_USERS};
use gatehouse_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::ApiQuery;
use crate::middleware::session::RequestIdentity;
use crate::response::{success, StatusMessage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Only activated users.
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<DbId>,
}

/// GET /users/list?active=
pub async fn list_users(
    State(state): State<AppState>,
    identity: RequestIdentity,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> AppResult<Json<UserListResponse>> {
    identity.require(&state, &[PERMISSION_LIST_USERS]).await?;
    let users = state
        .identity
        .users()
        .list(query.active, Some(identity.organization_id))
        .await?;
    Ok(Json(UserListResponse { users }))
}

/// POST /users/{id}/organization
pub async fn add_to_organization(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(user_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<StatusMessage>)> {
    identity.require(&state, &[PERMISSION_MANAGE_USERS]).await?;
    state.identity.user_by_id(user_id).await?;

    state
        .identity
        .users()
        .add_to_organization(user_id, identity.organization_id)
        .await?;
    tracing::info!(user_id, org_id = identity.organization_id, "Member added");
    Ok(success(StatusCode::ACCEPTED, "organization_member_added"))
}

/// DELETE /users/{id}/organization
pub async fn remove_from_organization(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(user_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<StatusMessage>)> {
    identity.require(&state, &[PERMISSION_MANAGE_USERS]).await?;

    state
        .identity
        .users()
        .remove_from_organization(user_id, identity.organization_id)
        .await?;
    tracing::info!(user_id, org_id = identity.organization_id, "Member removed");
    Ok(success(StatusCode::ACCEPTED, "organization_member_removed"))
}
