//! Handlers for permissions and role assignments within the caller's
//! active organization.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gatehouse_core::permissions::{PERMISSION_READ_ROLES, PERMISSION_WRITE_ROLES};
use gatehouse_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::session::RequestIdentity;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<DbId>,
}

/// Request body for `PUT /users/{id}/roles`: role names or role ids.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRolesRequest {
    pub roles: Option<Vec<String>>,
    pub role_ids: Option<Vec<DbId>>,
}

/// GET /users/permissions
pub async fn get_permissions(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> AppResult<Json<PermissionsResponse>> {
    let granted = identity.permissions(&state).await?;
    Ok(Json(PermissionsResponse {
        permissions: granted.0,
    }))
}

/// GET /users/{id}/roles
pub async fn get_user_roles(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<RolesResponse>> {
    identity.require(&state, &[PERMISSION_READ_ROLES]).await?;
    state.identity.user_by_id(user_id).await?;

    let roles = state
        .roles
        .get_role_ids(user_id, identity.organization_id)
        .await?;
    Ok(Json(RolesResponse { roles }))
}

/// PUT /users/{id}/roles
pub async fn set_user_roles(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(user_id): Path<DbId>,
    ApiJson(input): ApiJson<SetRolesRequest>,
) -> AppResult<(StatusCode, Json<RolesResponse>)> {
    identity.require(&state, &[PERMISSION_WRITE_ROLES]).await?;
    state.identity.user_by_id(user_id).await?;

    let org_id = identity.organization_id;
    let update = match (input.roles, input.role_ids) {
        (Some(names), None) => {
            state
                .roles
                .set_roles_by_name(user_id, org_id, &names)
                .await?
        }
        (None, Some(ids)) => {
            state
                .roles
                .set_roles_by_role_id(user_id, org_id, &ids)
                .await?
        }
        _ => {
            return Err(AppError::BadRequest(
                "exactly one of roles or roleIds is required".into(),
            ))
        }
    };
    tracing::debug!(
        user_id,
        org_id,
        cleared = update.cleared,
        inserted = update.inserted,
        changed_by = identity.user_id,
        "Role assignment written"
    );

    let roles = state.roles.get_role_ids(user_id, org_id).await?;
    Ok((StatusCode::ACCEPTED, Json(RolesResponse { roles })))
}
