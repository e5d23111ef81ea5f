//! Handlers for the `/users` account endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use gatehouse_core::types::DbId;
use gatehouse_core::user::Extensions;
use gatehouse_db::models::user::UserResponse;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::identity::{NewAccount, ProfileUpdate};
use crate::middleware::session::RequestIdentity;
use crate::response::{success, StatusMessage};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/new`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub organization_id: Option<DbId>,
    #[serde(default)]
    pub extensions: Extensions,
}

/// Request body for `POST /users/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub organization_id: DbId,
}

/// Query for the token request endpoints that only need an address.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    #[serde(default)]
    pub email: String,
}

/// Request body for `POST /users/activate`.
#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub email: String,
    pub activation_token: String,
}

/// Request body for `POST /users/password/reset`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub reset_token: String,
    pub password: String,
}

/// Request body for `POST /users/password/change`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub email: String,
    pub password: String,
    pub passwordold: String,
}

/// Query for `GET /users/onetimelogin`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneTimeLoginQuery {
    #[serde(default)]
    pub email: String,
    pub organization_id: DbId,
}

/// Request body for `POST /users/onetimelogin`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneTimeLoginRequest {
    pub email: String,
    #[serde(rename = "login_token")]
    pub login_token: String,
    pub organization_id: DbId,
}

/// Request body for `PUT /users/`: a user as previously returned. Read-only
/// fields that are echoed back (`activated`, `passwordLogin`, `token`) are
/// ignored.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: Option<DbId>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub organizations: Option<Vec<DbId>>,
    pub extensions: Option<Extensions>,
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

/// POST /users/new
///
/// Register and mail an activation token.
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<StatusMessage>)> {
    state
        .identity
        .create_user(NewAccount {
            email: input.email,
            password: input.password,
            organizations: input.organization_id.into_iter().collect(),
            extensions: input.extensions,
        })
        .await?;
    Ok(success(StatusCode::CREATED, "create_user_added"))
}

/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .identity
        .login(&input.email, &input.password, input.organization_id)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users/activate?email=
///
/// Mail a new activation token.
pub async fn request_activation(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> AppResult<(StatusCode, Json<StatusMessage>)> {
    state.identity.request_activation(&query.email).await?;
    Ok(success(StatusCode::OK, "activation_token_request_received"))
}

/// POST /users/activate
pub async fn activate(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ActivateRequest>,
) -> AppResult<(StatusCode, Json<StatusMessage>)> {
    state
        .identity
        .activate(&input.email, &input.activation_token)
        .await?;
    Ok(success(StatusCode::ACCEPTED, "user_activated"))
}

/// GET /users/password/reset?email=
///
/// Always reports success for well-formed addresses, registered or not.
pub async fn request_password_reset(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> AppResult<(StatusCode, Json<StatusMessage>)> {
    state.identity.request_password_reset(&query.email).await?;
    Ok(success(StatusCode::OK, "password_change_request_received"))
}

/// POST /users/password/reset
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ResetPasswordRequest>,
) -> AppResult<(StatusCode, Json<StatusMessage>)> {
    state
        .identity
        .reset_password(&input.email, &input.reset_token, &input.password)
        .await?;
    Ok(success(StatusCode::ACCEPTED, "password_change_success"))
}

/// GET /users/onetimelogin?email=&organizationId=
pub async fn request_one_time_login(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OneTimeLoginQuery>,
) -> AppResult<(StatusCode, Json<StatusMessage>)> {
    state
        .identity
        .request_one_time_login(&query.email, query.organization_id)
        .await?;
    Ok(success(StatusCode::OK, "onetimepassword_token_request_received"))
}

/// POST /users/onetimelogin
pub async fn one_time_login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<OneTimeLoginRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .identity
        .one_time_login(&input.email, input.organization_id, &input.login_token)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// ---------------------------------------------------------------------------
// Session handlers
// ---------------------------------------------------------------------------

/// POST /users/password/change
pub async fn change_password(
    State(state): State<AppState>,
    identity: RequestIdentity,
    ApiJson(input): ApiJson<ChangePasswordRequest>,
) -> AppResult<(StatusCode, Json<StatusMessage>)> {
    state
        .identity
        .password_change(
            identity.user_id,
            &input.email,
            &input.password,
            &input.passwordold,
        )
        .await?;
    Ok(success(StatusCode::ACCEPTED, "password_change_success"))
}

/// GET /users/
pub async fn current_user(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> AppResult<Json<UserResponse>> {
    let user = state.identity.user_by_id(identity.user_id).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// PUT /users/
///
/// Only profile extensions may change.
pub async fn update_current_user(
    State(state): State<AppState>,
    identity: RequestIdentity,
    ApiJson(input): ApiJson<UpdateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .identity
        .update(
            identity.user_id,
            ProfileUpdate {
                id: input.id,
                email: input.email,
                password: input.password,
                organizations: input.organizations,
                extensions: input.extensions,
            },
        )
        .await?;
    Ok((StatusCode::ACCEPTED, Json(UserResponse::from(&user))))
}
