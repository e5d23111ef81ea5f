//! Session-token middleware and the per-request identity it establishes.
//!
//! [`require_session`] runs in front of every API route. Routes listed in
//! [`routes::PUBLIC_ROUTES`](crate::routes::PUBLIC_ROUTES) pass straight
//! through; every other request must carry `Authorization: Bearer <token>`.
//! The decoded identity is stored in the request extensions, where handlers
//! pick it up with the [`RequestIdentity`] extractor.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use gatehouse_core::error::CoreError;
use gatehouse_core::types::DbId;

use crate::auth::jwt::{parse_session, SessionClaims};
use crate::error::AppError;
use crate::routes;
use crate::state::AppState;

/// Who is calling, and on behalf of which organization.
///
/// ```ignore
/// async fn my_handler(identity: RequestIdentity) -> AppResult<Json<()>> {
///     tracing::info!(user_id = identity.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestIdentity {
    pub user_id: DbId,
    pub organization_id: DbId,
    pub email: String,
}

impl From<SessionClaims> for RequestIdentity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.user_id,
            organization_id: claims.organization_id,
            email: claims.email,
        }
    }
}

/// Reject requests to non-public routes that lack a valid session token.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if routes::is_public(request.method(), request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| CoreError::MalformedToken)?),
        None => None,
    };
    let claims = parse_session(header, &state.config.jwt)?;

    request
        .extensions_mut()
        .insert(RequestIdentity::from(claims));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .cloned()
            .ok_or_else(|| CoreError::NoUserLoggedIn.into())
    }
}
