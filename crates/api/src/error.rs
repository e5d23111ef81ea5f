use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gatehouse_core::error::{CoreError, ErrorClass};
use gatehouse_db::DbError;
use gatehouse_mail::MailError;

use crate::response::StatusMessage;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for business-rule failures and adds variants for the
/// infrastructure the handlers touch. Implements [`IntoResponse`] to produce
/// `{"status": false, "message": "<code>"}` bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A business-rule failure with a stable surface code.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store failure that is not a business outcome.
    #[error(transparent)]
    Db(DbError),

    /// The e-mail collaborator failed.
    #[error(transparent)]
    Mail(#[from] MailError),

    /// The request body could not be decoded.
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),

    /// The query string could not be decoded.
    #[error(transparent)]
    InvalidQuery(#[from] QueryRejection),

    /// A bad request with a client-visible message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err.as_core() {
            Some(core) => AppError::Core(core),
            None => AppError::Db(err),
        }
    }
}

impl AppError {
    /// HTTP status and client-visible message.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Core(core) => {
                let status = match core.class() {
                    ErrorClass::Validation | ErrorClass::Conflict | ErrorClass::Missing => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    ErrorClass::Auth | ErrorClass::Token => StatusCode::FORBIDDEN,
                    ErrorClass::BadInput => StatusCode::BAD_REQUEST,
                };
                (status, core.code().to_string())
            }
            AppError::Db(err) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
            AppError::Mail(err) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
            AppError::InvalidBody(rejection) => (rejection.status(), "invalid_request_body".into()),
            AppError::InvalidQuery(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_query".into()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InternalError(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(%status, code = %message, "Request rejected");
        }

        (status, axum::Json(StatusMessage::failure(message))).into_response()
    }
}
