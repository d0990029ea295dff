//! Mapping of engine errors onto HTTP responses

use axum::http::StatusCode;
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::domain::AuthError;

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AuthError::DuplicateUser(_) => StatusCode::CONFLICT,
        AuthError::NotFound(_) => StatusCode::NOT_FOUND,
        AuthError::InvalidCredentials
        | AuthError::InvalidSignature
        | AuthError::Expired
        | AuthError::Revoked
        | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
        AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the error response. Token failures all read "Unauthorized" and
/// server-side details stay in the logs.
pub fn error_response(err: AuthError) -> ApiError {
    let status = status_for(&err);
    let message = match &err {
        e if e.is_token_failure() => AuthError::Unauthorized.to_string(),
        AuthError::Unavailable(_) => "Service temporarily unavailable".to_string(),
        AuthError::Internal(_) => "Internal server error".to_string(),
        other => other.to_string(),
    };

    if status.is_server_error() {
        error!(error = %err, status = status.as_u16(), "Request failed");
    }

    (status, Json(ApiResponse::error(message)))
}
