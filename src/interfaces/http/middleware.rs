//! Session guard for protected routes

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::common::error_response;
use super::modules::auth::AuthHandlerState;
use crate::domain::{AuthError, AuthResult, Identity};

/// Pull the token out of an `Authorization: Bearer <token>` value.
pub fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token)
}

async fn authenticate_headers(
    state: &AuthHandlerState,
    headers: &HeaderMap,
) -> AuthResult<Identity> {
    let token = bearer_token(headers).ok_or(AuthError::Unauthorized)?;
    state.auth.authenticate(token).await
}

/// Rejects the request with 401 unless it carries a live session token.
/// On success the caller's [`Identity`] is stored in request extensions.
pub async fn require_session(
    State(state): State<AuthHandlerState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate_headers(&state, request.headers()).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => error_response(e).into_response(),
    }
}
