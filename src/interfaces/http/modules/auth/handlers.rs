//! Authentication API handlers

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};

use super::dto::{
    DeleteUserParams, LoginRequest, LoginResponse, ProfileDto, RegisterRequest,
    UpdateProfileRequest,
};
use crate::application::AuthService;
use crate::domain::{AuthError, Identity};
use crate::interfaces::http::common::{error_response, ApiError, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::bearer_token;

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub auth: Arc<AuthService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let token = state
        .auth
        .login(&request.username, &request.password)
        .await
        .map_err(|e| match e {
            // Unknown user and wrong password look the same from outside
            AuthError::NotFound(_) => error_response(AuthError::InvalidCredentials),
            other => error_response(other),
        })?;

    Ok(Json(ApiResponse::success(LoginResponse::from_token(token))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token revoked", body = ApiResponse<EmptyData>)
    )
)]
pub async fn logout(
    State(state): State<AuthHandlerState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        state.auth.logout(token).await.map_err(error_response)?;
    }
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<ProfileDto>),
        (status = 409, description = "User already exists"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProfileDto>>), ApiError> {
    let profile = state
        .auth
        .register(&request.username, &request.password)
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ProfileDto::from(profile))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/user",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = ApiResponse<ProfileDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn load_profile(
    State(state): State<AuthHandlerState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let profile = state
        .auth
        .load_profile(&identity)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(profile.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/user",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<ProfileDto>),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_profile(
    State(state): State<AuthHandlerState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let profile = state
        .auth
        .update_profile(&identity, request.into())
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(profile.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/auth/delete/user",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    params(DeleteUserParams),
    responses(
        (status = 200, description = "Account deleted and its sessions revoked", body = ApiResponse<EmptyData>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not allowed to delete this account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AuthHandlerState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<DeleteUserParams>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    let target = params
        .username
        .unwrap_or_else(|| identity.username.clone());

    state
        .auth
        .delete_user(&identity, &target)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
