//! Authentication DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{ProfileUpdate, PublicProfile, SessionToken};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    /// Seconds until `expires_at`
    pub expires_in: i64,
    pub username: String,
    pub role: String,
}

impl LoginResponse {
    pub fn from_token(token: SessionToken) -> Self {
        Self {
            expires_in: (token.expires_at - token.issued_at).num_seconds(),
            expires_at: token.expires_at,
            role: token.role.as_str().to_string(),
            username: token.subject,
            token: token.token,
            token_type: "Bearer".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 72, message = "password must be 1-72 characters"))]
    pub password: String,
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "display name must be 1-100 characters"))]
    pub display_name: Option<String>,
    #[validate(length(min = 1, max = 72, message = "password must be 1-72 characters"))]
    pub password: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            email: req.email,
            display_name: req.display_name,
            password: req.password,
        }
    }
}

/// Deletion target. Defaults to the caller's own account.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteUserParams {
    pub username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileDto {
    pub username: String,
    pub role: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PublicProfile> for ProfileDto {
    fn from(p: PublicProfile) -> Self {
        Self {
            role: p.role.as_str().to_string(),
            username: p.username,
            email: p.email,
            display_name: p.display_name,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
