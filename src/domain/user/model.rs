use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserChanges;

/// User role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    /// Unknown strings map to the least privileged role.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

/// Salted password hash as stored next to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    /// bcrypt hash string (embeds cost and salt)
    pub hash: String,
    /// Hex encoded 16-byte salt
    pub salt: String,
}

/// Credential record, keyed by `username`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    pub role: UserRole,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(
        username: impl Into<String>,
        password: PasswordHash,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password.hash,
            salt: password.salt,
            role,
            email: None,
            display_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a set of changes. Fields left as `None` are kept.
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(email) = changes.email {
            self.email = Some(email);
        }
        if let Some(display_name) = changes.display_name {
            self.display_name = Some(display_name);
        }
        if let Some(password) = changes.password {
            self.password_hash = password.hash;
            self.salt = password.salt;
        }
        self.updated_at = changes.updated_at;
    }

    pub fn profile(&self) -> PublicProfile {
        PublicProfile::from(self)
    }
}

/// A user record without its secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicProfile {
    pub username: String,
    pub role: UserRole,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserRecord> for PublicProfile {
    fn from(user: &UserRecord) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
