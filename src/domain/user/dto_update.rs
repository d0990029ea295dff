use chrono::{DateTime, Utc};

use super::PasswordHash;

/// Partial profile update as requested by the owner.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub password: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.display_name.is_none() && self.password.is_none()
    }
}

/// Changes handed to the store once the new password (if any) is hashed.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub password: Option<PasswordHash>,
    pub updated_at: DateTime<Utc>,
}
