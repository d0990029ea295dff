use chrono::{DateTime, Utc};

use crate::domain::UserRole;

/// A signed, time-bounded credential minted on login. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Random nonce, unique per issuance
    pub id: String,
    pub subject: String,
    pub role: UserRole,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Compact encoded token; carries the signature
    pub token: String,
}

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }
}

/// The caller behind a successfully validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub role: UserRole,
    pub token_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Whether this caller may act on `username`'s account.
    pub fn can_manage(&self, username: &str) -> bool {
        self.is_admin() || self.username == username
    }
}

/// Marks a token as invalidated before its natural expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationEntry {
    pub token_id: String,
    pub subject: String,
    pub revoked_at: DateTime<Utc>,
    /// Past this instant the entry carries no information and may be purged
    pub expires_at: DateTime<Utc>,
}
