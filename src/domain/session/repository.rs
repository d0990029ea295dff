use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::RevocationEntry;
use crate::shared::AuthResult;

/// Durable copy of the revocation registry, so logouts survive a restart.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Idempotent on `token_id`.
    async fn save(&self, entry: &RevocationEntry) -> AuthResult<()>;

    /// Entries whose token has not yet expired at `now`.
    async fn load_live(&self, now: DateTime<Utc>) -> AuthResult<Vec<RevocationEntry>>;

    /// Returns the number of entries removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}
