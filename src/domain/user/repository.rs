use async_trait::async_trait;

use super::{UserChanges, UserRecord};
use crate::shared::AuthResult;

/// Persistence seam for credential records.
///
/// Every method is a point operation on the `username` key and must be
/// atomic: concurrent readers never see a half-applied write.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `DuplicateUser` if the username is taken.
    async fn insert(&self, record: UserRecord) -> AuthResult<()>;

    async fn find(&self, username: &str) -> AuthResult<Option<UserRecord>>;

    /// Fails with `NotFound` if the username is unknown.
    async fn update(&self, username: &str, changes: UserChanges) -> AuthResult<UserRecord>;

    /// Fails with `NotFound` if the username is unknown.
    async fn remove(&self, username: &str) -> AuthResult<()>;

    async fn count(&self) -> AuthResult<u64>;
}
