use async_trait::async_trait;

use crate::domain::{AuthError, AuthResult, CredentialStore, UserChanges, UserRecord};

/// A store whose backend is down: every call fails with `Unavailable`.
#[derive(Debug, Default)]
pub struct UnavailableCredentialStore;

fn down<T>() -> AuthResult<T> {
    Err(AuthError::Unavailable("connection refused".into()))
}

#[async_trait]
impl CredentialStore for UnavailableCredentialStore {
    async fn insert(&self, _record: UserRecord) -> AuthResult<()> {
        down()
    }

    async fn find(&self, _username: &str) -> AuthResult<Option<UserRecord>> {
        down()
    }

    async fn update(&self, _username: &str, _changes: UserChanges) -> AuthResult<UserRecord> {
        down()
    }

    async fn remove(&self, _username: &str) -> AuthResult<()> {
        down()
    }

    async fn count(&self) -> AuthResult<u64> {
        down()
    }
}
