//! In-memory credential store

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{AuthError, AuthResult, CredentialStore, UserChanges, UserRecord};

/// In-memory store for development and testing.
///
/// Each username lives in one dashmap shard, so every mutation is applied
/// under that shard's lock and readers only ever see whole records.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: DashMap<String, UserRecord>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert(&self, record: UserRecord) -> AuthResult<()> {
        match self.users.entry(record.username.clone()) {
            Entry::Occupied(_) => Err(AuthError::DuplicateUser(record.username)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn find(&self, username: &str) -> AuthResult<Option<UserRecord>> {
        Ok(self.users.get(username).map(|u| u.clone()))
    }

    async fn update(&self, username: &str, changes: UserChanges) -> AuthResult<UserRecord> {
        let mut user = self
            .users
            .get_mut(username)
            .ok_or_else(|| AuthError::NotFound(username.to_string()))?;
        user.apply(changes);
        Ok(user.clone())
    }

    async fn remove(&self, username: &str) -> AuthResult<()> {
        self.users
            .remove(username)
            .ok_or_else(|| AuthError::NotFound(username.to_string()))?;
        Ok(())
    }

    async fn count(&self) -> AuthResult<u64> {
        Ok(self.users.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::domain::{PasswordHash, UserRole};

    fn record(username: &str) -> UserRecord {
        UserRecord::new(
            username,
            PasswordHash {
                hash: "$2b$04$hash".into(),
                salt: "00".repeat(16),
            },
            UserRole::User,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn insert_and_find() {
        let store = InMemoryCredentialStore::new();
        store.insert(record("alice")).await.unwrap();

        let found = store.find("alice").await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert!(store.find("bob").await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_insert_fails() {
        let store = InMemoryCredentialStore::new();
        store.insert(record("alice")).await.unwrap();

        let err = store.insert(record("alice")).await.unwrap_err();
        assert_eq!(err, AuthError::DuplicateUser("alice".into()));
    }

    #[tokio::test]
    async fn concurrent_inserts_admit_one() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.insert(record("alice")).await }));
        }

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => ok += 1,
                Err(e) => assert!(matches!(e, AuthError::DuplicateUser(_))),
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn update_applies_partial_changes() {
        let store = InMemoryCredentialStore::new();
        store.insert(record("alice")).await.unwrap();

        let later = Utc::now() + chrono::Duration::seconds(5);
        let updated = store
            .update(
                "alice",
                UserChanges {
                    email: Some("alice@example.com".into()),
                    display_name: None,
                    password: None,
                    updated_at: later,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email.as_deref(), Some("alice@example.com"));
        assert_eq!(updated.display_name, None);
        assert_eq!(updated.password_hash, "$2b$04$hash");
        assert_eq!(updated.updated_at, later);
    }

    #[tokio::test]
    async fn update_and_remove_missing_user() {
        let store = InMemoryCredentialStore::new();
        let changes = UserChanges {
            email: None,
            display_name: None,
            password: None,
            updated_at: Utc::now(),
        };

        assert!(matches!(
            store.update("ghost", changes).await,
            Err(AuthError::NotFound(_))
        ));
        assert!(matches!(store.remove("ghost").await, Err(AuthError::NotFound(_))));
    }
}
