//! Credential operations: register, verify, update, delete
//!
//! Passwords are hashed on the blocking pool before the store is touched,
//! so no store lock is ever held across hashing.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use super::rules::{validate_password, validate_profile, validate_username};
use crate::application::session::SharedRevocationRegistry;
use crate::domain::{
    AuthError, AuthResult, CredentialStore, ProfileUpdate, UserChanges, UserRecord, UserRole,
};
use crate::infrastructure::crypto::password::{hash_password_blocking, verify_password_blocking};
use crate::shared::SharedClock;

pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    registry: SharedRevocationRegistry,
    clock: SharedClock,
    bcrypt_cost: u32,
    /// Hash checked against when the username is unknown, so a miss costs
    /// the same as a wrong password
    decoy_hash: OnceCell<String>,
}

impl CredentialService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        registry: SharedRevocationRegistry,
        clock: SharedClock,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            store,
            registry,
            clock,
            bcrypt_cost,
            decoy_hash: OnceCell::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Create a credential record with a fresh salt.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> AuthResult<UserRecord> {
        validate_username(username)?;
        validate_password(password)?;

        // Skip the hashing cost for names that are obviously taken; the
        // store's unique key still decides races.
        if self.store.find(username).await?.is_some() {
            return Err(AuthError::DuplicateUser(username.to_string()));
        }

        let hashed = hash_password_blocking(password.to_string(), self.bcrypt_cost).await?;
        let record = UserRecord::new(username, hashed, role, self.clock.now());
        self.store.insert(record.clone()).await?;

        info!(username, role = role.as_str(), "New user registered");
        Ok(record)
    }

    /// Check a username/password pair against the stored hash.
    pub async fn verify(&self, username: &str, password: &str) -> AuthResult<UserRecord> {
        let Some(user) = self.store.find(username).await? else {
            let decoy = self
                .decoy_hash
                .get_or_try_init(|| async {
                    hash_password_blocking("decoy-password".to_string(), self.bcrypt_cost)
                        .await
                        .map(|h| h.hash)
                })
                .await?;
            verify_password_blocking(password.to_string(), decoy.clone()).await?;
            return Err(AuthError::NotFound(username.to_string()));
        };

        if !verify_password_blocking(password.to_string(), user.password_hash.clone()).await? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Apply a partial profile update. A new password gets a new salt.
    pub async fn update(&self, username: &str, update: ProfileUpdate) -> AuthResult<UserRecord> {
        validate_profile(&update)?;

        if update.is_empty() {
            return self
                .store
                .find(username)
                .await?
                .ok_or_else(|| AuthError::NotFound(username.to_string()));
        }

        let password = match update.password {
            Some(password) => Some(hash_password_blocking(password, self.bcrypt_cost).await?),
            None => None,
        };

        let changes = UserChanges {
            email: update.email,
            display_name: update.display_name,
            password,
            updated_at: self.clock.now(),
        };

        let user = self.store.update(username, changes).await?;
        info!(username, "Profile updated");
        Ok(user)
    }

    /// Remove the record, then revoke every active session of the user.
    /// Returns the number of revoked sessions.
    pub async fn delete(&self, username: &str) -> AuthResult<usize> {
        self.store.remove(username).await?;
        let revoked = self.registry.revoke_all(username);
        info!(username, revoked_sessions = revoked, "User deleted");
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::application::session::RevocationRegistry;
    use crate::infrastructure::storage::InMemoryCredentialStore;
    use crate::shared::ManualClock;

    fn service() -> CredentialService {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        ));
        CredentialService::new(
            Arc::new(InMemoryCredentialStore::new()),
            RevocationRegistry::shared(clock.clone()),
            clock,
            4,
        )
    }

    #[tokio::test]
    async fn unknown_user_still_pays_for_a_hash_check() {
        let creds = service();
        assert!(!creds.decoy_hash.initialized());

        assert_eq!(
            creds.verify("ghost", "pw1").await,
            Err(AuthError::NotFound("ghost".into()))
        );
        assert!(creds.decoy_hash.initialized());

        // The decoy is computed once and reused
        let first = creds.decoy_hash.get().cloned();
        let _ = creds.verify("ghost", "pw2").await;
        assert_eq!(creds.decoy_hash.get().cloned(), first);
    }

    #[tokio::test]
    async fn known_user_skips_the_decoy() {
        let creds = service();
        creds.register("alice", "pw1", UserRole::User).await.unwrap();

        assert!(creds.verify("alice", "pw1").await.is_ok());
        assert_eq!(
            creds.verify("alice", "nope").await,
            Err(AuthError::InvalidCredentials)
        );
        assert!(!creds.decoy_hash.initialized());
    }
}
