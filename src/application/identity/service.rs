//! Authentication service, the application-layer orchestration
//!
//! Implements the request contract the HTTP layer depends on: login,
//! logout, register, load/update profile and user deletion. HTTP handlers
//! are thin wrappers that delegate here.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use super::credentials::CredentialService;
use crate::application::session::{
    RevocationRegistry, SharedRevocationRegistry, TokenIssuer, TokenValidator,
};
use crate::domain::{
    AuthError, AuthResult, CredentialStore, Identity, ProfileUpdate, PublicProfile,
    RevocationEntry, RevocationStore, SessionToken, UserRole,
};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::shared::{SharedClock, SystemClock};

/// Tunables for the engine
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
}

/// Owns the credential store handle, the token issuer/validator pair and
/// the revocation registry they share.
pub struct AuthService {
    credentials: CredentialService,
    issuer: TokenIssuer,
    validator: TokenValidator,
    registry: SharedRevocationRegistry,
    revocations: Option<Arc<dyn RevocationStore>>,
    clock: SharedClock,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, settings: AuthSettings, clock: SharedClock) -> Self {
        let registry = RevocationRegistry::shared(clock.clone());
        Self {
            credentials: CredentialService::new(
                store,
                registry.clone(),
                clock.clone(),
                settings.bcrypt_cost,
            ),
            issuer: TokenIssuer::new(settings.jwt.clone(), clock.clone(), registry.clone()),
            validator: TokenValidator::new(settings.jwt, clock.clone(), registry.clone()),
            registry,
            revocations: None,
            clock,
        }
    }

    pub fn with_system_clock(store: Arc<dyn CredentialStore>, settings: AuthSettings) -> Self {
        Self::new(store, settings, Arc::new(SystemClock))
    }

    /// Persist logouts to `store` as well as the in-memory registry.
    pub fn with_revocation_store(mut self, store: Arc<dyn RevocationStore>) -> Self {
        self.revocations = Some(store);
        self
    }

    pub fn registry(&self) -> SharedRevocationRegistry {
        self.registry.clone()
    }

    pub fn revocation_store(&self) -> Option<Arc<dyn RevocationStore>> {
        self.revocations.clone()
    }

    pub fn token_ttl(&self) -> Duration {
        self.issuer.ttl()
    }

    /// Load unexpired revocations from the durable store into the registry.
    /// Returns how many were loaded.
    pub async fn restore_revocations(&self) -> AuthResult<usize> {
        let Some(store) = &self.revocations else {
            return Ok(0);
        };

        let mut restored = 0;
        for entry in store.load_live(self.clock.now()).await? {
            if self.registry.restore(entry) {
                restored += 1;
            }
        }

        info!(restored, "Revocations restored");
        Ok(restored)
    }

    // ── Registration & login ────────────────────────────────────

    /// Register a regular user.
    pub async fn register(&self, username: &str, password: &str) -> AuthResult<PublicProfile> {
        let user = self
            .credentials
            .register(username, password, UserRole::User)
            .await?;
        Ok(user.profile())
    }

    /// Check credentials and mint a session token.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<SessionToken> {
        let user = self.credentials.verify(username, password).await?;
        let token = self.issuer.issue(&user.username, user.role)?;

        // A concurrent delete may have run between verify and issue. It
        // removes the record before revoking tracked sessions, so if the
        // record is still here our token is covered by that revocation.
        if self.credentials.store().find(&user.username).await?.is_none() {
            self.registry.revoke_token(&token);
            return Err(AuthError::NotFound(user.username));
        }

        info!(username = %user.username, token_id = %token.id, "User logged in");
        Ok(token)
    }

    /// Revoke the presented token. A token that is already invalid is a
    /// no-op, not an error.
    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        let identity = match self.validator.validate(token) {
            Ok(identity) => identity,
            Err(e) if e.is_token_failure() => {
                debug!(reason = %e, "Logout with an already invalid token");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.registry
            .revoke(&identity.token_id, &identity.username, identity.expires_at);

        if let Some(store) = &self.revocations {
            let entry = RevocationEntry {
                token_id: identity.token_id.clone(),
                subject: identity.username.clone(),
                revoked_at: self.clock.now(),
                expires_at: identity.expires_at,
            };
            store.save(&entry).await?;
        }

        info!(username = %identity.username, token_id = %identity.token_id, "User logged out");
        Ok(())
    }

    // ── Middleware contract ─────────────────────────────────────

    /// Validate a token for a protected operation. Every token failure is
    /// reported as `Unauthorized`.
    ///
    /// The token's subject must still exist and must not predate the
    /// account it names (a re-registered username starts with no
    /// sessions). The role comes from the stored record, not the claim.
    pub async fn authenticate(&self, token: &str) -> AuthResult<Identity> {
        let mut identity = self.validator.validate(token).map_err(|e| {
            debug!(reason = %e, "Authentication failed");
            e.into_boundary()
        })?;

        let Some(user) = self.credentials.store().find(&identity.username).await? else {
            debug!(username = %identity.username, "Token subject no longer exists");
            return Err(AuthError::Unauthorized);
        };

        // Token timestamps have second resolution
        if identity.issued_at.timestamp() < user.created_at.timestamp() {
            debug!(username = %identity.username, "Token predates the account");
            return Err(AuthError::Unauthorized);
        }

        identity.role = user.role;
        Ok(identity)
    }

    // ── Protected operations ────────────────────────────────────

    pub async fn load_profile(&self, identity: &Identity) -> AuthResult<PublicProfile> {
        self.credentials
            .store()
            .find(&identity.username)
            .await?
            .map(|u| u.profile())
            .ok_or_else(|| AuthError::NotFound(identity.username.clone()))
    }

    pub async fn update_profile(
        &self,
        identity: &Identity,
        update: ProfileUpdate,
    ) -> AuthResult<PublicProfile> {
        let user = self.credentials.update(&identity.username, update).await?;
        Ok(user.profile())
    }

    /// Delete `target`'s account and revoke its sessions.
    ///
    /// Users may delete only themselves; admins may delete anyone. The
    /// permission check runs before the existence check, so a non-admin
    /// learns nothing about which usernames exist.
    pub async fn delete_user(&self, identity: &Identity, target: &str) -> AuthResult<()> {
        if !identity.can_manage(target) {
            warn!(
                username = %identity.username,
                target,
                "Refused to delete another user's account"
            );
            return Err(AuthError::Forbidden(
                "Only admins may delete other accounts".into(),
            ));
        }

        self.credentials.delete(target).await?;
        Ok(())
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Create an admin account if the store is empty. Returns whether one
    /// was created.
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> AuthResult<bool> {
        if self.credentials.store().count().await? > 0 {
            return Ok(false);
        }

        match self
            .credentials
            .register(username, password, UserRole::Admin)
            .await
        {
            Ok(_) => {
                info!(username, "Default admin created");
                Ok(true)
            }
            // Another instance won the race
            Err(AuthError::DuplicateUser(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Round-trip to the credential store. Returns the number of users.
    pub async fn check_store(&self) -> AuthResult<u64> {
        self.credentials.store().count().await
    }
}
