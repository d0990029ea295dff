//! Token validation, run for every protected request

use tracing::debug;

use super::issuer::from_unix;
use super::revocation::SharedRevocationRegistry;
use crate::domain::{AuthError, AuthResult, Identity, UserRole};
use crate::infrastructure::crypto::jwt::{decode_token, JwtConfig};
use crate::shared::SharedClock;

pub struct TokenValidator {
    config: JwtConfig,
    clock: SharedClock,
    registry: SharedRevocationRegistry,
}

impl TokenValidator {
    pub fn new(config: JwtConfig, clock: SharedClock, registry: SharedRevocationRegistry) -> Self {
        Self {
            config,
            clock,
            registry,
        }
    }

    /// Check signature, then expiry, then revocation.
    ///
    /// Returns the specific failure (`InvalidSignature`, `Expired`,
    /// `Revoked`); callers facing the outside world collapse it.
    pub fn validate(&self, token: &str) -> AuthResult<Identity> {
        let claims = decode_token(token, &self.config).map_err(|e| {
            debug!(error = %e, "Token signature check failed");
            AuthError::InvalidSignature
        })?;

        let issued_at = from_unix(claims.iat).map_err(|_| AuthError::InvalidSignature)?;
        let expires_at = from_unix(claims.exp).map_err(|_| AuthError::InvalidSignature)?;
        if self.clock.now() >= expires_at {
            return Err(AuthError::Expired);
        }

        if self.registry.is_revoked(&claims.jti) {
            return Err(AuthError::Revoked);
        }

        Ok(Identity {
            username: claims.sub,
            role: UserRole::parse(&claims.role),
            token_id: claims.jti,
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::application::session::{RevocationRegistry, TokenIssuer};
    use crate::infrastructure::crypto::jwt::{encode_token, TokenClaims};
    use crate::shared::{Clock, ManualClock};

    struct Fixture {
        clock: Arc<ManualClock>,
        registry: SharedRevocationRegistry,
        issuer: TokenIssuer,
        validator: TokenValidator,
    }

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiration_hours: 24,
            issuer: "auth-service".to_string(),
        }
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        ));
        let registry = RevocationRegistry::shared(clock.clone());
        let issuer = TokenIssuer::new(config("secret"), clock.clone(), registry.clone());
        let validator = TokenValidator::new(config("secret"), clock.clone(), registry.clone());
        Fixture {
            clock,
            registry,
            issuer,
            validator,
        }
    }

    #[test]
    fn fresh_token_validates() {
        let f = fixture();
        let token = f.issuer.issue("alice", UserRole::User).unwrap();

        assert_eq!(token.expires_at, f.clock.now() + Duration::hours(24));
        let identity = f.validator.validate(token.as_str()).unwrap();
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, UserRole::User);
        assert_eq!(identity.token_id, token.id);
        assert_eq!(identity.issued_at, token.issued_at);
        assert_eq!(f.registry.active_sessions("alice"), 1);
    }

    #[test]
    fn tokens_are_unique_within_a_second() {
        let f = fixture();
        let a = f.issuer.issue("alice", UserRole::User).unwrap();
        let b = f.issuer.issue("alice", UserRole::User).unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.token, b.token);
        assert_eq!(a.issued_at, b.issued_at);
    }

    #[test]
    fn token_expires_exactly_at_expiry() {
        let f = fixture();
        let token = f.issuer.issue("alice", UserRole::User).unwrap();

        f.clock.advance(Duration::hours(24) - Duration::seconds(1));
        assert!(f.validator.validate(token.as_str()).is_ok());

        f.clock.advance(Duration::seconds(1));
        assert_eq!(f.validator.validate(token.as_str()), Err(AuthError::Expired));
    }

    #[test]
    fn revoked_token_rejected() {
        let f = fixture();
        let token = f.issuer.issue("alice", UserRole::User).unwrap();
        f.registry.revoke_token(&token);
        assert_eq!(f.validator.validate(token.as_str()), Err(AuthError::Revoked));
    }

    #[test]
    fn foreign_signature_rejected() {
        let f = fixture();
        let now = f.clock.now().timestamp();
        let forged = encode_token(
            &TokenClaims {
                sub: "alice".into(),
                role: "admin".into(),
                jti: "forged".into(),
                iat: now,
                exp: now + 3600,
                iss: "auth-service".into(),
            },
            &config("attacker-secret"),
        )
        .unwrap();

        assert_eq!(f.validator.validate(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn tampered_payload_rejected() {
        let f = fixture();
        let token = f.issuer.issue("alice", UserRole::User).unwrap();

        let mut parts: Vec<&str> = token.as_str().split('.').collect();
        let other = f.issuer.issue("mallory", UserRole::Admin).unwrap();
        let other_payload = other.as_str().split('.').nth(1).unwrap().to_string();
        parts[1] = other_payload.as_str();
        let spliced = parts.join(".");

        assert_eq!(f.validator.validate(&spliced), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn garbage_rejected() {
        let f = fixture();
        assert_eq!(f.validator.validate(""), Err(AuthError::InvalidSignature));
        assert_eq!(f.validator.validate("a.b.c"), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn signature_checked_before_expiry() {
        let f = fixture();
        let token = f.issuer.issue("alice", UserRole::User).unwrap();
        f.clock.advance(Duration::hours(48));

        let other = TokenValidator::new(config("rotated"), f.clock.clone(), f.registry.clone());
        assert_eq!(other.validate(token.as_str()), Err(AuthError::InvalidSignature));
        assert_eq!(f.validator.validate(token.as_str()), Err(AuthError::Expired));
    }
}
