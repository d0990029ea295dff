//! Mints signed session tokens on successful login

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::revocation::SharedRevocationRegistry;
use crate::domain::{AuthError, AuthResult, SessionToken, UserRole};
use crate::infrastructure::crypto::jwt::{encode_token, JwtConfig, TokenClaims};
use crate::shared::{InfraError, SharedClock};

pub struct TokenIssuer {
    config: JwtConfig,
    clock: SharedClock,
    registry: SharedRevocationRegistry,
}

impl TokenIssuer {
    pub fn new(config: JwtConfig, clock: SharedClock, registry: SharedRevocationRegistry) -> Self {
        Self {
            config,
            clock,
            registry,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::hours(self.config.expiration_hours)
    }

    /// Issue a token for `username` valid from now until now + TTL.
    ///
    /// Two tokens issued in the same second still differ by their random
    /// `jti`. The token is tracked as an active session of its subject.
    pub fn issue(&self, username: &str, role: UserRole) -> AuthResult<SessionToken> {
        let iat = self.clock.now().timestamp();
        let exp = iat + self.ttl().num_seconds();

        let claims = TokenClaims {
            sub: username.to_string(),
            role: role.as_str().to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat,
            exp,
            iss: self.config.issuer.clone(),
        };

        let token = encode_token(&claims, &self.config).map_err(InfraError::from)?;

        let session = SessionToken {
            id: claims.jti,
            subject: claims.sub,
            role,
            issued_at: from_unix(iat)?,
            expires_at: from_unix(exp)?,
            token,
        };

        self.registry.track(&session);
        debug!(username, token_id = %session.id, expires_at = %session.expires_at, "Session token issued");
        Ok(session)
    }
}

pub(crate) fn from_unix(secs: i64) -> AuthResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AuthError::Internal(format!("Timestamp out of range: {}", secs)))
}
