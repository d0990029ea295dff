//! JWT token encoding
//!
//! Tokens are HS256 JWTs. Expiry is not checked here: callers compare `exp`
//! against their own clock so the boundary (`now >= exp`) is exact.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token lifetime in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// User role
    pub role: String,
    /// Token id (random nonce)
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

/// Sign claims into a compact token
pub fn encode_token(
    claims: &TokenClaims,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify the signature and issuer of a token and decode its claims
pub fn decode_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["sub", "exp", "iss"]);
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiration_hours: 24,
            issuer: "auth-service".to_string(),
        }
    }

    fn claims() -> TokenClaims {
        TokenClaims {
            sub: "alice".into(),
            role: "user".into(),
            jti: "nonce-1".into(),
            iat: 1_700_000_000,
            exp: 1_700_086_400,
            iss: "auth-service".into(),
        }
    }

    #[test]
    fn test_encode_and_decode_token() {
        let cfg = config("secret");
        let token = encode_token(&claims(), &cfg).unwrap();
        assert_eq!(decode_token(&token, &cfg).unwrap(), claims());
    }

    #[test]
    fn test_expired_token_still_decodes() {
        // exp lies in the past; expiry is the caller's job
        let cfg = config("secret");
        let token = encode_token(&claims(), &cfg).unwrap();
        assert!(decode_token(&token, &cfg).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = encode_token(&claims(), &config("secret")).unwrap();
        assert!(decode_token(&token, &config("other")).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let cfg = config("secret");
        let mut foreign = claims();
        foreign.iss = "someone-else".into();
        let token = encode_token(&foreign, &cfg).unwrap();
        assert!(decode_token(&token, &cfg).is_err());
    }

    #[test]
    fn test_invalid_token() {
        assert!(decode_token("invalid-token", &config("secret")).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", config("hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
